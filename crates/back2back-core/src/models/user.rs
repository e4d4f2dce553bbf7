use serde::{Deserialize, Serialize};

use crate::error::ResourceError;
use crate::utils::{clean_phone_number, format_phone_number, is_valid_email, is_valid_name, is_valid_phone_number};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub full_name: String,
    pub email: String,
    /// Digits only; formatting is applied for display.
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl UserInfo {
    /// Check every editable field, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let mut problems = Vec::new();
        if !is_valid_name(&self.full_name) {
            problems.push("name must be at least 2 characters");
        }
        if !is_valid_email(&self.email) {
            problems.push("email address is invalid");
        }
        if !is_valid_phone_number(&self.phone_number) {
            problems.push("phone number must have 10 digits");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ResourceError::Validation(problems.join(", ")))
        }
    }

    /// Trim the name and email and strip phone formatting.
    pub fn normalized(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: clean_phone_number(&self.phone_number),
            profile_picture: self.profile_picture.clone(),
        }
    }

    pub fn display_phone(&self) -> String {
        format_phone_number(&self.phone_number)
    }

    /// Up to two initials for the avatar placeholder.
    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> UserInfo {
        UserInfo {
            full_name: "John Doe".into(),
            email: "john.doe@example.com".into(),
            phone_number: "3105551234".into(),
            profile_picture: None,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(john().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let info = UserInfo {
            full_name: "J".into(),
            email: "nope".into(),
            ..john()
        };
        match info.validate() {
            Err(ResourceError::Validation(msg)) => {
                assert!(msg.contains("name"));
                assert!(msg.contains("email"));
                assert!(!msg.contains("phone"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_normalized_and_display() {
        let info = UserInfo {
            full_name: "  john doe ".into(),
            phone_number: "(310) 555-1234".into(),
            ..john()
        };
        let normalized = info.normalized();
        assert_eq!(normalized.full_name, "john doe");
        assert_eq!(normalized.phone_number, "3105551234");
        assert_eq!(normalized.display_phone(), "(310) 555-1234");
        assert_eq!(normalized.initials(), "JD");
    }

    #[test]
    fn test_profile_picture_optional_in_json() {
        let json = r#"{"fullName":"John Doe","email":"john.doe@example.com","phoneNumber":"3105551234"}"#;
        let info: UserInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info, john());
        assert!(!serde_json::to_string(&info).unwrap().contains("profilePicture"));
    }
}
