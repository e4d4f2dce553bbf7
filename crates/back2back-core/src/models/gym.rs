use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct GymLocation {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub is_primary: bool,
}

impl GymLocation {
    /// Address as one line, e.g. "123 Main Street, Los Angeles, CA 90012".
    pub fn full_address(&self) -> String {
        match (self.address.is_empty(), self.city.is_empty()) {
            (false, false) => format!("{}, {}", self.address, self.city),
            (false, true) => self.address.clone(),
            (true, _) => self.city.clone(),
        }
    }

    pub fn find_primary(locations: &[GymLocation]) -> Option<&GymLocation> {
        locations.iter().find(|loc| loc.is_primary)
    }

    /// The list with exactly `location_id` marked primary, or `None` when
    /// no location has that id.
    pub fn with_primary(locations: &[GymLocation], location_id: &str) -> Option<Vec<GymLocation>> {
        if !locations.iter().any(|loc| loc.id == location_id) {
            return None;
        }
        Some(
            locations
                .iter()
                .map(|loc| GymLocation {
                    is_primary: loc.id == location_id,
                    ..loc.clone()
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gym(id: &str, primary: bool) -> GymLocation {
        GymLocation {
            id: id.to_string(),
            name: format!("Back2Back {}", id),
            address: "123 Main Street".to_string(),
            city: "Los Angeles, CA 90012".to_string(),
            is_primary: primary,
        }
    }

    #[test]
    fn test_with_primary_marks_exactly_one() {
        let locations = vec![gym("1", true), gym("2", false), gym("3", false)];
        let updated = GymLocation::with_primary(&locations, "2").unwrap();

        assert_eq!(updated.iter().filter(|l| l.is_primary).count(), 1);
        assert_eq!(GymLocation::find_primary(&updated).unwrap().id, "2");
        // Input untouched
        assert_eq!(GymLocation::find_primary(&locations).unwrap().id, "1");
    }

    #[test]
    fn test_with_primary_unknown_id() {
        let locations = vec![gym("1", true)];
        assert!(GymLocation::with_primary(&locations, "9").is_none());
    }

    #[test]
    fn test_parse_api_location() {
        let json = r#"{"id":"1","name":"Back2Back Downtown","address":"123 Main Street","city":"Los Angeles, CA 90012","isPrimary":true}"#;
        let loc: GymLocation = serde_json::from_str(json).unwrap();
        assert!(loc.is_primary);
        assert_eq!(loc.full_address(), "123 Main Street, Los Angeles, CA 90012");
    }
}
