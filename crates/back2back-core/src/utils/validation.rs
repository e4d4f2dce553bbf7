/// Minimum length for a display name after trimming
const MIN_NAME_LENGTH: usize = 2;

/// US phone numbers without country code
const PHONE_DIGITS: usize = 10;

/// Loose `local@domain.tld` check: no whitespace, one `@`, a dot inside the domain.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot in the domain with text on both sides of it
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_NAME_LENGTH
}

/// Strip all formatting, keeping only digits
pub fn clean_phone_number(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn is_valid_phone_number(phone: &str) -> bool {
    clean_phone_number(phone).len() == PHONE_DIGITS
}

/// Format a phone number as it is typed, progressing towards (XXX) XXX-XXXX.
/// Digits beyond the tenth are dropped.
pub fn format_phone_number(text: &str) -> String {
    let digits = clean_phone_number(text);
    let digits = &digits[..digits.len().min(PHONE_DIGITS)];

    match digits.len() {
        0..=3 => digits.to_string(),
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("john.doe@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("john.doe@example")); // no tld
        assert!(!is_valid_email("john doe@example.com")); // whitespace
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("john@@example.com"));
        assert!(!is_valid_email("john@.com"));
        assert!(!is_valid_email("john@example."));
        // Trailing dot is fine once the domain has an inner one
        assert!(is_valid_email("a@b.c."));
        assert!(is_valid_email("a@.b.c"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_is_valid_name() {
        assert!(is_valid_name("Jo"));
        assert!(is_valid_name("  John Doe  "));
        assert!(!is_valid_name(" J "));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_phone_number_helpers() {
        assert_eq!(clean_phone_number("(310) 555-1234"), "3105551234");
        assert!(is_valid_phone_number("(310) 555-1234"));
        assert!(!is_valid_phone_number("555-1234"));
    }

    #[test]
    fn test_format_phone_number_progressive() {
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("310"), "310");
        assert_eq!(format_phone_number("3105"), "(310) 5");
        assert_eq!(format_phone_number("310555"), "(310) 555");
        assert_eq!(format_phone_number("3105551"), "(310) 555-1");
        assert_eq!(format_phone_number("3105551234"), "(310) 555-1234");
        assert_eq!(format_phone_number("310555123499"), "(310) 555-1234");
        assert_eq!(format_phone_number("(310) 555-1234"), "(310) 555-1234");
    }
}
