//! Value masking policy.
//!
//! Every display-facing component masks through this function unless the
//! caller explicitly requested unmasked output.

/// Mask a secret value for display.
///
/// Values of 8 characters or fewer become the constant `"****"` so the
/// display does not reveal their length. Longer values keep their first
/// four characters and replace the rest with one asterisk per character.
/// Counts are characters, not bytes.
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len <= 8 {
        return "****".to_string();
    }

    let prefix: String = value.chars().take(4).collect();
    format!("{}{}", prefix, "*".repeat(len - 4))
}

/// Mask unless the caller asked for the real value.
pub fn mask_unless(value: &str, reveal: bool) -> String {
    if reveal {
        value.to_string()
    } else {
        mask(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_values_hide_length() {
        assert_eq!(mask("a"), "****");
        assert_eq!(mask("12345678"), "****");
        assert_eq!(mask(""), "****");
    }

    #[test]
    fn test_long_values_keep_prefix() {
        assert_eq!(mask("123456789"), "1234*****");
        assert_eq!(mask("secret-api-key"), "secr**********");
    }

    #[test]
    fn test_multibyte_counts_characters() {
        // 9 characters, 4 kept, 5 masked
        assert_eq!(mask("ééééééééé"), "éééé*****");
    }

    #[test]
    fn test_mask_unless() {
        assert_eq!(mask_unless("secret-api-key", false), "secr**********");
        assert_eq!(mask_unless("secret-api-key", true), "secret-api-key");
    }
}
