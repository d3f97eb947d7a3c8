use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Regex for validating category slugs used in storefront URLs
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "silk-kurthis", "sarees", "wedding-collection-2024"
    /// - Invalid: "-sarees", "sarees-", "silk--kurthis", "Sarees", "silk_kurthis"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Custom validator for slug fields
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_REGEX.is_match(slug) {
        Ok(())
    } else {
        Err(ValidationError::new("slug")
            .with_message("Slug must be lowercase alphanumeric with single hyphens".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("silk-kurthis"));
        assert!(SLUG_REGEX.is_match("sarees"));
        assert!(SLUG_REGEX.is_match("wedding-collection-2024"));
        assert!(SLUG_REGEX.is_match("a"));
        assert!(SLUG_REGEX.is_match("abc123"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-sarees")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("sarees-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("silk--kurthis")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Sarees")); // uppercase
        assert!(!SLUG_REGEX.is_match("silk_kurthis")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("silk kurthis")); // space
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("banarasi-silk").is_ok());
        assert!(validate_slug("Banarasi Silk").is_err());
    }
}
