//! Environment-backed configuration helpers

/// Read an environment variable, treating unset and blank values alike.
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a boolean flag such as `1`, `true`, `yes`, `on` (or their negatives).
///
/// Returns `None` for unset or unrecognized values.
pub fn env_flag(name: &str) -> Option<bool> {
    env_var(name).and_then(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Mask a credential for logs, keeping only its first 8 characters.
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        Some(s) if !s.is_empty() => {
            let prefix: String = s.chars().take(8).collect();
            format!("{prefix}...")
        }
        _ => "NOT SET".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("on"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(Some("abcdefghijkl")), "abcdefgh...");
        assert_eq!(mask_secret(Some("abc")), "abc...");
        assert_eq!(mask_secret(Some("")), "NOT SET");
        assert_eq!(mask_secret(None), "NOT SET");
    }

    #[test]
    fn test_env_var_blank_is_none() {
        // SAFETY: test-local variable name, not read by other tests
        unsafe {
            std::env::set_var("POKETRADE_UTILS_TEST_BLANK", "   ");
        }
        assert_eq!(env_var("POKETRADE_UTILS_TEST_BLANK"), None);
        assert_eq!(env_var("POKETRADE_UTILS_TEST_UNSET"), None);
    }
}
