use crate::ConfigResult;

/// Trait for configuration validation
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}

/// General validation utilities
pub struct ValidationUtils;

impl ValidationUtils {
    /// Validate that a string is not empty
    pub fn validate_not_empty(value: &str, field_name: &str) -> ConfigResult<()> {
        if value.trim().is_empty() {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} cannot be empty"
            )));
        }
        Ok(())
    }

    /// Validate that an interval is positive and at most one day
    pub fn validate_interval_ms(value_ms: u64, field_name: &str) -> ConfigResult<()> {
        if value_ms == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if value_ms > 86_400_000 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be less than or equal to 86400000"
            )));
        }
        Ok(())
    }

    /// Validate that a count lies in 1..=max
    pub fn validate_count(count: usize, field_name: &str, max: usize) -> ConfigResult<()> {
        if count == 0 {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be greater than 0"
            )));
        }
        if count > max {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be less than or equal to {max}"
            )));
        }
        Ok(())
    }

    /// Validate that a URL has an http(s) scheme
    pub fn validate_url(url: &str, field_name: &str) -> ConfigResult<()> {
        Self::validate_not_empty(url, field_name)?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must be an http or https URL"
            )));
        }

        Ok(())
    }

    /// Validate that a request path starts with '/'
    pub fn validate_path(path: &str, field_name: &str) -> ConfigResult<()> {
        if !path.starts_with('/') {
            return Err(crate::ConfigError::Validation(format!(
                "{field_name} must start with '/'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(ValidationUtils::validate_not_empty("test", "field").is_ok());
        assert!(ValidationUtils::validate_not_empty("  test  ", "field").is_ok());
        assert!(ValidationUtils::validate_not_empty("", "field").is_err());
        assert!(ValidationUtils::validate_not_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_interval_ms() {
        assert!(ValidationUtils::validate_interval_ms(10_000, "interval").is_ok());
        assert!(ValidationUtils::validate_interval_ms(86_400_000, "interval").is_ok());
        assert!(ValidationUtils::validate_interval_ms(0, "interval").is_err());
        assert!(ValidationUtils::validate_interval_ms(86_400_001, "interval").is_err());
    }

    #[test]
    fn test_validate_count() {
        assert!(ValidationUtils::validate_count(3, "test", 100).is_ok());
        assert!(ValidationUtils::validate_count(100, "test", 100).is_ok());
        assert!(ValidationUtils::validate_count(0, "test", 100).is_err());
        assert!(ValidationUtils::validate_count(101, "test", 100).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(ValidationUtils::validate_url("http://localhost:54321", "url").is_ok());
        assert!(ValidationUtils::validate_url("https://example.supabase.co", "url").is_ok());
        assert!(ValidationUtils::validate_url("", "url").is_err());
        assert!(ValidationUtils::validate_url("localhost:8080", "url").is_err());
        assert!(ValidationUtils::validate_url("amqp://localhost:5672", "url").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(ValidationUtils::validate_path("/rest/v1/sms_tasks", "path").is_ok());
        assert!(ValidationUtils::validate_path("rest/v1", "path").is_err());
    }
}
