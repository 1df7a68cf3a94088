use std::time::Duration;

use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskSourceConfig {
    pub base_url: String,
    /// 静态访问密钥，同时作为 apikey 头和 Bearer 凭证发送
    pub api_key: String,
    pub fetch_path: String,
    pub status_path: String,
    pub request_timeout_ms: u64,
}

impl Default for TaskSourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:54321".to_string(),
            api_key: String::new(),
            fetch_path: "/rest/v1/rpc/fetch_mining_task".to_string(),
            status_path: "/rest/v1/sms_tasks".to_string(),
            request_timeout_ms: 15_000,
        }
    }
}

impl TaskSourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn fetch_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.fetch_path)
    }

    pub fn status_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.status_path)
    }
}

impl ConfigValidator for TaskSourceConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        ValidationUtils::validate_url(&self.base_url, "task_source.base_url")?;
        ValidationUtils::validate_path(&self.fetch_path, "task_source.fetch_path")?;
        ValidationUtils::validate_path(&self.status_path, "task_source.status_path")?;
        ValidationUtils::validate_interval_ms(
            self.request_timeout_ms,
            "task_source.request_timeout_ms",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_source_config_urls() {
        let config = TaskSourceConfig {
            base_url: "https://example.supabase.co/".to_string(),
            ..TaskSourceConfig::default()
        };

        assert_eq!(
            config.fetch_url(),
            "https://example.supabase.co/rest/v1/rpc/fetch_mining_task"
        );
        assert_eq!(
            config.status_url(),
            "https://example.supabase.co/rest/v1/sms_tasks"
        );
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_task_source_config_validation() {
        let config = TaskSourceConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = config.clone();
        invalid_config.base_url = "example.supabase.co".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = config.clone();
        invalid_config.fetch_path = "rpc/fetch".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = config;
        invalid_config.request_timeout_ms = 0;
        assert!(invalid_config.validate().is_err());
    }
}
