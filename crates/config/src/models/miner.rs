use std::time::Duration;

use crate::validation::{ConfigValidator, ValidationUtils};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinerConfig {
    /// 启动时使用的默认账号，可被命令行覆盖
    pub identity: Option<String>,
    pub channel_selector: u32,
    pub base_interval_ms: u64,
    pub failure_interval_ms: u64,
    pub cooldown_ms: u64,
    pub max_recheck_ms: u64,
    pub max_consecutive_failures: u32,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            identity: None,
            channel_selector: 0,
            base_interval_ms: 10_000,
            failure_interval_ms: 30_000,
            cooldown_ms: 60_000,
            max_recheck_ms: 5_000,
            max_consecutive_failures: 3,
        }
    }
}

impl MinerConfig {
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    pub fn failure_interval(&self) -> Duration {
        Duration::from_millis(self.failure_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn max_recheck(&self) -> Duration {
        Duration::from_millis(self.max_recheck_ms)
    }
}

impl ConfigValidator for MinerConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        if let Some(identity) = &self.identity {
            ValidationUtils::validate_not_empty(identity, "miner.identity")?;
        }
        ValidationUtils::validate_interval_ms(self.base_interval_ms, "miner.base_interval_ms")?;
        ValidationUtils::validate_interval_ms(
            self.failure_interval_ms,
            "miner.failure_interval_ms",
        )?;
        ValidationUtils::validate_interval_ms(self.cooldown_ms, "miner.cooldown_ms")?;
        ValidationUtils::validate_interval_ms(self.max_recheck_ms, "miner.max_recheck_ms")?;
        ValidationUtils::validate_count(
            self.max_consecutive_failures as usize,
            "miner.max_consecutive_failures",
            1000,
        )?;

        if self.failure_interval_ms < self.base_interval_ms {
            return Err(crate::ConfigError::Validation(
                "miner.failure_interval_ms must not be shorter than miner.base_interval_ms"
                    .to_string(),
            ));
        }

        Ok(())
    }
}
