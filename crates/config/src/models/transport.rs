use std::collections::HashSet;
use std::time::Duration;

use crate::validation::ConfigValidator;
use serde::{Deserialize, Serialize};

/// 本机可用的一个发送端点（卡槽）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub slot_index: u32,
    pub subscription_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub max_part_len: usize,
    pub endpoints: Vec<EndpointConfig>,
    pub permission_granted: bool,
    pub sent_delay_ms: u64,
    pub delivered_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_part_len: 160,
            endpoints: vec![
                EndpointConfig {
                    slot_index: 0,
                    subscription_id: 1,
                },
                EndpointConfig {
                    slot_index: 1,
                    subscription_id: 2,
                },
            ],
            permission_granted: true,
            sent_delay_ms: 500,
            delivered_delay_ms: 2_000,
        }
    }
}

impl TransportConfig {
    pub fn sent_delay(&self) -> Duration {
        Duration::from_millis(self.sent_delay_ms)
    }

    pub fn delivered_delay(&self) -> Duration {
        Duration::from_millis(self.delivered_delay_ms)
    }
}

impl ConfigValidator for TransportConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        let mut slots = HashSet::new();
        for endpoint in &self.endpoints {
            if !slots.insert(endpoint.slot_index) {
                return Err(crate::ConfigError::Validation(format!(
                    "transport.endpoints has duplicate slot_index {}",
                    endpoint.slot_index
                )));
            }
            if endpoint.subscription_id < 0 {
                return Err(crate::ConfigError::Validation(format!(
                    "transport.endpoints slot {} has negative subscription_id",
                    endpoint.slot_index
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_config_default() {
        let config = TransportConfig::default();
        assert_eq!(config.max_part_len, 160);
        assert_eq!(config.endpoints.len(), 2);
        assert!(config.permission_granted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_transport_config_rejects_duplicate_slots() {
        let mut config = TransportConfig::default();
        config.endpoints.push(EndpointConfig {
            slot_index: 0,
            subscription_id: 9,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transport_config_rejects_negative_subscription() {
        let mut config = TransportConfig::default();
        config.endpoints[1].subscription_id = -1;
        assert!(config.validate().is_err());
    }
}
