use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    logging::LogConfig, miner::MinerConfig, task_source::TaskSourceConfig,
    transport::TransportConfig,
};
use crate::validation::ConfigValidator;
use crate::{ConfigError, ConfigResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub task_source: TaskSourceConfig,
    pub miner: MinerConfig,
    pub transport: TransportConfig,
    pub logging: LogConfig,
}

impl AppConfig {
    /// 依次加载配置文件与 `COURIER_` 前缀的环境变量，未给出的字段取默认值
    pub fn load(config_path: Option<&str>) -> ConfigResult<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(ConfigError::MissingFile(path.to_string()));
            }
        } else {
            let default_paths = [
                "config/courier.toml",
                "courier.toml",
                "/etc/courier/config.toml",
            ];

            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        // COURIER_TASK_SOURCE__API_KEY -> task_source.api_key
        builder = builder.add_source(
            Environment::with_prefix("COURIER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> ConfigResult<Self> {
        let config: AppConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl ConfigValidator for AppConfig {
    fn validate(&self) -> crate::ConfigResult<()> {
        self.task_source.validate()?;
        self.miner.validate()?;
        self.transport.validate()?;
        Ok(())
    }
}
