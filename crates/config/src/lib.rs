pub mod models;
pub mod validation;

pub use models::{
    AppConfig, EndpointConfig, LogConfig, LogLevel, MinerConfig, OutputFormat, TaskSourceConfig,
    TransportConfig,
};
pub use validation::{ConfigValidator, ValidationUtils};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 加载、解析与校验配置时的错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("配置文件不存在: {0}")]
    MissingFile(String),

    #[error("配置加载失败: {0}")]
    Load(#[from] config::ConfigError),

    #[error("TOML解析失败: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML序列化失败: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("配置校验失败: {0}")]
    Validation(String),
}
