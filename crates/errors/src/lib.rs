use thiserror::Error;

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("没有可用的发送通道: selector={selector}")]
    TransportUnavailable { selector: u32 },
    #[error("网络错误: {0}")]
    Network(String),
    #[error("HTTP状态异常: {status} - {body}")]
    HttpStatus { status: u16, body: String },
    #[error("响应格式错误: {0}")]
    Protocol(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type CourierResult<T> = Result<T, CourierError>;

impl CourierError {
    pub fn transport_unavailable(selector: u32) -> Self {
        Self::TransportUnavailable { selector }
    }
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        Self::Protocol(msg.into())
    }
    pub fn http_status<S: Into<String>>(status: u16, body: S) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    /// 拉取任务时出现的这类错误计入连续失败次数
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            CourierError::Network(_)
                | CourierError::HttpStatus { .. }
                | CourierError::Protocol(_)
        )
    }
}

impl From<reqwest::Error> for CourierError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return CourierError::Protocol(err.to_string());
        }
        match err.status() {
            Some(status) => CourierError::HttpStatus {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => CourierError::Network(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests;
