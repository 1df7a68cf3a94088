use crate::*;

#[test]
fn test_courier_error_display() {
    let error = CourierError::TransportUnavailable { selector: 1 };
    assert_eq!(error.to_string(), "没有可用的发送通道: selector=1");

    let error = CourierError::Network("Connection refused".to_string());
    assert_eq!(error.to_string(), "网络错误: Connection refused");

    let error = CourierError::HttpStatus {
        status: 503,
        body: "unavailable".to_string(),
    };
    assert_eq!(error.to_string(), "HTTP状态异常: 503 - unavailable");

    let error = CourierError::Protocol("missing field `phone`".to_string());
    assert_eq!(error.to_string(), "响应格式错误: missing field `phone`");

    let error = CourierError::Configuration("base_url cannot be empty".to_string());
    assert_eq!(error.to_string(), "配置错误: base_url cannot be empty");
}

#[test]
fn test_creation_methods() {
    assert!(matches!(
        CourierError::transport_unavailable(0),
        CourierError::TransportUnavailable { selector: 0 }
    ));
    assert!(matches!(
        CourierError::network("timeout"),
        CourierError::Network(_)
    ));
    assert!(matches!(
        CourierError::protocol("bad json"),
        CourierError::Protocol(_)
    ));
    assert!(matches!(
        CourierError::http_status(404, "not found"),
        CourierError::HttpStatus { status: 404, .. }
    ));
    assert!(matches!(
        CourierError::config_error("missing"),
        CourierError::Configuration(_)
    ));
}

#[test]
fn test_is_fetch_failure() {
    assert!(CourierError::network("reset").is_fetch_failure());
    assert!(CourierError::http_status(500, "").is_fetch_failure());
    assert!(CourierError::protocol("not an object").is_fetch_failure());

    assert!(!CourierError::transport_unavailable(0).is_fetch_failure());
    assert!(!CourierError::config_error("x").is_fetch_failure());
    assert!(!CourierError::Internal("x".to_string()).is_fetch_failure());
}

#[test]
fn test_error_from_reqwest_builder() {
    let err = reqwest::Client::new()
        .get("not a url")
        .build()
        .unwrap_err();
    let error: CourierError = err.into();
    assert!(matches!(error, CourierError::Network(_)));
    assert!(error.is_fetch_failure());
}

#[test]
fn test_courier_error_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CourierError>();
}

#[test]
fn test_error_chain_compatibility() {
    let result: Result<(), CourierError> = Err(CourierError::transport_unavailable(1));
    let anyhow_result: Result<(), anyhow::Error> = result.map_err(|e| e.into());
    assert!(anyhow_result
        .expect_err("Should be Err")
        .to_string()
        .contains("没有可用的发送通道"));
}
