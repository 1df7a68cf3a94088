use async_trait::async_trait;
use courier_config::TaskSourceConfig;
use courier_domain::{FetchOutcome, Task, TaskPhase, TaskSource};
use courier_errors::{CourierError, CourierResult};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

/// 基于 HTTP RPC 的任务源客户端
pub struct HttpTaskSource {
    fetch_url: String,
    status_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl HttpTaskSource {
    pub fn new(config: &TaskSourceConfig) -> CourierResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CourierError::config_error(format!("无法创建HTTP客户端: {e}")))?;

        Ok(Self {
            fetch_url: config.fetch_url(),
            status_url: config.status_url(),
            api_key: config.api_key.clone(),
            http_client,
        })
    }

    pub fn fetch_url(&self) -> &str {
        &self.fetch_url
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            return request;
        }
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl TaskSource for HttpTaskSource {
    async fn fetch_task(
        &self,
        identity: &str,
        channel_selector: u32,
    ) -> CourierResult<FetchOutcome> {
        let payload = json!({
            "p_user_id": identity,
            "p_sim_slot": channel_selector,
        });
        let request = self.authorize(self.http_client.post(&self.fetch_url).json(&payload));

        let response = request.send().await.inspect_err(|e| {
            warn!("Failed to connect to task source: {}", e);
        })?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "Fetch response received for {}", identity);
        parse_fetch_response(status, &body, identity)
    }

    async fn report_status(&self, task_id: &str, phase: TaskPhase) -> CourierResult<()> {
        let request = self
            .http_client
            .patch(&self.status_url)
            .query(&[("id", format!("eq.{task_id}"))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "status": phase }));
        let request = self.authorize(request);

        let response = request.send().await?;
        if response.status().is_success() {
            debug!("Task {} marked as {}", task_id, phase);
            return Ok(());
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(CourierError::http_status(status, body))
    }
}

/// 解析领取接口的响应。
///
/// 空响应、`null`、空数组以及没有 `id` 的对象都视为队列为空；
/// `delay_active: true` 表示服务端要求冷却；数组只取第一个元素。
pub fn parse_fetch_response(
    status: u16,
    body: &str,
    identity: &str,
) -> CourierResult<FetchOutcome> {
    if !(200..300).contains(&status) {
        return Err(CourierError::http_status(status, body));
    }

    let body = body.trim();
    if body.is_empty() {
        return Ok(FetchOutcome::NoTaskAvailable);
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| CourierError::protocol(format!("无法解析任务响应: {e}")))?;

    match value {
        Value::Array(items) => match items.into_iter().next() {
            Some(first) => parse_task_value(first, identity),
            None => Ok(FetchOutcome::NoTaskAvailable),
        },
        other => parse_task_value(other, identity),
    }
}

fn parse_task_value(value: Value, identity: &str) -> CourierResult<FetchOutcome> {
    let object = match value {
        Value::Null => return Ok(FetchOutcome::NoTaskAvailable),
        Value::Object(object) => object,
        other => {
            return Err(CourierError::protocol(format!(
                "任务响应不是对象: {other}"
            )))
        }
    };

    if object.get("delay_active").and_then(Value::as_bool) == Some(true) {
        return Ok(FetchOutcome::CooldownSignal);
    }

    let id = match object.get("id") {
        None | Some(Value::Null) => return Ok(FetchOutcome::NoTaskAvailable),
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        Some(other) => {
            return Err(CourierError::protocol(format!("任务ID类型无效: {other}")));
        }
    };

    let destination = string_field(&object, &["destination", "phone"])
        .ok_or_else(|| CourierError::protocol(format!("任务 {id} 缺少收件号码")))?;
    let body = string_field(&object, &["body", "message"])
        .ok_or_else(|| CourierError::protocol(format!("任务 {id} 缺少短信内容")))?;

    Ok(FetchOutcome::Task(Task::new(id, identity, destination, body)))
}

fn string_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
