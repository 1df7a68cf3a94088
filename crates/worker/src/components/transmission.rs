use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use courier_config::TransportConfig;
use courier_domain::{
    OutcomeSender, PartOutcomeAggregator, Submission, SubmissionHandle, SubmitResultCode,
    TaskPhase, TransmissionChannel,
};
use courier_errors::{CourierError, CourierResult};
use metrics::counter;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// 通道选择器（卡槽序号）到发送端点ID的映射
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: HashMap<u32, i32>,
    permission_granted: bool,
}

impl EndpointRegistry {
    pub fn new(endpoints: impl IntoIterator<Item = (u32, i32)>, permission_granted: bool) -> Self {
        Self {
            endpoints: endpoints.into_iter().collect(),
            permission_granted,
        }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(
            config
                .endpoints
                .iter()
                .map(|e| (e.slot_index, e.subscription_id)),
            config.permission_granted,
        )
    }

    /// 未授权或该卡槽为空时返回 `TransportUnavailable`
    pub fn resolve(&self, channel_selector: u32) -> CourierResult<i32> {
        if !self.permission_granted {
            warn!("Transport permission not granted");
            return Err(CourierError::transport_unavailable(channel_selector));
        }
        self.endpoints
            .get(&channel_selector)
            .copied()
            .ok_or_else(|| CourierError::transport_unavailable(channel_selector))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// 不接真实射频的发送通道：校验端点、记录分段，延时后回报汇总结果
pub struct DryRunChannel {
    registry: EndpointRegistry,
    max_part_len: usize,
    sent_delay: Duration,
    delivered_delay: Duration,
    scripted: Mutex<VecDeque<Vec<SubmitResultCode>>>,
    scripted_delivery: Mutex<VecDeque<Vec<bool>>>,
}

impl DryRunChannel {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            registry: EndpointRegistry::from_config(config),
            max_part_len: config.max_part_len,
            sent_delay: config.sent_delay(),
            delivered_delay: config.delivered_delay(),
            scripted: Mutex::new(VecDeque::new()),
            scripted_delivery: Mutex::new(VecDeque::new()),
        }
    }

    /// 为下一次提交预设逐段结果，未覆盖的分段视为成功
    pub fn script_part_results(&self, codes: Vec<SubmitResultCode>) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.push_back(codes);
        }
    }

    /// 为下一条全部提交成功的消息预设逐段送达回执，未覆盖的分段视为已送达
    pub fn script_delivery_results(&self, delivered: Vec<bool>) {
        if let Ok(mut scripted) = self.scripted_delivery.lock() {
            scripted.push_back(delivered);
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    fn next_part_results(&self, part_count: usize) -> Vec<SubmitResultCode> {
        let mut codes = self
            .scripted
            .lock()
            .ok()
            .and_then(|mut scripted| scripted.pop_front())
            .unwrap_or_default();
        codes.resize(part_count, SubmitResultCode::Ok);
        codes
    }

    fn next_delivery_results(&self, part_count: usize) -> Vec<bool> {
        let mut delivered = self
            .scripted_delivery
            .lock()
            .ok()
            .and_then(|mut scripted| scripted.pop_front())
            .unwrap_or_default();
        delivered.resize(part_count, true);
        delivered
    }
}

#[async_trait]
impl TransmissionChannel for DryRunChannel {
    fn max_part_len(&self) -> usize {
        self.max_part_len
    }

    async fn submit(
        &self,
        submission: Submission,
        outcomes: OutcomeSender,
    ) -> CourierResult<SubmissionHandle> {
        let endpoint_id = self.registry.resolve(submission.channel_selector)?;
        let task_id = submission.task_id().to_string();
        let part_count = submission.parts.len();

        info!(
            task_id = %task_id,
            endpoint_id,
            part_count,
            "Submitting message to {}",
            submission.task.destination
        );
        for (index, part) in submission.parts.iter().enumerate() {
            debug!(task_id = %task_id, index, "part: {}", part);
        }
        counter!("courier_dry_run_parts_total").increment(part_count as u64);

        let codes = self.next_part_results(part_count);
        let all_submitted = codes.iter().all(SubmitResultCode::is_success);
        let receipts = if all_submitted {
            self.next_delivery_results(part_count)
        } else {
            Vec::new()
        };
        let sent_delay = self.sent_delay;
        let delivered_delay = self.delivered_delay;
        let notify_id = task_id.clone();

        tokio::spawn(async move {
            sleep(sent_delay).await;
            let mut sent = PartOutcomeAggregator::for_submission(notify_id.as_str(), part_count);
            let mut all_sent = false;
            for (index, code) in codes.iter().enumerate() {
                if let Some(outcome) = sent.record(index, code.is_success()) {
                    all_sent = outcome.phase == TaskPhase::Sent;
                    if !outcomes.send(outcome) {
                        debug!("Outcome receiver closed, dropping result for {}", notify_id);
                        return;
                    }
                }
            }
            // 提交失败的消息不会有送达回执
            if !all_sent {
                return;
            }

            sleep(delivered_delay).await;
            let mut delivered =
                PartOutcomeAggregator::for_delivery(notify_id.as_str(), part_count);
            for (index, ok) in receipts.into_iter().enumerate() {
                if let Some(outcome) = delivered.record(index, ok) {
                    outcomes.send(outcome);
                }
            }
        });

        Ok(SubmissionHandle {
            task_id,
            endpoint_id,
            part_count,
        })
    }
}
