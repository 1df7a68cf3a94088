//! Mock implementations for every port trait
//!
//! These are in-memory doubles that record every interaction so tests can
//! assert on call order and arguments without any network or transport.

use async_trait::async_trait;
use courier_domain::{
    FetchOutcome, LifecycleGuard, OutcomeSender, PartOutcomeAggregator, Submission,
    SubmissionHandle, Task, TaskPhase, TaskSource, TransmissionChannel,
};
use courier_errors::{CourierError, CourierResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// One recorded `fetch_task` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub identity: String,
    pub channel_selector: u32,
    pub at: Instant,
}

/// One recorded `report_status` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub task_id: String,
    pub phase: TaskPhase,
}

/// Mock implementation of TaskSource with scripted fetch responses.
///
/// When the script is exhausted every fetch returns `NoTaskAvailable`.
#[derive(Clone, Default)]
pub struct MockTaskSource {
    responses: Arc<Mutex<VecDeque<CourierResult<FetchOutcome>>>>,
    fetch_calls: Arc<Mutex<Vec<FetchCall>>>,
    reports: Arc<Mutex<Vec<StatusReport>>>,
    fail_reports: Arc<AtomicBool>,
    fetch_delay: Arc<Mutex<Option<Duration>>>,
    report_delays: Arc<Mutex<Vec<(TaskPhase, Duration)>>>,
}

impl MockTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: CourierResult<FetchOutcome>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn push_task(&self, task: Task) {
        self.push_response(Ok(FetchOutcome::Task(task)));
    }

    pub fn push_empty(&self) {
        self.push_response(Ok(FetchOutcome::NoTaskAvailable));
    }

    pub fn push_cooldown(&self) {
        self.push_response(Ok(FetchOutcome::CooldownSignal));
    }

    pub fn push_error(&self, error: CourierError) {
        self.push_response(Err(error));
    }

    /// Make every fetch take `delay` before it resolves
    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    /// Make every `report_status` for `phase` take `delay`; the report is
    /// recorded when it completes
    pub fn set_report_delay(&self, phase: TaskPhase, delay: Duration) {
        self.report_delays.lock().unwrap().push((phase, delay));
    }

    pub fn set_fail_reports(&self, fail: bool) {
        self.fail_reports.store(fail, Ordering::SeqCst);
    }

    pub fn fetch_calls(&self) -> Vec<FetchCall> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.lock().unwrap().len()
    }

    pub fn reports(&self) -> Vec<StatusReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn phases_for(&self, task_id: &str) -> Vec<TaskPhase> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.task_id == task_id)
            .map(|r| r.phase)
            .collect()
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn fetch_task(
        &self,
        identity: &str,
        channel_selector: u32,
    ) -> CourierResult<FetchOutcome> {
        self.fetch_calls.lock().unwrap().push(FetchCall {
            identity: identity.to_string(),
            channel_selector,
            at: Instant::now(),
        });
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(FetchOutcome::NoTaskAvailable));

        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }

    async fn report_status(&self, task_id: &str, phase: TaskPhase) -> CourierResult<()> {
        let delay = self
            .report_delays
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, delay)| *delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.reports.lock().unwrap().push(StatusReport {
            task_id: task_id.to_string(),
            phase,
        });
        if self.fail_reports.load(Ordering::SeqCst) {
            return Err(CourierError::network("mock status report failure"));
        }
        Ok(())
    }
}

/// Mock implementation of TransmissionChannel.
///
/// Outcomes are emitted synchronously from `submit` through the supplied
/// sender: one aggregated sent/failed outcome and, when every part was sent,
/// one aggregated delivered/failed outcome.
#[derive(Clone)]
pub struct MockTransmissionChannel {
    max_part_len: usize,
    submissions: Arc<Mutex<Vec<Submission>>>,
    unavailable: Arc<AtomicBool>,
    fail_submit: Arc<AtomicBool>,
    part_results: Arc<Mutex<Option<Vec<bool>>>>,
    delivery_results: Arc<Mutex<Option<Vec<bool>>>>,
}

impl MockTransmissionChannel {
    pub fn new(max_part_len: usize) -> Self {
        Self {
            max_part_len,
            submissions: Arc::new(Mutex::new(Vec::new())),
            unavailable: Arc::new(AtomicBool::new(false)),
            fail_submit: Arc::new(AtomicBool::new(false)),
            part_results: Arc::new(Mutex::new(None)),
            delivery_results: Arc::new(Mutex::new(None)),
        }
    }

    /// Every submit fails with `TransportUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Every submit fails with a network error
    pub fn set_fail_submit(&self, fail: bool) {
        self.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Per-part submit results for subsequent submissions; missing parts succeed
    pub fn set_part_results(&self, results: Vec<bool>) {
        *self.part_results.lock().unwrap() = Some(results);
    }

    /// Per-part delivery receipts for subsequent submissions; missing parts are delivered
    pub fn set_delivery_results(&self, results: Vec<bool>) {
        *self.delivery_results.lock().unwrap() = Some(results);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

impl Default for MockTransmissionChannel {
    fn default() -> Self {
        Self::new(160)
    }
}

#[async_trait]
impl TransmissionChannel for MockTransmissionChannel {
    fn max_part_len(&self) -> usize {
        self.max_part_len
    }

    async fn submit(
        &self,
        submission: Submission,
        outcomes: OutcomeSender,
    ) -> CourierResult<SubmissionHandle> {
        self.submissions.lock().unwrap().push(submission.clone());

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CourierError::transport_unavailable(
                submission.channel_selector,
            ));
        }
        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(CourierError::network("mock submit failure"));
        }

        let task_id = submission.task_id().to_string();
        let part_count = submission.parts.len();

        let results = self
            .part_results
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_default();
        let mut sent = PartOutcomeAggregator::for_submission(task_id.as_str(), part_count);
        let mut all_sent = false;
        for index in 0..part_count {
            let ok = results.get(index).copied().unwrap_or(true);
            if let Some(outcome) = sent.record(index, ok) {
                all_sent = outcome.phase == TaskPhase::Sent;
                outcomes.send(outcome);
            }
        }

        if all_sent {
            let receipts = self
                .delivery_results
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_default();
            let mut delivered = PartOutcomeAggregator::for_delivery(task_id.as_str(), part_count);
            for index in 0..part_count {
                let ok = receipts.get(index).copied().unwrap_or(true);
                if let Some(outcome) = delivered.record(index, ok) {
                    outcomes.send(outcome);
                }
            }
        }

        Ok(SubmissionHandle {
            task_id,
            endpoint_id: submission.channel_selector as i32 + 1,
            part_count,
        })
    }
}

/// Mock implementation of LifecycleGuard that counts calls
#[derive(Debug, Clone, Default)]
pub struct MockLifecycleGuard {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl MockLifecycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire_count(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl LifecycleGuard for MockLifecycleGuard {
    fn acquire(&self) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
