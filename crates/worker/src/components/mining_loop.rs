use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use courier_domain::{
    outcome_channel, FetchOutcome, LifecycleGuard, OutcomeSender, Submission, Task, TaskPhase,
    TaskSource, TransmissionChannel,
};
use courier_errors::{CourierError, CourierResult};
use metrics::counter;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use super::outcome_sink::spawn_outcome_sink;
use crate::backoff::{BackoffPolicy, BackoffSettings};

/// 一次运行期间的调度状态，只由 tick 路径修改
#[derive(Debug, Clone)]
pub struct SchedulerState {
    pub identity: String,
    pub channel_selector: u32,
    pub policy: BackoffPolicy,
    pub ticks: u64,
}

impl SchedulerState {
    pub fn new(identity: String, channel_selector: u32, settings: BackoffSettings) -> Self {
        Self {
            identity,
            channel_selector,
            policy: BackoffPolicy::new(settings),
            ticks: 0,
        }
    }

    pub fn snapshot(&self, now: Instant) -> SchedulerSnapshot {
        SchedulerSnapshot {
            identity: self.identity.clone(),
            channel_selector: self.channel_selector,
            consecutive_failures: self.policy.consecutive_failures(),
            cooling_down: self.policy.is_cooling_down(now),
            cooldown_remaining: self.policy.remaining(now),
            ticks: self.ticks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerSnapshot {
    pub identity: String,
    pub channel_selector: u32,
    pub consecutive_failures: u32,
    pub cooling_down: bool,
    pub cooldown_remaining: Duration,
    pub ticks: u64,
}

struct ActiveRun {
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    state: Arc<Mutex<SchedulerState>>,
    tick_handle: JoinHandle<()>,
}

struct TickContext {
    task_source: Arc<dyn TaskSource>,
    channel: Arc<dyn TransmissionChannel>,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<SchedulerState>>,
    outcomes: OutcomeSender,
}

enum DispatchResult {
    Submitted,
    Unavailable,
    Failed,
    /// 提交前发现已停止，任务未交给发送通道
    Abandoned,
}

fn lock_state(state: &Mutex<SchedulerState>) -> MutexGuard<'_, SchedulerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 领取、发送、回报的调度循环。
///
/// 每次 `start` 都会建立新的运行状态与结果处理器，`stop` 之后可以再次 `start`。
/// 正在进行的领取请求不会被打断，但它返回后会发现已停止并直接退出。
pub struct MiningLoop {
    task_source: Arc<dyn TaskSource>,
    channel: Arc<dyn TransmissionChannel>,
    lifecycle: Arc<dyn LifecycleGuard>,
    settings: BackoffSettings,
    active: tokio::sync::Mutex<Option<ActiveRun>>,
}

impl MiningLoop {
    pub fn new(
        task_source: Arc<dyn TaskSource>,
        channel: Arc<dyn TransmissionChannel>,
        lifecycle: Arc<dyn LifecycleGuard>,
        settings: BackoffSettings,
    ) -> Self {
        Self {
            task_source,
            channel,
            lifecycle,
            settings,
            active: tokio::sync::Mutex::new(None),
        }
    }

    /// 开始调度。已在运行时不做任何事并返回 `Ok(false)`
    pub async fn start(
        &self,
        identity: impl Into<String>,
        channel_selector: u32,
    ) -> CourierResult<bool> {
        let identity = identity.into();
        if identity.trim().is_empty() {
            return Err(CourierError::config_error("身份标识不能为空"));
        }

        let mut active = self.active.lock().await;
        if active.is_some() {
            debug!("Mining loop already running, ignoring start");
            return Ok(false);
        }

        info!(identity = %identity, channel_selector, "Starting mining loop");
        self.lifecycle.acquire();

        let running = Arc::new(AtomicBool::new(true));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let state = Arc::new(Mutex::new(SchedulerState::new(
            identity,
            channel_selector,
            self.settings,
        )));
        let (outcome_tx, outcome_rx) = outcome_channel();

        // 结果处理器在所有发送端释放后自行退出，不需要持有句柄
        spawn_outcome_sink(
            outcome_rx,
            Arc::clone(&self.task_source),
            Arc::clone(&running),
        );

        let ctx = TickContext {
            task_source: Arc::clone(&self.task_source),
            channel: Arc::clone(&self.channel),
            running: Arc::clone(&running),
            state: Arc::clone(&state),
            outcomes: outcome_tx,
        };
        let tick_handle = tokio::spawn(Self::run_loop(ctx, shutdown_rx));

        *active = Some(ActiveRun {
            running,
            shutdown_tx,
            state,
            tick_handle,
        });
        Ok(true)
    }

    /// 停止调度，取消等待中的下一次 tick。未运行时返回 false
    pub async fn stop(&self) -> bool {
        self.halt().await.is_some()
    }

    /// 停止调度并等待调度任务退出（最多等待一次进行中的领取请求）
    pub async fn stop_and_wait(&self) -> bool {
        match self.halt().await {
            Some(handle) => {
                if let Err(e) = handle.await {
                    error!("Mining loop task ended abnormally: {}", e);
                }
                true
            }
            None => false,
        }
    }

    async fn halt(&self) -> Option<JoinHandle<()>> {
        let run = self.active.lock().await.take()?;
        run.running.store(false, Ordering::SeqCst);
        let _ = run.shutdown_tx.send(());
        self.lifecycle.release();

        let identity = lock_state(&run.state).identity.clone();
        info!(identity = %identity, "Mining loop stopped");
        Some(run.tick_handle)
    }

    pub async fn is_running(&self) -> bool {
        self.active.lock().await.is_some()
    }

    pub async fn snapshot(&self) -> Option<SchedulerSnapshot> {
        let active = self.active.lock().await;
        let run = active.as_ref()?;
        let snapshot = lock_state(&run.state).snapshot(Instant::now());
        Some(snapshot)
    }

    async fn run_loop(ctx: TickContext, mut shutdown_rx: broadcast::Receiver<()>) {
        while let Some(delay) = Self::tick(&ctx).await {
            debug!(delay_ms = delay.as_millis() as u64, "Next tick scheduled");
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown_rx.recv() => {
                    debug!("Mining loop received shutdown signal");
                    break;
                }
            }
        }
        debug!("Mining loop exited");
    }

    /// 执行一次调度，返回距下一次 tick 的等待时长；已停止时返回 None
    async fn tick(ctx: &TickContext) -> Option<Duration> {
        if !ctx.running.load(Ordering::SeqCst) {
            return None;
        }

        let (identity, channel_selector) = {
            let mut state = lock_state(&ctx.state);
            state.ticks += 1;
            let now = Instant::now();
            if state.policy.is_cooling_down(now) {
                let delay = state.policy.recheck_delay(now);
                debug!(
                    remaining_ms = state.policy.remaining(now).as_millis() as u64,
                    "Cooling down, skipping fetch"
                );
                return Some(delay);
            }
            (state.identity.clone(), state.channel_selector)
        };

        let result = ctx.task_source.fetch_task(&identity, channel_selector).await;

        if !ctx.running.load(Ordering::SeqCst) {
            debug!("Mining stopped while fetching, discarding result");
            return None;
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                let failures = lock_state(&ctx.state).policy.record_failure();
                if e.is_fetch_failure() {
                    counter!("courier_fetch_total", "result" => "error").increment(1);
                    warn!(identity = %identity, failures, "Failed to fetch task: {}", e);
                } else {
                    counter!("courier_fetch_total", "result" => "unexpected").increment(1);
                    error!(identity = %identity, failures, "Unexpected task source error: {}", e);
                }
                return Some(lock_state(&ctx.state).policy.current_interval());
            }
        };
        counter!("courier_fetch_total", "result" => outcome.kind()).increment(1);

        match outcome {
            FetchOutcome::Task(task) => {
                lock_state(&ctx.state).policy.record_success();

                let dispatch = Self::dispatch(ctx, task, channel_selector).await;

                let mut state = lock_state(&ctx.state);
                match dispatch {
                    DispatchResult::Abandoned => return None,
                    DispatchResult::Failed => {
                        state.policy.record_failure();
                    }
                    DispatchResult::Submitted | DispatchResult::Unavailable => {}
                }
                state.policy.register_cooldown(Instant::now());
            }
            FetchOutcome::NoTaskAvailable => {
                debug!(identity = %identity, "No task available");
                lock_state(&ctx.state).policy.record_success();
            }
            FetchOutcome::CooldownSignal => {
                info!(identity = %identity, "Server requested cooldown");
                lock_state(&ctx.state).policy.register_cooldown(Instant::now());
            }
        }

        Some(lock_state(&ctx.state).policy.current_interval())
    }

    /// 状态回报只入队给结果处理器，提交不等待任何回报完成
    async fn dispatch(ctx: &TickContext, task: Task, channel_selector: u32) -> DispatchResult {
        if !ctx.running.load(Ordering::SeqCst) {
            debug!(task_id = %task.id, "Mining stopped before submit, dropping task");
            return DispatchResult::Abandoned;
        }

        info!(
            task_id = %task.id,
            identity = %task.identity,
            "Task received, dispatching to {}",
            task.destination
        );
        ctx.outcomes.report(&task.id, TaskPhase::Processing);

        let submission = Submission::prepare(task, channel_selector, ctx.channel.max_part_len());
        let task_id = submission.task_id().to_string();

        match ctx.channel.submit(submission, ctx.outcomes.clone()).await {
            Ok(handle) => {
                counter!("courier_submissions_total", "result" => "ok").increment(1);
                info!(
                    task_id = %task_id,
                    endpoint_id = handle.endpoint_id,
                    part_count = handle.part_count,
                    "Message submitted"
                );
                DispatchResult::Submitted
            }
            Err(e) => {
                let unavailable = matches!(e, CourierError::TransportUnavailable { .. });
                let label = if unavailable { "unavailable" } else { "error" };
                counter!("courier_submissions_total", "result" => label).increment(1);
                error!(task_id = %task_id, "Message submission failed: {}", e);

                ctx.outcomes.report(&task_id, TaskPhase::Failed);
                if unavailable {
                    DispatchResult::Unavailable
                } else {
                    DispatchResult::Failed
                }
            }
        }
    }
}
