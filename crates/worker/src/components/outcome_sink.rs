use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use courier_domain::{OutcomeReceiver, TaskPhase, TaskSource};
use metrics::counter;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// 回报一次任务状态，失败只记录日志，不重试也不向上传播
async fn report_status_quietly(task_source: &dyn TaskSource, task_id: &str, phase: TaskPhase) {
    match task_source.report_status(task_id, phase).await {
        Ok(()) => {
            counter!("courier_status_reports_total", "result" => "ok").increment(1);
            debug!(task_id, phase = %phase, "Status reported");
        }
        Err(e) => {
            counter!("courier_status_reports_total", "result" => "error").increment(1);
            warn!(task_id, phase = %phase, "Failed to report task status: {}", e);
        }
    }
}

/// 消费调度循环与发送通道产生的状态并依次回报给任务源。
///
/// 回报按到达顺序逐条完成，同一任务的 processing/sent/delivered 不会乱序；
/// 回报在独立任务中进行，调度循环只负责入队。
/// 循环停止后收到的结果直接丢弃；所有发送端释放后本任务退出。
pub fn spawn_outcome_sink(
    mut outcomes: OutcomeReceiver,
    task_source: Arc<dyn TaskSource>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(outcome) = outcomes.recv().await {
            if !running.load(Ordering::SeqCst) {
                debug!(
                    task_id = %outcome.task_id,
                    phase = %outcome.phase,
                    "Mining stopped, ignoring outcome"
                );
                continue;
            }

            report_status_quietly(task_source.as_ref(), &outcome.task_id, outcome.phase).await;
        }
        debug!("Outcome sink closed");
    })
}
