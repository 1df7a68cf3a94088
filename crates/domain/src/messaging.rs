use tokio::sync::mpsc;

use crate::entities::{TaskOutcome, TaskPhase};

/// 发送通道回报结果的入口，由调度循环注入，接收端归结果处理器所有
#[derive(Debug, Clone)]
pub struct OutcomeSender {
    tx: mpsc::UnboundedSender<TaskOutcome>,
}

pub type OutcomeReceiver = mpsc::UnboundedReceiver<TaskOutcome>;

pub fn outcome_channel() -> (OutcomeSender, OutcomeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OutcomeSender { tx }, rx)
}

impl OutcomeSender {
    /// 接收端已关闭时返回 false
    pub fn send(&self, outcome: TaskOutcome) -> bool {
        self.tx.send(outcome).is_ok()
    }

    pub fn report(&self, task_id: &str, phase: TaskPhase) -> bool {
        self.send(TaskOutcome::new(task_id, phase))
    }
}

/// 汇总多分段短信的逐段结果，全部到齐后只产出一个结果；任一分段失败则整体失败
#[derive(Debug, Clone)]
pub struct PartOutcomeAggregator {
    task_id: String,
    success_phase: TaskPhase,
    results: Vec<Option<bool>>,
    emitted: bool,
}

impl PartOutcomeAggregator {
    pub fn new(task_id: impl Into<String>, part_count: usize, success_phase: TaskPhase) -> Self {
        Self {
            task_id: task_id.into(),
            success_phase,
            results: vec![None; part_count.max(1)],
            emitted: false,
        }
    }

    /// 提交阶段的汇总，成功为 sent
    pub fn for_submission(task_id: impl Into<String>, part_count: usize) -> Self {
        Self::new(task_id, part_count, TaskPhase::Sent)
    }

    /// 送达阶段的汇总，成功为 delivered
    pub fn for_delivery(task_id: impl Into<String>, part_count: usize) -> Self {
        Self::new(task_id, part_count, TaskPhase::Delivered)
    }

    /// 记录一个分段的结果。越界或重复的分段被忽略
    pub fn record(&mut self, part_index: usize, success: bool) -> Option<TaskOutcome> {
        if self.emitted {
            return None;
        }
        match self.results.get_mut(part_index) {
            Some(slot @ None) => *slot = Some(success),
            _ => return None,
        }
        if self.results.iter().any(Option::is_none) {
            return None;
        }

        self.emitted = true;
        let all_ok = self.results.iter().all(|r| *r == Some(true));
        let phase = if all_ok {
            self.success_phase
        } else {
            TaskPhase::Failed
        };
        Some(TaskOutcome::new(self.task_id.clone(), phase))
    }

    pub fn pending_parts(&self) -> usize {
        self.results.iter().filter(|r| r.is_none()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.emitted
    }
}
