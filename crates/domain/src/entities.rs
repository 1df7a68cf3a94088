use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::MessageParts;

/// 一条待发送的短信任务，由任务源领取后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub identity: String,   // 领取任务的账号
    pub destination: String, // 收件号码
    pub body: String,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        identity: impl Into<String>,
        destination: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            identity: identity.into(),
            destination: destination.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPhase {
    Processing,
    Sent,
    Delivered,
    Failed,
}

impl TaskPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPhase::Processing => "processing",
            TaskPhase::Sent => "sent",
            TaskPhase::Delivered => "delivered",
            TaskPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processing" => Ok(TaskPhase::Processing),
            "sent" => Ok(TaskPhase::Sent),
            "delivered" => Ok(TaskPhase::Delivered),
            "failed" => Ok(TaskPhase::Failed),
            _ => Err(format!(
                "Invalid task phase: {s}. Valid phases: processing, sent, delivered, failed"
            )),
        }
    }
}

/// 发送结果回报，按任务ID关联
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: String,
    pub phase: TaskPhase,
    pub timestamp: DateTime<Utc>,
}

impl TaskOutcome {
    pub fn new(task_id: impl Into<String>, phase: TaskPhase) -> Self {
        Self {
            task_id: task_id.into(),
            phase,
            timestamp: Utc::now(),
        }
    }
}

/// 一次领取请求的非错误结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Task(Task),
    NoTaskAvailable,
    /// 服务端要求暂停领取，不计入失败次数
    CooldownSignal,
}

impl FetchOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchOutcome::Task(_) => "task",
            FetchOutcome::NoTaskAvailable => "empty",
            FetchOutcome::CooldownSignal => "cooldown",
        }
    }
}

/// 交给发送通道的一次提交：任务本身、目标通道以及切分后的分段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub task: Task,
    pub channel_selector: u32,
    pub parts: MessageParts,
}

impl Submission {
    pub fn prepare(task: Task, channel_selector: u32, max_part_len: usize) -> Self {
        let parts = MessageParts::split(&task.body, max_part_len);
        Self {
            task,
            channel_selector,
            parts,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionHandle {
    pub task_id: String,
    pub endpoint_id: i32,
    pub part_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_phase_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskPhase::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::to_string(&TaskPhase::Delivered).unwrap(),
            "\"delivered\""
        );
        let phase: TaskPhase = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(phase, TaskPhase::Failed);
    }

    #[test]
    fn test_task_phase_from_str() {
        assert_eq!("SENT".parse::<TaskPhase>().unwrap(), TaskPhase::Sent);
        assert!("queued".parse::<TaskPhase>().is_err());
    }

    #[test]
    fn test_submission_prepare_splits_body() {
        let task = Task::new("T1", "user-1", "+15550001111", "abcdefghij");
        let submission = Submission::prepare(task, 1, 4);

        assert_eq!(submission.task_id(), "T1");
        assert_eq!(submission.channel_selector, 1);
        assert_eq!(submission.parts.len(), 3);
        assert_eq!(submission.parts.concat(), "abcdefghij");
    }

    #[test]
    fn test_fetch_outcome_kind() {
        let task = Task::new("T1", "u", "+1", "hi");
        assert_eq!(FetchOutcome::Task(task).kind(), "task");
        assert_eq!(FetchOutcome::NoTaskAvailable.kind(), "empty");
        assert_eq!(FetchOutcome::CooldownSignal.kind(), "cooldown");
    }
}
