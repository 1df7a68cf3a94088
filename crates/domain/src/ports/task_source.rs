use async_trait::async_trait;
use courier_errors::CourierResult;

use crate::entities::{FetchOutcome, TaskPhase};

/// 远端任务队列的抽象
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// 为指定账号与通道领取下一条任务
    ///
    /// # Returns
    /// * `Ok(FetchOutcome)` - 领到任务、队列为空或服务端要求冷却
    /// * `Err(_)` - 网络失败、非成功状态码或响应无法解析
    async fn fetch_task(&self, identity: &str, channel_selector: u32)
        -> CourierResult<FetchOutcome>;

    /// 回报任务状态。调用方只记录失败，不重试
    async fn report_status(&self, task_id: &str, phase: TaskPhase) -> CourierResult<()>;
}
