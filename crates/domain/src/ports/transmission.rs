use async_trait::async_trait;
use courier_errors::CourierResult;

use crate::entities::{Submission, SubmissionHandle};
use crate::messaging::OutcomeSender;

/// 短信发送通道的抽象
///
/// `submit` 同步校验通道是否可用并提交；之后通道通过 `outcomes` 异步回报
/// 一次提交结果（sent/failed）和一次送达结果（delivered/failed），都携带任务ID。
#[async_trait]
pub trait TransmissionChannel: Send + Sync {
    /// 单段最大字符数，0 表示不限制
    fn max_part_len(&self) -> usize;

    async fn submit(
        &self,
        submission: Submission,
        outcomes: OutcomeSender,
    ) -> CourierResult<SubmissionHandle>;
}
