use std::fmt;
use std::sync::Arc;

use courier_errors::{CourierError, CourierResult};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::components::MiningLoop;

pub const START_METHOD: &str = "START_MINING";
pub const STOP_METHOD: &str = "STOP_MINING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Start {
        identity: String,
        channel_selector: u32,
    },
    Stop,
}

impl ControlCommand {
    /// 按方法名构造命令，未给出通道时使用 0 号通道
    pub fn from_method(
        method: &str,
        identity: Option<&str>,
        channel_selector: Option<u32>,
    ) -> CourierResult<Self> {
        match method {
            START_METHOD => {
                let identity = identity
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| CourierError::config_error("START_MINING 缺少身份标识"))?;
                Ok(ControlCommand::Start {
                    identity: identity.to_string(),
                    channel_selector: channel_selector.unwrap_or(0),
                })
            }
            STOP_METHOD => Ok(ControlCommand::Stop),
            other => Err(CourierError::protocol(format!("未知的控制方法: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAck {
    Started,
    Stopped,
}

impl ControlAck {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAck::Started => "STARTED",
            ControlAck::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for ControlAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct ControlRequest {
    command: ControlCommand,
    reply: oneshot::Sender<CourierResult<ControlAck>>,
}

/// 向控制桥发送命令的句柄，可克隆
#[derive(Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<ControlRequest>,
}

impl ControlHandle {
    pub async fn send(&self, command: ControlCommand) -> CourierResult<ControlAck> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ControlRequest { command, reply })
            .await
            .map_err(|_| CourierError::Internal("控制通道已关闭".to_string()))?;
        rx.await
            .map_err(|_| CourierError::Internal("控制桥未应答".to_string()))?
    }

    pub async fn invoke(
        &self,
        method: &str,
        identity: Option<&str>,
        channel_selector: Option<u32>,
    ) -> CourierResult<ControlAck> {
        let command = ControlCommand::from_method(method, identity, channel_selector)?;
        self.send(command).await
    }

    pub async fn start(
        &self,
        identity: impl Into<String>,
        channel_selector: u32,
    ) -> CourierResult<ControlAck> {
        self.send(ControlCommand::Start {
            identity: identity.into(),
            channel_selector,
        })
        .await
    }

    pub async fn stop(&self) -> CourierResult<ControlAck> {
        self.send(ControlCommand::Stop).await
    }
}

/// 把外部的启动/停止命令转交给调度循环并逐条应答
pub struct ControlBridge {
    mining_loop: Arc<MiningLoop>,
    rx: mpsc::Receiver<ControlRequest>,
}

impl ControlBridge {
    pub fn new(mining_loop: Arc<MiningLoop>, buffer: usize) -> (Self, ControlHandle) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { mining_loop, rx }, ControlHandle { tx })
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// 处理命令直到所有句柄都被释放，随后停止调度循环
    pub async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            let result = self.handle(request.command).await;
            if request.reply.send(result).is_err() {
                warn!("Control caller went away before acknowledgement");
            }
        }

        info!("Control channel closed, stopping mining loop");
        self.mining_loop.stop_and_wait().await;
    }

    async fn handle(&self, command: ControlCommand) -> CourierResult<ControlAck> {
        match command {
            ControlCommand::Start {
                identity,
                channel_selector,
            } => {
                self.mining_loop.start(identity, channel_selector).await?;
                Ok(ControlAck::Started)
            }
            ControlCommand::Stop => {
                self.mining_loop.stop().await;
                Ok(ControlAck::Stopped)
            }
        }
    }
}
