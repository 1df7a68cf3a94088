use std::sync::Arc;

use anyhow::{Context, Result};
use courier_config::AppConfig;
use courier_worker::control::{START_METHOD, STOP_METHOD};
use courier_worker::{
    BackoffSettings, ControlBridge, DryRunChannel, HttpTaskSource, MiningLoop,
    TracingLifecycleGuard,
};
use tokio::sync::broadcast;
use tracing::{info, warn};

/// 主应用程序：按配置装配任务源、发送通道与调度循环
pub struct Application {
    identity: String,
    channel_selector: u32,
    mining_loop: Arc<MiningLoop>,
}

impl Application {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let identity = config
            .miner
            .identity
            .clone()
            .filter(|id| !id.trim().is_empty())
            .context("未配置身份标识，请通过 --identity 或 miner.identity 指定")?;

        let task_source =
            HttpTaskSource::new(&config.task_source).context("创建任务源客户端失败")?;
        info!("任务源: {}", task_source.fetch_url());

        let channel = DryRunChannel::new(&config.transport);
        if channel.registry().is_empty() {
            warn!("未配置任何发送端点，所有任务都将被标记为失败");
        }

        let mining_loop = Arc::new(MiningLoop::new(
            Arc::new(task_source),
            Arc::new(channel),
            Arc::new(TracingLifecycleGuard::new()),
            BackoffSettings::from(&config.miner),
        ));

        Ok(Self {
            identity,
            channel_selector: config.miner.channel_selector,
            mining_loop,
        })
    }

    /// 通过控制桥启动调度，收到关闭信号后停止并等待调度循环退出
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let (bridge, handle) = ControlBridge::new(Arc::clone(&self.mining_loop), 8);
        let bridge_task = bridge.spawn();

        let ack = handle
            .invoke(
                START_METHOD,
                Some(self.identity.as_str()),
                Some(self.channel_selector),
            )
            .await
            .context("启动调度循环失败")?;
        info!(
            identity = %self.identity,
            channel_selector = self.channel_selector,
            "调度循环已启动: {}",
            ack
        );

        let _ = shutdown_rx.recv().await;

        let ack = handle
            .invoke(STOP_METHOD, None, None)
            .await
            .context("停止调度循环失败")?;
        info!("调度循环已停止: {}", ack);

        drop(handle);
        bridge_task.await.context("控制桥异常退出")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config_for(identity: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.miner.identity = identity.map(str::to_string);
        config.task_source.base_url = "http://127.0.0.1:9".to_string();
        config.task_source.request_timeout_ms = 200;
        config
    }

    #[test]
    fn test_new_requires_identity() {
        assert!(Application::new(&config_for(None)).is_err());
        assert!(Application::new(&config_for(Some("  "))).is_err());
        assert!(Application::new(&config_for(Some("user-1"))).is_ok());
    }

    #[tokio::test]
    async fn test_run_returns_after_shutdown_signal() {
        let app = Application::new(&config_for(Some("user-1"))).unwrap();
        let mining_loop = Arc::clone(&app.mining_loop);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move { app.run(shutdown_rx).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(mining_loop.is_running().await);

        shutdown_tx.send(()).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("run did not finish")
            .unwrap();
        assert!(result.is_ok());
        assert!(!mining_loop.is_running().await);
    }
}
