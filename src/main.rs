use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use courier_config::{AppConfig, LogLevel, OutputFormat};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;

use app::Application;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("courier")
        .version("1.0.0")
        .about("短信任务轮询、发送与状态回报客户端")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径，未指定时按默认位置查找"),
        )
        .arg(
            Arg::new("identity")
                .short('i')
                .long("identity")
                .value_name("ID")
                .help("领取任务使用的账号标识，覆盖 miner.identity"),
        )
        .arg(
            Arg::new("channel-selector")
                .short('s')
                .long("channel-selector")
                .value_name("SLOT")
                .help("发送通道（卡槽）序号，覆盖 miner.channel_selector")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖 logging.level")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖 logging.format")
                .value_parser(["json", "pretty"]),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").map(String::as_str);
    let mut config = AppConfig::load(config_path).with_context(|| match config_path {
        Some(path) => format!("加载配置文件失败: {path}"),
        None => "加载配置失败".to_string(),
    })?;

    if let Some(identity) = matches.get_one::<String>("identity") {
        config.miner.identity = Some(identity.clone());
    }
    if let Some(selector) = matches.get_one::<u32>("channel-selector") {
        config.miner.channel_selector = *selector;
    }
    config.logging.apply_overrides(
        matches.get_one::<String>("log-level").map(String::as_str),
        matches.get_one::<String>("log-format").map(String::as_str),
    )?;

    init_logging(config.logging.level, config.logging.format)?;

    info!("启动短信任务客户端");
    if let Some(path) = config_path {
        info!("配置文件: {path}");
    }

    let app = Application::new(&config)?;
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app.run(shutdown_rx).await {
            error!("应用运行失败: {e:#}");
        }
    });

    wait_for_shutdown_signal().await;

    info!("收到关闭信号，开始优雅关闭...");
    let _ = shutdown_tx.send(());

    // 最多等待一次进行中的领取请求
    let grace = config.task_source.request_timeout() + Duration::from_secs(5);
    match tokio::time::timeout(grace, app_handle).await {
        Ok(Ok(())) => info!("应用已优雅关闭"),
        Ok(Err(e)) => error!("应用关闭时发生错误: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }

    info!("短信任务客户端已退出");
    Ok(())
}

/// 初始化日志系统，`RUST_LOG` 优先于配置的级别
fn init_logging(level: LogLevel, format: OutputFormat) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        OutputFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .context("初始化JSON日志格式失败")?,
        OutputFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
            .context("初始化Pretty日志格式失败")?,
    }

    Ok(())
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
