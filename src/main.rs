use anyhow::Result;
use terminal_autofill::utils::logging;
use terminal_autofill::{App, Config};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用；Ctrl+C 结束整次运行
    tokio::select! {
        result = async {
            App::initialize(config).await?.run().await
        } => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("⛔ 收到中断信号，结束运行");
        }
    }

    Ok(())
}
