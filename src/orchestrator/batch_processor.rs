//! 批量记录处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源管理。
//!
//! 1. **应用初始化**：写日志文件头、获取浏览器、创建 `ChromePage`
//! 2. **资源管理**：持有 Browser，确保生命周期覆盖整次运行
//! 3. **向下委托**：委托 `RowProcessor` 逐条处理记录
//! 4. **全局统计**：输出并落盘最终统计

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::info;
use url::Url;

use crate::browser;
use crate::config::{BrowserMode, Config};
use crate::error::{AppResult, AutomationError};
use crate::infrastructure::{ChromePage, JsExecutor};
use crate::orchestrator::row_processor::{RowProcessor, RunSummary};
use crate::store::CsvRecordStore;
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    _browser: Browser,
    page: ChromePage,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法写入日志文件: {}", config.output_log_file))?;

        logging::log_startup(&config);

        let (browser, page) = match config.browser_mode {
            BrowserMode::Connect => {
                let origin = site_origin(&config.target_url)?;
                browser::connect_to_browser_and_page(config.browser_debug_port, Some(origin.as_str()))
                    .await?
            }
            BrowserMode::Launch => browser::launch_browser(&config).await?,
        };

        Ok(Self {
            page: ChromePage::new(JsExecutor::new(page)),
            config,
            _browser: browser,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        info!("\n📁 正在读取记录文件: {}", self.config.input_file);
        let store = CsvRecordStore::new(&self.config.input_file);

        let processor = RowProcessor::new(&self.page, &store, &self.config)
            .with_session(self.config.target_url.clone());

        let mut summary = RunSummary::default();
        let result = processor.run(&mut summary).await;

        logging::print_final_stats(&summary, &self.config.output_log_file);
        logging::append_summary(&self.config.output_log_file, &summary, summary.aborted())
            .context("写入统计失败")?;

        result.context("运行中止")?;
        Ok(summary)
    }
}

/// 目标地址的源（scheme://host[:port]），用于匹配已打开的标签页
fn site_origin(target_url: &str) -> AppResult<String> {
    let origin = Url::parse(target_url)?.origin();
    if !origin.is_tuple() {
        return Err(AutomationError::Config(format!(
            "TARGET_URL 缺少主机名: {}",
            target_url
        )));
    }
    Ok(origin.ascii_serialization())
}
