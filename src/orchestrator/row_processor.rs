//! 记录处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **按文件顺序遍历**：当前记录到达终态后才开始下一条
//! 2. **按需建立会话**：第一条需要处理的记录之前才登录，全部跳过时不触碰页面
//! 3. **快速失败**：任何一条记录失败即中止整次运行
//! 4. **统计输出**：按结果类型计数

use std::time::Duration;

use tracing::{error, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::services::{SessionGate, StageDetector};
use crate::store::RecordStore;
use crate::utils::logging;
use crate::workflow::{RowCtx, RowFlow, RowOutcome};

/// 运行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub skipped_status: usize,
    pub skipped_invalid: usize,
    /// 中止运行的行号
    pub failed_row: Option<usize>,
    /// (行号, 结果)
    pub outcomes: Vec<(usize, RowOutcome)>,
}

impl RunSummary {
    pub fn record(&mut self, row_index: usize, outcome: RowOutcome) {
        match outcome {
            RowOutcome::SkippedStatus => self.skipped_status += 1,
            RowOutcome::SkippedInvalid => self.skipped_invalid += 1,
            RowOutcome::Completed { .. } => self.completed += 1,
        }
        self.outcomes.push((row_index, outcome));
    }

    pub fn aborted(&self) -> bool {
        self.failed_row.is_some()
    }
}

pub struct RowProcessor<'a> {
    page: &'a dyn PageDriver,
    store: &'a dyn RecordStore,
    config: &'a Config,
    session_url: Option<String>,
    poll_interval: Option<Duration>,
}

impl<'a> RowProcessor<'a> {
    pub fn new(page: &'a dyn PageDriver, store: &'a dyn RecordStore, config: &'a Config) -> Self {
        Self {
            page,
            store,
            config,
            session_url: None,
            poll_interval: None,
        }
    }

    /// 在第一条需要处理的记录之前打开该地址并完成登录
    pub fn with_session(mut self, target_url: impl Into<String>) -> Self {
        self.session_url = Some(target_url.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// 处理全部记录，结果累计到 `summary`
    ///
    /// 某条记录失败时立即返回错误，`summary.failed_row` 记录该行。
    pub async fn run(&self, summary: &mut RunSummary) -> AppResult<()> {
        let records = self.store.read_all()?;
        summary.total = records.len();
        logging::log_records_loaded(records.len());

        let mut flow = RowFlow::new(self.page, self.store, self.config);
        if let Some(interval) = self.poll_interval {
            flow = flow.with_poll_interval(interval);
        }

        let mut session_ready = self.session_url.is_none();
        for (position, record) in records.iter().enumerate() {
            let ctx = RowCtx::for_record(record);
            logging::log_row_start(&ctx, position + 1, records.len());

            if !session_ready && RowFlow::triage(record).is_none() {
                if let Some(url) = &self.session_url {
                    if let Err(e) = self.establish_session(url).await {
                        error!("[会话] ❌ 登录未完成，运行中止: {}", e);
                        summary.failed_row = Some(record.row_index);
                        return Err(e);
                    }
                }
                session_ready = true;
            }

            match flow.run(record, &ctx).await {
                Ok(outcome) => summary.record(record.row_index, outcome),
                Err(e) => {
                    error!("{} ❌ 运行中止，后续记录不再处理", ctx);
                    summary.failed_row = Some(record.row_index);
                    return Err(e);
                }
            }
        }

        info!("✓ 全部记录处理结束");
        Ok(())
    }

    async fn establish_session(&self, url: &str) -> AppResult<()> {
        let mut detector = StageDetector::new(self.page);
        if let Some(interval) = self.poll_interval {
            detector = detector.with_interval(interval);
        }
        SessionGate::new(self.page, self.config.timeouts)
            .with_detector(detector)
            .establish(url)
            .await
    }
}
