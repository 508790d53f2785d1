//! 单条记录处理流程 - 流程层
//!
//! 状态机：
//!
//! ```text
//! Pending ─┬─> SkippedStatus                      (已有状态)
//!          ├─> SkippedInvalid                     (CVV 不足 3 位)
//!          └─> Navigating -> Filling ─┬─> Paused  (审核模式，永久挂起)
//!                                     └─> Submitting -> AwaitingResult -> Persisted -> Returned
//! 任意状态 ──> Failed（返回 Err，由编排层中止整次运行）
//! ```

use std::fmt;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::models::{selectors as sel, stages, Record, STATUS_COLUMN};
use crate::services::navigator::{self, NEW_TRANSACTION, TRANSACTIONS};
use crate::services::{FormSequencer, ResultPoller, StageDetector};
use crate::store::RecordStore;
use crate::utils::truncate_text;
use crate::workflow::policy::{run_required, run_step, Step};
use crate::workflow::RowCtx;

/// 提交前的稳定等待
pub const SETTLE_DELAY: Duration = Duration::from_millis(800);
/// 提交后等待跳转或结果标记的上限
pub const SUBMIT_RACE_TIMEOUT: Duration = Duration::from_secs(20);

/// 记录处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Pending,
    SkippedStatus,
    SkippedInvalid,
    Navigating,
    Filling,
    Paused,
    Submitting,
    AwaitingResult,
    Persisted,
    Returned,
    Failed,
}

impl fmt::Display for RowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowState::Pending => "待处理",
            RowState::SkippedStatus => "跳过（已有状态）",
            RowState::SkippedInvalid => "跳过（输入无效）",
            RowState::Navigating => "导航",
            RowState::Filling => "填写",
            RowState::Paused => "暂停",
            RowState::Submitting => "提交",
            RowState::AwaitingResult => "等待结果",
            RowState::Persisted => "已写回",
            RowState::Returned => "已返回列表",
            RowState::Failed => "失败",
        };
        f.write_str(name)
    }
}

/// 记录处理结果（失败以 `Err` 表达）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// 已有状态，未触碰页面
    SkippedStatus,
    /// 输入不足以提交，未触碰页面
    SkippedInvalid,
    /// 已提交并写回结果（结果可能为空串）
    Completed { status: String },
}

impl RowOutcome {
    pub fn tag(&self) -> &'static str {
        match self {
            RowOutcome::SkippedStatus => "skipped_status",
            RowOutcome::SkippedInvalid => "skipped_invalid",
            RowOutcome::Completed { .. } => "completed",
        }
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            RowOutcome::Completed { status } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOutcome::Completed { status } => write!(f, "{} ({})", self.tag(), status),
            _ => f.write_str(self.tag()),
        }
    }
}

/// 单条记录处理流程
///
/// - 决定何时导航、填写、提交、写回
/// - 不持有页面，只借用 `PageDriver` 与 `RecordStore`
pub struct RowFlow<'a> {
    page: &'a dyn PageDriver,
    store: &'a dyn RecordStore,
    config: &'a Config,
    poll_interval: Option<Duration>,
}

impl<'a> RowFlow<'a> {
    pub fn new(page: &'a dyn PageDriver, store: &'a dyn RecordStore, config: &'a Config) -> Self {
        Self {
            page,
            store,
            config,
            poll_interval: None,
        }
    }

    /// 覆盖阶段检测和结果轮询的间隔
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    fn detector(&self) -> StageDetector<'a> {
        let detector = StageDetector::new(self.page);
        match self.poll_interval {
            Some(interval) => detector.with_interval(interval),
            None => detector,
        }
    }

    fn poller(&self) -> ResultPoller<'a> {
        let poller = ResultPoller::new(self.page);
        match self.poll_interval {
            Some(interval) => poller.with_interval(interval),
            None => poller,
        }
    }

    /// 跳过策略：已有状态优先于输入校验
    pub fn triage(record: &Record) -> Option<RowOutcome> {
        if record.has_status() {
            Some(RowOutcome::SkippedStatus)
        } else if !record.has_valid_cvv() {
            Some(RowOutcome::SkippedInvalid)
        } else {
            None
        }
    }

    pub async fn run(&self, record: &Record, ctx: &RowCtx) -> AppResult<RowOutcome> {
        enter(ctx, RowState::Pending);
        if let Some(skip) = Self::triage(record) {
            match skip {
                RowOutcome::SkippedStatus => {
                    enter(ctx, RowState::SkippedStatus);
                    info!(
                        "{} ⏭️ 已有状态「{}」，跳过",
                        ctx,
                        truncate_text(record.status(), 40)
                    );
                }
                _ => {
                    enter(ctx, RowState::SkippedInvalid);
                    warn!("{} ⏭️ CVV 不足 3 位，跳过", ctx);
                }
            }
            return Ok(skip);
        }

        match self.process(record, ctx).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                enter(ctx, RowState::Failed);
                error!("{} ❌ 处理失败: {}", ctx, e);
                Err(e)
            }
        }
    }

    async fn process(&self, record: &Record, ctx: &RowCtx) -> AppResult<RowOutcome> {
        enter(ctx, RowState::Navigating);
        self.open_new_transaction(ctx).await?;

        enter(ctx, RowState::Filling);
        FormSequencer::new(self.page, self.config.brand)
            .with_detector(self.detector())
            .fill(record, ctx)
            .await?;

        if self.config.is_review() {
            enter(ctx, RowState::Paused);
            info!("{} ⏸️ 审核模式：表单已填好，等待人工检查（Ctrl+C 结束）", ctx);
            return future::pending().await;
        }

        enter(ctx, RowState::Submitting);
        self.submit(ctx).await?;

        enter(ctx, RowState::AwaitingResult);
        let status = self.capture_result(ctx).await?;

        let store = self.store;
        let captured = status.as_str();
        run_step(Step::Persist, ctx, || async move {
            store.write_field(record.row_index, STATUS_COLUMN, captured)
        })
        .await?;
        enter(ctx, RowState::Persisted);

        self.return_to_list(ctx).await?;
        enter(ctx, RowState::Returned);

        Ok(RowOutcome::Completed { status })
    }

    /// 首页 → 交易列表 → 新建交易 → 新建交易页
    async fn open_new_transaction(&self, ctx: &RowCtx) -> AppResult<()> {
        let detector = self.detector();
        let page_load = self.config.timeouts.page_load;

        run_step(Step::NavigationStage, ctx, || {
            detector.wait_for(stages::dashboard(), page_load)
        })
        .await?;
        run_step(Step::NavigationClick, ctx, || {
            navigator::click_with_fallback(self.page, TRANSACTIONS)
        })
        .await?;
        run_step(Step::NavigationStage, ctx, || {
            detector.wait_for(stages::transactions(), page_load)
        })
        .await?;
        run_step(Step::NavigationClick, ctx, || {
            navigator::click_with_fallback(self.page, NEW_TRANSACTION)
        })
        .await?;
        if run_step(Step::NewTransactionStage, ctx, || {
            detector.wait_for(stages::new_transaction(), page_load)
        })
        .await?
        .is_some()
        {
            info!("{} ✓ 已进入新建交易页", ctx);
        }
        Ok(())
    }

    /// 稳定等待 → 提交 → 竞速 {跳转完成, 结果标记} → 确认结果页
    async fn submit(&self, ctx: &RowCtx) -> AppResult<()> {
        sleep(SETTLE_DELAY).await;
        info!("{} 📤 提交交易...", ctx);

        let detector = self.detector();
        let page = self.page;
        let detector_ref = &detector;
        run_required(Step::SubmissionRace, ctx, || async move {
            page.submit_form(sel::TRANSACTION_FORM, sel::SUBMIT_BUTTON)
                .await?;
            let navigation: BoxFuture<'_, AppResult<&'static str>> = page
                .wait_for_navigation(SUBMIT_RACE_TIMEOUT)
                .map(|r| r.map(|_| "navigation"))
                .boxed();
            let marker: BoxFuture<'_, AppResult<&'static str>> = detector_ref
                .wait_for(stages::result(), SUBMIT_RACE_TIMEOUT)
                .boxed();
            let (winner, _rest) = future::select_ok([navigation, marker]).await?;
            info!("{} ✓ 提交后检测到: {}", ctx, winner);
            Ok(())
        })
        .await?;

        run_required(Step::ResultStage, ctx, || {
            detector.wait_for(stages::result(), self.config.timeouts.page_load)
        })
        .await?;
        Ok(())
    }

    /// 两次轮询都拿不到结果时写回空串
    async fn capture_result(&self, ctx: &RowCtx) -> AppResult<String> {
        let poller = self.poller();
        let timeout = self.config.timeouts.result;
        match run_required(Step::ResultPoll, ctx, || poller.await_result(timeout)).await {
            Ok(status) => {
                info!("{} ✅ 结果: {}", ctx, truncate_text(&status, 80));
                Ok(status)
            }
            Err(e) if e.is_wait_failure() => {
                error!("{} ❌ 两次等待后仍未读到结果，写回空状态: {}", ctx, e);
                Ok(String::new())
            }
            Err(e) => Err(e),
        }
    }

    /// 回到交易列表，为下一条做准备
    async fn return_to_list(&self, ctx: &RowCtx) -> AppResult<()> {
        let detector = self.detector();
        run_step(Step::ReturnToList, ctx, || {
            navigator::click_with_fallback(self.page, TRANSACTIONS)
        })
        .await?;
        run_step(Step::ReturnToList, ctx, || {
            detector.wait_for(stages::transactions(), self.config.timeouts.page_load)
        })
        .await?;
        Ok(())
    }
}

fn enter(ctx: &RowCtx, state: RowState) {
    tracing::debug!("{} ▶ {}", ctx, state);
}
