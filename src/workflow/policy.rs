//! 错误处理策略表
//!
//! 每个步骤对应唯一的处理方式：直接上抛、重试一次后上抛、记录后继续。
//! 所有步骤都经 `run_step` 执行，不在调用点各自吞错。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::error::{AppResult, AutomationError};

/// 流程中的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// 登录 / 验证码 / 首页确认
    SessionStage,
    /// 导航过程中的页面确认
    NavigationStage,
    /// 导航链接点击
    NavigationClick,
    /// 新建交易页确认
    NewTransactionStage,
    /// 安装 / 解除回车与隐式提交拦截
    SubmitGuard,
    /// 主识别字段（商户账号）等待
    CriticalFieldWait,
    /// 次要字段等待
    SecondaryFieldWait,
    /// 字段输入
    FieldEntry,
    /// 卡号回读补齐
    CardReadBack,
    /// 风控复选框
    FraudCheckbox,
    /// 提交并等待跳转
    SubmissionRace,
    /// 结果页确认
    ResultStage,
    /// 结果文本轮询
    ResultPoll,
    /// 写回记录文件
    Persist,
    /// 返回交易列表
    ReturnToList,
}

/// 处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Propagate,
    RetryOnceThenPropagate,
    LogAndContinue,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::SessionStage => "会话阶段检测",
            Step::NavigationStage => "导航页面确认",
            Step::NavigationClick => "导航点击",
            Step::NewTransactionStage => "新建交易页检测",
            Step::SubmitGuard => "提交拦截",
            Step::CriticalFieldWait => "等待商户账号输入框",
            Step::SecondaryFieldWait => "等待次要输入框",
            Step::FieldEntry => "字段输入",
            Step::CardReadBack => "卡号回读校验",
            Step::FraudCheckbox => "风控复选框",
            Step::SubmissionRace => "提交表单",
            Step::ResultStage => "结果页检测",
            Step::ResultPoll => "读取结果状态",
            Step::Persist => "写回结果",
            Step::ReturnToList => "返回交易列表",
        }
    }

    /// 重试前的停顿
    pub fn retry_pause(self) -> Duration {
        match self {
            Step::CriticalFieldWait => Duration::from_millis(1500),
            Step::ResultPoll => Duration::from_secs(2),
            _ => Duration::from_secs(1),
        }
    }
}

/// 策略表
pub fn policy_for(step: Step) -> Policy {
    match step {
        Step::SessionStage
        | Step::FieldEntry
        | Step::SubmissionRace
        | Step::ResultStage => Policy::Propagate,
        Step::CriticalFieldWait | Step::ResultPoll => Policy::RetryOnceThenPropagate,
        Step::NavigationStage
        | Step::NavigationClick
        | Step::NewTransactionStage
        | Step::SubmitGuard
        | Step::SecondaryFieldWait
        | Step::CardReadBack
        | Step::FraudCheckbox
        | Step::Persist
        | Step::ReturnToList => Policy::LogAndContinue,
    }
}

/// 按策略表执行一个步骤
///
/// 成功返回 `Some`；被记录并忽略时返回 `None`；需要上抛时返回 `Err`。
pub async fn run_step<T, F, Fut>(step: Step, ctx: impl Display, mut op: F) -> AppResult<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match op().await {
        Ok(value) => Ok(Some(value)),
        Err(e) => match policy_for(step) {
            Policy::Propagate => Err(e),
            Policy::LogAndContinue => {
                warn!("{} ⚠️ {}失败，继续执行: {}", ctx, step.label(), e);
                Ok(None)
            }
            Policy::RetryOnceThenPropagate => {
                warn!(
                    "{} ⚠️ {}失败，{:?} 后重试一次: {}",
                    ctx,
                    step.label(),
                    step.retry_pause(),
                    e
                );
                sleep(step.retry_pause()).await;
                op().await.map(Some)
            }
        },
    }
}

/// 执行一个必须产出结果的步骤（策略为上抛或重试后上抛）
pub async fn run_required<T, F, Fut>(step: Step, ctx: impl Display, op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    match run_step(step, ctx, op).await? {
        Some(value) => Ok(value),
        None => Err(AutomationError::Config(format!(
            "步骤「{}」的策略不允许忽略失败",
            step.label()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn critical_steps_are_not_swallowed() {
        assert_eq!(policy_for(Step::SubmissionRace), Policy::Propagate);
        assert_eq!(policy_for(Step::CriticalFieldWait), Policy::RetryOnceThenPropagate);
        assert_eq!(policy_for(Step::ResultPoll), Policy::RetryOnceThenPropagate);
        assert_eq!(policy_for(Step::Persist), Policy::LogAndContinue);
        assert_eq!(policy_for(Step::ReturnToList), Policy::LogAndContinue);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_once_runs_exactly_twice() {
        let calls = AtomicUsize::new(0);
        let result: AppResult<Option<()>> = run_step(Step::CriticalFieldWait, "[test]", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AutomationError::not_found("#merchantAccount")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_succeeds_on_second_attempt() {
        let calls = AtomicUsize::new(0);
        let result = run_step(Step::ResultPoll, "[test]", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(AutomationError::timeout("status", Duration::from_secs(1)))
                } else {
                    Ok("Authorised")
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, Some("Authorised"));
    }

    #[tokio::test]
    async fn log_and_continue_swallows() {
        let result: Option<()> = run_step(Step::NavigationClick, "[test]", || async {
            Err(AutomationError::not_found("a"))
        })
        .await
        .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn propagate_returns_error_without_retry() {
        let calls = AtomicUsize::new(0);
        let result: AppResult<Option<()>> = run_step(Step::SubmissionRace, "[test]", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AutomationError::timeout("result", Duration::from_secs(1))) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
