//! 结果轮询 - 业务能力层
//!
//! 提交后结果节点往往先出现、后填充文本，这里反复读取直到非空。

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AppResult, AutomationError};
use crate::infrastructure::PageDriver;
use crate::models::{selectors, Condition};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct ResultPoller<'a> {
    page: &'a dyn PageDriver,
    status: Condition,
    interval: Duration,
}

impl<'a> ResultPoller<'a> {
    pub fn new(page: &'a dyn PageDriver) -> Self {
        Self {
            page,
            status: Condition::selector(selectors::RESULT_STATUS),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 读取结果文本，非空立即返回；截止前始终为空则返回 `Timeout`
    ///
    /// 节点暂不存在与文本为空同样处理。
    pub async fn await_result(&self, timeout: Duration) -> AppResult<String> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.page.text_of(&self.status).await {
                Ok(text) if !text.trim().is_empty() => return Ok(text.trim().to_string()),
                Ok(_) => debug!("结果节点尚未填充"),
                Err(e) => debug!("结果节点读取失败: {}", e),
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(AutomationError::timeout(self.status.to_string(), timeout));
            }
            sleep(self.interval.min(deadline - now)).await;
        }
    }
}
