//! 阶段竞速检测 - 业务能力层
//!
//! 给定若干阶段，为每个阶段起一个轮询 watcher，谁先成立谁胜出，
//! 其余 watcher 直接丢弃（远端不需要取消）。
//!
//! 平局规则：同一轮中，`FuturesUnordered` 先轮询到成立的 watcher 胜出，
//! 不保证跨运行一致；同一阶段内的候选条件按声明顺序检测。
//! 单次轮询出错视为"尚未成立"。

use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::{sleep, timeout_at, Instant};
use tracing::debug;

use crate::error::{AppResult, AutomationError};
use crate::infrastructure::PageDriver;
use crate::models::Stage;

/// 默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct StageDetector<'a> {
    page: &'a dyn PageDriver,
    interval: Duration,
}

impl<'a> StageDetector<'a> {
    pub fn new(page: &'a dyn PageDriver) -> Self {
        Self {
            page,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 等待任一阶段成立，返回其名称
    ///
    /// 超时返回 `Timeout`，携带参与竞争的阶段名与截止时长。
    pub async fn detect(&self, stages: &[Stage], timeout: Duration) -> AppResult<&'static str> {
        if stages.is_empty() {
            return Err(AutomationError::Config("阶段列表不能为空".to_string()));
        }
        let names = stages
            .iter()
            .map(|s| s.name)
            .collect::<Vec<_>>()
            .join(" | ");

        debug!("开始阶段检测: [{}], 超时 {:?}", names, timeout);
        let deadline = Instant::now() + timeout;
        let mut watchers = stages
            .iter()
            .map(|stage| self.watch(stage))
            .collect::<FuturesUnordered<_>>();

        match timeout_at(deadline, watchers.next()).await {
            Ok(Some(winner)) => {
                debug!("阶段检测命中: {}", winner);
                Ok(winner)
            }
            Ok(None) | Err(_) => Err(AutomationError::timeout(names, timeout)),
        }
    }

    /// 只等一个阶段
    pub async fn wait_for(&self, stage: Stage, timeout: Duration) -> AppResult<&'static str> {
        self.detect(std::slice::from_ref(&stage), timeout).await
    }

    async fn watch(&self, stage: &Stage) -> &'static str {
        loop {
            for condition in &stage.alternatives {
                if let Ok(true) = self.page.exists(condition).await {
                    return stage.name;
                }
            }
            sleep(self.interval).await;
        }
    }
}
