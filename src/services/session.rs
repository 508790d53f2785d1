//! 会话建立 - 业务能力层
//!
//! 账号密码与验证码由操作员在浏览器中手动输入，这里只负责等待并判断走到了哪一步。

use tracing::info;

use crate::config::Timeouts;
use crate::error::AppResult;
use crate::infrastructure::PageDriver;
use crate::models::stages;
use crate::services::StageDetector;
use crate::workflow::policy::{run_required, Step};

const CTX: &str = "[会话]";

pub struct SessionGate<'a> {
    page: &'a dyn PageDriver,
    detector: StageDetector<'a>,
    timeouts: Timeouts,
}

impl<'a> SessionGate<'a> {
    pub fn new(page: &'a dyn PageDriver, timeouts: Timeouts) -> Self {
        Self {
            page,
            detector: StageDetector::new(page),
            timeouts,
        }
    }

    pub fn with_detector(mut self, detector: StageDetector<'a>) -> Self {
        self.detector = detector;
        self
    }

    /// 打开登录页并等待进入首页
    ///
    /// 登录页 → (验证码页 | 首页) → 首页；任何一步超时都会结束本次运行。
    pub async fn establish(&self, target_url: &str) -> AppResult<()> {
        info!("{} 🌐 打开 {}", CTX, target_url);
        self.page.navigate(target_url).await?;

        let first = self
            .race(&[stages::login(), stages::dashboard()], self.timeouts.page_load)
            .await?;
        if first == stages::DASHBOARD {
            info!("{} ✓ 已处于登录状态", CTX);
            return Ok(());
        }

        info!("{} 🔑 请在浏览器中输入账号和密码并登录...", CTX);
        let after_login = self
            .race(&[stages::otp(), stages::dashboard()], self.timeouts.post_login)
            .await?;
        if after_login == stages::DASHBOARD {
            info!("{} ✓ 登录成功", CTX);
            return Ok(());
        }

        info!("{} 📱 请在浏览器中输入验证码...", CTX);
        self.race(&[stages::dashboard()], self.timeouts.otp).await?;
        info!("{} ✓ 验证通过，已进入首页", CTX);
        Ok(())
    }

    async fn race(
        &self,
        candidates: &[crate::models::Stage],
        timeout: std::time::Duration,
    ) -> AppResult<&'static str> {
        run_required(Step::SessionStage, CTX, || {
            self.detector.detect(candidates, timeout)
        })
        .await
    }
}
