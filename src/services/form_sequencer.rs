//! 表单填写 - 业务能力层
//!
//! 只在"新建交易"页确认到达后调用。填写顺序固定：
//! 1. 拦截回车 / 隐式提交
//! 2. 等待商户账号输入框（失败后停顿一次再等）
//! 3. 尽力等待金额、订单号、卡号三个输入框
//! 4. 按顺序清空并填写有值的字段；持卡人、邮编及品牌地址总是写入固定值
//! 5. 卡号回读，被输入掩码截断时补齐缺失的尾部
//! 6. 风控复选框：点击后复查，仍不对则强制设置
//! 7. 解除提交拦截，审核模式下操作员可以直接点击提交

use std::fmt::Display;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{AppResult, AutomationError};
use crate::infrastructure::PageDriver;
use crate::models::{digits_only, selectors as sel, Brand, Condition, Field, Record, Stage};
use crate::services::StageDetector;
use crate::utils::logging::mask_card;
use crate::workflow::policy::{run_required, run_step, Step};

/// 主识别字段的单次等待上限
pub const CRITICAL_FIELD_WAIT: Duration = Duration::from_secs(10);
/// 次要字段的单次等待上限
pub const SECONDARY_FIELD_WAIT: Duration = Duration::from_secs(3);
/// 风控复选框期望状态（勾选 = 跳过风控）
pub const SKIP_FRAUD_CHECK: bool = true;

pub struct FormSequencer<'a> {
    page: &'a dyn PageDriver,
    detector: StageDetector<'a>,
    brand: Brand,
}

impl<'a> FormSequencer<'a> {
    pub fn new(page: &'a dyn PageDriver, brand: Brand) -> Self {
        Self {
            page,
            detector: StageDetector::new(page),
            brand,
        }
    }

    pub fn with_detector(mut self, detector: StageDetector<'a>) -> Self {
        self.detector = detector;
        self
    }

    /// 填写整张表单
    pub async fn fill(&self, record: &Record, ctx: impl Display + Copy) -> AppResult<()> {
        run_step(Step::SubmitGuard, ctx, || {
            self.page.install_submit_guard(sel::TRANSACTION_FORM)
        })
        .await?;

        run_required(Step::CriticalFieldWait, ctx, || {
            self.wait_field(sel::MERCHANT_ACCOUNT, CRITICAL_FIELD_WAIT)
        })
        .await?;

        for selector in [sel::AMOUNT, sel::ORDER_ID, sel::CARD_NUMBER] {
            run_step(Step::SecondaryFieldWait, ctx, || {
                self.wait_field(selector, SECONDARY_FIELD_WAIT)
            })
            .await?;
        }

        let card_number = record.card_number();
        let expiry = record.expiry();
        let cvv = record.cvv_digits();
        let entries: [(&str, &str, &str); 7] = [
            ("商户账号", sel::MERCHANT_ACCOUNT, record.get(Field::MerchantAccount)),
            ("金额", sel::AMOUNT, record.get(Field::Amount)),
            ("订单号", sel::ORDER_ID, record.get(Field::OrderId)),
            ("客户姓名", sel::CUSTOMER_NAME, record.get(Field::CustomerName)),
            ("卡号", sel::CARD_NUMBER, &card_number),
            ("有效期", sel::EXPIRY, &expiry),
            ("CVV", sel::CVV, &cvv),
        ];

        for (label, selector, value) in entries {
            if value.is_empty() {
                debug!("{} 跳过空字段: {}", ctx, label);
                continue;
            }
            run_required(Step::FieldEntry, ctx, || self.type_fresh(selector, value)).await?;
            match selector {
                sel::CARD_NUMBER => {
                    info!("{} ✎ 卡号: {}", ctx, mask_card(value));
                    run_step(Step::CardReadBack, ctx, || {
                        self.verify_card_number(value, ctx)
                    })
                    .await?;
                }
                sel::CVV => info!("{} ✎ CVV: ***", ctx),
                _ => info!("{} ✎ {}: {}", ctx, label, value),
            }
        }

        self.fill_billing(ctx).await?;

        run_step(Step::FraudCheckbox, ctx, || {
            self.ensure_checkbox(sel::SKIP_FRAUD_CHECK, SKIP_FRAUD_CHECK, ctx)
        })
        .await?;

        run_step(Step::SubmitGuard, ctx, || {
            self.page.release_submit_guard(sel::TRANSACTION_FORM)
        })
        .await?;

        info!("{} ✓ 表单填写完成", ctx);
        Ok(())
    }

    /// 品牌固定值：持卡人、邮编，以及部分品牌的国家/街道/地区
    async fn fill_billing(&self, ctx: impl Display + Copy) -> AppResult<()> {
        let billing = self.brand.billing();
        let mut fixed = vec![
            (sel::CARDHOLDER_NAME, billing.cardholder_name),
            (sel::POSTAL_CODE, billing.postal_code),
        ];
        if let Some(address) = billing.address {
            fixed.push((sel::COUNTRY, address.country));
            fixed.push((sel::STREET, address.street));
            fixed.push((sel::REGION, address.region));
        }
        for (selector, value) in fixed {
            run_required(Step::FieldEntry, ctx, || self.page.set_value(selector, value)).await?;
        }
        info!("{} ✎ 账单信息: {} ({})", ctx, billing.cardholder_name, self.brand);
        Ok(())
    }

    async fn wait_field(&self, selector: &'static str, timeout: Duration) -> AppResult<()> {
        let stage = Stage::new(selector, vec![Condition::selector(selector)]);
        match self.detector.wait_for(stage, timeout).await {
            Ok(_) => Ok(()),
            Err(AutomationError::Timeout { .. }) => Err(AutomationError::not_found(selector)),
            Err(e) => Err(e),
        }
    }

    /// 先清空再逐键输入
    async fn type_fresh(&self, selector: &str, value: &str) -> AppResult<()> {
        self.page.set_value(selector, "").await?;
        self.page.type_text(selector, value).await
    }

    /// 回读卡号，位数不足时补输缺失的尾部
    async fn verify_card_number(&self, expected: &str, ctx: impl Display) -> AppResult<()> {
        let current = digits_only(&self.page.value_of(sel::CARD_NUMBER).await?);
        if current.len() >= expected.len() {
            return Ok(());
        }
        if !expected.starts_with(&current) {
            warn!(
                "{} ⚠️ 卡号回读与预期前缀不一致: {} vs {}",
                ctx,
                mask_card(&current),
                mask_card(expected)
            );
        }
        let missing = &expected[current.len()..];
        warn!(
            "{} ⚠️ 卡号被截断 ({}/{} 位)，补输 {} 位",
            ctx,
            current.len(),
            expected.len(),
            missing.len()
        );
        self.page.type_text(sel::CARD_NUMBER, missing).await
    }

    /// 点击切换；复查仍不符合时强制设置并触发 change
    async fn ensure_checkbox(
        &self,
        selector: &str,
        desired: bool,
        ctx: impl Display,
    ) -> AppResult<()> {
        if self.page.is_checked(selector).await? == desired {
            return Ok(());
        }
        self.page.click(selector).await?;
        if self.page.is_checked(selector).await? == desired {
            return Ok(());
        }
        warn!("{} ⚠️ 点击复选框未生效，强制设置为 {}", ctx, desired);
        self.page.force_checked(selector, desired).await
    }
}
