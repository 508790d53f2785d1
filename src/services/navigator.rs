//! 导航能力 - 业务能力层
//!
//! 只负责"点哪个链接"，不关心流程顺序

use tracing::debug;

use crate::error::{AppResult, AutomationError};
use crate::infrastructure::PageDriver;
use crate::models::{selectors, Condition};

/// 主选择器 + 备用选择器
#[derive(Debug, Clone, Copy)]
pub struct Link {
    pub name: &'static str,
    pub primary: &'static str,
    pub fallback: &'static str,
}

pub const TRANSACTIONS: Link = Link {
    name: "交易列表",
    primary: selectors::TRANSACTIONS_LINK,
    fallback: selectors::TRANSACTIONS_LINK_FALLBACK,
};

pub const NEW_TRANSACTION: Link = Link {
    name: "新建交易",
    primary: selectors::NEW_TRANSACTION_LINK,
    fallback: selectors::NEW_TRANSACTION_LINK_FALLBACK,
};

/// 点击链接：主选择器不存在时点击备用选择器
pub async fn click_with_fallback(page: &dyn PageDriver, link: Link) -> AppResult<()> {
    if page.exists(&Condition::selector(link.primary)).await? {
        debug!("点击{}: {}", link.name, link.primary);
        return page.click(link.primary).await;
    }
    if page.exists(&Condition::selector(link.fallback)).await? {
        debug!("点击{}（备用）: {}", link.name, link.fallback);
        return page.click(link.fallback).await;
    }
    Err(AutomationError::not_found(format!(
        "{} / {}",
        link.primary, link.fallback
    )))
}
