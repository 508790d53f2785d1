//! 页面阶段定义
//!
//! 一个阶段是一组"或"关系的条件，任一条件成立即认为页面到达该阶段。

use std::fmt;

/// 单个可检测条件
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    /// CSS 选择器能匹配到元素
    Selector(String),
    /// 页面正文包含给定文本
    TextContains(String),
}

impl Condition {
    pub fn selector(css: impl Into<String>) -> Self {
        Condition::Selector(css.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Condition::TextContains(text.into())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Selector(css) => write!(f, "selector({})", css),
            Condition::TextContains(text) => write!(f, "text({})", text),
        }
    }
}

/// 命名阶段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: &'static str,
    pub alternatives: Vec<Condition>,
}

impl Stage {
    pub fn new(name: &'static str, alternatives: Vec<Condition>) -> Self {
        Self { name, alternatives }
    }
}

/// 远端应用的阶段目录
pub mod stages {
    use super::{Condition, Stage};
    use crate::models::selectors as sel;

    pub const LOGIN: &str = "login";
    pub const OTP: &str = "otp";
    pub const DASHBOARD: &str = "dashboard";
    pub const TRANSACTIONS: &str = "transactions";
    pub const NEW_TRANSACTION: &str = "new_transaction";
    pub const RESULT: &str = "result";

    pub fn login() -> Stage {
        Stage::new(
            LOGIN,
            vec![
                Condition::selector("input[type='password']"),
                Condition::selector("form#login"),
            ],
        )
    }

    pub fn otp() -> Stage {
        Stage::new(
            OTP,
            vec![
                Condition::selector("input[autocomplete='one-time-code']"),
                Condition::text("verification code"),
            ],
        )
    }

    pub fn dashboard() -> Stage {
        Stage::new(
            DASHBOARD,
            vec![
                Condition::selector(sel::TRANSACTIONS_LINK),
                Condition::selector(sel::TRANSACTIONS_LINK_FALLBACK),
            ],
        )
    }

    pub fn transactions() -> Stage {
        Stage::new(
            TRANSACTIONS,
            vec![
                Condition::selector(sel::NEW_TRANSACTION_LINK),
                Condition::selector(sel::NEW_TRANSACTION_LINK_FALLBACK),
            ],
        )
    }

    /// 新建交易页：优先结构化标记，找不到时退回文本判断
    pub fn new_transaction() -> Stage {
        Stage::new(
            NEW_TRANSACTION,
            vec![
                Condition::selector(sel::TRANSACTION_FORM),
                Condition::text("New Transaction"),
            ],
        )
    }

    pub fn result() -> Stage {
        Stage::new(
            RESULT,
            vec![
                Condition::selector(sel::RESULT_STATUS),
                Condition::text("Transaction Result"),
            ],
        )
    }
}
