//! 记录处理上下文
//!
//! 封装"我正在处理第几行、哪个订单"这一信息，只用于日志前缀

use std::fmt::Display;

use crate::models::{Field, Record};

#[derive(Debug, Clone)]
pub struct RowCtx {
    /// 数据行号（从 0 开始）
    pub row_index: usize,
    /// 订单号，可能为空
    pub order_id: String,
}

impl RowCtx {
    pub fn new(row_index: usize, order_id: impl Into<String>) -> Self {
        Self {
            row_index,
            order_id: order_id.into(),
        }
    }

    pub fn for_record(record: &Record) -> Self {
        Self::new(record.row_index, record.get(Field::OrderId))
    }
}

impl Display for RowCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.order_id.is_empty() {
            write!(f, "[第 {} 行]", self.row_index + 1)
        } else {
            write!(f, "[第 {} 行 订单 {}]", self.row_index + 1, self.order_id)
        }
    }
}
