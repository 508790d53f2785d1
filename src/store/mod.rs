//! 记录存储
//!
//! 对带表头的表格文件的抽象：整体读取、按行号写回单个字段。
//! 写回按绝对行号定位，不按内容匹配。

pub mod csv_store;
pub mod memory;

pub use csv_store::CsvRecordStore;
pub use memory::MemoryRecordStore;

use crate::error::AppResult;
use crate::models::{record, Record};

pub trait RecordStore: Send + Sync {
    /// 按文件顺序读取全部记录
    fn read_all(&self) -> AppResult<Vec<Record>>;

    /// 写入第 `row_index` 行（从 0 开始，不含表头）的 `field` 列，列不存在时新建
    fn write_field(&self, row_index: usize, field: &str, value: &str) -> AppResult<()>;
}

/// 在表头中查找列：先按规范化名称精确匹配，再按逻辑字段别名匹配
pub(crate) fn find_column(headers: &[String], field: &str) -> Option<usize> {
    let wanted = record::normalize_header(field);
    if let Some(idx) = headers
        .iter()
        .position(|h| record::normalize_header(h) == wanted)
    {
        return Some(idx);
    }
    let logical = record::field_for_header(field)?;
    headers
        .iter()
        .position(|h| record::field_for_header(h) == Some(logical))
}
