//! 内存记录存储，测试和演练用

use std::sync::Mutex;

use crate::error::{AppResult, AutomationError};
use crate::models::Record;
use crate::store::{find_column, RecordStore};

#[derive(Default)]
pub struct MemoryRecordStore {
    inner: Mutex<Table>,
}

#[derive(Default)]
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl MemoryRecordStore {
    pub fn new<H, R>(headers: H, rows: Vec<R>) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect();
        Self {
            inner: Mutex::new(Table { headers, rows }),
        }
    }

    /// 读取单元格，列不存在时返回 None
    pub fn cell(&self, row_index: usize, field: &str) -> Option<String> {
        let table = self.inner.lock().ok()?;
        let column = find_column(&table.headers, field)?;
        table
            .rows
            .get(row_index)
            .map(|row| row.get(column).cloned().unwrap_or_default())
    }

    pub fn headers(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|t| t.headers.clone())
            .unwrap_or_default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn read_all(&self) -> AppResult<Vec<Record>> {
        let table = self
            .inner
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        Ok(table
            .rows
            .iter()
            .enumerate()
            .map(|(idx, cells)| Record::from_row(idx, &table.headers, cells))
            .collect())
    }

    fn write_field(&self, row_index: usize, field: &str, value: &str) -> AppResult<()> {
        let mut table = self.inner.lock().map_err(|e| {
            AutomationError::persistence(
                row_index,
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
            )
        })?;
        if row_index >= table.rows.len() {
            return Err(AutomationError::persistence(
                row_index,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "行号超出范围"),
            ));
        }
        let column = match find_column(&table.headers, field) {
            Some(idx) => idx,
            None => {
                table.headers.push(field.to_string());
                table.headers.len() - 1
            }
        };
        let row = &mut table.rows[row_index];
        if row.len() <= column {
            row.resize(column + 1, String::new());
        }
        row[column] = value.to_string();
        Ok(())
    }
}
