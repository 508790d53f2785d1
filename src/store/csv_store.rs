//! CSV 文件记录存储

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{AppResult, AutomationError};
use crate::models::Record;
use crate::store::{find_column, RecordStore};

/// CSV 文件记录存储
///
/// 每次写回都重新读取文件，只修改目标单元格，再经临时文件整体替换。
pub struct CsvRecordStore {
    path: PathBuf,
}

/// 原始表格：表头 + 数据行
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_table(&self) -> AppResult<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut lines = Vec::new();
        for row in reader.records() {
            let row = row?;
            lines.push(row.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let mut lines = lines.into_iter();
        let mut headers = lines.next().unwrap_or_default();
        if let Some(first) = headers.first_mut() {
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = stripped.to_string();
            }
        }

        Ok(Table {
            headers,
            rows: lines.collect(),
        })
    }

    /// 写入同目录下的临时文件，完成后整体替换原文件；中途失败时临时文件随之删除
    fn save_table(&self, table: &Table) -> AppResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(tmp.as_file());
            writer.write_record(&table.headers)?;
            for row in &table.rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl RecordStore for CsvRecordStore {
    fn read_all(&self) -> AppResult<Vec<Record>> {
        let table = self.load_table()?;
        debug!(
            "读取 {}: {} 列, {} 行",
            self.path.display(),
            table.headers.len(),
            table.rows.len()
        );
        Ok(table
            .rows
            .iter()
            .enumerate()
            .map(|(idx, cells)| Record::from_row(idx, &table.headers, cells))
            .collect())
    }

    fn write_field(&self, row_index: usize, field: &str, value: &str) -> AppResult<()> {
        let mut table = self
            .load_table()
            .map_err(|e| AutomationError::persistence(row_index, e))?;

        if row_index >= table.rows.len() {
            return Err(AutomationError::persistence(
                row_index,
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("行号 {} 超出范围，共 {} 行", row_index, table.rows.len()),
                ),
            ));
        }

        let column = match find_column(&table.headers, field) {
            Some(idx) => idx,
            None => {
                table.headers.push(field.to_string());
                table.headers.len() - 1
            }
        };

        let width = table.headers.len();
        for row in table.rows.iter_mut().filter(|r| r.len() < width) {
            row.resize(width, String::new());
        }
        table.rows[row_index][column] = value.to_string();

        self.save_table(&table)
            .map_err(|e| AutomationError::persistence(row_index, e))
    }
}
