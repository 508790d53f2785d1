//! 输入记录
//!
//! 一行 CSV 数据，按表头别名读取逻辑字段。表头比较时忽略大小写与多余空白。

use std::collections::HashMap;
use std::sync::OnceLock;

use phf::phf_map;
use regex::Regex;

/// 逻辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    MerchantAccount,
    Amount,
    OrderId,
    CustomerName,
    CardFirst4,
    CardLast12,
    Expiry,
    Cvv,
    Status,
}

/// 规范化表头 → 逻辑字段
static HEADER_ALIASES: phf::Map<&'static str, Field> = phf_map! {
    "maids" => Field::MerchantAccount,
    "maid" => Field::MerchantAccount,
    "merchant account" => Field::MerchantAccount,
    "merchant account id" => Field::MerchantAccount,
    "amount" => Field::Amount,
    "amt" => Field::Amount,
    "total" => Field::Amount,
    "reservation id" => Field::OrderId,
    "reservation" => Field::OrderId,
    "booking id" => Field::OrderId,
    "order id" => Field::OrderId,
    "customer name" => Field::CustomerName,
    "guest name" => Field::CustomerName,
    "name" => Field::CustomerName,
    "card first 4" => Field::CardFirst4,
    "first 4" => Field::CardFirst4,
    "card first four" => Field::CardFirst4,
    "card last 12" => Field::CardLast12,
    "last 12" => Field::CardLast12,
    "card last twelve" => Field::CardLast12,
    "expiry" => Field::Expiry,
    "expiration" => Field::Expiry,
    "expiry date" => Field::Expiry,
    "exp" => Field::Expiry,
    "cvv" => Field::Cvv,
    "cvc" => Field::Cvv,
    "security code" => Field::Cvv,
    "status" => Field::Status,
};

/// 写回结果时使用的列名
pub const STATUS_COLUMN: &str = "STATUS";

const FIRST_FRAGMENT_DIGITS: usize = 4;
const LAST_FRAGMENT_DIGITS: usize = 12;

/// 规范化表头：去首尾空白、合并内部空白、转小写
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 表头对应的逻辑字段
pub fn field_for_header(header: &str) -> Option<Field> {
    HEADER_ALIASES.get(normalize_header(header).as_str()).copied()
}

/// 只保留数字
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn digits_capped(value: &str, cap: usize) -> String {
    digits_only(value).chars().take(cap).collect()
}

/// 一行输入记录
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// 数据行号（从 0 开始，不含表头）
    pub row_index: usize,
    fields: HashMap<Field, String>,
}

impl Record {
    /// 由表头和一行单元格构造记录
    ///
    /// 同一逻辑字段出现多列时，第一个非空值生效。
    pub fn from_row(row_index: usize, headers: &[String], cells: &[String]) -> Self {
        let mut fields = HashMap::new();
        for (header, cell) in headers.iter().zip(cells.iter()) {
            let Some(field) = field_for_header(header) else {
                continue;
            };
            let value = cell.trim();
            if value.is_empty() {
                continue;
            }
            fields.entry(field).or_insert_with(|| value.to_string());
        }
        Self { row_index, fields }
    }

    /// 读取字段，缺失时返回空串
    pub fn get(&self, field: Field) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    /// 已有状态（非空即视为处理过）
    pub fn status(&self) -> &str {
        self.get(Field::Status)
    }

    pub fn has_status(&self) -> bool {
        !self.status().trim().is_empty()
    }

    /// CVV 纯数字
    pub fn cvv_digits(&self) -> String {
        digits_only(self.get(Field::Cvv))
    }

    /// CVV 至少 3 位数字才允许提交
    pub fn has_valid_cvv(&self) -> bool {
        self.cvv_digits().len() >= 3
    }

    /// 拼接完整卡号：前 4 位 + 后 12 位，各自去非数字并截断
    pub fn card_number(&self) -> String {
        let mut number = digits_capped(self.get(Field::CardFirst4), FIRST_FRAGMENT_DIGITS);
        number.push_str(&digits_capped(self.get(Field::CardLast12), LAST_FRAGMENT_DIGITS));
        number
    }

    /// 规范化后的有效期（MM/YY），无法识别时原样返回
    pub fn expiry(&self) -> String {
        normalize_expiry(self.get(Field::Expiry))
    }
}

fn expiry_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,2})\s*[/\-.]\s*(\d{2}|\d{4})\s*$").expect("expiry regex is valid")
    })
}

/// `12/2030`、`12-30`、`1/30` → `12/30`、`01/30`
pub fn normalize_expiry(raw: &str) -> String {
    let Some(caps) = expiry_pattern().captures(raw) else {
        return raw.trim().to_string();
    };
    let month: u32 = caps[1].parse().unwrap_or(0);
    if !(1..=12).contains(&month) {
        return raw.trim().to_string();
    }
    let year = &caps[2];
    let year = &year[year.len() - 2..];
    format!("{:02}/{}", month, year)
}
