use std::time::Duration;

use thiserror::Error;

/// 自动化过程中的错误类型
///
/// 输入校验不通过（如 CVV 不足 3 位）不是错误，而是跳过决策，
/// 由 `RowOutcome::SkippedInvalid` 表达，不会出现在这里。
#[derive(Debug, Error)]
pub enum AutomationError {
    /// 条件在截止时间内始终未成立
    #[error("等待超时 ({deadline:?}): {what}")]
    Timeout { what: String, deadline: Duration },

    /// 必需的元素始终未出现
    #[error("元素不存在: {selector}")]
    NotFound { selector: String },

    /// 结果写回记录文件失败
    #[error("写回第 {row} 行失败: {source}")]
    PersistenceFailure {
        row: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 浏览器 / CDP 错误
    #[error("浏览器错误: {0}")]
    Browser(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 错误: {0}")]
    Csv(#[from] csv::Error),
}

impl AutomationError {
    /// 创建超时错误，`what` 通常是参与竞争的阶段名列表
    pub fn timeout(what: impl Into<String>, deadline: Duration) -> Self {
        AutomationError::Timeout {
            what: what.into(),
            deadline,
        }
    }

    pub fn not_found(selector: impl Into<String>) -> Self {
        AutomationError::NotFound {
            selector: selector.into(),
        }
    }

    pub fn persistence(row: usize, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AutomationError::PersistenceFailure {
            row,
            source: Box::new(source),
        }
    }

    /// 是否属于"等不到"一类的错误（超时或元素不存在）
    pub fn is_wait_failure(&self) -> bool {
        matches!(
            self,
            AutomationError::Timeout { .. } | AutomationError::NotFound { .. }
        )
    }
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AutomationError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AutomationError::Browser(err.to_string())
    }
}

impl From<serde_json::Error> for AutomationError {
    fn from(err: serde_json::Error) -> Self {
        AutomationError::Browser(format!("脚本返回值解析失败: {}", err))
    }
}

impl From<url::ParseError> for AutomationError {
    fn from(err: url::ParseError) -> Self {
        AutomationError::Config(format!("URL 解析失败: {}", err))
    }
}

impl From<toml::de::Error> for AutomationError {
    fn from(err: toml::de::Error) -> Self {
        AutomationError::Config(err.to_string())
    }
}

// ========== Result 类型别名 ==========

/// 核心层结果类型
pub type AppResult<T> = Result<T, AutomationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_failures_are_classified() {
        assert!(AutomationError::timeout("dashboard", Duration::from_secs(5)).is_wait_failure());
        assert!(AutomationError::not_found("#amount").is_wait_failure());
        assert!(!AutomationError::Config("brand".into()).is_wait_failure());
    }

    #[test]
    fn timeout_message_names_stages_and_deadline() {
        let err = AutomationError::timeout("login | dashboard", Duration::from_secs(30));
        let msg = err.to_string();
        assert!(msg.contains("login | dashboard"));
        assert!(msg.contains("30s"));
    }
}
