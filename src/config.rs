//! 程序配置
//!
//! 加载顺序：默认值 → TOML 配置文件（可选）→ 环境变量。
//! 一次运行内配置不可变，通过引用向下传递。

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, AutomationError};
use crate::models::Brand;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 只填表不提交，填完第一条后暂停等待人工检查
    Review,
    /// 自动提交并抓取结果
    AutoSubmit,
}

/// 浏览器获取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserMode {
    /// 连接操作员已打开的浏览器（调试端口）
    Connect,
    /// 由程序启动浏览器
    Launch,
}

/// 四个相互独立的超时
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub page_load: Duration,
    pub post_login: Duration,
    pub otp: Duration,
    pub result: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page_load: Duration::from_secs(30),
            post_login: Duration::from_secs(180),
            otp: Duration::from_secs(180),
            result: Duration::from_secs(30),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 当前品牌
    pub brand: Brand,
    pub mode: RunMode,
    pub timeouts: Timeouts,
    /// 输入 CSV 文件
    pub input_file: String,
    /// 登录页 URL
    pub target_url: String,
    /// 浏览器调试端口
    pub browser_debug_port: u16,
    pub browser_mode: BrowserMode,
    /// 启动模式下使用的浏览器可执行文件
    pub browser_executable: Option<String>,
    pub headless: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brand: Brand::Booking,
            mode: RunMode::Review,
            timeouts: Timeouts::default(),
            input_file: "records.csv".to_string(),
            target_url: "https://terminal.example.com/login".to_string(),
            browser_debug_port: 9222,
            browser_mode: BrowserMode::Connect,
            browser_executable: None,
            headless: false,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

/// TOML 配置文件结构，所有字段可选
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    brand: Option<String>,
    review_mode: Option<bool>,
    input_file: Option<String>,
    target_url: Option<String>,
    browser_debug_port: Option<u16>,
    browser_mode: Option<String>,
    browser_executable: Option<String>,
    headless: Option<bool>,
    verbose_logging: Option<bool>,
    output_log_file: Option<String>,
    page_load_timeout_secs: Option<u64>,
    post_login_timeout_secs: Option<u64>,
    otp_timeout_secs: Option<u64>,
    result_timeout_secs: Option<u64>,
}

impl Config {
    /// 完整加载：默认值 → 配置文件 → 环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("AUTOFILL_CONFIG").unwrap_or_else(|_| "autofill.toml".to_string());
        let mut config = Self::default();
        if Path::new(&path).exists() {
            let content = std::fs::read_to_string(&path)?;
            config.apply_toml(&content)?;
        }
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// 只从环境变量加载
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    fn apply_toml(&mut self, content: &str) -> AppResult<()> {
        let file: FileConfig = toml::from_str(content)?;
        if let Some(v) = file.brand {
            self.brand = v.parse()?;
        }
        if let Some(v) = file.review_mode {
            self.mode = mode_from_flag(v);
        }
        if let Some(v) = file.input_file {
            self.input_file = v;
        }
        if let Some(v) = file.target_url {
            self.target_url = v;
        }
        if let Some(v) = file.browser_debug_port {
            self.browser_debug_port = v;
        }
        if let Some(v) = file.browser_mode {
            self.browser_mode = parse_browser_mode(&v)?;
        }
        if file.browser_executable.is_some() {
            self.browser_executable = file.browser_executable;
        }
        if let Some(v) = file.headless {
            self.headless = v;
        }
        if let Some(v) = file.verbose_logging {
            self.verbose_logging = v;
        }
        if let Some(v) = file.output_log_file {
            self.output_log_file = v;
        }
        if let Some(v) = file.page_load_timeout_secs {
            self.timeouts.page_load = Duration::from_secs(v);
        }
        if let Some(v) = file.post_login_timeout_secs {
            self.timeouts.post_login = Duration::from_secs(v);
        }
        if let Some(v) = file.otp_timeout_secs {
            self.timeouts.otp = Duration::from_secs(v);
        }
        if let Some(v) = file.result_timeout_secs {
            self.timeouts.result = Duration::from_secs(v);
        }
        Ok(())
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        if let Some(v) = var("BRAND") {
            self.brand = v.parse()?;
        }
        if let Some(v) = var("REVIEW_MODE") {
            self.mode = mode_from_flag(parse_env("REVIEW_MODE", &v)?);
        }
        if let Some(v) = var("INPUT_FILE") {
            self.input_file = v;
        }
        if let Some(v) = var("TARGET_URL") {
            self.target_url = v;
        }
        if let Some(v) = var("BROWSER_DEBUG_PORT") {
            self.browser_debug_port = parse_env("BROWSER_DEBUG_PORT", &v)?;
        }
        if let Some(v) = var("BROWSER_MODE") {
            self.browser_mode = parse_browser_mode(&v)?;
        }
        if let Some(v) = var("BROWSER_EXECUTABLE") {
            self.browser_executable = Some(v);
        }
        if let Some(v) = var("HEADLESS") {
            self.headless = parse_env("HEADLESS", &v)?;
        }
        if let Some(v) = var("VERBOSE_LOGGING") {
            self.verbose_logging = parse_env("VERBOSE_LOGGING", &v)?;
        }
        if let Some(v) = var("OUTPUT_LOG_FILE") {
            self.output_log_file = v;
        }
        if let Some(v) = var("PAGE_LOAD_TIMEOUT_SECS") {
            self.timeouts.page_load = Duration::from_secs(parse_env("PAGE_LOAD_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = var("POST_LOGIN_TIMEOUT_SECS") {
            self.timeouts.post_login = Duration::from_secs(parse_env("POST_LOGIN_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = var("OTP_TIMEOUT_SECS") {
            self.timeouts.otp = Duration::from_secs(parse_env("OTP_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = var("RESULT_TIMEOUT_SECS") {
            self.timeouts.result = Duration::from_secs(parse_env("RESULT_TIMEOUT_SECS", &v)?);
        }
        Ok(())
    }

    pub fn is_review(&self) -> bool {
        self.mode == RunMode::Review
    }
}

fn mode_from_flag(review: bool) -> RunMode {
    if review {
        RunMode::Review
    } else {
        RunMode::AutoSubmit
    }
}

fn parse_browser_mode(value: &str) -> AppResult<BrowserMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "connect" => Ok(BrowserMode::Connect),
        "launch" => Ok(BrowserMode::Launch),
        other => Err(AutomationError::Config(format!(
            "BROWSER_MODE 只能是 connect / launch，实际为 '{}'",
            other
        ))),
    }
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> AppResult<T> {
    value.trim().parse().map_err(|_| {
        AutomationError::Config(format!(
            "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
            name,
            value,
            std::any::type_name::<T>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_overrides_defaults() {
        let mut config = Config::default();
        config
            .apply_env(env_of(&[
                ("BRAND", "expedia"),
                ("REVIEW_MODE", "false"),
                ("RESULT_TIMEOUT_SECS", "45"),
            ]))
            .unwrap();
        assert_eq!(config.brand, Brand::Expedia);
        assert_eq!(config.mode, RunMode::AutoSubmit);
        assert_eq!(config.timeouts.result, Duration::from_secs(45));
        assert_eq!(config.timeouts.page_load, Duration::from_secs(30));
    }

    #[test]
    fn bad_env_value_is_reported() {
        let mut config = Config::default();
        let err = config
            .apply_env(env_of(&[("BROWSER_DEBUG_PORT", "abc")]))
            .unwrap_err();
        assert!(err.to_string().contains("BROWSER_DEBUG_PORT"));
    }

    #[test]
    fn toml_then_env_precedence() {
        let mut config = Config::default();
        config
            .apply_toml(
                r#"
                brand = "expedia"
                review_mode = false
                input_file = "batch.csv"
                otp_timeout_secs = 600
                "#,
            )
            .unwrap();
        config.apply_env(env_of(&[("BRAND", "booking")])).unwrap();
        assert_eq!(config.brand, Brand::Booking);
        assert_eq!(config.input_file, "batch.csv");
        assert_eq!(config.timeouts.otp, Duration::from_secs(600));
        assert!(!config.is_review());
    }

    #[test]
    fn unknown_browser_mode_rejected() {
        assert!(parse_browser_mode("remote").is_err());
        assert_eq!(parse_browser_mode("Launch").unwrap(), BrowserMode::Launch);
    }
}
