//! 测试用的假页面
//!
//! - `TimedPage`：条件在指定的虚拟时间点之后成立，用于阶段检测测试
//! - `FakeTerminal`：按屏幕建模的虚拟终端，用于表单与整行流程测试

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use terminal_autofill::models::selectors as sel;
use terminal_autofill::{AppResult, AutomationError, Condition, PageDriver};
use tokio::time::Instant;

pub fn init_tracing() {
    terminal_autofill::utils::logging::init(true);
}

// ========== TimedPage ==========

pub struct TimedPage {
    start: Instant,
    appear_at: HashMap<Condition, Duration>,
    polls: Mutex<usize>,
}

impl TimedPage {
    pub fn new(appear_at: Vec<(Condition, Duration)>) -> Self {
        Self {
            start: Instant::now(),
            appear_at: appear_at.into_iter().collect(),
            polls: Mutex::new(0),
        }
    }

    pub fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

#[async_trait]
impl PageDriver for TimedPage {
    async fn exists(&self, condition: &Condition) -> AppResult<bool> {
        *self.polls.lock().unwrap() += 1;
        Ok(self
            .appear_at
            .get(condition)
            .is_some_and(|at| self.start.elapsed() >= *at))
    }

    async fn text_of(&self, condition: &Condition) -> AppResult<String> {
        Err(AutomationError::not_found(condition.to_string()))
    }

    async fn value_of(&self, selector: &str) -> AppResult<String> {
        Err(AutomationError::not_found(selector))
    }

    async fn click(&self, selector: &str) -> AppResult<()> {
        Err(AutomationError::not_found(selector))
    }

    async fn type_text(&self, selector: &str, _text: &str) -> AppResult<()> {
        Err(AutomationError::not_found(selector))
    }

    async fn set_value(&self, selector: &str, _value: &str) -> AppResult<()> {
        Err(AutomationError::not_found(selector))
    }

    async fn is_checked(&self, selector: &str) -> AppResult<bool> {
        Err(AutomationError::not_found(selector))
    }

    async fn force_checked(&self, selector: &str, _checked: bool) -> AppResult<()> {
        Err(AutomationError::not_found(selector))
    }

    async fn install_submit_guard(&self, selector: &str) -> AppResult<()> {
        Err(AutomationError::not_found(selector))
    }

    async fn release_submit_guard(&self, selector: &str) -> AppResult<()> {
        Err(AutomationError::not_found(selector))
    }

    async fn submit_form(&self, selector: &str, _button: &str) -> AppResult<()> {
        Err(AutomationError::not_found(selector))
    }

    async fn navigate(&self, _url: &str) -> AppResult<()> {
        Ok(())
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> AppResult<()> {
        tokio::time::sleep(timeout).await;
        Err(AutomationError::timeout("navigation", timeout))
    }
}

// ========== FakeTerminal ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Blank,
    Login,
    Otp,
    Dashboard,
    Transactions,
    NewTransaction,
    Result,
}

/// 终端行为参数
#[derive(Debug, Clone)]
pub struct Behavior {
    /// 打开登录页后是否需要登录
    pub logged_in: bool,
    /// 操作员完成登录所需时间，None 表示一直不登录
    pub login_after: Option<Duration>,
    /// 登录后是否出现验证码页
    pub otp_required: bool,
    pub otp_after: Duration,
    /// 商户账号输入框在进入新建页之后多久出现
    pub merchant_field_after: Duration,
    /// 首次输入卡号时掩码只保留的位数
    pub card_truncate_to: Option<usize>,
    /// 点击风控复选框无效
    pub checkbox_click_ignored: bool,
    /// 提交后是否进入结果页
    pub submit_reaches_result: bool,
    /// 结果文本在进入结果页之后多久填充，None 表示一直为空
    pub result_after: Option<Duration>,
    pub result_text: String,
    /// 导航链接只提供备用选择器
    pub fallback_links_only: bool,
    /// 结果页上第一次点击交易列表链接失败
    pub return_click_fails: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            logged_in: true,
            login_after: Some(Duration::from_secs(5)),
            otp_required: false,
            otp_after: Duration::from_secs(5),
            merchant_field_after: Duration::ZERO,
            card_truncate_to: None,
            checkbox_click_ignored: false,
            submit_reaches_result: true,
            result_after: Some(Duration::from_secs(2)),
            result_text: "Authorised".to_string(),
            fallback_links_only: false,
            return_click_fails: false,
        }
    }
}

#[derive(Debug)]
struct State {
    screen: Screen,
    entered_at: Instant,
    values: HashMap<String, String>,
    checked: HashSet<String>,
    card_typed: bool,
    guard_installed: bool,
    return_click_failed: bool,
    submissions: Vec<HashMap<String, String>>,
    calls: Vec<String>,
}

pub struct FakeTerminal {
    behavior: Behavior,
    state: Mutex<State>,
}

const FORM_FIELDS: &[&str] = &[
    sel::MERCHANT_ACCOUNT,
    sel::AMOUNT,
    sel::ORDER_ID,
    sel::CUSTOMER_NAME,
    sel::CARD_NUMBER,
    sel::EXPIRY,
    sel::CVV,
    sel::CARDHOLDER_NAME,
    sel::POSTAL_CODE,
    sel::COUNTRY,
    sel::STREET,
    sel::REGION,
    sel::SKIP_FRAUD_CHECK,
    sel::SUBMIT_BUTTON,
];

impl FakeTerminal {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            state: Mutex::new(State {
                screen: Screen::Blank,
                entered_at: Instant::now(),
                values: HashMap::new(),
                checked: HashSet::new(),
                card_typed: false,
                guard_installed: false,
                return_click_failed: false,
                submissions: Vec::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// 直接停在某个屏幕上
    pub fn on_screen(behavior: Behavior, screen: Screen) -> Self {
        let terminal = Self::new(behavior);
        terminal.state.lock().unwrap().screen = screen;
        terminal
    }

    pub fn screen(&self) -> Screen {
        self.advance();
        self.state.lock().unwrap().screen
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn value(&self, selector: &str) -> Option<String> {
        self.state.lock().unwrap().values.get(selector).cloned()
    }

    pub fn checked(&self, selector: &str) -> bool {
        self.state.lock().unwrap().checked.contains(selector)
    }

    pub fn guard_installed(&self) -> bool {
        self.state.lock().unwrap().guard_installed
    }

    pub fn submissions(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().unwrap().submissions.clone()
    }

    /// 操作员手动点击提交；拦截仍在时提交被吞掉，返回 false
    pub fn operator_submit(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.guard_installed || state.screen != Screen::NewTransaction {
            return false;
        }
        let submitted = state.values.clone();
        state.submissions.push(submitted);
        true
    }

    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn switch(state: &mut State, screen: Screen) {
        state.screen = screen;
        state.entered_at = Instant::now();
        if screen == Screen::NewTransaction {
            state.values.clear();
            state.checked.clear();
            state.card_typed = false;
            state.guard_installed = false;
        }
    }

    /// 操作员在登录页 / 验证码页上的动作随虚拟时间推进
    fn advance(&self) {
        let mut state = self.state.lock().unwrap();
        let elapsed = state.entered_at.elapsed();
        let screen = state.screen;
        match screen {
            Screen::Login => {
                if let Some(after) = self.behavior.login_after {
                    if elapsed >= after {
                        let next = if self.behavior.otp_required {
                            Screen::Otp
                        } else {
                            Screen::Dashboard
                        };
                        Self::switch(&mut state, next);
                    }
                }
            }
            Screen::Otp => {
                if elapsed >= self.behavior.otp_after {
                    Self::switch(&mut state, Screen::Dashboard);
                }
            }
            _ => {}
        }
    }

    /// 把导航链接选择器映射到页面实际提供的那一个，未提供时返回 None
    fn resolve<'s>(&self, selector: &'s str) -> Option<&'s str> {
        let fallback_only = self.behavior.fallback_links_only;
        match selector {
            s if s == sel::TRANSACTIONS_LINK || s == sel::NEW_TRANSACTION_LINK => {
                (!fallback_only).then_some(s)
            }
            s if s == sel::TRANSACTIONS_LINK_FALLBACK => {
                fallback_only.then_some(sel::TRANSACTIONS_LINK)
            }
            s if s == sel::NEW_TRANSACTION_LINK_FALLBACK => {
                fallback_only.then_some(sel::NEW_TRANSACTION_LINK)
            }
            s => Some(s),
        }
    }

    fn present(&self, selector: &str) -> bool {
        let Some(selector) = self.resolve(selector) else {
            return false;
        };
        self.advance();
        let state = self.state.lock().unwrap();
        let elapsed = state.entered_at.elapsed();
        match state.screen {
            Screen::Blank => false,
            Screen::Login => selector == "input[type='password']",
            Screen::Otp => selector == "input[autocomplete='one-time-code']",
            Screen::Dashboard => selector == sel::TRANSACTIONS_LINK,
            Screen::Transactions => {
                selector == sel::TRANSACTIONS_LINK || selector == sel::NEW_TRANSACTION_LINK
            }
            Screen::NewTransaction => {
                if selector == sel::MERCHANT_ACCOUNT {
                    elapsed >= self.behavior.merchant_field_after
                } else {
                    selector == sel::TRANSACTIONS_LINK
                        || selector == sel::TRANSACTION_FORM
                        || FORM_FIELDS.contains(&selector)
                }
            }
            Screen::Result => selector == sel::TRANSACTIONS_LINK || selector == sel::RESULT_STATUS,
        }
    }

    fn body_text(&self) -> &'static str {
        match self.screen() {
            Screen::Otp => "Enter the verification code we sent you",
            Screen::NewTransaction => "New Transaction",
            Screen::Result => "Transaction Result",
            _ => "",
        }
    }

    fn require(&self, selector: &str) -> AppResult<()> {
        if self.present(selector) {
            Ok(())
        } else {
            Err(AutomationError::not_found(selector))
        }
    }
}

#[async_trait]
impl PageDriver for FakeTerminal {
    async fn exists(&self, condition: &Condition) -> AppResult<bool> {
        self.log(format!("exists {}", condition));
        Ok(match condition {
            Condition::Selector(css) => self.present(css),
            Condition::TextContains(text) => self.body_text().contains(text.as_str()),
        })
    }

    async fn text_of(&self, condition: &Condition) -> AppResult<String> {
        self.log(format!("text_of {}", condition));
        match condition {
            Condition::Selector(css) if css == sel::RESULT_STATUS => {
                self.require(css)?;
                let state = self.state.lock().unwrap();
                let hydrated = self
                    .behavior
                    .result_after
                    .is_some_and(|after| state.entered_at.elapsed() >= after);
                Ok(if hydrated {
                    self.behavior.result_text.clone()
                } else {
                    String::new()
                })
            }
            _ => Err(AutomationError::not_found(condition.to_string())),
        }
    }

    async fn value_of(&self, selector: &str) -> AppResult<String> {
        self.log(format!("value_of {}", selector));
        self.require(selector)?;
        Ok(self.value(selector).unwrap_or_default())
    }

    async fn click(&self, selector: &str) -> AppResult<()> {
        self.log(format!("click {}", selector));
        self.require(selector)?;
        let selector = self.resolve(selector).unwrap_or(selector);
        let mut state = self.state.lock().unwrap();
        if selector == sel::TRANSACTIONS_LINK
            && state.screen == Screen::Result
            && self.behavior.return_click_fails
            && !state.return_click_failed
        {
            state.return_click_failed = true;
            return Err(AutomationError::Browser("click intercepted".to_string()));
        }
        match selector {
            s if s == sel::TRANSACTIONS_LINK => Self::switch(&mut state, Screen::Transactions),
            s if s == sel::NEW_TRANSACTION_LINK => Self::switch(&mut state, Screen::NewTransaction),
            s if s == sel::SKIP_FRAUD_CHECK => {
                if !self.behavior.checkbox_click_ignored && !state.checked.remove(s) {
                    state.checked.insert(s.to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> AppResult<()> {
        self.log(format!("type {} {}", selector, text));
        self.require(selector)?;
        let mut state = self.state.lock().unwrap();
        let mut typed = text.to_string();
        if selector == sel::CARD_NUMBER && !state.card_typed {
            state.card_typed = true;
            if let Some(keep) = self.behavior.card_truncate_to {
                typed = typed.chars().take(keep).collect();
            }
        }
        state
            .values
            .entry(selector.to_string())
            .or_default()
            .push_str(&typed);
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> AppResult<()> {
        self.log(format!("set {} {}", selector, value));
        self.require(selector)?;
        self.state
            .lock()
            .unwrap()
            .values
            .insert(selector.to_string(), value.to_string());
        Ok(())
    }

    async fn is_checked(&self, selector: &str) -> AppResult<bool> {
        self.log(format!("is_checked {}", selector));
        self.require(selector)?;
        Ok(self.checked(selector))
    }

    async fn force_checked(&self, selector: &str, checked: bool) -> AppResult<()> {
        self.log(format!("force_checked {} {}", selector, checked));
        self.require(selector)?;
        let mut state = self.state.lock().unwrap();
        if checked {
            state.checked.insert(selector.to_string());
        } else {
            state.checked.remove(selector);
        }
        Ok(())
    }

    async fn install_submit_guard(&self, form_selector: &str) -> AppResult<()> {
        self.log(format!("guard {}", form_selector));
        self.require(form_selector)?;
        self.state.lock().unwrap().guard_installed = true;
        Ok(())
    }

    async fn release_submit_guard(&self, form_selector: &str) -> AppResult<()> {
        self.log(format!("release_guard {}", form_selector));
        self.require(form_selector)?;
        self.state.lock().unwrap().guard_installed = false;
        Ok(())
    }

    async fn submit_form(&self, form_selector: &str, _button_selector: &str) -> AppResult<()> {
        self.log(format!("submit {}", form_selector));
        self.require(form_selector)?;
        let mut state = self.state.lock().unwrap();
        let mut submitted = state.values.clone();
        if state.checked.contains(sel::SKIP_FRAUD_CHECK) {
            submitted.insert(sel::SKIP_FRAUD_CHECK.to_string(), "on".to_string());
        }
        state.submissions.push(submitted);
        if self.behavior.submit_reaches_result {
            Self::switch(&mut state, Screen::Result);
        }
        Ok(())
    }

    async fn navigate(&self, url: &str) -> AppResult<()> {
        self.log(format!("navigate {}", url));
        let mut state = self.state.lock().unwrap();
        let screen = if self.behavior.logged_in {
            Screen::Dashboard
        } else {
            Screen::Login
        };
        Self::switch(&mut state, screen);
        Ok(())
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> AppResult<()> {
        // 单页应用：提交后不会发生整页跳转
        tokio::time::sleep(timeout).await;
        Err(AutomationError::timeout("navigation", timeout))
    }
}

// ========== 样例数据 ==========

pub const HEADERS: [&str; 9] = [
    "MAIDS",
    "Amount",
    "Reservation ID",
    "Guest Name",
    "Card First 4",
    "Card Last 12",
    "Expiry",
    "CVV",
    "Status",
];

pub fn sample_row(order_id: &str, cvv: &str, status: &str) -> Vec<String> {
    [
        "M-1001",
        "125.00",
        order_id,
        "Ada Lovelace",
        "4111",
        "1111-1111-1111",
        "12/2030",
        cvv,
        status,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn sample_record(order_id: &str) -> terminal_autofill::Record {
    let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    terminal_autofill::Record::from_row(0, &headers, &sample_row(order_id, "123", ""))
}
