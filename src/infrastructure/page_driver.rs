//! 页面自动化能力 - 基础设施层
//!
//! `PageDriver` 是核心流程与远端页面之间唯一的接缝：查询条件、读文本、
//! 点击、输入、导航。核心流程不直接操作 DOM。

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppResult, AutomationError};
use crate::infrastructure::JsExecutor;
use crate::models::Condition;

/// 页面自动化能力
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 条件当前是否成立（立即返回，不等待）
    async fn exists(&self, condition: &Condition) -> AppResult<bool>;

    /// 条件对应节点的文本
    async fn text_of(&self, condition: &Condition) -> AppResult<String>;

    /// 输入框当前的值
    async fn value_of(&self, selector: &str) -> AppResult<String>;

    async fn click(&self, selector: &str) -> AppResult<()>;

    /// 逐键输入（会触发页面的输入掩码逻辑）
    async fn type_text(&self, selector: &str, text: &str) -> AppResult<()>;

    /// 直接设置值并触发 input / change 事件
    async fn set_value(&self, selector: &str, value: &str) -> AppResult<()>;

    async fn is_checked(&self, selector: &str) -> AppResult<bool>;

    /// 强制设置勾选状态并触发 change 事件
    async fn force_checked(&self, selector: &str, checked: bool) -> AppResult<()>;

    /// 拦截回车和隐式提交，直到 `submit_form` 被调用
    async fn install_submit_guard(&self, form_selector: &str) -> AppResult<()>;

    /// 解除拦截，之后回车和人工点击提交都照常生效
    async fn release_submit_guard(&self, form_selector: &str) -> AppResult<()>;

    /// 解除拦截并提交表单：支持 requestSubmit 时调用之，否则点击提交按钮
    async fn submit_form(&self, form_selector: &str, button_selector: &str) -> AppResult<()>;

    async fn navigate(&self, url: &str) -> AppResult<()>;

    async fn wait_for_navigation(&self, timeout: Duration) -> AppResult<()>;
}

/// 基于 chromiumoxide 的实现
pub struct ChromePage {
    executor: JsExecutor,
}

impl ChromePage {
    pub fn new(executor: JsExecutor) -> Self {
        Self { executor }
    }

    async fn find(&self, selector: &str) -> AppResult<chromiumoxide::element::Element> {
        self.executor
            .page()
            .find_element(selector)
            .await
            .map_err(|_| AutomationError::not_found(selector))
    }
}

fn js_str(value: &str) -> String {
    // serde_json 生成的字符串字面量可以直接嵌入 JS
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn exists(&self, condition: &Condition) -> AppResult<bool> {
        let js_code = match condition {
            Condition::Selector(css) => {
                format!("document.querySelector({}) !== null", js_str(css))
            }
            Condition::TextContains(text) => format!(
                "((document.body && document.body.innerText) || '').includes({})",
                js_str(text)
            ),
        };
        self.executor.eval_as::<bool>(js_code).await
    }

    async fn text_of(&self, condition: &Condition) -> AppResult<String> {
        match condition {
            Condition::Selector(css) => {
                let js_code = format!(
                    r#"
                    (() => {{
                        const el = document.querySelector({});
                        if (!el) return null;
                        return (el.innerText || el.textContent || '').trim();
                    }})()
                    "#,
                    js_str(css)
                );
                let text: Option<String> = self.executor.eval_as(js_code).await?;
                text.ok_or_else(|| AutomationError::not_found(css.as_str()))
            }
            Condition::TextContains(text) => {
                if self.exists(condition).await? {
                    Ok(text.clone())
                } else {
                    Err(AutomationError::not_found(condition.to_string()))
                }
            }
        }
    }

    async fn value_of(&self, selector: &str) -> AppResult<String> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                return el ? String(el.value ?? '') : null;
            }})()
            "#,
            js_str(selector)
        );
        let value: Option<String> = self.executor.eval_as(js_code).await?;
        value.ok_or_else(|| AutomationError::not_found(selector))
    }

    async fn click(&self, selector: &str) -> AppResult<()> {
        let element = self.find(selector).await?;
        element.click().await?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> AppResult<()> {
        let element = self.find(selector).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn set_value(&self, selector: &str, value: &str) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return false;
                const proto = el instanceof HTMLTextAreaElement
                    ? HTMLTextAreaElement.prototype
                    : el instanceof HTMLSelectElement
                        ? HTMLSelectElement.prototype
                        : HTMLInputElement.prototype;
                const setter = Object.getOwnPropertyDescriptor(proto, 'value').set;
                setter.call(el, {});
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            js_str(selector),
            js_str(value)
        );
        if self.executor.eval_as::<bool>(js_code).await? {
            Ok(())
        } else {
            Err(AutomationError::not_found(selector))
        }
    }

    async fn is_checked(&self, selector: &str) -> AppResult<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                return el ? !!el.checked : null;
            }})()
            "#,
            js_str(selector)
        );
        let checked: Option<bool> = self.executor.eval_as(js_code).await?;
        checked.ok_or_else(|| AutomationError::not_found(selector))
    }

    async fn force_checked(&self, selector: &str, checked: bool) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return false;
                el.checked = {};
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            js_str(selector),
            checked
        );
        if self.executor.eval_as::<bool>(js_code).await? {
            Ok(())
        } else {
            Err(AutomationError::not_found(selector))
        }
    }

    async fn install_submit_guard(&self, form_selector: &str) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const form = document.querySelector({});
                if (!form) return false;
                window.__autofillAllowSubmit = false;
                if (form.__autofillGuard) return true;
                form.__autofillGuard = true;
                form.addEventListener('keydown', (e) => {{
                    if (e.key === 'Enter' && e.target.tagName !== 'TEXTAREA' && !window.__autofillAllowSubmit) {{
                        e.preventDefault();
                        e.stopPropagation();
                    }}
                }}, true);
                form.addEventListener('submit', (e) => {{
                    if (!window.__autofillAllowSubmit) {{
                        e.preventDefault();
                        e.stopImmediatePropagation();
                    }}
                }}, true);
                return true;
            }})()
            "#,
            js_str(form_selector)
        );
        if self.executor.eval_as::<bool>(js_code).await? {
            Ok(())
        } else {
            Err(AutomationError::not_found(form_selector))
        }
    }

    async fn release_submit_guard(&self, form_selector: &str) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                window.__autofillAllowSubmit = true;
                return document.querySelector({}) !== null;
            }})()
            "#,
            js_str(form_selector)
        );
        if self.executor.eval_as::<bool>(js_code).await? {
            Ok(())
        } else {
            Err(AutomationError::not_found(form_selector))
        }
    }

    async fn submit_form(&self, form_selector: &str, button_selector: &str) -> AppResult<()> {
        let js_code = format!(
            r#"
            (() => {{
                const form = document.querySelector({});
                const button = document.querySelector({});
                window.__autofillAllowSubmit = true;
                if (form && typeof form.requestSubmit === 'function') {{
                    button ? form.requestSubmit(button) : form.requestSubmit();
                    return 'requestSubmit';
                }}
                if (button) {{
                    button.click();
                    return 'click';
                }}
                return null;
            }})()
            "#,
            js_str(form_selector),
            js_str(button_selector)
        );
        let how: Option<String> = self.executor.eval_as(js_code).await?;
        match how {
            Some(how) => {
                debug!("表单提交方式: {}", how);
                Ok(())
            }
            None => Err(AutomationError::not_found(button_selector)),
        }
    }

    async fn navigate(&self, url: &str) -> AppResult<()> {
        self.executor.page().goto(url).await?;
        Ok(())
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> AppResult<()> {
        match tokio::time::timeout(timeout, self.executor.page().wait_for_navigation()).await {
            Ok(result) => {
                result?;
                Ok(())
            }
            Err(_) => Err(AutomationError::timeout("navigation", timeout)),
        }
    }
}
