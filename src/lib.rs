//! # Terminal Autofill
//!
//! 逐条读取 CSV 记录，在远端虚拟终端中填写并提交交易，把结果写回记录文件。
//! 账号密码和验证码由操作员手动输入，其余步骤自动完成。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 条件查询 / 点击 / 输入 / 导航的唯一接缝
//!
//! ### ② 业务能力层（Services）
//! - `StageDetector` - 多阶段竞速检测
//! - `FormSequencer` - 按固定顺序填写表单
//! - `ResultPoller` - 轮询结果文本
//! - `SessionGate` - 等待操作员完成登录 / 验证码
//!
//! ### ③ 流程层（Workflow）
//! - `RowFlow` - 单条记录的状态机
//! - `policy` - 每个步骤的错误处理策略表
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/row_processor` - 按顺序遍历记录，失败即中止
//! - `orchestrator/batch_processor` - 应用入口，管理浏览器资源
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, RunMode, Timeouts};
pub use error::{AppResult, AutomationError};
pub use infrastructure::{ChromePage, JsExecutor, PageDriver};
pub use models::{Brand, Condition, Field, Record, Stage};
pub use orchestrator::{App, RowProcessor, RunSummary};
pub use store::{CsvRecordStore, MemoryRecordStore, RecordStore};
pub use workflow::{RowCtx, RowFlow, RowOutcome};
