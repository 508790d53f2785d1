//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用入口
//! - 管理应用生命周期（初始化、运行、统计）
//! - 唯一持有 Browser 的模块
//!
//! ### `row_processor` - 记录处理器
//! - 按文件顺序遍历记录
//! - 按需建立登录会话
//! - 单条失败即中止整次运行
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (App)
//!     ↓
//! row_processor (处理 Vec<Record>)
//!     ↓
//! workflow::RowFlow (处理单个 Record)
//!     ↓
//! services (能力层：阶段检测 / 表单 / 结果 / 导航 / 会话)
//!     ↓
//! infrastructure (基础设施：PageDriver)
//! ```

pub mod batch_processor;
pub mod row_processor;

pub use batch_processor::App;
pub use row_processor::{RowProcessor, RunSummary};
