pub mod policy;
pub mod row_ctx;
pub mod row_flow;

pub use policy::{policy_for, run_required, run_step, Policy, Step};
pub use row_ctx::RowCtx;
pub use row_flow::{RowFlow, RowOutcome, RowState};
