pub mod brand;
pub mod record;
pub mod selectors;
pub mod stage;

pub use brand::{BillingAddress, BillingIdentity, Brand};
pub use record::{digits_only, Field, Record, STATUS_COLUMN};
pub use stage::{stages, Condition, Stage};
