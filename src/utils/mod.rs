pub mod logging;

pub use logging::{mask_card, truncate_text};
