pub mod form_sequencer;
pub mod navigator;
pub mod result_poller;
pub mod session;
pub mod stage_detector;

pub use form_sequencer::FormSequencer;
pub use result_poller::ResultPoller;
pub use session::SessionGate;
pub use stage_detector::StageDetector;
