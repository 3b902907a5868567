//! Analysis lifecycle
//!
//! Submission, periodic polling and the snapshots observers render from

pub mod poller;
pub mod session;
pub mod timer;

pub use poller::AnalysisPoller;
pub use session::{AnalysisSession, FailureKind, PollSnapshot, SessionPhase};
pub use timer::{CadenceTimer, TickControl, TickHandler, TimerLedger};
