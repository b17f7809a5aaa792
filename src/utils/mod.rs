//! Utility modules
//!
//! Small helpers shared by the clients and the guardrail dispatcher.

pub mod cancel;

pub use cancel::{CancelHandle, new_cancel_handle, run_cancellable};
