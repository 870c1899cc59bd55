//! Config - emitter 설정
//!
//! - `emitter.rs` - EmitterConfig, FailurePolicy

mod emitter;

pub use emitter::{EmitterConfig, FailurePolicy, RESERVED_MEMBERS};
