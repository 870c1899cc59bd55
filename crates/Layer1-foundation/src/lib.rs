//! # lineage-foundation
//!
//! Foundation layer for lineage:
//! - Error: 에러 타입 (Config, Listener 실패 등)
//! - Config: EmitterConfig, FailurePolicy
//! - Event: Listener, Outcome, EventContext, EventHandler
//!
//! 디스패치 엔진은 `lineage-core`에 있습니다.

pub mod config;
pub mod error;
pub mod event;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{EmitterConfig, FailurePolicy, RESERVED_MEMBERS};

// ============================================================================
// Event (리스너 타입)
// ============================================================================
pub use event::{Event, EventContext, EventHandler, Level, Listener, Outcome};
