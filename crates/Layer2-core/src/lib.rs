//! lineage-core: Core Runtime for lineage
//!
//! Layer2 - 리스너 등록과 디스패치
//!
//! # 주요 모듈
//!
//! - `emitter`: 인스턴스 리스너 저장소, 타입 리스너 테이블, 디스패치 엔진
//!
//! # 사용 예시
//!
//! ```ignore
//! use lineage_core::{Emitter, EmitterType, EventEmitter, Listener};
//!
//! let human = EmitterType::builder("Human")
//!     .on("event", Listener::new(|_, _| Ok(Value::Null)))
//!     .build()?;
//! let person = EmitterType::builder("Person").extends(&human).build()?;
//!
//! let emitter = Emitter::new(person);
//! emitter.on("event", Listener::new(|_, args| Ok(args[0].clone())));
//!
//! // 인스턴스 → Person → Human 순서
//! let values = emitter.emit("event", &[json!(123)]).await?;
//! ```

// Core modules
pub mod emitter;

// Re-exports: Emitter
pub use emitter::{Emission, Emitter, EmitterType, EventEmitter, ListenerStore, TypeBuilder};

// Re-exports: Foundation
pub use lineage_foundation::{
    EmitterConfig, Error, Event, EventContext, EventHandler, FailurePolicy, Level, Listener,
    Outcome, Result,
};
