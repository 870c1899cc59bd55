//! Emitter - 계층형 이벤트 emitter
//!
//! 인스턴스 리스너와 타입 hierarchy 각 레벨의 정적 리스너를 하나의 디스패치로 합칩니다.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  person.emit("event", args)                                  │
//! │         │                                                    │
//! │         ▼                                                    │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐      │
//! │  │  Instance    │ → │  Person      │ → │  Human       │ → …  │
//! │  │  (store)     │   │  (table)     │   │  (table)     │      │
//! │  └──────────────┘   └──────────────┘   └──────────────┘      │
//! │         │                  │                  │              │
//! │         └──────────────────┴──────────────────┘              │
//! │                            ▼                                 │
//! │                 Emission (try_join_all)                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - `store.rs` - 인스턴스 리스너 저장소 (tombstone 해제)
//! - `table.rs` - 타입 descriptor와 정적 선언 빌더
//! - `dispatch.rs` - hierarchy walk와 aggregate completion
//! - `traits.rs` - EventEmitter 합성 인터페이스

mod dispatch;
mod store;
mod table;
mod traits;

pub use dispatch::Emission;
pub use store::ListenerStore;
pub use table::{EmitterType, TypeBuilder};
pub use traits::{Emitter, EventEmitter};
