//! Event - 리스너 타입
//!
//! emitter 코어(Layer2)가 호출하는 리스너와 그 컨텍스트를 정의합니다.
//!
//! ## 사용법
//!
//! ```ignore
//! use lineage_foundation::event::{Listener, Outcome};
//! use serde_json::Value;
//!
//! // 동기 리스너
//! let sync = Listener::new(|ctx, args| {
//!     println!("{} fired with {:?}", ctx.event(), args);
//!     Ok(Value::Null)
//! });
//!
//! // 비동기 리스너
//! let later = Listener::new_async(|_ctx, _args| async {
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     Ok(Value::Null)
//! });
//! ```

pub mod types;

pub use types::{Event, EventContext, EventHandler, Level, Listener, Outcome};
