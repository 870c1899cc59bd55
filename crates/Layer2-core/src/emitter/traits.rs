//! EventEmitter - 합성 인터페이스
//!
//! 어떤 타입이든 `Emitter`를 필드로 두고 `emitter()`만 구현하면
//! `on` / `off` / `once` / `emit`을 얻습니다.

use super::dispatch::{self, Emission};
use super::store::ListenerStore;
use super::table::EmitterType;
use lineage_foundation::Listener;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

// ============================================================================
// Emitter - 인스턴스 상태
// ============================================================================

/// 인스턴스별 emitter 코어
///
/// 인스턴스 리스너 저장소와 타입 descriptor를 묶습니다.
pub struct Emitter {
    id: Uuid,
    ty: Arc<EmitterType>,
    store: ListenerStore,
}

impl Emitter {
    pub fn new(ty: Arc<EmitterType>) -> Self {
        let id = Uuid::new_v4();
        debug!(emitter_id = %id, type_name = ty.name(), "Created emitter");

        Self {
            id,
            ty,
            store: ListenerStore::new(),
        }
    }

    /// 로그 상관관계용 ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn emitter_type(&self) -> &Arc<EmitterType> {
        &self.ty
    }

    pub fn store(&self) -> &ListenerStore {
        &self.store
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("id", &self.id)
            .field("type", &self.ty.name())
            .field("store", &self.store)
            .finish()
    }
}

// ============================================================================
// EventEmitter trait
// ============================================================================

/// 이벤트 emitter capability
///
/// ```ignore
/// struct Person {
///     emitter: Emitter,
///     name: String,
/// }
///
/// impl EventEmitter for Person {
///     fn emitter(&self) -> &Emitter {
///         &self.emitter
///     }
/// }
///
/// let person = Person { emitter: Emitter::new(person_type()), name: "ada".into() };
/// let listener = person.on("event", Listener::new(|ctx, args| {
///     let me = ctx.receiver::<Person>().unwrap();
///     println!("{} got {:?}", me.name, args);
///     Ok(Value::Null)
/// }));
/// person.emit("event", &[json!(123)]).await?;
/// person.off("event", Some(&listener));
/// ```
pub trait EventEmitter: Any + Send + Sync {
    /// 내장된 emitter 코어
    fn emitter(&self) -> &Emitter;

    /// 리스너 등록. 해제할 때 쓸 같은 핸들을 돌려줌
    fn on(&self, event: &str, listener: Listener) -> Listener {
        self.emitter().store().register(event, listener)
    }

    /// 한 번만 실행되는 리스너 등록. 반환값은 해제용 래퍼 핸들
    fn once(&self, event: &str, listener: Listener) -> Listener {
        self.emitter().store().register_once(event, listener)
    }

    /// 리스너 해제 (`None`이면 이벤트의 모든 리스너)
    fn off(&self, event: &str, listener: Option<&Listener>) {
        self.emitter().store().unregister(event, listener);
    }

    /// 이벤트 발생
    ///
    /// 리스너는 이 호출 안에서 모두 시작되고, 반환된 `Emission`은 전체 완료를 나타냅니다.
    fn emit(&self, event: &str, args: &[Value]) -> Emission
    where
        Self: Sized,
    {
        let emitter = self.emitter();
        dispatch::dispatch(
            self,
            emitter.id(),
            emitter.store(),
            emitter.emitter_type(),
            event,
            args,
        )
    }

    /// 인스턴스에 살아 있는 리스너 수
    fn listener_count(&self, event: &str) -> usize {
        self.emitter().store().listener_count(event)
    }

    /// 인스턴스에 등록된 적 있는 이벤트 이름
    fn event_names(&self) -> Vec<String> {
        self.emitter().store().event_names()
    }
}

impl EventEmitter for Emitter {
    fn emitter(&self) -> &Emitter {
        self
    }
}
