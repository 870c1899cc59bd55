//! Event Types - 리스너와 호출 컨텍스트
//!
//! 리스너는 identity로만 비교됩니다. 같은 동작을 감싼 두 리스너도 서로 다릅니다.

use crate::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

// ============================================================================
// Outcome - 리스너 호출 결과
// ============================================================================

/// 리스너 한 번의 호출 결과
///
/// 이미 끝난 값이거나 아직 진행 중인 비동기 계산입니다.
pub enum Outcome {
    /// 동기 결과
    Ready(Result<Value>),
    /// 비동기 결과
    Pending(BoxFuture<'static, Result<Value>>),
}

impl Outcome {
    /// 성공한 동기 결과
    pub fn ready(value: Value) -> Self {
        Outcome::Ready(Ok(value))
    }

    /// 비동기 결과
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = Result<Value>> + Send + 'static,
    {
        Outcome::Pending(Box::pin(future))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }
}

impl From<Result<Value>> for Outcome {
    fn from(result: Result<Value>) -> Self {
        Outcome::Ready(result)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Outcome::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

// ============================================================================
// Level / EventContext
// ============================================================================

/// 리스너가 등록된 hierarchy 레벨
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level<'a> {
    /// 인스턴스에 동적으로 등록된 리스너
    Instance,
    /// 타입 선언에 정적으로 등록된 리스너 (타입 이름)
    Type(&'a str),
}

impl fmt::Display for Level<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Instance => write!(f, "instance"),
            Level::Type(name) => write!(f, "type:{}", name),
        }
    }
}

/// 리스너 호출 컨텍스트
///
/// 어느 레벨에서 온 리스너든 receiver는 항상 emit을 호출한 원래 객체입니다.
pub struct EventContext<'a> {
    receiver: &'a dyn Any,
    event: &'a str,
    level: Level<'a>,
    listener: &'a Listener,
}

impl<'a> EventContext<'a> {
    pub fn new(
        receiver: &'a dyn Any,
        event: &'a str,
        level: Level<'a>,
        listener: &'a Listener,
    ) -> Self {
        Self {
            receiver,
            event,
            level,
            listener,
        }
    }

    /// receiver를 구체 타입으로 downcast
    pub fn receiver<T: Any>(&self) -> Option<&'a T> {
        self.receiver.downcast_ref::<T>()
    }

    /// 이벤트 이름
    pub fn event(&self) -> &'a str {
        self.event
    }

    /// 현재 호출 중인 레벨
    pub fn level(&self) -> Level<'a> {
        self.level
    }

    /// 현재 호출 중인 리스너 (자기 자신 해제용)
    pub fn listener(&self) -> &'a Listener {
        self.listener
    }
}

// ============================================================================
// Event / EventHandler
// ============================================================================

/// 소유된 이벤트 (핸들러 전달용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// 이벤트 이름
    pub name: String,
    /// 호출 인자
    pub args: Vec<Value>,
}

impl Event {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// n번째 인자
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

/// 구조체형 리스너 trait
///
/// `Listener::handler`로 감싸서 등록합니다. 호출은 항상 pending 결과가 됩니다.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 핸들러 이름 (디버깅용)
    fn name(&self) -> &str;

    /// 이벤트 처리
    async fn handle(&self, event: &Event) -> Result<Value>;
}

// ============================================================================
// Listener
// ============================================================================

type ListenerFn = dyn Fn(&EventContext<'_>, &[Value]) -> Outcome + Send + Sync;

/// 이벤트 리스너
///
/// clone은 같은 identity를 공유합니다. `on`이 돌려준 핸들을 `off`에 그대로 넘기면 됩니다.
#[derive(Clone)]
pub struct Listener {
    func: Arc<ListenerFn>,
    label: Option<Arc<str>>,
}

impl Listener {
    /// 동기 리스너
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&EventContext<'_>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self::from_fn(move |ctx, args| Outcome::Ready(f(ctx, args)))
    }

    /// 비동기 리스너
    ///
    /// future는 컨텍스트를 빌릴 수 없으므로 필요한 값은 미리 꺼내 둡니다.
    pub fn new_async<F, Fut>(f: F) -> Self
    where
        F: Fn(&EventContext<'_>, &[Value]) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self::from_fn(move |ctx, args| Outcome::pending(f(ctx, args)))
    }

    /// Outcome을 직접 돌려주는 리스너
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&EventContext<'_>, &[Value]) -> Outcome + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(f),
            label: None,
        }
    }

    /// EventHandler를 리스너로 변환
    pub fn handler<H>(handler: Arc<H>) -> Self
    where
        H: EventHandler + 'static,
    {
        let label: Arc<str> = Arc::from(handler.name());
        let listener = Self::from_fn(move |ctx, args| {
            let handler = handler.clone();
            let event = Event::new(ctx.event(), args.to_vec());
            Outcome::pending(async move { handler.handle(&event).await })
        });
        listener.labeled(label)
    }

    /// 디버깅용 이름 부여 (identity는 유지)
    pub fn labeled(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// 리스너 호출
    pub fn call(&self, ctx: &EventContext<'_>, args: &[Value]) -> Outcome {
        (self.func)(ctx, args)
    }

    /// identity 비교
    pub fn same(&self, other: &Listener) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func) as *const (),
            Arc::as_ptr(&other.func) as *const (),
        )
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("label", &self.label)
            .field("ptr", &(Arc::as_ptr(&self.func) as *const ()))
            .finish()
    }
}
