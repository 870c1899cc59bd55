//! Dispatch Engine - hierarchy를 따라 리스너 호출
//!
//! 순서: 인스턴스 리스너 → 가장 하위 타입 → ... → 루트 타입.
//! 이름을 전혀 모르는 레벨을 만나면 그 위는 볼 필요가 없으므로 거기서 멈춥니다.
//!
//! 모든 리스너는 순서대로 즉시 시작됩니다. pending 결과는 기다리지 않고 다음 리스너로 넘어가며,
//! 전체 완료는 반환되는 `Emission`에서만 기다립니다.

use super::store::ListenerStore;
use super::table::EmitterType;
use futures::future::{self, BoxFuture, FutureExt};
use lineage_foundation::{
    EmitterConfig, Error, EventContext, FailurePolicy, Level, Listener, Outcome, Result,
};
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};
use uuid::Uuid;

// ============================================================================
// Emission - aggregate completion
// ============================================================================

/// emit 한 번의 결과
///
/// 모든 기여가 끝나야 완료되고, 하나라도 실패하면 첫 실패로 끝납니다.
/// 이미 spawn된 나머지 계산은 취소되지 않고 계속 실행됩니다.
/// tokio runtime 밖에서 emit하면 pending 계산은 emission을 poll할 때 진행되며,
/// 이 경우 실패가 있어도 모든 계산을 끝까지 poll합니다.
/// 결과 값은 리스너 시작 순서를 따릅니다.
#[must_use = "emission results are only observed when awaited"]
pub struct Emission {
    event: String,
    invoked: usize,
    inner: BoxFuture<'static, Result<Vec<Value>>>,
}

impl Emission {
    pub fn event(&self) -> &str {
        &self.event
    }

    /// 시작된 리스너 수 (실패 포함)
    pub fn invoked(&self) -> usize {
        self.invoked
    }

    pub fn is_empty(&self) -> bool {
        self.invoked == 0
    }
}

impl Future for Emission {
    type Output = Result<Vec<Value>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl std::fmt::Debug for Emission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emission")
            .field("event", &self.event)
            .field("invoked", &self.invoked)
            .finish()
    }
}

// ============================================================================
// Contribution - 리스너 하나의 기여
// ============================================================================

enum Contribution {
    /// 동기 결과
    Ready(Result<Value>),
    /// runtime에 spawn된 계산
    Spawned(JoinHandle<Result<Value>>),
    /// runtime이 없어 emission이 직접 poll하는 계산 (실패해도 끝까지 poll)
    Deferred(BoxFuture<'static, Result<Value>>),
}

impl Contribution {
    fn into_future(self, event: Arc<str>, emitter_id: Uuid) -> BoxFuture<'static, Result<Value>> {
        match self {
            Contribution::Ready(result) => future::ready(result).boxed(),
            Contribution::Spawned(handle) => async move {
                match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        let error = if e.is_panic() {
                            Error::panicked(&*event, &*e.into_panic())
                        } else {
                            Error::Internal(format!("listener task for {}: {}", event, e))
                        };
                        warn!(
                            emitter_id = %emitter_id,
                            event = %event,
                            error = %error,
                            "Listener task failed"
                        );
                        Err(error)
                    }
                }
            }
            .boxed(),
            Contribution::Deferred(fut) => fut,
        }
    }

    fn is_deferred(&self) -> bool {
        matches!(self, Contribution::Deferred(_))
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// 한 번의 hierarchy walk 상태
struct Dispatcher<'a> {
    receiver: &'a dyn Any,
    emitter_id: Uuid,
    event: &'a str,
    args: &'a [Value],
    config: &'a EmitterConfig,
    contributions: Vec<Contribution>,
}

impl<'a> Dispatcher<'a> {
    /// 리스너 하나 호출. `FailurePolicy::Abort`에서 동기 실패하면 Err
    fn invoke(&mut self, listener: &Listener, level: Level<'_>) -> Result<()> {
        if self.config.debug_mode {
            trace!(
                emitter_id = %self.emitter_id,
                event = self.event,
                at = %level,
                label = listener.label().unwrap_or("-"),
                "Invoking listener"
            );
        }

        let ctx = EventContext::new(self.receiver, self.event, level, listener);
        let outcome = if self.config.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| listener.call(&ctx, self.args)))
                .unwrap_or_else(|payload| Outcome::Ready(Err(Error::panicked(self.event, &*payload))))
        } else {
            listener.call(&ctx, self.args)
        };

        match outcome {
            Outcome::Ready(Ok(value)) => self.contributions.push(Contribution::Ready(Ok(value))),
            Outcome::Ready(Err(e)) => {
                warn!(
                    emitter_id = %self.emitter_id,
                    event = self.event,
                    at = %level,
                    error = %e,
                    "Listener failed"
                );
                match self.config.failure_policy {
                    FailurePolicy::Contain => self.contributions.push(Contribution::Ready(Err(e))),
                    FailurePolicy::Abort => return Err(e),
                }
            }
            Outcome::Pending(fut) => {
                let contribution = self.start(fut);
                self.contributions.push(contribution);
            }
        }

        Ok(())
    }

    /// pending 결과를 시작 (runtime이 있으면 spawn)
    fn start(&self, fut: BoxFuture<'static, Result<Value>>) -> Contribution {
        let event = self.event.to_string();
        let emitter_id = self.emitter_id;

        let fut = if self.config.catch_panics {
            let event = event.clone();
            AssertUnwindSafe(fut)
                .catch_unwind()
                .map(move |result| result.unwrap_or_else(|payload| Err(Error::panicked(event, &*payload))))
                .boxed()
        } else {
            fut
        };

        // 실패 로그는 계산 안에서 남김 (emission이 먼저 끝나도 기록됨)
        let fut = async move {
            let result = fut.await;
            if let Err(e) = &result {
                warn!(
                    emitter_id = %emitter_id,
                    event = %event,
                    error = %e,
                    "Async listener failed"
                );
            }
            result
        }
        .boxed();

        match Handle::try_current() {
            Ok(handle) => Contribution::Spawned(handle.spawn(fut)),
            Err(_) => Contribution::Deferred(fut),
        }
    }

    /// 인스턴스 레벨부터 루트까지 walk
    fn walk(&mut self, store: &ListenerStore, ty: &EmitterType) -> Result<()> {
        if !store.knows(self.event) && !ty.knows(self.event) {
            return Ok(());
        }

        // 시작 시점 길이까지만. 도중에 추가된 리스너는 이번 walk에서 실행되지 않음
        let len = store.len_of(self.event).unwrap_or(0);
        for index in 0..len {
            if let Some(listener) = store.slot(self.event, index) {
                self.invoke(&listener, Level::Instance)?;
            }
        }

        for level in ty.lineage() {
            if !level.knows(self.event) {
                break;
            }
            for listener in level.declared_listeners(self.event) {
                self.invoke(listener, Level::Type(level.name()))?;
            }
        }

        Ok(())
    }

    fn finish(self, aborted: Option<Error>) -> Emission {
        let event: Arc<str> = Arc::from(self.event);
        let invoked = self.contributions.len() + usize::from(aborted.is_some());

        debug!(
            emitter_id = %self.emitter_id,
            event = self.event,
            invoked,
            aborted = aborted.is_some(),
            "Dispatched event"
        );

        let emitter_id = self.emitter_id;
        let deferred = self.contributions.iter().any(Contribution::is_deferred);
        let futures: Vec<_> = self
            .contributions
            .into_iter()
            .map(|c| c.into_future(event.clone(), emitter_id))
            .collect();

        // 이미 spawn된 기여는 detach된 채 계속 실행됨. deferred 기여는 emission만 진행시킬 수 있으므로
        // 첫 실패에서 멈추지 않고 모두 끝까지 poll한 뒤 시작 순서상 첫 실패를 반환
        let inner = match (aborted, deferred) {
            (Some(e), false) => future::ready(Err(e)).boxed(),
            (Some(e), true) => future::join_all(futures).map(move |_| Err(e)).boxed(),
            (None, true) => future::join_all(futures)
                .map(|results| results.into_iter().collect::<Result<Vec<Value>>>())
                .boxed(),
            (None, false) => future::try_join_all(futures).boxed(),
        };

        Emission {
            event: self.event.to_string(),
            invoked,
            inner,
        }
    }
}

/// `receiver`를 컨텍스트로 `event`를 디스패치
pub(crate) fn dispatch(
    receiver: &dyn Any,
    emitter_id: Uuid,
    store: &ListenerStore,
    ty: &EmitterType,
    event: &str,
    args: &[Value],
) -> Emission {
    let mut dispatcher = Dispatcher {
        receiver,
        emitter_id,
        event,
        args,
        config: ty.config(),
        contributions: Vec::new(),
    };

    let aborted = dispatcher.walk(store, ty).err();
    dispatcher.finish(aborted)
}
