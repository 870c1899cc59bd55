//! Instance Listener Store - 인스턴스별 리스너 저장소
//!
//! 해제는 슬롯을 비우기만 하고 시퀀스를 줄이지 않습니다 (tombstone).
//! 진행 중인 디스패치는 시작 시점의 길이까지만 돌고, 슬롯의 비어 있음은 호출 직전에 읽습니다.

use lineage_foundation::{Listener, Outcome};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

type Slots = HashMap<String, Vec<Option<Listener>>>;

/// 인스턴스 리스너 저장소
///
/// 소유 객체 전용입니다. 락은 리스너 호출 중에 잡혀 있지 않으므로
/// 리스너 안에서 `register`/`unregister`를 다시 불러도 됩니다.
#[derive(Default)]
pub struct ListenerStore {
    slots: Arc<RwLock<Slots>>,
}

impl ListenerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 리스너 등록
    ///
    /// 이름의 시퀀스가 없으면 만들고 끝에 추가합니다. 같은 핸들을 두 번 넣으면 두 슬롯이 됩니다.
    pub fn register(&self, name: &str, listener: Listener) -> Listener {
        let mut slots = self.slots.write();
        let sequence = slots.entry(name.to_string()).or_default();
        sequence.push(Some(listener.clone()));

        debug!(
            event = name,
            slot = sequence.len() - 1,
            label = listener.label().unwrap_or("-"),
            "Registered listener"
        );

        listener
    }

    /// 한 번만 실행되는 리스너 등록
    ///
    /// 반환되는 핸들은 래퍼입니다. 실행 전에 해제하려면 이 핸들을 `unregister`에 넘깁니다.
    pub fn register_once(&self, name: &str, listener: Listener) -> Listener {
        let store: Weak<RwLock<Slots>> = Arc::downgrade(&self.slots);
        let fired = AtomicBool::new(false);
        let label = listener.label().map(Arc::<str>::from);

        let wrapper = Listener::from_fn(move |ctx, args| {
            if fired.swap(true, Ordering::SeqCst) {
                return Outcome::ready(Value::Null);
            }
            if let Some(slots) = store.upgrade() {
                clear(&mut slots.write(), ctx.event(), Some(ctx.listener()));
            }
            listener.call(ctx, args)
        });
        let wrapper = match label {
            Some(label) => wrapper.labeled(label),
            None => wrapper,
        };

        self.register(name, wrapper)
    }

    /// 리스너 해제
    ///
    /// `listener`가 없으면 이름의 모든 슬롯을, 있으면 identity가 같은 첫 슬롯만 비웁니다.
    /// 모르는 이름이나 리스너는 no-op입니다. 실제로 비운 슬롯이 있으면 true.
    pub fn unregister(&self, name: &str, listener: Option<&Listener>) -> bool {
        let removed = clear(&mut self.slots.write(), name, listener);

        if removed {
            debug!(event = name, all = listener.is_none(), "Unregistered listener");
        }

        removed
    }

    /// 이름이 이 인스턴스에 한 번이라도 등록됐는지
    pub fn knows(&self, name: &str) -> bool {
        self.slots.read().contains_key(name)
    }

    /// 시퀀스 길이 (tombstone 포함). 모르는 이름이면 None
    pub fn len_of(&self, name: &str) -> Option<usize> {
        self.slots.read().get(name).map(Vec::len)
    }

    /// 현재 슬롯 내용. 비었거나 범위 밖이면 None
    pub fn slot(&self, name: &str, index: usize) -> Option<Listener> {
        self.slots
            .read()
            .get(name)
            .and_then(|sequence| sequence.get(index))
            .and_then(|slot| slot.clone())
    }

    /// 살아 있는 리스너 수
    pub fn listener_count(&self, name: &str) -> usize {
        self.slots
            .read()
            .get(name)
            .map(|sequence| sequence.iter().filter(|slot| slot.is_some()).count())
            .unwrap_or(0)
    }

    /// 등록된 적 있는 이벤트 이름 (정렬됨)
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ListenerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.read();
        let mut map = f.debug_map();
        for (name, sequence) in slots.iter() {
            map.entry(name, &sequence.len());
        }
        map.finish()
    }
}

fn clear(slots: &mut Slots, name: &str, listener: Option<&Listener>) -> bool {
    let Some(sequence) = slots.get_mut(name) else {
        return false;
    };

    match listener {
        None => {
            let mut removed = false;
            for slot in sequence.iter_mut() {
                removed |= slot.take().is_some();
            }
            removed
        }
        Some(target) => {
            let found = sequence
                .iter_mut()
                .find(|slot| slot.as_ref().is_some_and(|l| l.same(target)));
            match found {
                Some(slot) => {
                    *slot = None;
                    true
                }
                None => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener {
        Listener::new(|_, _| Ok(Value::Null))
    }

    #[test]
    fn test_register_returns_same_handle() {
        let store = ListenerStore::new();
        let listener = noop();
        let returned = store.register("event", listener.clone());

        assert_eq!(returned, listener);
        assert_eq!(store.len_of("event"), Some(1));
        assert_eq!(store.listener_count("event"), 1);
        assert!(store.knows("event"));
        assert!(!store.knows("other"));
    }

    #[test]
    fn test_unregister_tombstones() {
        let store = ListenerStore::new();
        let a = store.register("event", noop());
        let b = store.register("event", noop());

        assert!(store.unregister("event", Some(&a)));
        assert_eq!(store.len_of("event"), Some(2));
        assert!(store.slot("event", 0).is_none());
        assert_eq!(store.slot("event", 1), Some(b));

        // 두 번째 해제는 no-op
        assert!(!store.unregister("event", Some(&a)));
        assert_eq!(store.listener_count("event"), 1);
    }

    #[test]
    fn test_unregister_all() {
        let store = ListenerStore::new();
        store.register("event", noop());
        store.register("event", noop());

        assert!(store.unregister("event", None));
        assert_eq!(store.len_of("event"), Some(2));
        assert_eq!(store.listener_count("event"), 0);
        // 이름 자체는 계속 알려져 있음
        assert!(store.knows("event"));
    }

    #[test]
    fn test_duplicate_registration_first_occurrence() {
        let store = ListenerStore::new();
        let listener = noop();
        store.register("event", listener.clone());
        store.register("event", listener.clone());

        assert!(store.unregister("event", Some(&listener)));
        assert!(store.slot("event", 0).is_none());
        assert_eq!(store.slot("event", 1), Some(listener.clone()));

        assert!(store.unregister("event", Some(&listener)));
        assert_eq!(store.listener_count("event"), 0);
    }

    #[test]
    fn test_unknown_name_is_noop() {
        let store = ListenerStore::new();
        assert!(!store.unregister("missing", None));
        assert!(!store.unregister("missing", Some(&noop())));
        assert!(store.len_of("missing").is_none());
        assert!(store.event_names().is_empty());
    }

    #[test]
    fn test_event_names_sorted() {
        let store = ListenerStore::new();
        store.register("zeta", noop());
        store.register("alpha", noop());
        assert_eq!(store.event_names(), vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
