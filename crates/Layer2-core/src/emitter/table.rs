//! Type Listener Table - 타입 선언에 붙는 정적 리스너
//!
//! `TypeBuilder`로 선언하고 `build` 이후에는 변경되지 않습니다.
//! 상위 타입 목록(lineage)은 build 시점에 한 번 계산됩니다.

use lineage_foundation::{EmitterConfig, Error, Listener, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// EmitterType
// ============================================================================

/// emitter 타입 descriptor
///
/// 같은 타입의 모든 인스턴스가 공유합니다.
pub struct EmitterType {
    name: String,
    /// 상위 타입들, 가까운 순서 (parent, grandparent, ..., root)
    ancestors: Vec<Arc<EmitterType>>,
    /// 이벤트 이름별 선언 순서 리스너
    listeners: HashMap<String, Vec<Listener>>,
    /// 자신과 상위 타입에서 선언된 이벤트 이름
    known: HashSet<String>,
    config: EmitterConfig,
}

impl EmitterType {
    /// 타입 선언 시작
    pub fn builder(name: impl Into<String>) -> TypeBuilder {
        TypeBuilder::new(name)
    }

    /// 정적 리스너가 없는 루트 타입
    pub fn plain(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            ancestors: Vec::new(),
            listeners: HashMap::new(),
            known: HashSet::new(),
            config: EmitterConfig::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<EmitterType>> {
        self.ancestors.first()
    }

    /// 상위 타입들 (가까운 순서)
    pub fn ancestors(&self) -> &[Arc<EmitterType>] {
        &self.ancestors
    }

    /// 자신부터 루트까지의 hierarchy chain
    pub fn lineage(&self) -> impl Iterator<Item = &EmitterType> {
        std::iter::once(self).chain(self.ancestors.iter().map(Arc::as_ref))
    }

    /// 이 타입에 직접 선언된 리스너
    pub fn declared_listeners(&self, event: &str) -> &[Listener] {
        self.listeners
            .get(event)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 이 타입 또는 상위 타입이 이벤트 이름을 선언했는지
    pub fn knows(&self, event: &str) -> bool {
        self.known.contains(event)
    }

    /// `other`가 자신이거나 상위 타입인지
    pub fn is_a(&self, other: &EmitterType) -> bool {
        self.lineage().any(|ty| std::ptr::eq(ty, other))
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }
}

impl std::fmt::Debug for EmitterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterType")
            .field("name", &self.name)
            .field(
                "ancestors",
                &self.ancestors.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("events", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ============================================================================
// TypeBuilder - 정적 선언 인터페이스
// ============================================================================

/// 타입 선언 빌더
///
/// ```ignore
/// let human = EmitterType::builder("Human")
///     .on("event", Listener::new(|_, _| Ok(Value::Null)))
///     .build()?;
///
/// let person = EmitterType::builder("Person")
///     .extends(&human)
///     .member("greet")
///     .build()?;
/// ```
pub struct TypeBuilder {
    name: String,
    parent: Option<Arc<EmitterType>>,
    listeners: HashMap<String, Vec<Listener>>,
    members: Vec<String>,
    config: Option<EmitterConfig>,
}

impl TypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            listeners: HashMap::new(),
            members: Vec::new(),
            config: None,
        }
    }

    /// 상위 타입 지정
    pub fn extends(mut self, parent: &Arc<EmitterType>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// 타입이 이미 가진 일반 멤버 이름 선언
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.push(name.into());
        self
    }

    /// 정적 리스너 선언 (선언 순서대로 실행)
    pub fn on(mut self, event: impl Into<String>, listener: Listener) -> Self {
        self.listeners.entry(event.into()).or_default().push(listener);
        self
    }

    /// 설정 지정 (없으면 상위 타입 설정 상속)
    pub fn config(mut self, config: EmitterConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 타입 확정
    ///
    /// 예약된 capability 이름이 멤버나 이벤트 이름으로 이미 쓰이고 있으면 `Error::Config`.
    pub fn build(self) -> Result<Arc<EmitterType>> {
        let conflict = self
            .members
            .iter()
            .map(String::as_str)
            .chain(self.listeners.keys().map(String::as_str))
            .find(|name| EmitterConfig::is_reserved(name));
        if let Some(name) = conflict {
            return Err(Error::already_defined(&self.name, name));
        }

        let mut ancestors = Vec::new();
        let mut known: HashSet<String> = self.listeners.keys().cloned().collect();
        let mut config = self.config;

        if let Some(parent) = self.parent {
            known.extend(parent.known.iter().cloned());
            config.get_or_insert_with(|| parent.config.clone());
            ancestors.extend(parent.ancestors.iter().cloned());
            ancestors.insert(0, parent);
        }

        debug!(
            type_name = %self.name,
            events = self.listeners.len(),
            depth = ancestors.len(),
            "Declared emitter type"
        );

        Ok(Arc::new(EmitterType {
            name: self.name,
            ancestors,
            listeners: self.listeners,
            known,
            config: config.unwrap_or_default(),
        }))
    }
}
