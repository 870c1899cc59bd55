//! Emitter Configuration - 디스패치 동작 설정
//!
//! 타입 선언 시점에 붙고, 하위 타입은 override하지 않으면 상위 설정을 상속합니다.

use serde::{Deserialize, Serialize};

/// emitter capability가 차지하는 멤버 이름
///
/// 타입이 이 중 하나를 이미 정의하고 있으면 합성 시 설정 에러입니다.
pub const RESERVED_MEMBERS: &[&str] = &[
    "on",
    "off",
    "once",
    "emit",
    "emitter",
    "listener_count",
    "event_names",
];

/// 동기 리스너 실패 처리 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 실패를 aggregate에 담고 나머지 리스너는 계속 실행
    #[default]
    Contain,
    /// 첫 동기 실패에서 walk 중단 (같은 레벨의 남은 리스너, 상위 레벨 모두 생략)
    Abort,
}

/// Emitter 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// 동기 실패 정책
    pub failure_policy: FailurePolicy,

    /// 디버그 모드 (모든 리스너 호출 로깅)
    pub debug_mode: bool,

    /// 리스너 panic을 `Error::ListenerPanicked`로 변환
    pub catch_panics: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Contain,
            debug_mode: false,
            catch_panics: true,
        }
    }
}

impl EmitterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 실패 정책 설정
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// 디버그 모드 설정
    pub fn with_debug_mode(mut self, debug: bool) -> Self {
        self.debug_mode = debug;
        self
    }

    /// panic 변환 여부 설정
    pub fn with_catch_panics(mut self, catch: bool) -> Self {
        self.catch_panics = catch;
        self
    }

    /// 예약된 멤버 이름인지 확인
    pub fn is_reserved(name: &str) -> bool {
        RESERVED_MEMBERS.contains(&name)
    }
}
