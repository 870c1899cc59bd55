//! Error types for lineage
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// lineage 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련 (타입 선언 시점)
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 리스너 관련 (emit 시점)
    // ========================================================================
    #[error("Listener failed: {event} - {message}")]
    Listener { event: String, message: String },

    #[error("Listener panicked: {event} - {message}")]
    ListenerPanicked { event: String, message: String },

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 리스너 실행 중 발생한 에러인지 확인
    pub fn is_listener_failure(&self) -> bool {
        matches!(
            self,
            Error::Listener { .. } | Error::ListenerPanicked { .. } | Error::Json(_) | Error::Other(_)
        )
    }

    /// 설정 에러인지 확인
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// 리스너 에러 생성 헬퍼
    pub fn listener(event: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Listener {
            event: event.into(),
            message: message.into(),
        }
    }

    /// panic payload를 에러로 변환
    pub fn panicked(event: impl Into<String>, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };

        Error::ListenerPanicked {
            event: event.into(),
            message,
        }
    }

    /// 이미 정의된 capability 이름 충돌
    pub fn already_defined(type_name: &str, member: &str) -> Self {
        Error::Config(format!(
            "\"{}\" method is already defined on {}",
            member, type_name
        ))
    }
}
