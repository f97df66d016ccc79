//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{CacheError, SegmentError, SessionError, TtsError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),

    /// 外部服务不可达
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

/// 校验字段去除首尾空白后非空
pub fn ensure_not_blank(field: &str, value: &str) -> Result<(), ApplicationError> {
    if value.trim().is_empty() {
        return Err(ApplicationError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// TTL 上限（小时），十年
pub const MAX_TTL_HOURS: f64 = 24.0 * 365.0 * 10.0;

/// 小时数换算为 Duration，拒绝负数、非有限值和超过上限的值
pub fn hours_to_duration(field: &str, hours: f64) -> Result<chrono::Duration, ApplicationError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(ApplicationError::validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    if hours > MAX_TTL_HOURS {
        return Err(ApplicationError::validation(format!(
            "{} must not exceed {} hours",
            field, MAX_TTL_HOURS
        )));
    }
    chrono::Duration::try_seconds((hours * 3600.0).round() as i64)
        .ok_or_else(|| ApplicationError::validation(format!("{} is out of range", field)))
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        match err {
            TtsError::NetworkError(_) | TtsError::Timeout => {
                Self::ServiceUnavailable(err.to_string())
            }
            TtsError::ServiceError(_) | TtsError::InvalidResponse(_) => {
                Self::ExternalServiceError(err.to_string())
            }
        }
    }
}

impl From<CacheError> for ApplicationError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::CapacityExceeded { .. } => Self::ValidationError(err.to_string()),
            _ => Self::StorageError(err.to_string()),
        }
    }
}

impl From<SessionError> for ApplicationError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) | SessionError::Expired(id) => Self::not_found("Session", id),
            SessionError::PersistentTierDisabled => Self::ValidationError(err.to_string()),
            SessionError::Store(_) => Self::StorageError(err.to_string()),
            SessionError::Serialization(_) => Self::InternalError(err.to_string()),
        }
    }
}

impl From<SegmentError> for ApplicationError {
    fn from(err: SegmentError) -> Self {
        Self::ValidationError(err.to_string())
    }
}
