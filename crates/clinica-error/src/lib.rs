use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// 系统统一错误类型
///
/// 前端核心层的所有失败路径都归一到这个枚举：令牌解码、会话缺失、
/// HTTP 请求失败以及技术性错误。包装服务从不重试，错误同步上抛给
/// 直接调用方（两条声明的静默降级路径除外）。
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ClinicaError {
    // === 会话/令牌错误 ===
    #[error("令牌解码失败: {message}")]
    TokenDecode { message: String },

    #[error("无效的令牌: {message}")]
    InvalidToken { message: String },

    #[error("无会话令牌: {operation}")]
    NoSession { operation: String },

    // === HTTP 请求错误 ===
    #[error("请求失败 ({status}): {message}")]
    Request { status: u16, message: String },

    #[error("网络错误: {operation}")]
    Network { operation: String, message: String },

    #[error("超时错误: {operation} 超过 {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    // === 系统错误 ===
    #[error("序列化错误: {format}")]
    Serialization { format: String, message: String },

    #[error("配置错误: {key} - {reason}")]
    Configuration { key: String, reason: String },

    #[error("并发错误: {operation}")]
    Concurrency { operation: String, message: String },

    #[error("内部系统错误: {message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

/// 错误严重级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Low,      // 可预期的业务错误
    Medium,   // 技术错误但不影响核心功能
    High,     // 影响核心功能的错误
    Critical, // 系统级严重错误
}

impl ClinicaError {
    /// 获取错误的严重级别
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClinicaError::TokenDecode { .. }
            | ClinicaError::InvalidToken { .. }
            | ClinicaError::NoSession { .. } => ErrorSeverity::Low,
            ClinicaError::Request { .. }
            | ClinicaError::Network { .. }
            | ClinicaError::Timeout { .. } => ErrorSeverity::Medium,
            ClinicaError::Serialization { .. } | ClinicaError::Concurrency { .. } => {
                ErrorSeverity::High
            }
            ClinicaError::Configuration { .. } | ClinicaError::Internal { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    /// 是否属于认证/会话类错误
    ///
    /// 调用方把这类失败一律视为“未登录”，绝不部分信任解码结果。
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClinicaError::TokenDecode { .. }
                | ClinicaError::InvalidToken { .. }
                | ClinicaError::NoSession { .. }
        )
    }

    /// HTTP 状态码（仅 Request 错误携带）
    pub fn status(&self) -> Option<u16> {
        match self {
            ClinicaError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 获取用户友好的错误消息
    ///
    /// 面向用户的文案与后端 UX 契约保持一致，使用西班牙语。
    pub fn user_message(&self) -> String {
        match self {
            ClinicaError::TokenDecode { .. } | ClinicaError::InvalidToken { .. } => {
                "Token inválido".to_string()
            }
            ClinicaError::NoSession { .. } => "Sin token en sesión".to_string(),
            ClinicaError::Request { message, .. } => message.clone(),
            ClinicaError::Network { .. } => "Error de conexión con el servidor".to_string(),
            ClinicaError::Timeout { .. } => "La solicitud tardó demasiado".to_string(),
            _ => "Error interno, contacte al administrador".to_string(),
        }
    }

    /// 记录错误日志
    pub fn log(&self, component: &str, operation: &str) {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::Medium => {
                warn!(
                    error_id = %uuid::Uuid::new_v4(),
                    component = %component,
                    operation = %operation,
                    error = %self,
                    "操作失败"
                );
            }
            ErrorSeverity::High | ErrorSeverity::Critical => {
                error!(
                    error_id = %uuid::Uuid::new_v4(),
                    component = %component,
                    operation = %operation,
                    error = %self,
                    severity = ?self.severity(),
                    "严重错误"
                );
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ClinicaError>;

// === 转换实现 ===

impl From<serde_json::Error> for ClinicaError {
    fn from(err: serde_json::Error) -> Self {
        ClinicaError::Serialization {
            format: "json".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClinicaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClinicaError::Timeout {
                operation: "http_request".to_string(),
                timeout_ms: 30000,
            }
        } else if err.is_connect() {
            ClinicaError::Network {
                operation: "connect".to_string(),
                message: err.to_string(),
            }
        } else {
            ClinicaError::Network {
                operation: "http_request".to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl From<tokio::task::JoinError> for ClinicaError {
    fn from(err: tokio::task::JoinError) -> Self {
        ClinicaError::Concurrency {
            operation: "task_join".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ClinicaError {
    fn from(err: anyhow::Error) -> Self {
        ClinicaError::Internal {
            message: err.to_string(),
            details: None,
        }
    }
}
