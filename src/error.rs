//! 统一错误模型
//! 定义连通性检查的所有错误类型
//!
//! 对外的布尔结果只区分可达/不可达，具体原因通过 `ReachError` 暴露给调用方和测试

use thiserror::Error;

/// 错误类别，便于调用方按原因分支而不用匹配错误消息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    UnsupportedAuthMethod,
    Timeout,
    HostUnreachable,
    AuthRejected,
    PrivateKey,
    Protocol,
    Config,
}

/// 连通性检查错误
#[derive(Debug, Clone, Error)]
pub enum ReachError {
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),

    #[error("Unsupported SSH authentication method: password")]
    UnsupportedAuthMethod,

    #[error("SSH connect timeout after {secs}s: {target}")]
    Timeout { target: String, secs: u64 },

    #[error("Host unreachable: {0}")]
    HostUnreachable(String),

    #[error("SSH authentication rejected: {0}")]
    AuthRejected(String),

    #[error("Failed to load private key: {0}")]
    PrivateKey(String),

    #[error("SSH protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReachError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReachError::InvalidAddress(_) => ErrorKind::InvalidInput,
            ReachError::UnsupportedAuthMethod => ErrorKind::UnsupportedAuthMethod,
            ReachError::Timeout { .. } => ErrorKind::Timeout,
            ReachError::HostUnreachable(_) => ErrorKind::HostUnreachable,
            ReachError::AuthRejected(_) => ErrorKind::AuthRejected,
            ReachError::PrivateKey(_) => ErrorKind::PrivateKey,
            ReachError::Protocol(_) => ErrorKind::Protocol,
            ReachError::Config(_) => ErrorKind::Config,
        }
    }

    /// 是否为连接过程中产生的错误（会被吞掉，只记录日志）
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Timeout
                | ErrorKind::HostUnreachable
                | ErrorKind::AuthRejected
                | ErrorKind::PrivateKey
                | ErrorKind::Protocol
        )
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            ReachError::InvalidAddress(_) => "Invalid host address".to_string(),
            ReachError::UnsupportedAuthMethod => {
                "Password authentication is not supported".to_string()
            }
            ReachError::Timeout { secs, .. } => format!("SSH connect timeout after {}s", secs),
            ReachError::HostUnreachable(_) => "Host unreachable".to_string(),
            ReachError::AuthRejected(_) => "SSH authentication failed".to_string(),
            ReachError::PrivateKey(_) => "Private key unavailable".to_string(),
            ReachError::Protocol(_) => "SSH connection failed".to_string(),
            ReachError::Config(_) => "Configuration error".to_string(),
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ReachError>;

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for ReachError {
    fn from(e: config::ConfigError) -> Self {
        ReachError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ReachError::InvalidAddress("x".to_string()).kind(), ErrorKind::InvalidInput);
        assert_eq!(ReachError::UnsupportedAuthMethod.kind(), ErrorKind::UnsupportedAuthMethod);
        assert_eq!(
            ReachError::Timeout {
                target: "root@10.0.0.5:22".to_string(),
                secs: 1
            }
            .kind(),
            ErrorKind::Timeout
        );
        assert_eq!(ReachError::Protocol("eof".to_string()).kind(), ErrorKind::Protocol);
    }

    #[test]
    fn test_transport_classification() {
        assert!(ReachError::HostUnreachable("refused".to_string()).is_transport());
        assert!(ReachError::AuthRejected("root".to_string()).is_transport());
        assert!(ReachError::PrivateKey("missing".to_string()).is_transport());
        assert!(!ReachError::UnsupportedAuthMethod.is_transport());
        assert!(!ReachError::InvalidAddress(String::new()).is_transport());
        assert!(!ReachError::Config("bad".to_string()).is_transport());
    }

    #[test]
    fn test_user_message_no_sensitive_info() {
        let error = ReachError::PrivateKey("/home/alice/.ssh/id_rsa: permission denied".to_string());
        let message = error.user_message();
        assert_eq!(message, "Private key unavailable");
        assert!(!message.contains("alice"));
    }

    #[test]
    fn test_config_error_conversion() {
        let error: ReachError = config::ConfigError::Message("boom".to_string()).into();
        assert!(matches!(error, ReachError::Config(_)));
    }
}
