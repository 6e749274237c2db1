//! 连接请求与参数规整

use std::net::Ipv4Addr;
use std::time::Duration;

use secrecy::{ExposeSecret, Secret};

use crate::config::SshSettings;
use crate::error::{ReachError, Result};

/// 视为本机、无需建立连接的地址
pub const LOCAL_ADDRESSES: [&str; 2] = ["127.0.0.1", "localhost"];

/// 建立连接时接受的主机名别名（大小写敏感）
const LOCALHOST_ALIAS: &str = "localhost";

/// 判断地址是否为本机（忽略大小写）
pub fn is_local_address(address: &str) -> bool {
    LOCAL_ADDRESSES
        .iter()
        .any(|local| local.eq_ignore_ascii_case(address))
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_valid_target(address: &str) -> bool {
    address == LOCALHOST_ALIAS || address.parse::<Ipv4Addr>().is_ok()
}

/// 单次连接请求，用完即弃
///
/// 端口、超时为 0 或用户名为空时使用配置中的默认值
#[derive(Debug, Clone)]
pub struct ConnectionRequest {
    address: String,
    port: u16,
    user: String,
    password: Option<Secret<String>>,
    timeout_secs: u64,
}

impl ConnectionRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: 0,
            user: String::new(),
            password: None,
            timeout_secs: 0,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Secret::new(password.into()));
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// 是否使用公钥认证（密码为空即公钥认证）
    pub fn uses_public_key(&self) -> bool {
        self.password
            .as_ref()
            .map_or(true, |password| is_blank(password.expose_secret()))
    }

    /// 校验地址与认证方式，并填充默认值
    ///
    /// 地址非法返回 `InvalidAddress`，密码非空返回 `UnsupportedAuthMethod`，
    /// 两者都不会触发任何网络访问
    pub fn resolve(&self, settings: &SshSettings) -> Result<ResolvedTarget> {
        if is_blank(&self.address) || !is_valid_target(&self.address) {
            return Err(ReachError::InvalidAddress(self.address.clone()));
        }

        if !self.uses_public_key() {
            return Err(ReachError::UnsupportedAuthMethod);
        }

        let user = if is_blank(&self.user) {
            settings.default_username.clone()
        } else {
            self.user.clone()
        };
        let port = if self.port == 0 {
            settings.default_port
        } else {
            self.port
        };
        let timeout_secs = if self.timeout_secs == 0 {
            settings.connect_timeout_secs
        } else {
            self.timeout_secs
        };

        Ok(ResolvedTarget {
            address: self.address.clone(),
            port,
            user,
            timeout_secs,
        })
    }
}

/// 规整后的连接目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub address: String,
    pub port: u16,
    pub user: String,
    pub timeout_secs: u64,
}

impl ResolvedTarget {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 获取目标地址字符串
    pub fn target(&self) -> String {
        format!("{}@{}:{}", self.user, self.address, self.port)
    }

    /// 日志中使用的主机描述
    pub fn detail(&self) -> String {
        format!(
            "[{}] by [public_key] with connectTimeout:[{}]",
            self.target(),
            self.timeout_secs
        )
    }
}
