//! 配置系统
//! 从环境变量加载 SSH 默认值和日志配置，进程启动时加载一次，之后只读

use std::path::PathBuf;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// 默认 SSH 端口
pub const DEFAULT_SSH_PORT: u16 = 22;
/// 默认 SSH 用户
pub const DEFAULT_SSH_USER: &str = "root";
/// 默认连接超时（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct SshSettings {
    /// 默认 SSH 用户名
    pub default_username: String,
    /// 默认 SSH 端口
    pub default_port: u16,
    /// 默认连接超时（秒）
    pub connect_timeout_secs: u64,
    /// 私钥路径（可选，默认 ~/.ssh/id_rsa）
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            default_username: DEFAULT_SSH_USER.to_string(),
            default_port: DEFAULT_SSH_PORT,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            private_key_path: None,
        }
    }
}

impl SshSettings {
    /// 指定私钥路径（测试中用于注入临时密钥）
    pub fn with_private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    /// 解析实际使用的私钥路径
    ///
    /// 未配置时回退到 `<home>/.ssh/id_rsa`，找不到 home 目录时返回 None
    pub fn resolved_private_key_path(&self) -> Option<PathBuf> {
        match &self.private_key_path {
            Some(path) => Some(path.clone()),
            None => home::home_dir().map(|home| home.join(".ssh").join("id_rsa")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub ssh: SshSettings,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        settings = settings
            .set_default("ssh.default_username", DEFAULT_SSH_USER)?
            .set_default("ssh.default_port", DEFAULT_SSH_PORT as i64)?
            .set_default("ssh.connect_timeout_secs", DEFAULT_CONNECT_TIMEOUT_SECS as i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?;

        // 从环境变量加载配置（前缀为 REACH_）
        settings = settings.add_source(
            Environment::with_prefix("REACH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    fn validate(&self) -> Result<(), ConfigError> {
        if self.ssh.default_port == 0 {
            return Err(ConfigError::Message("ssh.default_port must be > 0".to_string()));
        }

        if self.ssh.connect_timeout_secs == 0 {
            return Err(ConfigError::Message("ssh.connect_timeout_secs must be > 0".to_string()));
        }

        if self.ssh.default_username.trim().is_empty() {
            return Err(ConfigError::Message("ssh.default_username must not be blank".to_string()));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        Ok(())
    }
}
