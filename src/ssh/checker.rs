//! 主机连通性检查
//!
//! 本机地址直接视为可达，其余地址通过一次公钥认证的 SSH 连接判断

use std::io::ErrorKind as IoErrorKind;
use std::sync::Arc;

use russh::client;
use russh_keys::load_secret_key;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::options::{ClientOptions, ProbeHandler};
use super::request::{is_local_address, ConnectionRequest, ResolvedTarget};
use super::session::Session;
use crate::config::SshSettings;
use crate::error::{ReachError, Result};

/// 连通性检查器
///
/// 客户端配置在构造时生成一次，之后所有连接共享同一份只读配置
#[derive(Clone)]
pub struct ReachabilityChecker {
    settings: SshSettings,
    options: ClientOptions,
    client_config: Arc<client::Config>,
}

impl ReachabilityChecker {
    pub fn new(settings: SshSettings) -> Self {
        Self::with_options(settings, ClientOptions::default())
    }

    pub fn with_options(settings: SshSettings, options: ClientOptions) -> Self {
        let client_config = options.to_client_config();
        Self {
            settings,
            options,
            client_config,
        }
    }

    pub fn settings(&self) -> &SshSettings {
        &self.settings
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// 检查主机是否可达
    ///
    /// 使用默认端口、默认用户和公钥认证，获得的会话在返回前关闭
    pub async fn check_reachable(&self, address: &str) -> bool {
        if is_local_address(address) {
            debug!(host = %address, "Local address, skip SSH check");
            return true;
        }

        match self.open_session(&ConnectionRequest::new(address)).await {
            Ok(Some(session)) => {
                let connected = session.is_connected();
                session.close().await;
                connected
            }
            _ => false,
        }
    }

    /// 打开 SSH 会话
    ///
    /// 地址非法或连接失败时返回 `Ok(None)`，只有密码认证会返回错误
    pub async fn open_session(&self, request: &ConnectionRequest) -> Result<Option<Session>> {
        match self.connect(request).await {
            Ok(session) => Ok(Some(session)),
            Err(ReachError::UnsupportedAuthMethod) => Err(ReachError::UnsupportedAuthMethod),
            Err(_) => Ok(None),
        }
    }

    /// 打开 SSH 会话，失败时返回具体原因
    pub async fn connect(&self, request: &ConnectionRequest) -> Result<Session> {
        let target = request.resolve(&self.settings)?;

        info!(
            user = %target.user,
            host = %target.address,
            port = target.port,
            auth = "public_key",
            timeout_secs = target.timeout_secs,
            "Start to connect to host:{} using SSH...",
            target.detail()
        );

        let result = match timeout(target.timeout(), self.establish(&target)).await {
            Ok(result) => result,
            Err(_) => Err(ReachError::Timeout {
                target: target.target(),
                secs: target.timeout_secs,
            }),
        };

        if let Err(e) = &result {
            warn!(
                host = %target.address,
                port = target.port,
                error = %e,
                "Connect to host:{} ERROR!!!",
                target.detail()
            );
        }

        result
    }

    async fn establish(&self, target: &ResolvedTarget) -> Result<Session> {
        let handler = self.options.handler(&target.address, target.port);

        let mut handle = client::connect(
            self.client_config.clone(),
            (target.address.as_str(), target.port),
            handler,
        )
        .await
        .map_err(|e| classify(e, target))?;

        // 连接建立后的任何失败都要主动断开
        if let Err(e) = self.authenticate(&mut handle, target).await {
            let _ = handle
                .disconnect(russh::Disconnect::ByApplication, "", "")
                .await;
            return Err(e);
        }

        debug!(host = %target.address, port = target.port, "SSH authentication succeeded");

        Ok(Session::new(handle, target.target()))
    }

    async fn authenticate(
        &self,
        handle: &mut client::Handle<ProbeHandler>,
        target: &ResolvedTarget,
    ) -> Result<()> {
        let key_path = self
            .settings
            .resolved_private_key_path()
            .ok_or_else(|| ReachError::PrivateKey("home directory not found".to_string()))?;
        let key = load_secret_key(&key_path, None).map_err(|e| {
            ReachError::PrivateKey(format!("{}: {}", key_path.display(), e))
        })?;

        let authenticated = handle
            .authenticate_publickey(target.user.clone(), Arc::new(key))
            .await
            .map_err(|e| classify(e, target))?;

        if !authenticated {
            return Err(ReachError::AuthRejected(target.target()));
        }

        Ok(())
    }
}

/// 将 russh 错误归类
fn classify(e: russh::Error, target: &ResolvedTarget) -> ReachError {
    match e {
        russh::Error::IO(ref io) => match io.kind() {
            IoErrorKind::UnexpectedEof => ReachError::Protocol(e.to_string()),
            IoErrorKind::TimedOut => ReachError::Timeout {
                target: target.target(),
                secs: target.timeout_secs,
            },
            _ => ReachError::HostUnreachable(format!("{}: {}", target.target(), e)),
        },
        other => ReachError::Protocol(other.to_string()),
    }
}
