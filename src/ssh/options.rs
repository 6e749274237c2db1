//! 固定的 SSH 客户端选项
//!
//! 关闭主机密钥检查和主机 IP 检查，开启压缩，仅使用公钥认证

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client;
use russh_keys::key::PublicKey;
use russh_keys::PublicKeyBase64;
use sha2::Digest;
use tracing::debug;

/// 客户端选项，构造后不可修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    strict_host_key_checking: bool,
    check_host_ip: bool,
    compression: bool,
    preferred_authentications: &'static str,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            strict_host_key_checking: false,
            check_host_ip: false,
            compression: true,
            preferred_authentications: "publickey",
        }
    }
}

impl ClientOptions {
    pub fn strict_host_key_checking(&self) -> bool {
        self.strict_host_key_checking
    }

    pub fn check_host_ip(&self) -> bool {
        self.check_host_ip
    }

    pub fn compression(&self) -> bool {
        self.compression
    }

    pub fn preferred_authentications(&self) -> &'static str {
        self.preferred_authentications
    }

    /// 转换为 russh 客户端配置
    pub fn to_client_config(&self) -> Arc<client::Config> {
        let mut preferred = russh::Preferred::default();

        if self.compression {
            // 稳定排序，"none" 排到最后
            let mut algorithms = preferred.compression.into_owned();
            algorithms.sort_by_key(|name| AsRef::<str>::as_ref(name) == "none");
            preferred.compression = Cow::Owned(algorithms);
        }

        Arc::new(client::Config {
            preferred,
            ..Default::default()
        })
    }

    pub(crate) fn handler(&self, host: &str, port: u16) -> ProbeHandler {
        ProbeHandler {
            host: host.to_string(),
            port,
        }
    }
}

/// SSH 客户端会话处理器
///
/// 主机密钥检查固定关闭，接受任何主机密钥，只记录指纹
pub struct ProbeHandler {
    host: String,
    port: u16,
}

/// 计算主机公钥的 SHA-256 指纹
fn fingerprint(server_public_key: &PublicKey) -> String {
    let mut hasher = sha2::Sha256::new();
    hasher.update(server_public_key.public_key_base64().as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl client::Handler for ProbeHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        let fingerprint = fingerprint(server_public_key);

        debug!(
            host = %self.host,
            port = self.port,
            fingerprint = %fingerprint,
            "Host key checking disabled - accepting key"
        );
        Ok(true)
    }
}
