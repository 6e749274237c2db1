//! 已认证的 SSH 会话

use russh::client::Handle;
use tracing::{debug, warn};

use super::options::ProbeHandler;

/// 一次连通性检查得到的 SSH 会话
///
/// `close` 消耗会话本身，保证每个会话最多关闭一次
pub struct Session {
    handle: Handle<ProbeHandler>,
    target: String,
}

impl Session {
    pub(crate) fn new(handle: Handle<ProbeHandler>, target: String) -> Self {
        Self { handle, target }
    }

    /// 目标地址，格式为 user@host:port
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_connected(&self) -> bool {
        !self.handle.is_closed()
    }

    /// 断开连接
    pub async fn close(self) {
        if let Err(e) = self
            .handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await
        {
            // 对端已先行关闭时断开会失败，不影响结果
            warn!(session = %self.target, error = %e, "SSH disconnect failed");
            return;
        }
        debug!(session = %self.target, "SSH session closed");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("target", &self.target)
            .field("connected", &self.is_connected())
            .finish()
    }
}
