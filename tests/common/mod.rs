//! 测试公共模块
//! 提供模拟远端主机的本地监听器和进程内 SSH 服务

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::server::{self, Auth};
use russh_keys::key::{KeyPair, PublicKey};
use ssh_reach::config::SshSettings;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// 创建测试配置，默认端口指向给定端口
pub fn create_test_settings(default_port: u16) -> SshSettings {
    SshSettings {
        default_username: "tester".to_string(),
        default_port,
        connect_timeout_secs: 10,
        private_key_path: Some("/nonexistent/.ssh/id_rsa".into()),
    }
}

/// 接受连接但从不应答的主机，用于模拟握手超时
pub async fn spawn_silent_host() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    port
}

/// 返回一个当前无人监听的端口
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// 返回非 SSH 协议数据后立即断开的主机
pub async fn spawn_non_ssh_host() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let _ = socket
                .write_all(b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n")
                .await;
            let _ = socket.shutdown().await;
        }
    });

    port
}

/// 在临时目录中生成客户端私钥（PKCS#8 PEM）
pub fn write_client_key(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("id_ed25519");
    let mut file = std::fs::File::create(&path).unwrap();
    russh_keys::encode_pkcs8_pem(&KeyPair::generate_ed25519().unwrap(), &mut file).unwrap();
    path
}

/// 进程内 SSH 服务的会话处理器
struct TestSshHandler {
    accept_keys: bool,
}

#[async_trait]
impl server::Handler for TestSshHandler {
    type Error = russh::Error;

    async fn auth_publickey(
        &mut self,
        _user: &str,
        _public_key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        if self.accept_keys {
            Ok(Auth::Accept)
        } else {
            Ok(Auth::Reject {
                proceed_with_methods: None,
            })
        }
    }
}

/// 进程内 SSH 服务
pub struct TestSshHost {
    pub port: u16,
    active: Arc<AtomicUsize>,
}

impl TestSshHost {
    /// 当前仍在服务端运行的会话数
    pub fn active_sessions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// 等待所有会话在服务端结束
    pub async fn wait_released(&self) -> bool {
        for _ in 0..50 {
            if self.active_sessions() == 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(40)).await;
        }
        false
    }
}

/// 启动进程内 SSH 服务，`accept_keys` 决定是否接受任何公钥
pub async fn spawn_ssh_host(bind_addr: &str, accept_keys: bool) -> TestSshHost {
    let listener = TcpListener::bind((bind_addr, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let config = Arc::new(server::Config {
        keys: vec![KeyPair::generate_ed25519().unwrap()],
        auth_rejection_time: Duration::from_millis(10),
        ..Default::default()
    });
    let active = Arc::new(AtomicUsize::new(0));
    let counter = active.clone();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let config = config.clone();
            let counter = counter.clone();
            counter.fetch_add(1, Ordering::SeqCst);

            tokio::spawn(async move {
                let handler = TestSshHandler { accept_keys };
                if let Ok(running) = server::run_stream(config, socket, handler).await {
                    let _ = running.await;
                }
                counter.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });

    TestSshHost { port, active }
}
