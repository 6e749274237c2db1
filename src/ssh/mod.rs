//! SSH 连通性模块
//! 本机地址短路，其余地址通过一次公钥认证的 SSH 连接判断是否可达

pub mod checker;
pub mod options;
pub mod request;
pub mod session;

pub use checker::ReachabilityChecker;
pub use options::ClientOptions;
pub use request::{is_local_address, ConnectionRequest, ResolvedTarget, LOCAL_ADDRESSES};
pub use session::Session;
