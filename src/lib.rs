//! SSH 主机连通性检查库

pub mod config;
pub mod error;
pub mod ssh;
pub mod telemetry;

pub use error::{ErrorKind, ReachError};
pub use ssh::{is_local_address, ConnectionRequest, ReachabilityChecker, Session};
