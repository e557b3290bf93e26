// gvm-gmp: blocking Rust client for the Greenbone Management Protocol
//
// Usage:
//
//   let mut gvm = GmpClient::new(ClientConfig {
//       credentials: Credentials::new("admin", "admin"),
//       ..ClientConfig::default()
//   })?;
//   let config = gvm.config_id_by_name("Full and fast")?;
//   let target = gvm.target_create(&params([("name", "t"), ("hosts", "127.0.0.1")]))?;

pub mod auth;
pub mod client;
pub mod configs;
pub mod error;
pub mod models;
pub mod reports;
pub mod system;
pub mod targets;
pub mod tasks;
pub mod transport;
pub mod xml;

pub use auth::{AuthToken, Credentials};
pub use client::{ClientConfig, GmpClient};
pub use error::Error;
pub use models::{Config, Report, STATUS_DONE, Target, Task};
pub use reports::BASE64_FORMATS;
pub use tasks::TASK_REFERENCES;
pub use transport::{
    DEFAULT_BUFSIZE, DEFAULT_READ_TIMEOUT, DEFAULT_SOCKET_PATH, Socket, Transport, TransportConfig,
};
pub use xml::{Document, Element, Node, Params, params};
