// Dashboard IPC - named operations the external dashboard process calls.
// The transport lives in infra, the Discord-backed directory in discord.

pub mod ipc_models;
pub mod ipc_service;

pub use ipc_models::*;
pub use ipc_service::*;
