// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "config/env_config.rs"]
pub mod config;

#[path = "storage/mod.rs"]
pub mod storage;

#[path = "ipc/ipc_server.rs"]
pub mod ipc;

#[path = "topgg/topgg_client.rs"]
pub mod topgg;
