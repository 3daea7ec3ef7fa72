// AFK tracking - who is away, since when, and why.

pub mod afk_models;
pub mod afk_service;

pub use afk_models::*;
pub use afk_service::*;
