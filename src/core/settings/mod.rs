// Per-guild settings: log channels, welcome message, automod flags,
// the moderation case counter and the blacklist.

pub mod settings_models;
pub mod settings_service;

pub use settings_models::*;
pub use settings_service::*;
