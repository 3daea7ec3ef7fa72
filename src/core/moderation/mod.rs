// Core moderation module - case-numbered action logging, command input
// validation and ban-list resolution.

pub mod moderation_models;
pub mod moderation_service;

pub use moderation_models::*;
pub use moderation_service::*;
