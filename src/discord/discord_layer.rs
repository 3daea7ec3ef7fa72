// Discord layer - commands, event handlers and the Discord-facing adapters
// for the core services.

use crate::core::afk::AfkService;
use crate::core::automod::AutomodService;
use crate::core::moderation::ModerationService;
use crate::core::settings::SettingsService;
use crate::infra::storage::MySqlStore;
use std::sync::Arc;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "checks/permission_checks.rs"]
pub mod checks;

#[path = "errors/error_handler.rs"]
pub mod errors;

#[path = "logging/mod.rs"]
pub mod logging;

#[path = "events/mod.rs"]
pub mod events;

#[path = "ipc/serenity_directory.rs"]
pub mod ipc;

/// Type alias for our bot's context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type ApplicationContext<'a> = poise::ApplicationContext<'a, Data, Error>;

/// Data that's shared across all commands.
pub struct Data {
    pub settings: Arc<SettingsService<MySqlStore>>,
    pub afk: Arc<AfkService<MySqlStore>>,
    pub automod: Arc<AutomodService<MySqlStore>>,
    pub moderation: Arc<ModerationService<MySqlStore>>,
    /// Colour for informational embeds.
    pub embed_colour: u32,
}
