// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "settings/mod.rs"]
pub mod settings;

#[path = "afk/mod.rs"]
pub mod afk;

#[path = "automod/automod_service.rs"]
pub mod automod;

#[path = "moderation/mod.rs"]
pub mod moderation;

#[path = "permissions/permission_gate.rs"]
pub mod permissions;

#[path = "roles/role_models.rs"]
pub mod roles;

#[path = "cooldowns/cooldown_format.rs"]
pub mod cooldowns;

#[path = "ipc/mod.rs"]
pub mod ipc;

pub mod best_effort;
