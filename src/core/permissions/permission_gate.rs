// Permission gate - pure checks over caller and bot capabilities.
//
// The Discord layer extracts `Capabilities` from the interaction and runs one
// of the named checks below before the command body executes.

use std::fmt;
use thiserror::Error;

/// The guild-level permission flags the bot cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub administrator: bool,
    pub kick_members: bool,
    pub ban_members: bool,
    pub moderate_members: bool,
    pub manage_messages: bool,
    pub manage_roles: bool,
    pub manage_guild: bool,
    pub manage_nicknames: bool,
}

impl Capabilities {
    /// Administrator implies every other flag.
    pub fn has(&self, permission: Permission) -> bool {
        if self.administrator {
            return true;
        }
        match permission {
            Permission::KickMembers => self.kick_members,
            Permission::BanMembers => self.ban_members,
            Permission::ModerateMembers => self.moderate_members,
            Permission::ManageMessages => self.manage_messages,
            Permission::ManageRoles => self.manage_roles,
            Permission::ManageGuild => self.manage_guild,
            Permission::ManageNicknames => self.manage_nicknames,
        }
    }

    #[cfg(test)]
    pub fn all() -> Self {
        Self {
            administrator: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    KickMembers,
    BanMembers,
    ModerateMembers,
    ManageMessages,
    ManageRoles,
    ManageGuild,
    ManageNicknames,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::KickMembers => "Kick Members",
            Permission::BanMembers => "Ban Members",
            Permission::ModerateMembers => "Moderate Members",
            Permission::ManageMessages => "Manage Messages",
            Permission::ManageRoles => "Manage Roles",
            Permission::ManageGuild => "Manage Server",
            Permission::ManageNicknames => "Manage Nicknames",
        };
        f.write_str(name)
    }
}

/// Why a command was refused. The display text is shown to the caller as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionDenied {
    #[error("I need the **{0}** permission in this server to perform this action.")]
    Bot(Permission),

    #[error("You need the **{0}** permission in this server to perform this action.")]
    Caller(Permission),

    #[error("You need the **Kick Members** or **Ban Members** permission in this server to perform this action.")]
    CallerNeedsKickOrBan,
}

pub type CheckResult = Result<(), PermissionDenied>;

fn require_bot(bot: &Capabilities, permission: Permission) -> CheckResult {
    if bot.has(permission) {
        Ok(())
    } else {
        Err(PermissionDenied::Bot(permission))
    }
}

fn require_caller(caller: &Capabilities, permission: Permission) -> CheckResult {
    if caller.has(permission) {
        Ok(())
    } else {
        Err(PermissionDenied::Caller(permission))
    }
}

/// Bot first, then caller.
fn require_both(caller: &Capabilities, bot: &Capabilities, permission: Permission) -> CheckResult {
    require_bot(bot, permission)?;
    require_caller(caller, permission)
}

pub fn kick_check(caller: &Capabilities, bot: &Capabilities) -> CheckResult {
    require_both(caller, bot, Permission::KickMembers)
}

pub fn ban_check(caller: &Capabilities, bot: &Capabilities) -> CheckResult {
    require_both(caller, bot, Permission::BanMembers)
}

pub fn mute_check(caller: &Capabilities, bot: &Capabilities) -> CheckResult {
    require_both(caller, bot, Permission::ModerateMembers)
}

/// Channel mutes are permission overwrites, so the bot's channel-level
/// rights are checked when the overwrite is written.
pub fn channel_mute_check(caller: &Capabilities, _bot: &Capabilities) -> CheckResult {
    require_caller(caller, Permission::ModerateMembers)
}

pub fn warn_check(caller: &Capabilities, _bot: &Capabilities) -> CheckResult {
    if caller.has(Permission::KickMembers) || caller.has(Permission::BanMembers) {
        Ok(())
    } else {
        Err(PermissionDenied::CallerNeedsKickOrBan)
    }
}

pub fn clear_check(caller: &Capabilities, bot: &Capabilities) -> CheckResult {
    require_both(caller, bot, Permission::ManageMessages)
}

pub fn roles_check(caller: &Capabilities, bot: &Capabilities) -> CheckResult {
    require_both(caller, bot, Permission::ManageRoles)
}

pub fn settings_check(caller: &Capabilities, _bot: &Capabilities) -> CheckResult {
    require_caller(caller, Permission::ManageGuild)
}

pub fn automod_check(caller: &Capabilities, bot: &Capabilities) -> CheckResult {
    require_both(caller, bot, Permission::ManageGuild)
}

pub fn announce_check(caller: &Capabilities, _bot: &Capabilities) -> CheckResult {
    require_caller(caller, Permission::ManageGuild)
}

/// AFK renames need the bot to manage nicknames; the caller needs nothing.
pub fn afk_check(_caller: &Capabilities, bot: &Capabilities) -> CheckResult {
    require_bot(bot, Permission::ManageNicknames)
}

/// Role hierarchy: the guild owner may target anyone, everyone else only
/// members whose top role is not above their own.
pub fn can_moderate(caller_is_owner: bool, caller_top_role: u16, target_top_role: u16) -> bool {
    caller_is_owner || target_top_role <= caller_top_role
}
