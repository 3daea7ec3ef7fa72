use crate::core::moderation::{MemberLogEntry, ModCase};
use crate::core::roles::RoleLogEntry;
use poise::serenity_prelude::{self as serenity, CreateEmbed};

fn with_fields(mut embed: CreateEmbed, fields: Vec<(&'static str, String)>) -> CreateEmbed {
    for (name, value) in fields {
        embed = embed.field(name, value, false);
    }
    embed
}

pub fn format_case(case: &ModCase) -> CreateEmbed {
    let mut embed = CreateEmbed::default()
        .title(case.title())
        .color(case.draft.action.colour())
        .timestamp(serenity::Timestamp::now());

    if let Some(description) = &case.draft.description {
        embed = embed.description(description);
    }

    with_fields(embed, case.fields())
}

pub fn format_role_log(entry: &RoleLogEntry) -> CreateEmbed {
    let embed = CreateEmbed::default()
        .title(entry.action.label())
        .color(entry.colour)
        .timestamp(serenity::Timestamp::now());

    with_fields(embed, entry.fields())
}

pub fn format_member_log(entry: &MemberLogEntry) -> CreateEmbed {
    let embed = CreateEmbed::default()
        .title(entry.title())
        .color(entry.colour())
        .timestamp(serenity::Timestamp::now());

    with_fields(embed, entry.fields())
}
