use crate::discord::{Context, Data, Error};
use poise::serenity_prelude as serenity;

// Help sections, in display order
const CATEGORY_ORDER: &[&str] = &["General", "Afk", "Moderation", "Roles", "Automod", "Settings"];

/// "`afk set`, `afk reset`" for a group, "`kick`" for a plain command.
fn command_names(command: &poise::Command<Data, Error>) -> Vec<String> {
    if command.subcommands.is_empty() {
        return vec![format!("`{}`", command.name)];
    }
    command
        .subcommands
        .iter()
        .map(|sub| format!("`{} {}`", command.name, sub.name))
        .collect()
}

/// Group the visible commands by category, in display order.
fn sections(commands: &[poise::Command<Data, Error>]) -> Vec<(&'static str, String)> {
    CATEGORY_ORDER
        .iter()
        .filter_map(|&category| {
            let names: Vec<String> = commands
                .iter()
                .filter(|command| !command.hide_in_help)
                .filter(|command| command.category.as_deref().unwrap_or("General") == category)
                .flat_map(command_names)
                .collect();
            (!names.is_empty()).then(|| (category, names.join(", ")))
        })
        .collect()
}

/// Shows a list of all the commands provided by FumeGuard.
#[poise::command(slash_command, user_cooldown = 3, category = "General")]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let mut embed = serenity::CreateEmbed::new()
        .title("Command List")
        .description("Here's a list of available commands:")
        .color(ctx.data().embed_colour);

    for (category, names) in sections(&ctx.framework().options().commands) {
        embed = embed.field(category, names, false);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discord::commands;

    #[test]
    fn test_sections_follow_category_order() {
        let all = commands::all();
        let sections = sections(&all);

        let names: Vec<&str> = sections.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["General", "Afk", "Moderation", "Roles", "Automod", "Settings"]
        );
    }

    #[test]
    fn test_groups_list_their_subcommands() {
        let all = commands::all();
        let sections = sections(&all);

        let afk = sections
            .iter()
            .find(|(name, _)| *name == "Afk")
            .map(|(_, value)| value.as_str())
            .unwrap();
        assert_eq!(afk, "`afk set`, `afk reset`, `afk check`, `afk list`");

        let moderation = sections
            .iter()
            .find(|(name, _)| *name == "Moderation")
            .map(|(_, value)| value.as_str())
            .unwrap();
        assert!(moderation.starts_with("`kick`, `ban`, `unban`"));
    }
}
