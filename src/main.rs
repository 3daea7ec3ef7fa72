// This is the entry point of FumeGuard.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (MySQL, the IPC server, top.gg)
// - `discord/` = Discord-specific adapters (commands, events, checks)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Start the background tasks (dashboard IPC, top.gg stats)

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::afk::AfkService;
use crate::core::automod::AutomodService;
use crate::core::ipc::IpcService;
use crate::core::moderation::ModerationService;
use crate::core::settings::SettingsService;
use crate::discord::ipc::SerenityDirectory;
use crate::discord::{Data, Error};
use crate::infra::config::{BotConfig, IpcConfig};
use crate::infra::ipc as ipc_server;
use crate::infra::storage::MySqlStore;
use crate::infra::topgg::{TopggClient, POST_INTERVAL};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Serve the dashboard over HTTP until the process exits.
fn spawn_ipc_server(
    config: IpcConfig,
    ctx: &serenity::Context,
    command_guild: Option<u64>,
    settings: Arc<SettingsService<MySqlStore>>,
    afk: Arc<AfkService<MySqlStore>>,
) {
    let directory = SerenityDirectory::new(ctx.cache.clone(), ctx.http.clone(), command_guild);
    let service = Arc::new(IpcService::new(directory, settings, afk));
    let router = ipc_server::router(service, &config.secret);

    tokio::spawn(async move {
        if let Err(e) = ipc_server::serve(router, config.addr).await {
            tracing::error!("IPC server stopped: {}", e);
        }
    });
}

/// Post the guild count to top.gg every 30 minutes.
fn spawn_topgg_poster(token: &str, cache: Arc<serenity::Cache>, bot_id: u64) {
    let client = match TopggClient::new(token) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("top.gg poster disabled: {}", e);
            return;
        }
    };

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(POST_INTERVAL);
        loop {
            interval.tick().await;
            let guilds = cache.guild_count();
            match client.post_stats(bot_id, guilds, cache.shard_count()).await {
                Ok(()) => tracing::info!("Posted {} guilds to top.gg", guilds),
                Err(e) => tracing::warn!("Failed to post stats to top.gg: {}", e),
            }
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fumeguard=debug")),
        )
        .init();

    let config = BotConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // One pool, shared by every service through cheap store clones.

    let store = MySqlStore::connect(&config.database_url).await?;
    store.migrate().await?;
    tracing::info!("Connected to the database");

    let settings = Arc::new(SettingsService::new(store.clone()));
    let afk = Arc::new(AfkService::new(store.clone()));
    let automod = Arc::new(AutomodService::new(store.clone()));
    let moderation = Arc::new(ModerationService::new(store));

    let data = Data {
        settings: Arc::clone(&settings),
        afk: Arc::clone(&afk),
        automod,
        moderation,
        embed_colour: config.embed_colour,
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT; // Required for automod and AFK mentions

    let ipc_config = config.ipc.clone();
    let topgg_token = config.topgg_token.clone();
    let community_guild = config.community_guild_id;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            on_error: |error| Box::pin(discord::errors::on_error(error)),
            command_check: Some(|ctx| Box::pin(discord::checks::not_blacklisted(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(discord::events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!("Logged in as {}", ready.user.name);

                match community_guild {
                    // Guild registration is instant, global can take up to an hour
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                    }
                }
                tracing::info!("Commands registered");

                if let Some(ipc) = ipc_config {
                    spawn_ipc_server(ipc, ctx, community_guild, settings, afk);
                } else {
                    tracing::info!("IPC_SECRET_KEY not set, dashboard IPC disabled");
                }

                if let Some(token) = topgg_token {
                    spawn_topgg_poster(&token, ctx.cache.clone(), ready.user.id.get());
                }

                Ok::<Data, Error>(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    client.start_autosharded().await?;
    Ok(())
}
