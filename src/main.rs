use linhir::albion::{AlbionClient, GameDataApi};
use linhir::cache::ItemCache;
use linhir::commands::{battle, guild};
use linhir::db::Database;
use linhir::items::ItemNameResolver;
use linhir::monitor::{BattleMonitor, ScanSettings};
use linhir::notify::DiscordNotifier;
use linhir::report::ReportService;
use linhir::{config::Config, interactions, Data};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);
    let discord_token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![guild::guild(), battle::battle()],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::InteractionCreate { interaction } = event {
                        interactions::route_component(ctx, interaction, &data.reports);
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                match config.dev_guild_id {
                    Some(id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(id),
                        )
                        .await?
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?
                    }
                }

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let db = Database::new(&config)?;
                db.execute_init()?;

                let api: Arc<dyn GameDataApi> = Arc::new(AlbionClient::new(&config)?);
                let cache = ItemCache::new(config.item_cache_capacity, config.item_cache_ttl);
                let resolver = ItemNameResolver::new(api.clone(), cache);
                let reports = ReportService::new(db.clone(), resolver, &config);

                let notifier = Arc::new(DiscordNotifier::new(ctx.http.clone()));
                let monitor =
                    BattleMonitor::new(db.clone(), api, notifier, ScanSettings::from(&config));
                tokio::spawn(monitor.run());

                Ok(Data {
                    config,
                    db,
                    reports,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
