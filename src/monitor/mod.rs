//! Periodic scan of every active guild's recent battles.

use crate::albion::{BattleSummary, GameDataApi};
use crate::config::Config;
use crate::db::{Database, DbError, GuildConfig};
use crate::notify::{BattleNotice, BattleNotifier};
use anyhow::Context as AnyhowContext;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

pub mod processor;

pub use processor::BattleProcessor;

#[derive(Debug, Clone, Copy)]
pub struct ScanSettings {
    pub interval: Duration,
    pub battles_limit: u32,
    pub events_limit: u32,
}

impl From<&Config> for ScanSettings {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.scan_interval,
            battles_limit: config.battles_page_limit,
            events_limit: config.events_page_limit,
        }
    }
}

/// Counters of one scan pass, logged at the end of each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub guilds: usize,
    pub new_battles: usize,
    pub deaths: usize,
    pub notifications: usize,
    pub failures: usize,
}

pub struct BattleMonitor {
    db: Database,
    api: Arc<dyn GameDataApi>,
    notifier: Arc<dyn BattleNotifier>,
    processor: BattleProcessor,
    settings: ScanSettings,
}

impl BattleMonitor {
    pub fn new(
        db: Database,
        api: Arc<dyn GameDataApi>,
        notifier: Arc<dyn BattleNotifier>,
        settings: ScanSettings,
    ) -> Self {
        let processor = BattleProcessor::new(db.clone(), api.clone(), settings.events_limit);
        Self {
            db,
            api,
            notifier,
            processor,
            settings,
        }
    }

    /// Scans forever. The first pass starts immediately; a pass that overruns
    /// the interval delays the next one instead of stacking ticks.
    pub async fn run(self) {
        info!(
            "Battle monitor started, scanning every {}",
            humantime::format_duration(self.settings.interval)
        );
        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.scan_once().await {
                Ok(stats) if stats.new_battles > 0 || stats.failures > 0 => info!(
                    "Scan finished: {} guilds, {} new battles, {} deaths, {} notifications, {} failures",
                    stats.guilds, stats.new_battles, stats.deaths, stats.notifications, stats.failures
                ),
                Ok(stats) => debug!("Scan finished: {} guilds, nothing new", stats.guilds),
                Err(e) => error!("Battle scan failed: {:#}", e),
            }
        }
    }

    /// One pass over all active guilds. Only failing to list the guilds
    /// aborts the pass; every other failure is confined to its guild or battle.
    pub async fn scan_once(&self) -> anyhow::Result<ScanStats> {
        debug!("Checking for new battles...");
        let guilds = self.db.run_blocking(|db| db.list_active_guilds()).await?;

        let mut stats = ScanStats {
            guilds: guilds.len(),
            ..Default::default()
        };
        for guild in &guilds {
            if let Err(e) = self.scan_guild(guild, &mut stats).await {
                stats.failures += 1;
                error!(
                    "Error scanning guild {} ({}): {:#}",
                    guild.display_name, guild.albion_guild_id, e
                );
            }
        }
        Ok(stats)
    }

    async fn scan_guild(&self, guild: &GuildConfig, stats: &mut ScanStats) -> anyhow::Result<()> {
        let battles = self
            .api
            .recent_battles(&guild.albion_guild_id, self.settings.battles_limit)
            .await
            .with_context(|| format!("Failed to fetch battles for {}", guild.albion_guild_id))?;

        for battle in battles {
            if let Err(e) = self.scan_battle(&battle, guild, stats).await {
                stats.failures += 1;
                error!("Error processing battle {}: {:#}", battle.id, e);
            }
        }
        Ok(())
    }

    /// Dedup check and processing of one battle. Errors stay confined to it.
    async fn scan_battle(
        &self,
        battle: &BattleSummary,
        guild: &GuildConfig,
        stats: &mut ScanStats,
    ) -> anyhow::Result<()> {
        let battle_id = battle.id;
        let processed = self
            .db
            .run_blocking(move |db| db.is_battle_processed(battle_id))
            .await?;
        if processed {
            debug!("Battle {} already processed, skipping", battle_id);
            return Ok(());
        }

        info!("New battle detected: {} for {}", battle_id, guild.display_name);
        self.handle_battle(battle, guild, stats).await
    }

    async fn handle_battle(
        &self,
        battle: &BattleSummary,
        guild: &GuildConfig,
        stats: &mut ScanStats,
    ) -> anyhow::Result<()> {
        let deaths = match self.processor.process_battle(battle, guild).await {
            Ok(deaths) => deaths,
            Err(e) => {
                return match e.downcast_ref::<DbError>() {
                    Some(DbError::DuplicateBattle(id)) => {
                        debug!("Battle {} was claimed by a concurrent scan, skipping", id);
                        Ok(())
                    }
                    None => Err(e),
                };
            }
        };

        stats.new_battles += 1;
        stats.deaths += deaths;
        if deaths == 0 {
            debug!("Battle {} has no deaths for {}", battle.id, guild.display_name);
            return Ok(());
        }
        self.notifier
            .notify(guild, &BattleNotice::new(battle, deaths))
            .await;
        stats.notifications += 1;
        Ok(())
    }
}
