use crate::albion::{BattleEvent, BattleSummary, GameDataApi, Victim};
use crate::db::{Database, GuildConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Records one battle: the battle row first, then every death of the tracked
/// guild with the items it lost.
#[derive(Clone)]
pub struct BattleProcessor {
    db: Database,
    api: Arc<dyn GameDataApi>,
    events_limit: u32,
}

impl BattleProcessor {
    pub fn new(db: Database, api: Arc<dyn GameDataApi>, events_limit: u32) -> Self {
        Self {
            db,
            api,
            events_limit,
        }
    }

    /// Returns the number of deaths recorded for `guild`.
    ///
    /// Fails with [`crate::db::DbError::DuplicateBattle`] when another scan
    /// already claimed the battle. An unavailable or empty event log is not an
    /// error: the battle stays recorded with zero deaths.
    pub async fn process_battle(
        &self,
        battle: &BattleSummary,
        guild: &GuildConfig,
    ) -> anyhow::Result<usize> {
        let battle_id = battle.id;
        debug!("Processing battle {} for {}", battle_id, guild.display_name);

        let summary = battle.clone();
        self.db
            .run_blocking(move |db| {
                db.insert_battle(
                    summary.id,
                    summary.start_time.as_deref(),
                    summary.total_fame,
                    summary.total_kills,
                )
            })
            .await?;

        let events = match self.api.battle_events(battle_id, self.events_limit).await {
            Ok(events) => events,
            Err(e) => {
                warn!("Could not fetch events for battle {}: {}", battle_id, e);
                return Ok(0);
            }
        };
        if events.is_empty() {
            warn!("No events returned for battle {}", battle_id);
            return Ok(0);
        }

        let mut deaths = 0;
        for (index, raw) in events.iter().enumerate() {
            let Some(event) = BattleEvent::from_raw(raw) else {
                warn!("Battle {}: skipping malformed event #{}", battle_id, index);
                continue;
            };
            let Some(victim) = event.victim else {
                continue;
            };
            if !victim.belongs_to(&guild.albion_guild_id) {
                continue;
            }

            let items = self
                .record_death(battle_id, index as i64, &victim, event.timestamp, guild)
                .await?;
            deaths += 1;
            info!(
                "Death recorded: {} in battle {} ({} items)",
                victim.name, battle_id, items
            );
        }

        Ok(deaths)
    }

    /// Stores the death and its lost items atomically; returns the item count.
    async fn record_death(
        &self,
        battle_id: i64,
        event_index: i64,
        victim: &Victim,
        timestamp: Option<String>,
        guild: &GuildConfig,
    ) -> anyhow::Result<usize> {
        let slots = victim.lost_slots();
        let player_id = victim.id.clone();
        let player_name = victim.name.clone();
        let guild_id = guild.albion_guild_id.clone();

        self.db
            .run_blocking(move |db| {
                db.insert_death_with_items(
                    battle_id,
                    event_index,
                    &player_id,
                    &player_name,
                    &guild_id,
                    timestamp.as_deref(),
                    &slots,
                )?;
                Ok(slots.len())
            })
            .await
    }
}
