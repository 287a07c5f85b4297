use crate::albion::LostSlot;
use crate::config::Config;
use crate::i18n::Language;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

pub mod schema;

/// Storage format for instants: seconds precision, UTC, no offset.
pub const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("battle {0} is already recorded")]
    DuplicateBattle(i64),
}

/// One tracked Albion guild bound to a Discord server.
#[derive(Debug, Clone, PartialEq)]
pub struct GuildConfig {
    pub id: i64,
    pub discord_guild_id: String,
    pub albion_guild_id: String,
    pub display_name: String,
    pub language: Language,
    pub battle_report_channel: String,
    pub individual_report_channel: String,
    pub summary_channel: String,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct GuildRegistration {
    pub discord_guild_id: String,
    pub albion_guild_id: String,
    pub display_name: String,
    pub language: Language,
    pub battle_report_channel: String,
    pub individual_report_channel: String,
    pub summary_channel: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BattleRecord {
    pub battle_id: i64,
    pub start_time: Option<String>,
    pub total_fame: Option<i64>,
    pub total_kills: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeathRecord {
    pub id: i64,
    pub battle_id: i64,
    pub event_index: i64,
    pub player_id: String,
    pub player_name: String,
    pub guild_id: String,
    pub death_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LostItemRecord {
    pub id: i64,
    pub death_id: i64,
    pub slot: String,
    pub item_type: String,
    pub quality: i64,
    pub quantity: i64,
}

/// Lost items of one battle summed per `(item_type, quality)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTotal {
    pub item_type: String,
    pub quality: i64,
    pub total_quantity: i64,
}

/// Converts an API instant such as `2026-02-26T05:38:15.108776600Z` to
/// `2026-02-26 05:38:15`. Strings the parser rejects are cut at the first `.`
/// with `T` replaced by a space. Empty input yields `None`.
pub fn normalize_timestamp(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;

    let with_offset = raw.replace('Z', "+00:00");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&with_offset) {
        return Some(dt.with_timezone(&Utc).format(SQLITE_DATETIME_FORMAT).to_string());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.format(SQLITE_DATETIME_FORMAT).to_string());
    }

    let head = raw.split_once('.').map_or(raw, |(head, _)| head);
    Some(head.replace('T', " "))
}

fn guild_from_row(row: &Row<'_>) -> rusqlite::Result<GuildConfig> {
    let language: String = row.get(4)?;
    Ok(GuildConfig {
        id: row.get(0)?,
        discord_guild_id: row.get(1)?,
        albion_guild_id: row.get(2)?,
        display_name: row.get(3)?,
        language: Language::from_code(&language),
        battle_report_channel: row.get(5)?,
        individual_report_channel: row.get(6)?,
        summary_channel: row.get(7)?,
        active: row.get(8)?,
    })
}

fn insert_death_row(
    conn: &Connection,
    battle_id: i64,
    event_index: i64,
    player_id: &str,
    player_name: &str,
    guild_id: &str,
    death_time: Option<&str>,
) -> anyhow::Result<i64> {
    let death_time = normalize_timestamp(death_time);
    conn.execute(
        "INSERT INTO deaths (battle_id, event_index, player_id, player_name, guild_id, death_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (battle_id, event_index, player_id, player_name, guild_id, death_time),
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_lost_item_row(
    conn: &Connection,
    death_id: i64,
    slot: &str,
    item_type: &str,
    quality: i64,
    quantity: i64,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO lost_items (death_id, slot, item_type, quality, quantity)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (death_id, slot, item_type, quality, quantity),
    )?;
    Ok(())
}

const GUILD_COLUMNS: &str = "id, discord_guild_id, albion_guild_id, display_name, language, \
    battle_report_channel, individual_report_channel, summary_channel, active";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        if let Some(parent) = std::path::Path::new(&config.database_url).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::open(&config.database_url)?)
    }

    pub fn open(path: &str) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn execute_init(&self) -> anyhow::Result<()> {
        info!("Database: Initializing schema...");
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(schema::SCHEMA)?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    /// Runs `f` on the blocking pool so SQLite calls never stall the runtime.
    pub async fn run_blocking<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }

    // --- Guilds ---

    /// Inserts or refreshes the binding of an Albion guild to a Discord server.
    /// Re-registering reactivates a paused guild.
    pub fn register_guild(&self, reg: &GuildRegistration) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO guilds
                (discord_guild_id, albion_guild_id, display_name, language,
                 battle_report_channel, individual_report_channel, summary_channel, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, TRUE)
             ON CONFLICT(discord_guild_id, albion_guild_id) DO UPDATE SET
                display_name = excluded.display_name,
                language = excluded.language,
                battle_report_channel = excluded.battle_report_channel,
                individual_report_channel = excluded.individual_report_channel,
                summary_channel = excluded.summary_channel,
                active = TRUE",
            (
                &reg.discord_guild_id,
                &reg.albion_guild_id,
                &reg.display_name,
                reg.language.code(),
                &reg.battle_report_channel,
                &reg.individual_report_channel,
                &reg.summary_channel,
            ),
        )?;
        let id = conn.query_row(
            "SELECT id FROM guilds WHERE discord_guild_id = ?1 AND albion_guild_id = ?2",
            (&reg.discord_guild_id, &reg.albion_guild_id),
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn list_active_guilds(&self) -> anyhow::Result<Vec<GuildConfig>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM guilds WHERE active = TRUE ORDER BY id",
            GUILD_COLUMNS
        ))?;
        let rows = stmt.query_map([], guild_from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn list_guilds_for_server(&self, discord_guild_id: &str) -> anyhow::Result<Vec<GuildConfig>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM guilds WHERE discord_guild_id = ?1 ORDER BY id",
            GUILD_COLUMNS
        ))?;
        let rows = stmt.query_map([discord_guild_id], guild_from_row)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn set_guild_active(
        &self,
        discord_guild_id: &str,
        albion_guild_id: &str,
        active: bool,
    ) -> anyhow::Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count = conn.execute(
            "UPDATE guilds SET active = ?3 WHERE discord_guild_id = ?1 AND albion_guild_id = ?2",
            (discord_guild_id, albion_guild_id, active),
        )?;
        Ok(count)
    }

    // --- Battles ---

    pub fn is_battle_processed(&self, battle_id: i64) -> anyhow::Result<bool> {
        let conn = self.conn.lock().unwrap();
        let exists = conn
            .prepare("SELECT 1 FROM battles WHERE battle_id = ?1")?
            .exists([battle_id])?;
        Ok(exists)
    }

    /// Fails with [`DbError::DuplicateBattle`] when `battle_id` is already stored.
    pub fn insert_battle(
        &self,
        battle_id: i64,
        start_time: Option<&str>,
        total_fame: Option<i64>,
        total_kills: Option<i64>,
    ) -> anyhow::Result<()> {
        let start_time = normalize_timestamp(start_time);
        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT INTO battles (battle_id, start_time, total_fame, total_kills)
             VALUES (?1, ?2, ?3, ?4)",
            (battle_id, start_time, total_fame, total_kills),
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(DbError::DuplicateBattle(battle_id).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_battle(&self, battle_id: i64) -> anyhow::Result<Option<BattleRecord>> {
        let conn = self.conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT battle_id, start_time, total_fame, total_kills FROM battles WHERE battle_id = ?1",
                [battle_id],
                |row| {
                    Ok(BattleRecord {
                        battle_id: row.get(0)?,
                        start_time: row.get(1)?,
                        total_fame: row.get(2)?,
                        total_kills: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    // --- Deaths and lost items ---

    /// Stores one death and returns its generated id.
    pub fn insert_death(
        &self,
        battle_id: i64,
        event_index: i64,
        player_id: &str,
        player_name: &str,
        guild_id: &str,
        death_time: Option<&str>,
    ) -> anyhow::Result<i64> {
        let conn = self.conn.lock().unwrap();
        insert_death_row(
            &conn,
            battle_id,
            event_index,
            player_id,
            player_name,
            guild_id,
            death_time,
        )
    }

    pub fn insert_lost_item(
        &self,
        death_id: i64,
        slot: &str,
        item_type: &str,
        quality: i64,
        quantity: i64,
    ) -> anyhow::Result<()> {
        let conn = self.conn.lock().unwrap();
        insert_lost_item_row(&conn, death_id, slot, item_type, quality, quantity)
    }

    /// Stores a death together with its lost items in one transaction: either
    /// all rows land or none do.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_death_with_items(
        &self,
        battle_id: i64,
        event_index: i64,
        player_id: &str,
        player_name: &str,
        guild_id: &str,
        death_time: Option<&str>,
        items: &[LostSlot],
    ) -> anyhow::Result<i64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let death_id = insert_death_row(
            &tx,
            battle_id,
            event_index,
            player_id,
            player_name,
            guild_id,
            death_time,
        )?;
        for item in items {
            insert_lost_item_row(
                &tx,
                death_id,
                &item.slot,
                &item.item_type,
                item.quality,
                item.quantity,
            )?;
        }
        tx.commit()?;
        Ok(death_id)
    }

    /// Deaths in log order.
    pub fn list_deaths_for_battle(&self, battle_id: i64) -> anyhow::Result<Vec<DeathRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, battle_id, event_index, player_id, player_name, guild_id, death_time
             FROM deaths WHERE battle_id = ?1 ORDER BY event_index, id",
        )?;
        let rows = stmt.query_map([battle_id], |row| {
            Ok(DeathRecord {
                id: row.get(0)?,
                battle_id: row.get(1)?,
                event_index: row.get(2)?,
                player_id: row.get(3)?,
                player_name: row.get(4)?,
                guild_id: row.get(5)?,
                death_time: row.get(6)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn list_items_for_death(&self, death_id: i64) -> anyhow::Result<Vec<LostItemRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, death_id, slot, item_type, quality, quantity
             FROM lost_items WHERE death_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([death_id], |row| {
            Ok(LostItemRecord {
                id: row.get(0)?,
                death_id: row.get(1)?,
                slot: row.get(2)?,
                item_type: row.get(3)?,
                quality: row.get(4)?,
                quantity: row.get(5)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn aggregate_items_for_battle(&self, battle_id: i64) -> anyhow::Result<Vec<ItemTotal>> {
        self.aggregate_items(battle_id, None)
    }

    /// Same grouping, restricted to the deaths of one Albion guild.
    pub fn aggregate_items_for_guild(
        &self,
        battle_id: i64,
        guild_id: &str,
    ) -> anyhow::Result<Vec<ItemTotal>> {
        self.aggregate_items(battle_id, Some(guild_id))
    }

    fn aggregate_items(&self, battle_id: i64, guild_id: Option<&str>) -> anyhow::Result<Vec<ItemTotal>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT li.item_type, li.quality, SUM(li.quantity) AS total_quantity
             FROM lost_items li
             JOIN deaths d ON li.death_id = d.id
             WHERE d.battle_id = ?1 AND (?2 IS NULL OR d.guild_id = ?2)
             GROUP BY li.item_type, li.quality
             ORDER BY li.item_type, li.quality",
        )?;
        let rows = stmt.query_map((battle_id, guild_id), |row| {
            Ok(ItemTotal {
                item_type: row.get(0)?,
                quality: row.get(1)?,
                total_quantity: row.get(2)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        debug!("Database: {} grouped items for battle {}", results.len(), battle_id);
        Ok(results)
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> anyhow::Result<()> {
        self.conn.lock().unwrap().execute_batch(sql)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open(":memory:").unwrap();
        db.execute_init().unwrap();
        db
    }

    fn registration(server: &str, albion: &str) -> GuildRegistration {
        GuildRegistration {
            discord_guild_id: server.to_string(),
            albion_guild_id: albion.to_string(),
            display_name: format!("Guild {}", albion),
            language: Language::En,
            battle_report_channel: "100".to_string(),
            individual_report_channel: "101".to_string(),
            summary_channel: "102".to_string(),
        }
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp(Some("2026-02-26T05:38:15.108776600Z")).as_deref(),
            Some("2026-02-26 05:38:15")
        );
        assert_eq!(
            normalize_timestamp(Some("2026-01-01T00:00:00.000000Z")).as_deref(),
            Some("2026-01-01 00:00:00")
        );
        assert_eq!(
            normalize_timestamp(Some("2026-01-01T10:20:30")).as_deref(),
            Some("2026-01-01 10:20:30")
        );
        assert_eq!(normalize_timestamp(None), None);
        assert_eq!(normalize_timestamp(Some("")), None);

        // Unparsable fraction: truncate at the dot, swap the separator.
        assert_eq!(
            normalize_timestamp(Some("2026-02-26T05:38:15.1x8Z")).as_deref(),
            Some("2026-02-26 05:38:15")
        );
    }

    #[test]
    fn test_guild_registration_and_active_filter() {
        let db = test_db();
        let first = db.register_guild(&registration("s1", "G1")).unwrap();
        db.register_guild(&registration("s1", "G2")).unwrap();
        db.register_guild(&registration("s2", "G3")).unwrap();

        // Re-registering updates in place.
        let mut updated = registration("s1", "G1");
        updated.display_name = "Renamed".to_string();
        updated.language = Language::Es;
        assert_eq!(db.register_guild(&updated).unwrap(), first);

        assert_eq!(db.list_active_guilds().unwrap().len(), 3);
        assert_eq!(db.set_guild_active("s1", "G2", false).unwrap(), 1);
        assert_eq!(db.set_guild_active("s1", "missing", false).unwrap(), 0);

        let active: Vec<String> = db
            .list_active_guilds()
            .unwrap()
            .into_iter()
            .map(|g| g.albion_guild_id)
            .collect();
        assert_eq!(active, vec!["G1".to_string(), "G3".to_string()]);

        let server = db.list_guilds_for_server("s1").unwrap();
        assert_eq!(server.len(), 2);
        assert_eq!(server[0].display_name, "Renamed");
        assert_eq!(server[0].language, Language::Es);
        assert!(!server[1].active);

        // Registering again resumes a paused guild.
        db.register_guild(&registration("s1", "G2")).unwrap();
        assert_eq!(db.list_active_guilds().unwrap().len(), 3);
    }

    #[test]
    fn test_battle_dedup() {
        let db = test_db();
        assert!(!db.is_battle_processed(100).unwrap());

        db.insert_battle(100, Some("2026-01-01T00:00:00.000000Z"), Some(5000), Some(3))
            .unwrap();
        assert!(db.is_battle_processed(100).unwrap());

        let err = db.insert_battle(100, None, None, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DbError>(),
            Some(DbError::DuplicateBattle(100))
        ));

        let battle = db.get_battle(100).unwrap().unwrap();
        assert_eq!(battle.start_time.as_deref(), Some("2026-01-01 00:00:00"));
        assert_eq!(battle.total_fame, Some(5000));
        assert_eq!(db.get_battle(999).unwrap(), None);

        db.insert_battle(101, None, None, None).unwrap();
        assert_eq!(db.get_battle(101).unwrap().unwrap().start_time, None);
    }

    #[test]
    fn test_deaths_and_items() {
        let db = test_db();
        db.insert_battle(100, None, None, None).unwrap();

        let d2 = db
            .insert_death(100, 4, "p2", "Alice", "G1", Some("2026-01-01T00:05:00.5Z"))
            .unwrap();
        let d1 = db.insert_death(100, 1, "p1", "Bob", "G1", None).unwrap();
        assert_ne!(d1, d2);

        db.insert_lost_item(d1, "MainHand", "T4_SWORD", 1, 1).unwrap();
        db.insert_lost_item(d1, "Armor", "T4_ARMOR_CLOTH_SET2@1", 2, 1).unwrap();

        let deaths = db.list_deaths_for_battle(100).unwrap();
        assert_eq!(deaths.len(), 2);
        assert_eq!(deaths[0].player_name, "Bob");
        assert_eq!(deaths[1].death_time.as_deref(), Some("2026-01-01 00:05:00"));

        let items = db.list_items_for_death(d1).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].slot, "MainHand");
        assert_eq!(items[1].item_type, "T4_ARMOR_CLOTH_SET2@1");
        assert!(db.list_items_for_death(d2).unwrap().is_empty());
        assert!(db.list_deaths_for_battle(555).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_items_for_battle() {
        let db = test_db();
        db.insert_battle(100, None, None, None).unwrap();
        db.insert_battle(200, None, None, None).unwrap();

        let d1 = db.insert_death(100, 0, "p1", "Bob", "G1", None).unwrap();
        let d2 = db.insert_death(100, 1, "p2", "Eve", "G1", None).unwrap();
        let other = db.insert_death(200, 0, "p3", "Zed", "G1", None).unwrap();

        db.insert_lost_item(d1, "MainHand", "A", 1, 3).unwrap();
        db.insert_lost_item(d2, "MainHand", "A", 1, 2).unwrap();
        db.insert_lost_item(d2, "Armor", "B", 2, 1).unwrap();
        db.insert_lost_item(other, "MainHand", "A", 1, 10).unwrap();

        let mut totals = db.aggregate_items_for_battle(100).unwrap();
        totals.sort_by(|a, b| a.item_type.cmp(&b.item_type));
        assert_eq!(
            totals,
            vec![
                ItemTotal {
                    item_type: "A".to_string(),
                    quality: 1,
                    total_quantity: 5
                },
                ItemTotal {
                    item_type: "B".to_string(),
                    quality: 2,
                    total_quantity: 1
                },
            ]
        );
        assert!(db.aggregate_items_for_battle(300).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_items_for_guild() {
        let db = test_db();
        db.insert_battle(100, None, None, None).unwrap();
        let ours = db.insert_death(100, 0, "p1", "Bob", "G1", None).unwrap();
        let theirs = db.insert_death(100, 1, "p2", "Zed", "G2", None).unwrap();
        db.insert_lost_item(ours, "MainHand", "A", 1, 2).unwrap();
        db.insert_lost_item(theirs, "MainHand", "A", 1, 7).unwrap();

        assert_eq!(
            db.aggregate_items_for_guild(100, "G1").unwrap(),
            vec![ItemTotal {
                item_type: "A".to_string(),
                quality: 1,
                total_quantity: 2
            }]
        );
        assert_eq!(db.aggregate_items_for_battle(100).unwrap()[0].total_quantity, 9);
        assert!(db.aggregate_items_for_guild(100, "G3").unwrap().is_empty());
    }

    #[test]
    fn test_death_with_items_is_atomic() {
        let db = test_db();
        db.insert_battle(100, None, None, None).unwrap();
        db.execute_batch(
            "CREATE TRIGGER reject_cursed BEFORE INSERT ON lost_items
             WHEN NEW.item_type = 'CURSED'
             BEGIN SELECT RAISE(ABORT, 'cursed item'); END;",
        )
        .unwrap();

        let slot = |slot: &str, item_type: &str| LostSlot {
            slot: slot.to_string(),
            item_type: item_type.to_string(),
            quality: 1,
            quantity: 1,
        };

        let stored = db
            .insert_death_with_items(
                100,
                0,
                "p1",
                "Bob",
                "G1",
                None,
                &[slot("MainHand", "T4_SWORD"), slot("Armor", "T4_ARMOR")],
            )
            .unwrap();
        assert_eq!(db.list_items_for_death(stored).unwrap().len(), 2);

        let failed = db.insert_death_with_items(
            100,
            1,
            "p2",
            "Eve",
            "G1",
            None,
            &[slot("MainHand", "T4_SWORD"), slot("Armor", "CURSED")],
        );
        assert!(failed.is_err());

        let deaths = db.list_deaths_for_battle(100).unwrap();
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].player_name, "Bob");
        let totals = db.aggregate_items_for_battle(100).unwrap();
        assert!(totals.iter().all(|total| total.total_quantity == 1));
    }

    #[tokio::test]
    async fn test_run_blocking() {
        let db = test_db();
        db.run_blocking(|db| db.insert_battle(7, None, None, None))
            .await
            .unwrap();
        let processed = db.run_blocking(|db| db.is_battle_processed(7)).await.unwrap();
        assert!(processed);
    }
}
