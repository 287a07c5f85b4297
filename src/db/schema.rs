//! SQLite schema, applied idempotently by [`super::Database::execute_init`].

pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS guilds (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        discord_guild_id TEXT NOT NULL,
        albion_guild_id TEXT NOT NULL,
        display_name TEXT NOT NULL,
        language TEXT NOT NULL DEFAULT 'es',
        battle_report_channel TEXT NOT NULL,
        individual_report_channel TEXT NOT NULL,
        summary_channel TEXT NOT NULL,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        UNIQUE (discord_guild_id, albion_guild_id)
    );
    CREATE INDEX IF NOT EXISTS idx_guilds_active ON guilds (active);

    -- battle_id is the dedup key of the scan loop
    CREATE TABLE IF NOT EXISTS battles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        battle_id INTEGER NOT NULL UNIQUE,
        start_time DATETIME,
        total_fame INTEGER,
        total_kills INTEGER,
        recorded_at DATETIME DEFAULT CURRENT_TIMESTAMP
    );

    CREATE TABLE IF NOT EXISTS deaths (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        battle_id INTEGER NOT NULL REFERENCES battles (battle_id),
        event_index INTEGER NOT NULL,
        player_id TEXT NOT NULL,
        player_name TEXT NOT NULL,
        guild_id TEXT NOT NULL,
        death_time DATETIME
    );
    CREATE INDEX IF NOT EXISTS idx_deaths_battle ON deaths (battle_id, event_index);

    CREATE TABLE IF NOT EXISTS lost_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        death_id INTEGER NOT NULL REFERENCES deaths (id),
        slot TEXT NOT NULL,
        item_type TEXT NOT NULL,
        quality INTEGER NOT NULL DEFAULT 0,
        quantity INTEGER NOT NULL DEFAULT 1
    );
    CREATE INDEX IF NOT EXISTS idx_lost_items_death ON lost_items (death_id);
";
