use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_url: String,
    pub albion_api_url: String,
    pub status_message: String,
    pub dev_guild_id: Option<u64>,

    // Battle scan settings
    pub scan_interval: Duration,
    pub battles_page_limit: u32,
    pub events_page_limit: u32,
    pub http_timeout_secs: u64,

    // Item name cache
    pub item_cache_ttl: Duration,
    pub item_cache_capacity: usize,

    // Report views
    pub report_nav_timeout_secs: u64,
    pub report_fields_per_page: usize,
    pub summary_lines_per_page: usize,
}

pub const DEFAULT_ALBION_API_URL: &str = "https://gameinfo.albiononline.com/api/gameinfo";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "data/linhir.db".to_string()),
            albion_api_url: env::var("ALBION_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_ALBION_API_URL.to_string()),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Watching the killboard".to_string()),
            dev_guild_id: env::var("DEV_GUILD_ID").ok().and_then(|id| id.parse().ok()),

            scan_interval: duration_var("SCAN_INTERVAL", Duration::from_secs(120)),
            battles_page_limit: env::var("BATTLES_PAGE_LIMIT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            events_page_limit: env::var("EVENTS_PAGE_LIMIT")
                .unwrap_or_else(|_| "51".to_string())
                .parse()
                .unwrap_or(51),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),

            item_cache_ttl: duration_var("ITEM_CACHE_TTL", Duration::from_secs(24 * 60 * 60)),
            item_cache_capacity: env::var("ITEM_CACHE_CAPACITY")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),

            report_nav_timeout_secs: env::var("REPORT_NAV_TIMEOUT_SECS")
                .unwrap_or_else(|_| "180".to_string())
                .parse()
                .unwrap_or(180),
            report_fields_per_page: env::var("REPORT_FIELDS_PER_PAGE")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            summary_lines_per_page: env::var("SUMMARY_LINES_PER_PAGE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
        })
    }
}

/// Reads a humantime duration (`2m`, `24h`, `1h 30m`), falling back to `default`.
fn duration_var(key: &str, default: Duration) -> Duration {
    env::var(key)
        .ok()
        .and_then(|raw| humantime::parse_duration(raw.trim()).ok())
        .filter(|d| !d.is_zero())
        .unwrap_or(default)
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("database_url", &self.database_url)
            .field("albion_api_url", &self.albion_api_url)
            .field("status_message", &self.status_message)
            .field("dev_guild_id", &self.dev_guild_id)
            .field("scan_interval", &self.scan_interval)
            .field("battles_page_limit", &self.battles_page_limit)
            .field("events_page_limit", &self.events_page_limit)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("item_cache_ttl", &self.item_cache_ttl)
            .field("item_cache_capacity", &self.item_cache_capacity)
            .field("report_nav_timeout_secs", &self.report_nav_timeout_secs)
            .field("report_fields_per_page", &self.report_fields_per_page)
            .field("summary_lines_per_page", &self.summary_lines_per_page)
            .finish()
    }
}

/// Embed field value limit
pub const DISCORD_FIELD_VALUE_LIMIT: usize = 1024;
/// Embed description limit is 4096 characters
pub const DISCORD_EMBED_LIMIT: usize = 4096;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Missing token
        env::remove_var("DISCORD_TOKEN");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when DISCORD_TOKEN is missing");

        // 2. Defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        env::remove_var("SCAN_INTERVAL");
        env::remove_var("EVENTS_PAGE_LIMIT");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.scan_interval, Duration::from_secs(120));
        assert_eq!(config.events_page_limit, 51);
        assert_eq!(config.item_cache_ttl, Duration::from_secs(86_400));
        assert_eq!(config.albion_api_url, DEFAULT_ALBION_API_URL);

        // 3. Humantime parsing and bad values falling back
        env::set_var("SCAN_INTERVAL", "5m");
        env::set_var("EVENTS_PAGE_LIMIT", "lots");
        let config = Config::build().unwrap();
        assert_eq!(config.scan_interval, Duration::from_secs(300));
        assert_eq!(config.events_page_limit, 51);

        env::set_var("SCAN_INTERVAL", "soon");
        assert_eq!(Config::build().unwrap().scan_interval, Duration::from_secs(120));

        // 4. Debug redaction
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("test_token"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("SCAN_INTERVAL");
        env::remove_var("EVENTS_PAGE_LIMIT");
    }
}
