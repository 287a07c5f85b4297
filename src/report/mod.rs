//! Loss reports opened from the buttons under a battle notification.
//!
//! Buttons carry a [`ReportTrigger`] in their custom id, so a click is served
//! by rebuilding the report from the database. Nothing has to stay in memory
//! between the notification and the click, and clicks keep working across
//! restarts.

use crate::config::{Config, DISCORD_FIELD_VALUE_LIMIT};
use crate::db::Database;
use crate::i18n::Language;
use crate::items::ItemNameResolver;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub mod paginator;
pub mod view;

pub use paginator::{PageNav, Paginator};

pub const TRIGGER_PREFIX: &str = "battle_report";
/// Discord rejects component custom ids longer than this.
pub const CUSTOM_ID_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Players,
    Purchases,
}

impl ReportKind {
    fn key(self) -> &'static str {
        match self {
            ReportKind::Players => "players",
            ReportKind::Purchases => "purchases",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "players" => Some(ReportKind::Players),
            "purchases" => Some(ReportKind::Purchases),
            _ => None,
        }
    }
}

/// Everything a report button needs to rebuild its report:
/// `battle_report:<kind>:<battle_id>:<lang>:<albion_guild_id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTrigger {
    pub kind: ReportKind,
    pub battle_id: i64,
    pub language: Language,
    pub albion_guild_id: String,
}

impl ReportTrigger {
    pub fn new(kind: ReportKind, battle_id: i64, language: Language, albion_guild_id: &str) -> Self {
        Self {
            kind,
            battle_id,
            language,
            albion_guild_id: albion_guild_id.to_string(),
        }
    }

    pub fn custom_id(&self) -> String {
        self.to_string()
    }

    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        let rest = custom_id.strip_prefix(TRIGGER_PREFIX)?.strip_prefix(':')?;
        let mut parts = rest.splitn(4, ':');
        let kind = ReportKind::from_key(parts.next()?)?;
        let battle_id = parts.next()?.parse().ok()?;
        let language = parts.next()?.parse().ok()?;
        let albion_guild_id = parts.next().filter(|id| !id.is_empty())?;
        Some(Self::new(kind, battle_id, language, albion_guild_id))
    }
}

impl fmt::Display for ReportTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            TRIGGER_PREFIX,
            self.kind.key(),
            self.battle_id,
            self.language.code(),
            self.albion_guild_id
        )
    }
}

/// One display unit of a report: an embed field for the per-player report,
/// a description line for the purchase summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRow {
    Field { name: String, value: String },
    Line(String),
}

#[derive(Clone)]
pub struct ReportService {
    db: Database,
    resolver: ItemNameResolver,
    fields_per_page: usize,
    lines_per_page: usize,
    nav_timeout: Duration,
    /// Message ids of paginated replies whose collector is still listening.
    open_views: Arc<Mutex<HashSet<u64>>>,
}

impl ReportService {
    pub fn new(db: Database, resolver: ItemNameResolver, config: &Config) -> Self {
        Self {
            db,
            resolver,
            fields_per_page: config.report_fields_per_page,
            lines_per_page: config.summary_lines_per_page,
            nav_timeout: Duration::from_secs(config.report_nav_timeout_secs),
            open_views: Default::default(),
        }
    }

    pub fn nav_timeout(&self) -> Duration {
        self.nav_timeout
    }

    /// Marks a reply as served by a live collector until the guard drops.
    pub fn track_view(&self, message_id: u64) -> OpenView {
        self.open_views.lock().unwrap().insert(message_id);
        OpenView {
            views: self.open_views.clone(),
            message_id,
        }
    }

    pub fn is_view_open(&self, message_id: u64) -> bool {
        self.open_views.lock().unwrap().contains(&message_id)
    }

    /// A nav click on a reply nobody listens to any more, e.g. one sent
    /// before a restart.
    pub fn is_orphaned_nav(&self, custom_id: &str, message_id: u64) -> bool {
        custom_id.starts_with(view::NAV_PREFIX) && !self.is_view_open(message_id)
    }

    /// Builds and paginates the report. No pages means there is nothing to show.
    pub async fn assemble(&self, trigger: &ReportTrigger) -> anyhow::Result<Paginator<ReportRow>> {
        let paginator = match trigger.kind {
            ReportKind::Players => Paginator::new(
                self.player_rows(trigger).await?,
                self.fields_per_page,
            ),
            ReportKind::Purchases => Paginator::new(
                self.purchase_rows(trigger).await?,
                self.lines_per_page,
            ),
        };
        Ok(paginator)
    }

    /// Deaths of the trigger's guild only; other guilds in the same battle
    /// are left out.
    async fn player_rows(&self, trigger: &ReportTrigger) -> anyhow::Result<Vec<ReportRow>> {
        let battle_id = trigger.battle_id;
        let language = trigger.language;
        let deaths: Vec<_> = self
            .db
            .run_blocking(move |db| db.list_deaths_for_battle(battle_id))
            .await?
            .into_iter()
            .filter(|death| death.guild_id == trigger.albion_guild_id)
            .collect();

        let mut rows = Vec::with_capacity(deaths.len());
        for death in deaths {
            let death_id = death.id;
            let items = self
                .db
                .run_blocking(move |db| db.list_items_for_death(death_id))
                .await?;

            let mut lines = Vec::with_capacity(items.len());
            for item in items {
                let name = self
                    .resolver
                    .display_name(&item.item_type, item.quality, language)
                    .await;
                lines.push(format!("{} x{}", name, item.quantity));
            }

            let value = if lines.is_empty() {
                language.texts().no_items_for_player.to_string()
            } else {
                truncate_chars(&lines.join("\n"), DISCORD_FIELD_VALUE_LIMIT)
            };
            rows.push(ReportRow::Field {
                name: format!("⚔️ {}", death.player_name),
                value,
            });
        }
        Ok(rows)
    }

    async fn purchase_rows(&self, trigger: &ReportTrigger) -> anyhow::Result<Vec<ReportRow>> {
        let battle_id = trigger.battle_id;
        let language = trigger.language;
        let guild_id = trigger.albion_guild_id.clone();
        let totals = self
            .db
            .run_blocking(move |db| db.aggregate_items_for_guild(battle_id, &guild_id))
            .await?;

        let mut rows = Vec::with_capacity(totals.len());
        for total in totals {
            let name = self
                .resolver
                .display_name(&total.item_type, total.quality, language)
                .await;
            rows.push(ReportRow::Line(format!("**{}** x{}", name, total.total_quantity)));
        }
        Ok(rows)
    }
}

/// Keeps a reply registered in [`ReportService`] while its collector runs.
pub struct OpenView {
    views: Arc<Mutex<HashSet<u64>>>,
    message_id: u64,
}

impl Drop for OpenView {
    fn drop(&mut self) {
        if let Ok(mut views) = self.views.lock() {
            views.remove(&self.message_id);
        }
    }
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `…`.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ItemCache;
    use crate::items::tests::FakeCatalog;

    fn service(db: Database, fields_per_page: usize, lines_per_page: usize) -> ReportService {
        let catalog = Arc::new(FakeCatalog::with(&[
            ("T4_SWORD", "Adept's Broadsword", "Espada ancha de adepto"),
            ("T4_ARMOR_CLOTH_SET2", "Adept's Cleric Robe", "Túnica de clérigo de adepto"),
        ]));
        let resolver = ItemNameResolver::new(catalog, ItemCache::new(100, Duration::from_secs(3600)));
        ReportService {
            db,
            resolver,
            fields_per_page,
            lines_per_page,
            nav_timeout: Duration::from_secs(180),
            open_views: Default::default(),
        }
    }

    fn seeded_db() -> Database {
        let db = Database::open(":memory:").unwrap();
        db.execute_init().unwrap();
        db.insert_battle(100, None, None, None).unwrap();
        let bob = db.insert_death(100, 0, "p1", "Bob", "G1", None).unwrap();
        let eve = db.insert_death(100, 2, "p2", "Eve", "G1", None).unwrap();
        db.insert_death(100, 5, "p3", "Naked", "G1", None).unwrap();
        db.insert_lost_item(bob, "MainHand", "T4_SWORD", 1, 1).unwrap();
        db.insert_lost_item(bob, "Armor", "T4_ARMOR_CLOTH_SET2@1", 0, 1).unwrap();
        db.insert_lost_item(eve, "MainHand", "T4_SWORD", 1, 2).unwrap();
        // An allied guild's death in the same battle.
        let ally = db.insert_death(100, 7, "p9", "Ally", "G2", None).unwrap();
        db.insert_lost_item(ally, "MainHand", "T4_SWORD", 1, 4).unwrap();
        db
    }

    #[test]
    fn test_trigger_custom_id() {
        let trigger = ReportTrigger::new(ReportKind::Purchases, 1234567890, Language::En, "iS2Q2Mw3S1asC9GVMC5P2w");
        let id = trigger.custom_id();
        assert_eq!(id, "battle_report:purchases:1234567890:en:iS2Q2Mw3S1asC9GVMC5P2w");
        assert!(id.len() <= CUSTOM_ID_LIMIT);
        assert_eq!(ReportTrigger::from_custom_id(&id), Some(trigger));

        assert_eq!(ReportTrigger::from_custom_id("battle_report:players:abc:en:G1"), None);
        assert_eq!(ReportTrigger::from_custom_id("battle_report:maps:1:en:G1"), None);
        assert_eq!(ReportTrigger::from_custom_id("battle_report:players:1:fr:G1"), None);
        assert_eq!(ReportTrigger::from_custom_id("battle_report:players:1:es:"), None);
        assert_eq!(ReportTrigger::from_custom_id("report_nav:123:next"), None);
    }

    #[test]
    fn test_nav_clicks_without_a_listener_are_orphaned() {
        let db = Database::open(":memory:").unwrap();
        let service = service(db, 5, 20);

        assert!(service.is_orphaned_nav("report_nav:next", 77));
        {
            let _open = service.clone().track_view(77);
            assert!(service.is_view_open(77));
            assert!(!service.is_orphaned_nav("report_nav:next", 77));
            assert!(service.is_orphaned_nav("report_nav:next", 78));
        }
        assert!(!service.is_view_open(77));
        assert!(service.is_orphaned_nav("report_nav:last", 77));

        // Report buttons are never nav clicks.
        assert!(!service.is_orphaned_nav("battle_report:players:1:en:G1", 77));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        let cut = truncate_chars("ñññññ", 3);
        assert_eq!(cut, "ññ…");
        assert_eq!(cut.chars().count(), 3);
    }

    #[tokio::test]
    async fn test_player_report() {
        let service = service(seeded_db(), 2, 20);
        let trigger = ReportTrigger::new(ReportKind::Players, 100, Language::En, "G1");
        let paginator = service.assemble(&trigger).await.unwrap();

        assert_eq!(paginator.page_count(), 2);
        let rows: Vec<ReportRow> = paginator.pages().iter().flatten().cloned().collect();
        assert_eq!(
            rows,
            vec![
                ReportRow::Field {
                    name: "⚔️ Bob".to_string(),
                    value: "Adept's Broadsword (Good) x1\nAdept's Cleric Robe.1 x1".to_string(),
                },
                ReportRow::Field {
                    name: "⚔️ Eve".to_string(),
                    value: "Adept's Broadsword (Good) x2".to_string(),
                },
                ReportRow::Field {
                    name: "⚔️ Naked".to_string(),
                    value: "No items recorded".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_purchase_summary() {
        let service = service(seeded_db(), 5, 20);
        let trigger = ReportTrigger::new(ReportKind::Purchases, 100, Language::Es, "G1");
        let paginator = service.assemble(&trigger).await.unwrap();

        assert_eq!(paginator.page_count(), 1);
        assert_eq!(
            paginator.current_page().unwrap(),
            &[
                ReportRow::Line("**Túnica de clérigo de adepto.1** x1".to_string()),
                ReportRow::Line("**Espada ancha de adepto (Buena)** x3".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_reports_show_only_the_trigger_guild() {
        let service = service(seeded_db(), 5, 20);

        let players = ReportTrigger::new(ReportKind::Players, 100, Language::En, "G2");
        let rows: Vec<ReportRow> = service
            .assemble(&players)
            .await
            .unwrap()
            .pages()
            .iter()
            .flatten()
            .cloned()
            .collect();
        assert_eq!(
            rows,
            vec![ReportRow::Field {
                name: "⚔️ Ally".to_string(),
                value: "Adept's Broadsword (Good) x4".to_string(),
            }]
        );

        let purchases = ReportTrigger::new(ReportKind::Purchases, 100, Language::En, "G2");
        let paginator = service.assemble(&purchases).await.unwrap();
        assert_eq!(
            paginator.current_page().unwrap(),
            &[ReportRow::Line("**Adept's Broadsword (Good)** x4".to_string())]
        );

        let stranger = ReportTrigger::new(ReportKind::Players, 100, Language::En, "G3");
        assert!(service.assemble(&stranger).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_reports() {
        let service = service(seeded_db(), 5, 20);
        for kind in [ReportKind::Players, ReportKind::Purchases] {
            let trigger = ReportTrigger::new(kind, 999, Language::En, "G1");
            assert!(service.assemble(&trigger).await.unwrap().is_empty());
        }
    }
}
