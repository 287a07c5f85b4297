//! Battle notification cards posted to a guild's report channel.

use crate::albion::BattleSummary;
use crate::db::{normalize_timestamp, BattleRecord, GuildConfig};
use crate::report::{ReportKind, ReportTrigger};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use serenity::{ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateMessage};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const NOTICE_COLOR: u32 = 0xE74C3C;

#[derive(Debug, Clone, PartialEq)]
pub struct BattleNotice {
    pub battle_id: i64,
    pub deaths: usize,
    pub start_time: Option<String>,
    pub total_fame: Option<i64>,
    pub total_kills: Option<i64>,
}

impl BattleNotice {
    pub fn new(battle: &BattleSummary, deaths: usize) -> Self {
        Self {
            battle_id: battle.id,
            deaths,
            start_time: battle.start_time.clone(),
            total_fame: battle.total_fame,
            total_kills: battle.total_kills,
        }
    }

    pub fn from_record(record: &BattleRecord, deaths: usize) -> Self {
        Self {
            battle_id: record.battle_id,
            deaths,
            start_time: record.start_time.clone(),
            total_fame: record.total_fame,
            total_kills: record.total_kills,
        }
    }
}

/// Delivery of battle notices. Implementations log failures instead of
/// returning them: a lost notification never undoes a recorded battle.
#[async_trait]
pub trait BattleNotifier: Send + Sync {
    async fn notify(&self, guild: &GuildConfig, notice: &BattleNotice);
}

/// Text content of a notification, independent of Discord builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleCard {
    pub title: String,
    pub description: String,
    pub fields: Vec<(String, String)>,
}

/// Missing or zero statistics are left out of the card.
pub fn battle_card(guild: &GuildConfig, notice: &BattleNotice) -> BattleCard {
    let language = guild.language;
    let texts = language.texts();

    let mut fields = Vec::new();
    if let Some(start) = normalize_timestamp(notice.start_time.as_deref()) {
        fields.push((texts.field_start.to_string(), start));
    }
    if let Some(fame) = notice.total_fame.filter(|fame| *fame != 0) {
        fields.push((texts.field_fame.to_string(), language.format_number(fame)));
    }
    if let Some(kills) = notice.total_kills.filter(|kills| *kills != 0) {
        fields.push((texts.field_kills.to_string(), kills.to_string()));
    }

    BattleCard {
        title: language.battle_title(notice.battle_id),
        description: language.deaths_description(notice.deaths, &guild.display_name),
        fields,
    }
}

pub fn battle_embed(card: &BattleCard) -> CreateEmbed {
    CreateEmbed::new()
        .title(card.title.as_str())
        .description(card.description.as_str())
        .color(NOTICE_COLOR)
        .fields(
            card.fields
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str(), true)),
        )
        .timestamp(serenity::Timestamp::now())
}

/// The two report buttons. Their custom ids carry the whole report request,
/// so they keep working for as long as the message exists.
pub fn report_buttons(guild: &GuildConfig, battle_id: i64) -> CreateActionRow {
    let texts = guild.language.texts();
    let button = |kind, label: &str, style| {
        let trigger = ReportTrigger::new(kind, battle_id, guild.language, &guild.albion_guild_id);
        CreateButton::new(trigger.custom_id()).label(label).style(style)
    };

    CreateActionRow::Buttons(vec![
        button(ReportKind::Players, texts.button_players, ButtonStyle::Primary),
        button(ReportKind::Purchases, texts.button_purchases, ButtonStyle::Success),
    ])
}

pub fn battle_message(guild: &GuildConfig, notice: &BattleNotice) -> CreateMessage {
    CreateMessage::new()
        .embed(battle_embed(&battle_card(guild, notice)))
        .components(vec![report_buttons(guild, notice.battle_id)])
}

fn parse_channel(raw: &str) -> Option<serenity::ChannelId> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(serenity::ChannelId::new)
}

pub struct DiscordNotifier {
    http: Arc<serenity::Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl BattleNotifier for DiscordNotifier {
    async fn notify(&self, guild: &GuildConfig, notice: &BattleNotice) {
        let Some(channel_id) = parse_channel(&guild.battle_report_channel) else {
            warn!(
                "Guild {} has an invalid report channel {:?}, battle {} not announced",
                guild.display_name, guild.battle_report_channel, notice.battle_id
            );
            return;
        };

        match channel_id
            .send_message(&self.http, battle_message(guild, notice))
            .await
        {
            Ok(_) => info!(
                "Notification sent for battle {} to channel {}",
                notice.battle_id, channel_id
            ),
            Err(e) => error!(
                "Failed to send notification for battle {} to channel {}: {}",
                notice.battle_id, channel_id, e
            ),
        }
    }
}
