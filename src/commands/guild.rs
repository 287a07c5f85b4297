use crate::db::GuildRegistration;
use crate::i18n::Language;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

/// Longest Albion guild id accepted, keeping report button ids under
/// Discord's custom id limit.
pub const MAX_ALBION_GUILD_ID_LEN: usize = 48;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum LanguageChoice {
    #[name = "Español"]
    Es,
    #[name = "English"]
    En,
}

impl From<LanguageChoice> for Language {
    fn from(choice: LanguageChoice) -> Self {
        match choice {
            LanguageChoice::Es => Language::Es,
            LanguageChoice::En => Language::En,
        }
    }
}

fn valid_albion_guild_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ALBION_GUILD_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Manage the Albion guilds tracked on this server
#[poise::command(
    slash_command,
    subcommands("register", "status", "pause", "resume"),
    guild_only
)]
pub async fn guild(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Track an Albion guild and choose where its reports go
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR", guild_only)]
pub async fn register(
    ctx: Context<'_>,
    #[description = "Albion guild id (from the killboard URL)"] albion_guild_id: String,
    #[description = "Name shown in reports"]
    #[max_length = 100]
    name: String,
    #[description = "Report language"] language: LanguageChoice,
    #[description = "Channel for battle notifications"]
    #[channel_types("Text")]
    battle_channel: serenity::GuildChannel,
    #[description = "Channel for individual reports"]
    #[channel_types("Text")]
    individual_channel: serenity::GuildChannel,
    #[description = "Channel for purchase summaries"]
    #[channel_types("Text")]
    summary_channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let albion_guild_id = albion_guild_id.trim().to_string();
    if !valid_albion_guild_id(&albion_guild_id) {
        ctx.say("❌ That does not look like an Albion guild id. Copy it from the guild's killboard URL.")
            .await?;
        return Ok(());
    }

    let registration = GuildRegistration {
        discord_guild_id: guild_id.to_string(),
        albion_guild_id: albion_guild_id.clone(),
        display_name: name.trim().to_string(),
        language: language.into(),
        battle_report_channel: battle_channel.id.to_string(),
        individual_report_channel: individual_channel.id.to_string(),
        summary_channel: summary_channel.id.to_string(),
    };

    ctx.data()
        .db
        .run_blocking(move |db| db.register_guild(&registration))
        .await?;

    info!(
        "Guild {} ({}) registered on server {}",
        name, albion_guild_id, guild_id
    );
    ctx.say(format!(
        "✅ **{}** registered. Battle notifications will be posted in <#{}>.",
        name.trim(),
        battle_channel.id
    ))
    .await?;
    Ok(())
}

/// List the Albion guilds tracked on this server
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?.to_string();
    let guilds = ctx
        .data()
        .db
        .run_blocking(move |db| db.list_guilds_for_server(&guild_id))
        .await?;

    if guilds.is_empty() {
        ctx.say("No Albion guild is tracked here yet. Use `/guild register` to add one.")
            .await?;
        return Ok(());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("🛡️ Tracked guilds")
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Scanning every {}",
            humantime::format_duration(ctx.data().config.scan_interval)
        )))
        .color(0x5865F2);

    for guild in guilds.iter().take(25) {
        let state = if guild.active { "🟢 active" } else { "⏸️ paused" };
        embed = embed.field(
            guild.display_name.as_str(),
            format!(
                "`{}` · {} · {}\nBattles: <#{}>\nReports: <#{}> · Summary: <#{}>",
                guild.albion_guild_id,
                guild.language.code(),
                state,
                guild.battle_report_channel,
                guild.individual_report_channel,
                guild.summary_channel
            ),
            false,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Stop scanning an Albion guild
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR", guild_only)]
pub async fn pause(
    ctx: Context<'_>,
    #[description = "Albion guild id"] albion_guild_id: String,
) -> Result<(), Error> {
    set_active(ctx, albion_guild_id, false).await
}

/// Resume scanning a paused Albion guild
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR", guild_only)]
pub async fn resume(
    ctx: Context<'_>,
    #[description = "Albion guild id"] albion_guild_id: String,
) -> Result<(), Error> {
    set_active(ctx, albion_guild_id, true).await
}

async fn set_active(ctx: Context<'_>, albion_guild_id: String, active: bool) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?.to_string();
    let albion_guild_id = albion_guild_id.trim().to_string();

    let id = albion_guild_id.clone();
    let updated = ctx
        .data()
        .db
        .run_blocking(move |db| db.set_guild_active(&guild_id, &id, active))
        .await?;

    if updated == 0 {
        ctx.say(format!("❌ `{}` is not registered on this server.", albion_guild_id))
            .await?;
    } else if active {
        ctx.say(format!("▶️ Resumed scanning `{}`.", albion_guild_id)).await?;
    } else {
        ctx.say(format!("⏸️ Paused scanning `{}`.", albion_guild_id)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_albion_guild_id_validation() {
        assert!(valid_albion_guild_id("iS2Q2Mw3S1asC9GVMC5P2w"));
        assert!(valid_albion_guild_id("a-b_c"));
        assert!(!valid_albion_guild_id(""));
        assert!(!valid_albion_guild_id("has space"));
        assert!(!valid_albion_guild_id("colon:id"));
        assert!(!valid_albion_guild_id(&"x".repeat(MAX_ALBION_GUILD_ID_LEN + 1)));
    }

    #[test]
    fn test_language_choice() {
        assert_eq!(Language::from(LanguageChoice::En), Language::En);
        assert_eq!(Language::from(LanguageChoice::Es), Language::Es);
    }
}
