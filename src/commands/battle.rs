use crate::db::{DeathRecord, GuildConfig};
use crate::notify::{battle_card, battle_embed, report_buttons, BattleNotice};
use crate::{Context, Error};

/// Show the notification card of a recorded battle again
#[poise::command(slash_command, guild_only)]
pub async fn battle(
    ctx: Context<'_>,
    #[description = "Albion battle id"]
    #[min = 1]
    battle_id: i64,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?.to_string();
    let db = &ctx.data().db;

    let guilds = db
        .run_blocking(move |db| db.list_guilds_for_server(&guild_id))
        .await?;
    if guilds.is_empty() {
        ctx.say("❌ No Albion guild is registered on this server. Use `/guild register` first.")
            .await?;
        return Ok(());
    }

    let record = db.run_blocking(move |db| db.get_battle(battle_id)).await?;
    let deaths = db
        .run_blocking(move |db| db.list_deaths_for_battle(battle_id))
        .await?;

    let guild = pick_guild(&guilds, &deaths);
    let Some(record) = record else {
        ctx.send(
            poise::CreateReply::default()
                .content(guild.language.texts().no_battle)
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    let own_deaths = deaths
        .iter()
        .filter(|death| death.guild_id == guild.albion_guild_id)
        .count();
    let notice = BattleNotice::from_record(&record, own_deaths);

    ctx.send(
        poise::CreateReply::default()
            .embed(battle_embed(&battle_card(guild, &notice)))
            .components(vec![report_buttons(guild, battle_id)]),
    )
    .await?;
    Ok(())
}

/// The registered guild that lost players in the battle, else the first one.
fn pick_guild<'a>(guilds: &'a [GuildConfig], deaths: &[DeathRecord]) -> &'a GuildConfig {
    guilds
        .iter()
        .find(|guild| deaths.iter().any(|death| death.guild_id == guild.albion_guild_id))
        .unwrap_or(&guilds[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    fn guild(albion: &str) -> GuildConfig {
        GuildConfig {
            id: 0,
            discord_guild_id: "900".to_string(),
            albion_guild_id: albion.to_string(),
            display_name: albion.to_string(),
            language: Language::Es,
            battle_report_channel: "1".to_string(),
            individual_report_channel: "2".to_string(),
            summary_channel: "3".to_string(),
            active: true,
        }
    }

    fn death(guild_id: &str) -> DeathRecord {
        DeathRecord {
            id: 1,
            battle_id: 100,
            event_index: 0,
            player_id: "p".to_string(),
            player_name: "Bob".to_string(),
            guild_id: guild_id.to_string(),
            death_time: None,
        }
    }

    #[test]
    fn test_pick_guild() {
        let guilds = vec![guild("G1"), guild("G2")];
        assert_eq!(pick_guild(&guilds, &[death("G2")]).albion_guild_id, "G2");
        assert_eq!(pick_guild(&guilds, &[death("ENEMY")]).albion_guild_id, "G1");
        assert_eq!(pick_guild(&guilds, &[]).albion_guild_id, "G1");
    }
}
