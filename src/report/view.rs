use super::{
    truncate_chars, PageNav, Paginator, ReportKind, ReportRow, ReportService, ReportTrigger,
};
use crate::config::DISCORD_EMBED_LIMIT;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use serenity::{
    ButtonStyle, ComponentInteraction, CreateActionRow, CreateButton, CreateEmbed,
    CreateEmbedFooter, CreateInteractionResponse, CreateInteractionResponseMessage,
    EditInteractionResponse,
};
use tracing::{debug, error, info};

pub(crate) const NAV_PREFIX: &str = "report_nav:";

/// Serves one report button click with an ephemeral, paginated reply.
///
/// Any failure is logged and, when possible, reported to the user with the
/// generic error text of the guild's language.
pub async fn handle_trigger(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    trigger: &ReportTrigger,
    reports: &ReportService,
) {
    info!(
        "Report {:?} for battle {} requested by {}",
        trigger.kind, trigger.battle_id, interaction.user.name
    );

    if let Err(e) = show_report(ctx, interaction, trigger, reports).await {
        error!(
            "Failed to show {:?} report for battle {}: {:#}",
            trigger.kind, trigger.battle_id, e
        );
        let _ = interaction
            .edit_response(
                &ctx.http,
                EditInteractionResponse::new()
                    .content(trigger.language.texts().report_error)
                    .embeds(Vec::new())
                    .components(Vec::new()),
            )
            .await;
    }
}

async fn show_report(
    ctx: &serenity::Context,
    interaction: &ComponentInteraction,
    trigger: &ReportTrigger,
    reports: &ReportService,
) -> anyhow::Result<()> {
    interaction
        .defer_ephemeral(&ctx.http)
        .await
        .context("Failed to acknowledge report button")?;

    let texts = trigger.language.texts();
    let mut paginator = reports.assemble(trigger).await?;

    if paginator.is_empty() {
        let empty = match trigger.kind {
            ReportKind::Players => texts.no_deaths,
            ReportKind::Purchases => texts.no_items,
        };
        interaction
            .edit_response(&ctx.http, EditInteractionResponse::new().content(empty))
            .await?;
        return Ok(());
    }

    let message = interaction
        .edit_response(
            &ctx.http,
            EditInteractionResponse::new()
                .embed(render_page(trigger, &paginator))
                .components(nav_rows(&paginator, false)),
        )
        .await?;

    if paginator.page_count() < 2 {
        return Ok(());
    }

    let _open = reports.track_view(message.id.get());
    loop {
        let Some(press) = message
            .await_component_interaction(ctx)
            .timeout(reports.nav_timeout())
            .await
        else {
            // Idle: leave the page visible, disable the controls.
            debug!("Report navigation for battle {} timed out", trigger.battle_id);
            let _ = interaction
                .edit_response(
                    &ctx.http,
                    EditInteractionResponse::new().components(nav_rows(&paginator, true)),
                )
                .await;
            return Ok(());
        };

        if let Some(nav) = press
            .data
            .custom_id
            .strip_prefix(NAV_PREFIX)
            .and_then(PageNav::from_key)
        {
            paginator.apply(nav);
        }

        press
            .create_response(
                &ctx.http,
                CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .embed(render_page(trigger, &paginator))
                        .components(nav_rows(&paginator, false)),
                ),
            )
            .await?;
    }
}

pub fn render_page(trigger: &ReportTrigger, paginator: &Paginator<ReportRow>) -> CreateEmbed {
    let language = trigger.language;
    let mut embed = match trigger.kind {
        ReportKind::Players => CreateEmbed::new()
            .title(language.players_title(trigger.battle_id))
            .color(0x3498DB),
        ReportKind::Purchases => CreateEmbed::new()
            .title(language.purchases_title(trigger.battle_id))
            .color(0x2ECC71),
    };

    let mut lines = Vec::new();
    for row in paginator.current_page().unwrap_or_default() {
        match row {
            ReportRow::Field { name, value } => {
                embed = embed.field(name.as_str(), value.as_str(), false);
            }
            ReportRow::Line(line) => lines.push(line.as_str()),
        }
    }
    if trigger.kind == ReportKind::Purchases {
        let description = format!(
            "{}\n\n{}",
            language.texts().purchases_description,
            lines.join("\n")
        );
        embed = embed.description(truncate_chars(&description, DISCORD_EMBED_LIMIT));
    }

    if paginator.page_count() > 1 {
        embed = embed.footer(CreateEmbedFooter::new(language.page_footer(
            paginator.current_index() + 1,
            paginator.page_count(),
        )));
    }
    embed
}

/// First/prev/next/last buttons. Single-page reports get no controls.
pub fn nav_rows<T>(paginator: &Paginator<T>, all_disabled: bool) -> Vec<CreateActionRow> {
    if paginator.page_count() < 2 {
        return Vec::new();
    }

    let buttons = PageNav::ALL
        .into_iter()
        .map(|nav| {
            let at_bound = match nav {
                PageNav::First | PageNav::Prev => !paginator.can_go_back(),
                PageNav::Next | PageNav::Last => !paginator.can_go_forward(),
            };
            nav_button(nav, all_disabled || at_bound)
        })
        .collect();

    vec![CreateActionRow::Buttons(buttons)]
}

/// The nav row with every control off, for replies that lost their collector.
pub fn disabled_nav_row() -> CreateActionRow {
    CreateActionRow::Buttons(
        PageNav::ALL
            .into_iter()
            .map(|nav| nav_button(nav, true))
            .collect(),
    )
}

fn nav_button(nav: PageNav, disabled: bool) -> CreateButton {
    CreateButton::new(format!("{}{}", NAV_PREFIX, nav.key()))
        .emoji(serenity::ReactionType::Unicode(nav.emoji().to_string()))
        .style(ButtonStyle::Secondary)
        .disabled(disabled)
}

/// Acknowledges a nav click on a reply whose collector is gone and turns its
/// controls off, keeping the page that is on screen.
pub async fn expire_orphaned_nav(ctx: &serenity::Context, press: &ComponentInteraction) {
    debug!(
        "Nav click on stale report message {} by {}",
        press.message.id, press.user.name
    );
    let response = CreateInteractionResponse::UpdateMessage(
        CreateInteractionResponseMessage::new().components(vec![disabled_nav_row()]),
    );
    if let Err(e) = press.create_response(&ctx.http, response).await {
        error!("Failed to expire report navigation: {}", e);
    }
}
