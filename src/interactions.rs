//! Routing of component interactions that are not owned by a collector.

use crate::report::{view, ReportService, ReportTrigger};
use poise::serenity_prelude as serenity;
use tracing::debug;

/// Dispatches a report button click to its own task so slow reports never
/// hold up the gateway event loop. Returns whether the interaction was taken.
pub fn route_component(
    ctx: &serenity::Context,
    interaction: &serenity::Interaction,
    reports: &ReportService,
) -> bool {
    let Some(component) = interaction.as_message_component() else {
        return false;
    };
    // Live nav clicks belong to the collector of their reply.
    if reports.is_orphaned_nav(&component.data.custom_id, component.message.id.get()) {
        let ctx = ctx.clone();
        let component = component.clone();
        tokio::spawn(async move {
            view::expire_orphaned_nav(&ctx, &component).await;
        });
        return true;
    }

    let Some(trigger) = ReportTrigger::from_custom_id(&component.data.custom_id) else {
        debug!("Ignoring component {}", component.data.custom_id);
        return false;
    };

    let ctx = ctx.clone();
    let component = component.clone();
    let reports = reports.clone();
    tokio::spawn(async move {
        view::handle_trigger(&ctx, &component, &trigger, &reports).await;
    });
    true
}
