pub mod albion;
pub mod cache;
pub mod commands;
pub mod config;
pub mod db;
pub mod i18n;
pub mod interactions;
pub mod items;
pub mod monitor;
pub mod notify;
pub mod report;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub db: db::Database,
    pub reports: report::ReportService,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
