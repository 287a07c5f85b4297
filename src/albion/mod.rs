pub mod client;
pub mod model;

pub use client::{AlbionClient, ApiError, GameDataApi};
pub use model::{BattleEvent, BattleSummary, ItemData, LostSlot, Victim};
