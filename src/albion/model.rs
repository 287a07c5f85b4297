use crate::i18n::Language;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One entry of the `/battles` listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleSummary {
    pub id: i64,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub total_fame: Option<i64>,
    #[serde(default)]
    pub total_kills: Option<i64>,
}

/// One kill event from `/events/battle/{id}`. Only the victim side is used.
#[derive(Debug, Clone, Deserialize)]
pub struct BattleEvent {
    #[serde(rename = "TimeStamp", default)]
    pub timestamp: Option<String>,
    #[serde(rename = "Victim", default)]
    pub victim: Option<Victim>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Victim {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name", default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(rename = "GuildId", default)]
    pub guild_id: Option<String>,
    /// Slot name to item snapshot, in payload order. Slot values are often `null`.
    #[serde(rename = "Equipment", default)]
    pub equipment: Option<Map<String, Value>>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentItem {
    #[serde(rename = "Type", default)]
    pub item_type: Option<String>,
    #[serde(rename = "Quality", default)]
    pub quality: Option<i64>,
    #[serde(rename = "Count", default)]
    pub count: Option<i64>,
}

/// An equipment slot that carried an item when its owner died.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LostSlot {
    pub slot: String,
    pub item_type: String,
    pub quality: i64,
    pub quantity: i64,
}

impl Victim {
    pub fn belongs_to(&self, albion_guild_id: &str) -> bool {
        self.guild_id.as_deref() == Some(albion_guild_id)
    }

    /// Slots holding a typed item. Empty, `null` and non-object slots are skipped.
    pub fn lost_slots(&self) -> Vec<LostSlot> {
        let Some(equipment) = &self.equipment else {
            return Vec::new();
        };

        equipment
            .iter()
            .filter(|(_, raw)| raw.is_object())
            .filter_map(|(slot, raw)| {
                let item: EquipmentItem = serde_json::from_value(raw.clone()).ok()?;
                let item_type = item.item_type.filter(|t| !t.trim().is_empty())?;
                Some(LostSlot {
                    slot: slot.clone(),
                    item_type,
                    quality: item.quality.unwrap_or(0),
                    quantity: item.count.unwrap_or(1),
                })
            })
            .collect()
    }
}

impl BattleEvent {
    /// Typed view of one raw log entry. `None` means the entry is malformed
    /// (e.g. a victim without `Id`) and should be skipped.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        serde_json::from_value(raw.clone()).ok()
    }
}

/// Catalog record from `/items/{key}/data`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub unique_name: String,
    #[serde(default)]
    pub localized_names: Option<HashMap<String, String>>,
}

impl ItemData {
    pub fn localized_name(&self, language: Language) -> String {
        self.localized_names
            .as_ref()
            .and_then(|names| names.get(language.locale_key()))
            .filter(|name| !name.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| self.unique_name.clone())
    }
}
