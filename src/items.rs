//! Item identifiers (`BASE_TYPE[@ENCHANT]`) and their display names.

use crate::albion::{GameDataApi, ItemData};
use crate::cache::{CachedItem, ItemCache};
use crate::i18n::Language;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemIdentifier {
    pub base_type: String,
    pub enchant: u32,
}

impl ItemIdentifier {
    /// Never fails: a missing or unparsable enchant suffix reads as level 0.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('@') {
            Some((base, level)) => Self {
                base_type: base.to_string(),
                enchant: level.trim().parse().unwrap_or(0),
            },
            None => Self {
                base_type: raw.to_string(),
                enchant: 0,
            },
        }
    }
}

/// Resolves catalog keys to localized names through a shared [`ItemCache`].
#[derive(Clone)]
pub struct ItemNameResolver {
    api: Arc<dyn GameDataApi>,
    cache: ItemCache,
}

impl ItemNameResolver {
    pub fn new(api: Arc<dyn GameDataApi>, cache: ItemCache) -> Self {
        Self { api, cache }
    }

    pub async fn resolve(&self, item_key: &str, language: Language) -> Option<String> {
        self.resolve_at(item_key, language, Utc::now()).await
    }

    /// Cached lookup. A "not found" answer is remembered for the cache TTL;
    /// transport and status failures are not cached so the next call retries.
    pub async fn resolve_at(
        &self,
        item_key: &str,
        language: Language,
        now: DateTime<Utc>,
    ) -> Option<String> {
        self.lookup(item_key, now)
            .await
            .map(|item| item.localized_name(language))
    }

    async fn lookup(&self, item_key: &str, now: DateTime<Utc>) -> Option<ItemData> {
        match self.cache.get(item_key, now) {
            Some(CachedItem::Found(item)) => return Some(item),
            Some(CachedItem::NotFound) => return None,
            None => {}
        }

        match self.api.item_data(item_key).await {
            Ok(Some(item)) => {
                self.cache
                    .insert(item_key, CachedItem::Found(item.clone()), now);
                Some(item)
            }
            Ok(None) => {
                debug!("Item catalog has no entry for {}", item_key);
                self.cache.insert(item_key, CachedItem::NotFound, now);
                None
            }
            Err(e) => {
                warn!("Item lookup for {} failed: {}", item_key, e);
                None
            }
        }
    }

    /// Full label for a lost item, e.g. `Adept's Broadsword.2 (Excellent)`.
    ///
    /// The base type is tried first, then the full identifier (some catalog
    /// entries are keyed by the enchanted variant), and finally the raw
    /// identifier is used as the name.
    pub async fn display_name(&self, identifier: &str, quality: i64, language: Language) -> String {
        let parsed = ItemIdentifier::parse(identifier);

        let mut name = self.resolve(&parsed.base_type, language).await;
        if name.is_none() && parsed.base_type != identifier {
            name = self.resolve(identifier, language).await;
        }

        let mut label = name.unwrap_or_else(|| identifier.to_string());
        if parsed.enchant > 0 {
            label.push_str(&format!(".{}", parsed.enchant));
        }
        if quality > 0 {
            label.push_str(&format!(" ({})", language.quality_label(quality)));
        }
        label
    }
}
