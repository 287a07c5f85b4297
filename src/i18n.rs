//! Report and notification strings for the two supported guild languages.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    /// Key used by the item catalog's `localizedNames` map.
    pub fn locale_key(self) -> &'static str {
        match self {
            Language::Es => "ES-ES",
            Language::En => "EN-US",
        }
    }

    /// Unknown codes fall back to Spanish, the default for registered guilds.
    pub fn from_code(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }

    pub fn texts(self) -> &'static Texts {
        match self {
            Language::Es => &ES,
            Language::En => &EN,
        }
    }

    pub fn quality_label(self, quality: i64) -> String {
        let table = &self.texts().quality_names;
        match quality {
            1..=4 => table[(quality - 1) as usize].to_string(),
            n => match self {
                Language::Es => format!("Calidad {}", n),
                Language::En => format!("Quality {}", n),
            },
        }
    }

    pub fn battle_title(self, battle_id: i64) -> String {
        match self {
            Language::Es => format!("⚔️ Batalla detectada: {}", battle_id),
            Language::En => format!("⚔️ Battle detected: {}", battle_id),
        }
    }

    pub fn deaths_description(self, deaths: usize, guild_name: &str) -> String {
        match self {
            Language::Es => format!(
                "Se han registrado **{}** bajas de **{}**.",
                deaths, guild_name
            ),
            Language::En => format!(
                "**{}** deaths recorded for **{}**.",
                deaths, guild_name
            ),
        }
    }

    pub fn players_title(self, battle_id: i64) -> String {
        match self {
            Language::Es => format!("📜 Reporte de bajas - Batalla {}", battle_id),
            Language::En => format!("📜 Loss report - Battle {}", battle_id),
        }
    }

    pub fn purchases_title(self, battle_id: i64) -> String {
        match self {
            Language::Es => format!("🛒 Lista de compras - Batalla {}", battle_id),
            Language::En => format!("🛒 Shopping list - Battle {}", battle_id),
        }
    }

    pub fn page_footer(self, page: usize, total: usize) -> String {
        match self {
            Language::Es => format!("Página {}/{}", page, total),
            Language::En => format!("Page {}/{}", page, total),
        }
    }

    /// Groups digits in threes: `1,234,567` in English, `1.234.567` in Spanish.
    pub fn format_number(self, value: i64) -> String {
        let separator = match self {
            Language::Es => '.',
            Language::En => ',',
        };
        let digits = value.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(separator);
            }
            grouped.push(ch);
        }
        if value < 0 {
            grouped.insert(0, '-');
        }
        grouped
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            _ => Err(()),
        }
    }
}

pub struct Texts {
    pub field_start: &'static str,
    pub field_fame: &'static str,
    pub field_kills: &'static str,
    pub button_players: &'static str,
    pub button_purchases: &'static str,
    pub purchases_description: &'static str,
    pub no_deaths: &'static str,
    pub no_items: &'static str,
    pub no_items_for_player: &'static str,
    pub no_battle: &'static str,
    pub report_error: &'static str,
    pub quality_names: [&'static str; 4],
}

static ES: Texts = Texts {
    field_start: "📅 Inicio",
    field_fame: "💰 Fama total",
    field_kills: "💀 Asesinatos",
    button_players: "📋 Reporte por jugador",
    button_purchases: "🛒 Resumen de compras",
    purchases_description: "Items necesarios para reequipar todas las bajas",
    no_deaths: "No se encontraron muertes para esta batalla.",
    no_items: "No hay items registrados para esta batalla.",
    no_items_for_player: "Sin items registrados",
    no_battle: "No hay datos registrados para esa batalla.",
    report_error: "Ocurrió un error al generar el reporte.",
    quality_names: ["Buena", "Sobresaliente", "Excelente", "Obra maestra"],
};

static EN: Texts = Texts {
    field_start: "📅 Start",
    field_fame: "💰 Total fame",
    field_kills: "💀 Kills",
    button_players: "📋 Per-player report",
    button_purchases: "🛒 Purchase summary",
    purchases_description: "Items needed to re-equip every death",
    no_deaths: "No deaths were found for this battle.",
    no_items: "No items were recorded for this battle.",
    no_items_for_player: "No items recorded",
    no_battle: "No data is stored for that battle.",
    report_error: "An error occurred generating the report.",
    quality_names: ["Good", "Outstanding", "Excellent", "Masterpiece"],
};
