use serde::{Deserialize, Serialize};

// ============================================================================
// Steam Store API Types
// ============================================================================

/// Game metadata as returned in the `data` object of Steam's `appdetails`
///
/// Only the fields the recommendation flow reads are kept. The same shape is
/// written to the Redis cache, so every field tolerates absence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    #[serde(default)]
    pub steam_appid: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub header_image: String,
    #[serde(default)]
    pub developers: Vec<String>,
    #[serde(default)]
    pub publishers: Vec<String>,
    #[serde(default)]
    pub release_date: Option<ReleaseDate>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Absent for free-to-play titles
    #[serde(default)]
    pub price_overview: Option<PriceOverview>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReleaseDate {
    #[serde(default)]
    pub coming_soon: bool,
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceOverview {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Final price in cents, after any discount
    #[serde(rename = "final", default)]
    pub final_cents: i64,
    #[serde(default)]
    pub discount_percent: i64,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl CatalogEntry {
    /// Canonical title, if the catalog provides a non-blank one
    pub fn title(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Genre names in catalog order, skipping blank descriptions
    pub fn genre_names(&self) -> Vec<String> {
        self.genres
            .iter()
            .filter(|genre| !genre.description.is_empty())
            .map(|genre| genre.description.clone())
            .collect()
    }
}

// ============================================================================
// Display Types
// ============================================================================

/// Game card shown to the user; every field is a display-ready string
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayGame {
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    pub release_date: String,
    pub publisher: String,
    pub developer: String,
    pub price: String,
    pub sale_price: String,
    pub description: String,
}

impl From<&CatalogEntry> for DisplayGame {
    fn from(entry: &CatalogEntry) -> Self {
        DisplayGame {
            id: entry
                .steam_appid
                .map(|id| id.to_string())
                .unwrap_or_default(),
            title: entry.title().unwrap_or("Unknown Game").to_string(),
            thumbnail: entry.header_image.clone(),
            release_date: entry
                .release_date
                .as_ref()
                .map(|date| date.date.clone())
                .unwrap_or_default(),
            publisher: entry.publishers.join(", "),
            developer: entry.developers.join(", "),
            price: format_price(entry.price_overview.as_ref()),
            sale_price: format_sale_price(entry.price_overview.as_ref()),
            description: entry.short_description.clone(),
        }
    }
}

/// Formats a Steam price; no price structure means the game is free
pub fn format_price(price: Option<&PriceOverview>) -> String {
    let Some(price) = price else {
        return "Free to Play".to_string();
    };

    let amount = price.final_cents as f64 / 100.0;
    match price.currency.as_str() {
        "USD" => format!("${:.2}", amount),
        "EUR" => format!("€{:.2}", amount),
        "GBP" => format!("£{:.2}", amount),
        code => format!("{:.2} {}", amount, code),
    }
}

/// The current price when discounted, otherwise an empty string
pub fn format_sale_price(price: Option<&PriceOverview>) -> String {
    match price {
        Some(p) if p.discount_percent > 0 => format_price(Some(p)),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(currency: &str, final_cents: i64, discount_percent: i64) -> PriceOverview {
        PriceOverview {
            currency: currency.to_string(),
            final_cents,
            discount_percent,
        }
    }

    #[test]
    fn test_catalog_entry_deserialization() {
        let json = r#"{
            "type": "game",
            "name": "The Witcher 3: Wild Hunt",
            "steam_appid": 292030,
            "short_description": "You are Geralt of Rivia, mercenary monster slayer.",
            "header_image": "https://cdn.example/292030/header.jpg",
            "developers": ["CD PROJEKT RED"],
            "publishers": ["CD PROJEKT RED"],
            "price_overview": {
                "currency": "USD",
                "initial": 3999,
                "final": 799,
                "discount_percent": 80,
                "final_formatted": "$7.99"
            },
            "genres": [
                {"id": "3", "description": "RPG"},
                {"id": "1", "description": "Action"}
            ],
            "release_date": {"coming_soon": false, "date": "18 May, 2015"}
        }"#;

        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.steam_appid, Some(292030));
        assert_eq!(entry.title(), Some("The Witcher 3: Wild Hunt"));
        assert_eq!(entry.genre_names(), vec!["RPG", "Action"]);
        assert_eq!(entry.price_overview.as_ref().unwrap().final_cents, 799);
    }

    #[test]
    fn test_catalog_entry_tolerates_missing_fields() {
        let entry: CatalogEntry = serde_json::from_str(r#"{"steam_appid": 10}"#).unwrap();
        assert_eq!(entry.title(), None);
        assert!(entry.genre_names().is_empty());
        assert!(entry.price_overview.is_none());
    }

    #[test]
    fn test_blank_name_is_not_a_title() {
        let entry = CatalogEntry {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(entry.title(), None);
    }

    #[test]
    fn test_format_price_currencies() {
        assert_eq!(format_price(Some(&price("USD", 3999, 0))), "$39.99");
        assert_eq!(format_price(Some(&price("EUR", 1999, 0))), "€19.99");
        assert_eq!(format_price(Some(&price("GBP", 500, 0))), "£5.00");
        assert_eq!(format_price(Some(&price("CAD", 2599, 0))), "25.99 CAD");
    }

    #[test]
    fn test_format_price_free_to_play() {
        assert_eq!(format_price(None), "Free to Play");
    }

    #[test]
    fn test_format_sale_price() {
        assert_eq!(format_sale_price(Some(&price("USD", 799, 80))), "$7.99");
        assert_eq!(format_sale_price(Some(&price("USD", 3999, 0))), "");
        assert_eq!(format_sale_price(None), "");
    }

    #[test]
    fn test_display_game_from_entry() {
        let entry = CatalogEntry {
            steam_appid: Some(413150),
            name: Some("Stardew Valley".to_string()),
            short_description: "Farming life.".to_string(),
            header_image: "https://cdn.example/413150.jpg".to_string(),
            developers: vec!["ConcernedApe".to_string()],
            publishers: vec!["ConcernedApe".to_string(), "Chucklefish".to_string()],
            release_date: Some(ReleaseDate {
                coming_soon: false,
                date: "26 Feb, 2016".to_string(),
            }),
            genres: vec![],
            price_overview: Some(price("USD", 1499, 0)),
        };

        let game = DisplayGame::from(&entry);
        assert_eq!(game.id, "413150");
        assert_eq!(game.title, "Stardew Valley");
        assert_eq!(game.publisher, "ConcernedApe, Chucklefish");
        assert_eq!(game.developer, "ConcernedApe");
        assert_eq!(game.release_date, "26 Feb, 2016");
        assert_eq!(game.price, "$14.99");
        assert_eq!(game.sale_price, "");
    }

    #[test]
    fn test_display_game_serializes_camel_case() {
        let json = serde_json::to_value(DisplayGame::default()).unwrap();
        assert!(json.get("releaseDate").is_some());
        assert!(json.get("salePrice").is_some());
    }
}
