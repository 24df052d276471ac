//! Card identity model and card resolution

use crate::error::{Error, Result};
use crate::rows::{CardRow, COL_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Fill used behind transparent artwork unless the crop plan says otherwise
pub const DEFAULT_BACKGROUND: [u8; 4] = [255, 255, 255, 0];

/// Characters stripped from names when building file names
const INVALID_FILENAME_CHARS: &[char] = &['(', ')', '\'', '"', '[', ']', '{', '}'];

/// The three rarity levels a card can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    SpecialRare,
}

impl Rarity {
    /// Abbreviation printed on card frames and in stats headers
    pub fn short_name(&self) -> &'static str {
        match self {
            Rarity::Common => "C",
            Rarity::Rare => "R",
            Rarity::SpecialRare => "SR",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::SpecialRare => "SpecialRare",
        }
    }
}

impl FromStr for Rarity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Common" => Ok(Rarity::Common),
            "Rare" => Ok(Rarity::Rare),
            "SpecialRare" => Ok(Rarity::SpecialRare),
            other => Err(Error::InvalidRarity(other.to_string())),
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite display name shared by cards and bundle entries
pub fn composite_name(name: &str, variant: Option<&str>) -> String {
    match variant {
        Some(v) => format!("{} ({})", name, v),
        None => name.to_string(),
    }
}

/// A resolved card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub variant: Option<String>,
    /// Character this card's artwork belongs to; `None` for grouped rows
    pub character: Option<String>,
    pub company: Option<String>,
    pub rarity: Rarity,
    pub image_credit: Option<String>,
    /// Page the artwork came from
    pub source_url: Option<String>,
    /// Where the original artwork lives (URL or file URI)
    pub image_file_uri: Option<String>,
    /// Set once the artwork has been copied or downloaded
    pub local_image_path: Option<PathBuf>,
    /// Set once the fixed-size crop exists
    pub resized_uri: Option<String>,
    pub background_fill: [u8; 4],
}

impl Card {
    /// Create a card with no provenance fields set
    pub fn new(name: impl Into<String>, variant: Option<&str>, rarity: Rarity) -> Self {
        Self {
            name: name.into(),
            variant: variant.map(str::to_string),
            character: None,
            company: None,
            rarity,
            image_credit: None,
            source_url: None,
            image_file_uri: None,
            local_image_path: None,
            resized_uri: None,
            background_fill: DEFAULT_BACKGROUND,
        }
    }

    /// Display name, `"{name} ({variant})"` when there is a variant
    pub fn card_name(&self) -> String {
        composite_name(&self.name, self.variant.as_deref())
    }

    /// File-system safe name for this card's images
    pub fn image_filename(&self, suffix: &str) -> String {
        let base = match &self.variant {
            Some(v) => format!("{}_{}", self.name, v),
            None => self.name.clone(),
        };
        let cleaned: String = base
            .chars()
            .filter(|c| !INVALID_FILENAME_CHARS.contains(c))
            .collect();
        format!("{}{}", cleaned.replace(' ', "_").to_lowercase(), suffix)
    }

    /// Build a card from a sheet row
    ///
    /// Returns `Ok(None)` for rows without a rarity.
    pub fn from_row(row: &CardRow, sheet: &str) -> Result<Option<Self>> {
        let rarity = match row.rarity.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(r) => r.parse::<Rarity>()?,
        };

        let name = row
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Error::MissingField {
                sheet: sheet.to_string(),
                row: row.line,
                column: COL_NAME.to_string(),
            })?;

        let variant = row
            .variant
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let mut card = Card::new(name, variant, rarity);
        if row.group.is_none() {
            card.character = Some(name.to_string());
        }
        card.company = row.company.clone();
        card.image_credit = row.credit.clone();
        card.source_url = row.source_url.clone();
        card.image_file_uri = row.file_uri.clone();

        Ok(Some(card))
    }
}

/// Resolve card rows into cards, dropping rows without a rarity
pub fn resolve_cards(rows: &[CardRow]) -> Result<Vec<Card>> {
    resolve_sheet_cards(rows, "Cards")
}

/// Same as [`resolve_cards`], naming the sheet in errors
pub fn resolve_sheet_cards(rows: &[CardRow], sheet: &str) -> Result<Vec<Card>> {
    let mut cards = Vec::with_capacity(rows.len());
    for row in rows {
        match Card::from_row(row, sheet)? {
            Some(card) => cards.push(card),
            None => log::debug!("Dropping row {} of '{}': no rarity", row.line, sheet),
        }
    }
    log::info!(
        "Resolved {} cards from {} rows of '{}'",
        cards.len(),
        rows.len(),
        sheet
    );
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, variant: Option<&str>, group: Option<&str>, rarity: Option<&str>) -> CardRow {
        CardRow {
            line: 2,
            name: Some(name.to_string()),
            variant: variant.map(str::to_string),
            group: group.map(str::to_string),
            rarity: rarity.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_rarity_parse() {
        assert_eq!("Common".parse::<Rarity>().unwrap(), Rarity::Common);
        assert_eq!("Rare".parse::<Rarity>().unwrap(), Rarity::Rare);
        assert_eq!("SpecialRare".parse::<Rarity>().unwrap(), Rarity::SpecialRare);
    }

    #[test]
    fn test_rarity_rejects_spaced_spelling() {
        let err = "Special Rare".parse::<Rarity>().unwrap_err();
        assert!(matches!(err, Error::InvalidRarity(ref r) if r == "Special Rare"));
    }

    #[test]
    fn test_rarity_parse_invalid() {
        let err = "Legendary".parse::<Rarity>().unwrap_err();
        assert!(matches!(err, Error::InvalidRarity(ref r) if r == "Legendary"));
        assert!("common".parse::<Rarity>().is_err());
    }

    #[test]
    fn test_rarity_short_names() {
        assert_eq!(Rarity::Common.short_name(), "C");
        assert_eq!(Rarity::Rare.short_name(), "R");
        assert_eq!(Rarity::SpecialRare.short_name(), "SR");
    }

    #[test]
    fn test_card_name_composite() {
        let plain = Card::new("Alice", None, Rarity::Common);
        assert_eq!(plain.card_name(), "Alice");

        let variant = Card::new("Alice", Some("Holiday"), Rarity::Rare);
        assert_eq!(variant.card_name(), "Alice (Holiday)");
    }

    #[test]
    fn test_image_filename() {
        let card = Card::new("Mr. O'Brien", Some("Summer (Beach)"), Rarity::Rare);
        assert_eq!(card.image_filename(".png"), "mr._obrien_summer_beach.png");

        let card = Card::new("Alice", None, Rarity::Common);
        assert_eq!(card.image_filename(".jpg"), "alice.jpg");
    }

    #[test]
    fn test_from_row_without_group_sets_character() {
        let card = Card::from_row(&row("  Alice ", None, None, Some("Common")), "Cards")
            .unwrap()
            .unwrap();
        assert_eq!(card.name, "Alice");
        assert_eq!(card.character.as_deref(), Some("Alice"));
        assert_eq!(card.background_fill, DEFAULT_BACKGROUND);
        assert_eq!(card.local_image_path, None);
        assert_eq!(card.resized_uri, None);
    }

    #[test]
    fn test_from_row_with_group_leaves_character_empty() {
        let card = Card::from_row(
            &row("Alice", Some(" Holiday "), Some("Alice"), Some("Rare")),
            "Cards",
        )
        .unwrap()
        .unwrap();
        assert_eq!(card.variant.as_deref(), Some("Holiday"));
        assert_eq!(card.character, None);
        assert_eq!(card.card_name(), "Alice (Holiday)");
    }

    #[test]
    fn test_from_row_missing_name_is_fatal() {
        let mut r = row("", None, None, Some("Common"));
        r.name = None;
        r.line = 7;
        let err = Card::from_row(&r, "Cards").unwrap_err();
        assert!(matches!(err, Error::MissingField { row: 7, .. }));
    }

    #[test]
    fn test_resolve_cards_drops_rows_without_rarity() {
        let rows = vec![
            row("Alice", None, None, Some("Common")),
            row("Bob", None, None, None),
            row("Carol", None, None, Some("")),
            row("Alice", Some("Holiday"), Some("Alice"), Some("SpecialRare")),
        ];
        let cards = resolve_cards(&rows).unwrap();

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].card_name(), "Alice");
        assert_eq!(cards[1].card_name(), "Alice (Holiday)");
    }

    #[test]
    fn test_resolve_cards_invalid_rarity_is_fatal() {
        let rows = vec![
            row("Alice", None, None, Some("Common")),
            row("Bob", None, None, Some("Legendary")),
        ];
        let err = resolve_cards(&rows).unwrap_err();
        assert!(matches!(err, Error::InvalidRarity(_)));
    }

    #[test]
    fn test_rarity_serializes_as_variant_name() {
        let json = serde_json::to_string(&Rarity::SpecialRare).unwrap();
        assert_eq!(json, "\"SpecialRare\"");
    }
}
