//! Pack assembly and JSON export
//!
//! The pack file is what the card-game bot consumes. Field order follows the
//! struct declarations and list order follows resolution order, so the same
//! sheets always produce the same bytes.

use crate::bundle::Bundle;
use crate::card::{Card, Rarity};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Wire form of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportCard {
    /// Composite display name
    pub name: String,
    /// Company line shown under the name
    pub subtext: Option<String>,
    pub character: Option<String>,
    pub rarity: Rarity,
    /// File name of the cropped image
    pub image_url: Option<String>,
    pub image_credit: Option<String>,
    pub image_source: Option<String>,
}

impl From<&Card> for ExportCard {
    fn from(card: &Card) -> Self {
        Self {
            name: card.card_name(),
            subtext: card.company.clone(),
            character: card.character.clone(),
            rarity: card.rarity,
            image_url: card.resized_uri.clone(),
            image_credit: card.image_credit.clone(),
            image_source: card.source_url.clone(),
        }
    }
}

/// Everything exported for one release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    pub name: String,
    pub cards: Vec<ExportCard>,
    pub bundles: Vec<Bundle>,
}

impl Pack {
    /// Load a pack from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the pack to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Find a card by composite name
    pub fn find_card(&self, name: &str) -> Option<&ExportCard> {
        self.cards.iter().find(|c| c.name == name)
    }

    /// Find a bundle by name
    pub fn find_bundle(&self, name: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.name == name)
    }
}

/// Wrap resolved cards and bundles into a pack
pub fn assemble_pack(name: impl Into<String>, cards: &[Card], bundles: Vec<Bundle>) -> Pack {
    Pack {
        name: name.into(),
        cards: cards.iter().map(ExportCard::from).collect(),
        bundles,
    }
}

/// Write only the card list
pub fn export_cards_json<P: AsRef<Path>>(pack: &Pack, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(&pack.cards)?;
    fs::write(path, content)?;
    Ok(())
}

/// Write only the bundle list
pub fn export_bundles_json<P: AsRef<Path>>(pack: &Pack, path: P) -> Result<()> {
    let content = serde_json::to_string_pretty(&pack.bundles)?;
    fs::write(path, content)?;
    Ok(())
}
