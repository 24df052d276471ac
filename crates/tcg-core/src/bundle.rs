//! Bundle resolution
//!
//! Bundle sheets list memberships one row at a time. Every row names a
//! bundle (`Group Name`) and a card, character or other bundle, depending on
//! which sheet it came from. Resolution groups the rows per bundle, checks
//! card and character references against the resolved cards, and drops
//! anything it can't verify. Sub-bundle references are kept as-is so a
//! bundle may point at one defined later in the sheets.

use crate::card::{composite_name, Card};
use crate::error::{Error, Result};
use crate::rows::BundleRow;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Which kind of sheet a membership row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleType {
    /// Rows name individual cards
    Card,
    /// Rows name characters
    Character,
    /// Rows name other bundles
    Meta,
}

impl BundleType {
    pub const ALL: [BundleType; 3] = [BundleType::Card, BundleType::Character, BundleType::Meta];

    /// Workbook sheet holding rows of this type
    pub fn sheet_name(&self) -> &'static str {
        match self {
            BundleType::Card => "Card Groups",
            BundleType::Character => "Character Groups",
            BundleType::Meta => "Meta Groups",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BundleType::Card => "card",
            BundleType::Character => "character",
            BundleType::Meta => "meta",
        }
    }
}

impl FromStr for BundleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(BundleType::Card),
            "character" => Ok(BundleType::Character),
            "meta" => Ok(BundleType::Meta),
            _ => Err(Error::InvalidBundleType(s.to_string())),
        }
    }
}

impl fmt::Display for BundleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named group of cards, characters and other bundles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    pub name: String,
    /// Composite card names
    pub cards: Vec<String>,
    pub characters: Vec<String>,
    /// Names of other bundles
    pub sub_bundles: Vec<String>,
}

impl Bundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cards: Vec::new(),
            characters: Vec::new(),
            sub_bundles: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty() && self.characters.is_empty() && self.sub_bundles.is_empty()
    }
}

/// A membership row with its identity fields normalized
#[derive(Debug, Clone)]
struct BundleEntry {
    name: String,
    card_name: String,
    bundle_name: String,
    bundle_type: BundleType,
}

impl BundleEntry {
    fn from_row(row: &BundleRow) -> Self {
        let name = row.name.trim().to_string();
        let variant = row
            .variant
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty());
        Self {
            card_name: composite_name(&name, variant),
            name,
            bundle_name: row.bundle_name.trim().to_string(),
            bundle_type: row.bundle_type,
        }
    }
}

/// Entries grouped by bundle name, in order of first appearance
#[derive(Debug, Default)]
struct BundleGroups {
    groups: Vec<(String, Vec<BundleEntry>)>,
    index: HashMap<String, usize>,
}

impl BundleGroups {
    fn push(&mut self, entry: BundleEntry) {
        match self.index.get(&entry.bundle_name) {
            Some(&i) => self.groups[i].1.push(entry),
            None => {
                self.index.insert(entry.bundle_name.clone(), self.groups.len());
                self.groups.push((entry.bundle_name.clone(), vec![entry]));
            }
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Resolve membership rows from all bundle sheets into bundles
///
/// Card references must match a card's composite name and character
/// references a card's character; anything else is dropped. Bundles left
/// with no members are not emitted.
pub fn resolve_bundles(rows: &[BundleRow], cards: &[Card]) -> Vec<Bundle> {
    let mut grouped = BundleGroups::default();
    for row in rows {
        grouped.push(BundleEntry::from_row(row));
    }

    let valid_characters: HashSet<&str> =
        cards.iter().filter_map(|c| c.character.as_deref()).collect();
    let valid_cards: HashSet<String> = cards.iter().map(Card::card_name).collect();

    let mut bundles = Vec::with_capacity(grouped.groups.len());
    for (bundle_name, entries) in &grouped.groups {
        let mut bundle = Bundle::new(bundle_name.clone());

        for entry in entries {
            match entry.bundle_type {
                BundleType::Card => {
                    if valid_cards.contains(&entry.card_name) {
                        push_unique(&mut bundle.cards, &entry.card_name);
                    } else {
                        log::debug!(
                            "Bundle '{}': dropping unknown card '{}'",
                            bundle_name,
                            entry.card_name
                        );
                    }
                }
                BundleType::Character => {
                    if valid_characters.contains(entry.name.as_str()) {
                        push_unique(&mut bundle.characters, &entry.card_name);
                    } else {
                        log::debug!(
                            "Bundle '{}': dropping unknown character '{}'",
                            bundle_name,
                            entry.name
                        );
                    }
                }
                BundleType::Meta => push_unique(&mut bundle.sub_bundles, &entry.name),
            }
        }

        if bundle.is_empty() {
            log::info!("Bundle '{}' has no valid members, skipping", bundle_name);
            continue;
        }
        bundles.push(bundle);
    }

    log::info!(
        "Resolved {} bundles from {} rows ({} distinct names)",
        bundles.len(),
        rows.len(),
        grouped.groups.len()
    );
    bundles
}
