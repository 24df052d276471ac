//! Summary statistics for a pack
//!
//! A `StatsContext` loads a finished pack into an in-memory SQLite database
//! and answers the release checklist questions: how many bundles each
//! character is in, how rarities spread per character, and what each
//! company contributes.

use crate::card::Rarity;
use crate::error::Result;
use crate::pack::Pack;
use rusqlite::{params, Connection};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE cards (
        name      TEXT NOT NULL,
        character TEXT,
        subtext   TEXT,
        rarity    TEXT NOT NULL
    );
    CREATE TABLE bundles (bundle_name TEXT PRIMARY KEY);
    CREATE TABLE card_bundles (
        bundle_name TEXT NOT NULL REFERENCES bundles(bundle_name),
        card_name   TEXT NOT NULL
    );
    CREATE TABLE character_bundles (
        bundle_name    TEXT NOT NULL REFERENCES bundles(bundle_name),
        character_name TEXT NOT NULL
    );
    CREATE VIEW characters(character) AS
        SELECT DISTINCT character FROM cards WHERE character IS NOT NULL;
";

/// Bundle counts for one character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterMembership {
    pub character: String,
    pub character_bundles: u32,
    pub card_bundles: u32,
}

impl CharacterMembership {
    pub fn total(&self) -> u32 {
        self.character_bundles + self.card_bundles
    }
}

/// Card counts per rarity for one character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRarities {
    pub character: String,
    pub common: u32,
    pub rare: u32,
    pub special_rare: u32,
}

/// Characters and cards for one subtext (company)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtextCount {
    pub subtext: String,
    pub characters: u32,
    pub cards: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub cards: u32,
    pub characters: u32,
    pub bundles: u32,
}

/// Query context over one pack
pub struct StatsContext {
    conn: Connection,
    timestamp: bool,
}

impl StatsContext {
    /// Build the in-memory database from a pack
    pub fn from_pack(pack: &Pack) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        let tx = conn.transaction()?;
        {
            let mut insert_card = tx.prepare(
                "INSERT INTO cards (name, character, subtext, rarity) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for card in &pack.cards {
                insert_card.execute(params![
                    card.name,
                    card.character,
                    card.subtext,
                    card.rarity.as_str()
                ])?;
            }

            let mut insert_bundle =
                tx.prepare("INSERT OR IGNORE INTO bundles (bundle_name) VALUES (?1)")?;
            let mut insert_card_member =
                tx.prepare("INSERT INTO card_bundles (bundle_name, card_name) VALUES (?1, ?2)")?;
            let mut insert_character_member = tx.prepare(
                "INSERT INTO character_bundles (bundle_name, character_name) VALUES (?1, ?2)",
            )?;

            for bundle in &pack.bundles {
                insert_bundle.execute(params![bundle.name])?;
                for card in &bundle.cards {
                    insert_card_member.execute(params![bundle.name, card])?;
                }
                for character in &bundle.characters {
                    insert_character_member.execute(params![bundle.name, character])?;
                }
            }
        }
        tx.commit()?;

        log::debug!(
            "Loaded {} cards and {} bundles into stats database",
            pack.cards.len(),
            pack.bundles.len()
        );
        Ok(Self {
            conn,
            timestamp: true,
        })
    }

    /// Whether the report starts with a generation timestamp (on by default)
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Bundles each character appears in, directly or through its card
    pub fn bundle_membership(&self) -> Result<Vec<CharacterMembership>> {
        let mut stmt = self.conn.prepare(
            "SELECT ch.character,
                (SELECT COUNT(DISTINCT chb.bundle_name) FROM character_bundles chb
                    WHERE chb.character_name = ch.character),
                (SELECT COUNT(DISTINCT cb.bundle_name) FROM card_bundles cb
                    JOIN cards ca ON ca.name = cb.card_name
                    WHERE ca.character = ch.character)
             FROM characters ch
             ORDER BY ch.character",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CharacterMembership {
                character: row.get(0)?,
                character_bundles: row.get(1)?,
                card_bundles: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Rarity counts per character
    pub fn character_rarities(&self) -> Result<Vec<CharacterRarities>> {
        let mut stmt = self.conn.prepare(
            "SELECT ch.character,
                SUM(CASE WHEN ca.rarity = ?1 THEN 1 ELSE 0 END),
                SUM(CASE WHEN ca.rarity = ?2 THEN 1 ELSE 0 END),
                SUM(CASE WHEN ca.rarity = ?3 THEN 1 ELSE 0 END)
             FROM characters ch
             LEFT JOIN cards ca ON ca.character = ch.character
             GROUP BY ch.character
             ORDER BY ch.character",
        )?;
        let rows = stmt.query_map(
            params![
                Rarity::Common.as_str(),
                Rarity::Rare.as_str(),
                Rarity::SpecialRare.as_str()
            ],
            |row| {
                Ok(CharacterRarities {
                    character: row.get(0)?,
                    common: row.get(1)?,
                    rare: row.get(2)?,
                    special_rare: row.get(3)?,
                })
            },
        )?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Characters and cards per subtext
    pub fn subtexts(&self) -> Result<Vec<SubtextCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT subtext, COUNT(DISTINCT character), COUNT(*)
             FROM cards
             WHERE subtext IS NOT NULL
             GROUP BY subtext
             ORDER BY subtext",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SubtextCount {
                subtext: row.get(0)?,
                characters: row.get(1)?,
                cards: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn totals(&self) -> Result<Totals> {
        let (cards, characters) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT character) FROM cards",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let bundles = self
            .conn
            .query_row("SELECT COUNT(*) FROM bundles", [], |row| row.get(0))?;
        Ok(Totals {
            cards,
            characters,
            bundles,
        })
    }

    /// Render every report as text tables
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.timestamp {
            writeln!(
                out,
                "Generated {}\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            )?;
        }

        let mut table = TextTable::new(&["Character Name", "Total", "Char", "Card"]);
        for m in self.bundle_membership()? {
            table.add_row(vec![
                m.character.clone(),
                m.total().to_string(),
                m.character_bundles.to_string(),
                m.card_bundles.to_string(),
            ]);
        }
        writeln!(out, "Number of bundles per character:")?;
        writeln!(out, "{}\n", table.render())?;

        let mut table = TextTable::new(&[
            "Character Name",
            Rarity::Common.short_name(),
            Rarity::Rare.short_name(),
            Rarity::SpecialRare.short_name(),
        ]);
        for r in self.character_rarities()? {
            table.add_row(vec![
                r.character,
                r.common.to_string(),
                r.rare.to_string(),
                r.special_rare.to_string(),
            ]);
        }
        writeln!(out, "Rarities per character:")?;
        writeln!(out, "{}\n", table.render())?;

        let mut table = TextTable::new(&["Subtext", "Characters", "Cards"]);
        for s in self.subtexts()? {
            table.add_row(vec![s.subtext, s.characters.to_string(), s.cards.to_string()]);
        }
        writeln!(out, "Subtext/Company counts:")?;
        writeln!(out, "{}\n", table.render())?;

        let totals = self.totals()?;
        let mut table = TextTable::new(&["Item", "Total"]);
        table.add_row(vec!["Cards".to_string(), totals.cards.to_string()]);
        table.add_row(vec!["Characters".to_string(), totals.characters.to_string()]);
        table.add_row(vec!["Bundles".to_string(), totals.bundles.to_string()]);
        writeln!(out, "Totals:")?;
        writeln!(out, "{}", table.render())?;

        Ok(())
    }

    /// Write the report to a file
    pub fn write_report_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_report(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Boxed plain-text table
#[derive(Debug, Clone)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let border = format!(
            "+{}+",
            widths
                .iter()
                .map(|w| "-".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("+")
        );
        let line = |cells: &[String]| {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    format!(" {}{} ", cell, " ".repeat(w - cell.chars().count()))
                })
                .collect();
            format!("|{}|", padded.join("|"))
        };

        let mut out = vec![border.clone(), line(self.headers.as_slice()), border.clone()];
        out.extend(self.rows.iter().map(|r| line(r.as_slice())));
        out.push(border);
        out.join("\n")
    }
}
