//! Gather local artwork referenced by the card sheet into one directory
//!
//! Sheets tend to point at files scattered across someone's disk. This
//! copies every `file://` artwork outside the export directory into it and
//! rewrites the `File URI` cell, so the sheet and its art can travel together.

use crate::error::{Error, Result};
use crate::images::{file_uri, ImageSource};
use crate::rows::COL_FILE_URI;
use crate::table::Table;
use std::fs;
use std::path::Path;

/// Rewrite `File URI` cells that point outside `export_dir`
///
/// Returns the number of cells rewritten. Remote URLs, plain paths and
/// files already inside `export_dir` are left alone.
pub fn fixup_file_uris<P: AsRef<Path>>(table: &mut Table, export_dir: P) -> Result<usize> {
    let export_dir = export_dir.as_ref();
    let col = table
        .find_column(COL_FILE_URI)
        .map(|c| c.index)
        .ok_or_else(|| Error::MissingColumn {
            sheet: table.name.clone(),
            column: COL_FILE_URI.to_string(),
        })?;

    fs::create_dir_all(export_dir)?;
    let export_dir = export_dir.canonicalize()?;

    let mut rewritten = 0;
    for row in &mut table.rows {
        let Some(uri) = row.get(col) else {
            continue;
        };
        if !uri.starts_with("file://") {
            continue;
        }

        let ImageSource::Local(path) = ImageSource::parse(uri)? else {
            continue;
        };
        // Compare resolved paths so symlinked routes into export_dir count as inside
        let resolved = path.canonicalize().unwrap_or_else(|_| path.clone());
        if resolved.starts_with(&export_dir) {
            continue;
        }

        let Some(file_name) = path.file_name() else {
            log::warn!("Row {}: '{}' has no file name, leaving it", row.line, uri);
            continue;
        };
        let target = export_dir.join(file_name);

        log::info!("Copying {} to {}", path.display(), target.display());
        fs::copy(&path, &target).map_err(|e| Error::FileRead {
            path: path.clone(),
            source: e,
        })?;

        row.set(col, Some(file_uri(&target)));
        rewritten += 1;
    }

    log::info!(
        "Rewrote {} '{}' cells in '{}'",
        rewritten,
        COL_FILE_URI,
        table.name
    );
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_csv_str;

    #[test]
    fn test_fixup_copies_outside_files() {
        let art_dir = tempfile::tempdir().unwrap();
        let export = tempfile::tempdir().unwrap();
        let export_dir = export.path().canonicalize().unwrap();

        let outside = art_dir.path().join("alice.png");
        fs::write(&outside, b"alice").unwrap();
        let inside = export_dir.join("bob.png");
        fs::write(&inside, b"bob").unwrap();

        let csv = format!(
            "Name,Rarity,File URI\nAlice,Common,{}\nBob,Rare,{}\nCarol,Rare,https://example.com/c.png\nDave,Rare,\n",
            file_uri(&outside),
            file_uri(&inside)
        );
        let mut table = parse_csv_str(&csv, "Cards").unwrap();

        let count = fixup_file_uris(&mut table, &export_dir).unwrap();
        assert_eq!(count, 1);

        let expected = export_dir.join("alice.png");
        assert_eq!(fs::read(&expected).unwrap(), b"alice");
        assert_eq!(table.value(0, "File URI"), Some(file_uri(&expected).as_str()));
        assert_eq!(table.value(1, "File URI"), Some(file_uri(&inside).as_str()));
        assert_eq!(
            table.value(2, "File URI"),
            Some("https://example.com/c.png")
        );
        assert_eq!(table.value(3, "File URI"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_fixup_leaves_files_reached_through_symlink() {
        let art_dir = tempfile::tempdir().unwrap();
        let export = tempfile::tempdir().unwrap();
        fs::write(export.path().join("bob.png"), b"bob").unwrap();

        let link = art_dir.path().join("exported");
        std::os::unix::fs::symlink(export.path(), &link).unwrap();
        let via_link = link.join("bob.png");

        let csv = format!("Name,Rarity,File URI\nBob,Rare,{}\n", file_uri(&via_link));
        let mut table = parse_csv_str(&csv, "Cards").unwrap();

        assert_eq!(fixup_file_uris(&mut table, export.path()).unwrap(), 0);
        assert_eq!(fs::read(export.path().join("bob.png")).unwrap(), b"bob");
        assert_eq!(table.value(0, "File URI"), Some(file_uri(&via_link).as_str()));
    }

    #[test]
    fn test_fixup_requires_column() {
        let export = tempfile::tempdir().unwrap();
        let mut table = parse_csv_str("Name,Rarity\nAlice,Common\n", "Cards").unwrap();
        let err = fixup_file_uris(&mut table, export.path()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }

    #[test]
    fn test_fixup_missing_source_file() {
        let export = tempfile::tempdir().unwrap();
        let csv = "Name,Rarity,File URI\nAlice,Common,file:///nonexistent/alice.png\n";
        let mut table = parse_csv_str(csv, "Cards").unwrap();
        let err = fixup_file_uris(&mut table, export.path()).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
