//! Pipeline configuration file

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

fn default_image_dir() -> PathBuf {
    PathBuf::from("images")
}

fn default_crop_dir() -> PathBuf {
    PathBuf::from("cropped")
}

fn default_pack_file() -> PathBuf {
    PathBuf::from("pack.json")
}

fn default_stats_file() -> Option<PathBuf> {
    Some(PathBuf::from("stats.txt"))
}

fn default_true() -> bool {
    true
}

/// Settings for one pipeline run
///
/// Relative output paths are resolved against `export_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory of sheet CSV exports
    pub workbook: PathBuf,
    /// Directory everything is written to
    pub export_dir: PathBuf,
    /// Pack (edition) name
    pub pack_name: String,
    /// Local copies of the original artwork
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,
    /// Fixed-size card images
    #[serde(default = "default_crop_dir")]
    pub crop_dir: PathBuf,
    #[serde(default = "default_pack_file")]
    pub pack_file: PathBuf,
    /// Card list on its own, if wanted
    #[serde(default)]
    pub card_file: Option<PathBuf>,
    /// Bundle list on its own, if wanted
    #[serde(default)]
    pub bundle_file: Option<PathBuf>,
    #[serde(default = "default_stats_file")]
    pub stats_file: Option<PathBuf>,
    /// Put a generation time at the top of the stats report
    #[serde(default = "default_true")]
    pub stats_timestamp: bool,
    /// Operator crop choices
    #[serde(default)]
    pub crop_plan: Option<PathBuf>,
    /// Framed card previews, if wanted
    #[serde(default)]
    pub preview_dir: Option<PathBuf>,
    /// TrueType/OpenType font for preview text
    #[serde(default)]
    pub preview_font: Option<PathBuf>,
}

impl PipelineConfig {
    /// Config with default output names
    pub fn new(
        workbook: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
        pack_name: impl Into<String>,
    ) -> Self {
        Self {
            workbook: workbook.into(),
            export_dir: export_dir.into(),
            pack_name: pack_name.into(),
            image_dir: default_image_dir(),
            crop_dir: default_crop_dir(),
            pack_file: default_pack_file(),
            card_file: None,
            bundle_file: None,
            stats_file: default_stats_file(),
            stats_timestamp: true,
            crop_plan: None,
            preview_dir: None,
            preview_font: None,
        }
    }

    /// Load a config file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve a path against the export directory
    pub fn output_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.export_dir.join(path)
        }
    }

    pub fn image_path(&self) -> PathBuf {
        self.output_path(&self.image_dir)
    }

    pub fn crop_path(&self) -> PathBuf {
        self.output_path(&self.crop_dir)
    }

    pub fn pack_path(&self) -> PathBuf {
        self.output_path(&self.pack_file)
    }

    pub fn card_path(&self) -> Option<PathBuf> {
        self.card_file.as_deref().map(|p| self.output_path(p))
    }

    pub fn bundle_path(&self) -> Option<PathBuf> {
        self.bundle_file.as_deref().map(|p| self.output_path(p))
    }

    pub fn stats_path(&self) -> Option<PathBuf> {
        self.stats_file.as_deref().map(|p| self.output_path(p))
    }

    pub fn preview_path(&self) -> Option<PathBuf> {
        self.preview_dir.as_deref().map(|p| self.output_path(p))
    }
}
