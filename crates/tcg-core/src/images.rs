//! Artwork acquisition: copy or download each card's source image

use crate::card::Card;
use crate::error::{Error, Result};
use image::{DynamicImage, ImageReader};
use std::fs;
use std::path::{Path, PathBuf};

const USER_AGENT: &str = "tcg-pack-builder/0.1";

/// Extensions a copy may have been saved under when the source had none
const SNIFFED_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".gif", ".webp"];

/// Where a card's original artwork can be fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// http(s) URL
    Remote(String),
    /// Local file, from a `file://` URI or a plain path
    Local(PathBuf),
}

impl ImageSource {
    /// Classify a `File URI` cell
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        let lower = uri.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(ImageSource::Remote(uri.to_string()));
        }

        if let Some(rest) = uri.strip_prefix("file://") {
            // file://host/path is not something a spreadsheet points at
            if !rest.starts_with('/') {
                return Err(Error::UnsupportedUri(uri.to_string()));
            }
            let decoded =
                urlencoding::decode(rest).map_err(|_| Error::UnsupportedUri(uri.to_string()))?;
            return Ok(ImageSource::Local(PathBuf::from(decoded.into_owned())));
        }

        if uri.is_empty() || lower.contains("://") {
            return Err(Error::UnsupportedUri(uri.to_string()));
        }

        Ok(ImageSource::Local(PathBuf::from(uri)))
    }

    /// File extension of the source, with the leading dot
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            ImageSource::Remote(url) => {
                let path = url.split(&['?', '#'][..]).next().unwrap_or(url);
                path.rsplit('/').next().unwrap_or(path).to_string()
            }
            ImageSource::Local(path) => path.file_name()?.to_string_lossy().into_owned(),
        };
        Path::new(&name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
    }
}

/// Build a `file://` URI for a local path
pub fn file_uri(path: &Path) -> String {
    let encoded: Vec<String> = path
        .to_string_lossy()
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("file://{}", encoded.join("/"))
}

/// Decode an image, trusting its contents over its file extension
pub fn open_image(path: &Path) -> Result<DynamicImage> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Pixel size of an image, sniffing the format like [`open_image`]
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.into_dimensions()?)
}

/// Extension matching the image format of `bytes`, `.png` if unknown
fn sniffed_extension(bytes: &[u8]) -> String {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| ".png".to_string())
}

/// Fetch an image over HTTP
pub fn fetch_image(url: &str) -> Result<Vec<u8>> {
    log::debug!("Fetching image: {}", url);

    let response = reqwest::blocking::Client::new()
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()?;

    if response.status().is_success() {
        Ok(response.bytes()?.to_vec())
    } else {
        Err(Error::HttpStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        })
    }
}

/// Directory holding local copies of every card's artwork
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        log::info!("Image directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy or download the card's artwork, unless a copy already exists
    ///
    /// Returns `Ok(None)` for cards with no `File URI`.
    pub fn materialize(&self, card: &mut Card) -> Result<Option<PathBuf>> {
        let Some(uri) = card.image_file_uri.as_deref() else {
            log::warn!("Card '{}' has no File URI, skipping artwork", card.card_name());
            return Ok(None);
        };

        let source = ImageSource::parse(uri)?;
        let extension = source.extension();

        let target = match self.existing_copy(card, extension.as_deref()) {
            Some(path) => {
                log::debug!("Skipping {} as it already exists", path.display());
                path
            }
            None => self.fetch(card, &source, extension)?,
        };

        card.local_image_path = Some(target.clone());
        Ok(Some(target))
    }

    /// A copy saved by an earlier run, if any
    fn existing_copy(&self, card: &Card, extension: Option<&str>) -> Option<PathBuf> {
        let candidates: Vec<&str> = match extension {
            Some(ext) => vec![ext],
            None => SNIFFED_EXTENSIONS.to_vec(),
        };
        candidates
            .into_iter()
            .map(|ext| self.dir.join(card.image_filename(ext)))
            .find(|path| path.exists())
    }

    /// Download or copy the artwork into the store
    ///
    /// Sources without an extension are named after their sniffed format.
    fn fetch(
        &self,
        card: &Card,
        source: &ImageSource,
        extension: Option<String>,
    ) -> Result<PathBuf> {
        match (source, extension) {
            (ImageSource::Local(path), Some(ext)) => {
                let target = self.dir.join(card.image_filename(&ext));
                log::info!("Copying {} to {}", path.display(), target.display());
                fs::copy(path, &target).map_err(|e| Error::FileRead {
                    path: path.clone(),
                    source: e,
                })?;
                Ok(target)
            }
            (source, extension) => {
                let bytes = match source {
                    ImageSource::Remote(url) => {
                        log::info!("Downloading {}", url);
                        fetch_image(url)?
                    }
                    ImageSource::Local(path) => fs::read(path).map_err(|e| Error::FileRead {
                        path: path.clone(),
                        source: e,
                    })?,
                };
                let ext = extension.unwrap_or_else(|| sniffed_extension(&bytes));
                let target = self.dir.join(card.image_filename(&ext));
                log::info!("Saving artwork as {}", target.display());
                fs::write(&target, bytes)?;
                Ok(target)
            }
        }
    }

    /// Materialize artwork for every card, stopping at the first failure
    pub fn materialize_all(&self, cards: &mut [Card]) -> Result<usize> {
        let mut count = 0;
        for card in cards.iter_mut() {
            if self.materialize(card)?.is_some() {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rarity;

    #[test]
    fn test_parse_remote() {
        assert_eq!(
            ImageSource::parse("https://example.com/a.png").unwrap(),
            ImageSource::Remote("https://example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_parse_file_uri_decodes() {
        assert_eq!(
            ImageSource::parse("file:///home/me/My%20Art/alice.png").unwrap(),
            ImageSource::Local(PathBuf::from("/home/me/My Art/alice.png"))
        );
    }

    #[test]
    fn test_parse_plain_path() {
        assert_eq!(
            ImageSource::parse("art/alice.jpg").unwrap(),
            ImageSource::Local(PathBuf::from("art/alice.jpg"))
        );
    }

    #[test]
    fn test_parse_unsupported() {
        assert!(matches!(
            ImageSource::parse("ftp://example.com/a.png"),
            Err(Error::UnsupportedUri(_))
        ));
        assert!(ImageSource::parse("file://server/share/a.png").is_err());
    }

    #[test]
    fn test_extension() {
        let remote = ImageSource::Remote("https://example.com/img/Alice.JPG?size=large".to_string());
        assert_eq!(remote.extension().as_deref(), Some(".jpg"));

        let local = ImageSource::Local(PathBuf::from("/art/alice.webp"));
        assert_eq!(local.extension().as_deref(), Some(".webp"));

        let bare = ImageSource::Remote("https://example.com/media/12345".to_string());
        assert_eq!(bare.extension(), None);
    }

    #[test]
    fn test_file_uri_round_trip() {
        let path = PathBuf::from("/tmp/My Art/alice.png");
        let uri = file_uri(&path);
        assert_eq!(uri, "file:///tmp/My%20Art/alice.png");
        assert_eq!(ImageSource::parse(&uri).unwrap(), ImageSource::Local(path));
    }

    #[test]
    fn test_materialize_copies_local_file() {
        let src_dir = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("original.png");
        fs::write(&src, b"artwork").unwrap();

        let mut card = Card::new("Alice", Some("Holiday"), Rarity::Rare);
        card.image_file_uri = Some(file_uri(&src));

        let store = ImageStore::new(store_dir.path()).unwrap();
        let path = store.materialize(&mut card).unwrap().unwrap();

        assert_eq!(path, store_dir.path().join("alice_holiday.png"));
        assert_eq!(fs::read(&path).unwrap(), b"artwork");
        assert_eq!(card.local_image_path, Some(path));
    }

    #[test]
    fn test_materialize_reuses_existing_copy() {
        let store_dir = tempfile::tempdir().unwrap();
        fs::write(store_dir.path().join("alice.png"), b"cached").unwrap();

        let mut card = Card::new("Alice", None, Rarity::Common);
        // Source does not exist; the cached copy must win
        card.image_file_uri = Some("/nonexistent/alice.png".to_string());

        let store = ImageStore::new(store_dir.path()).unwrap();
        let path = store.materialize(&mut card).unwrap().unwrap();
        assert_eq!(fs::read(path).unwrap(), b"cached");
    }

    fn jpeg_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(8, 6, image::Rgb([10, 200, 30])))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
            .unwrap();
        bytes
    }

    #[test]
    fn test_materialize_names_extensionless_source_by_content() {
        let src_dir = tempfile::tempdir().unwrap();
        let store_dir = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("media_XYZ");
        fs::write(&src, jpeg_bytes()).unwrap();

        let mut card = Card::new("Alice", None, Rarity::Common);
        card.image_file_uri = Some(file_uri(&src));

        let store = ImageStore::new(store_dir.path()).unwrap();
        let path = store.materialize(&mut card).unwrap().unwrap();
        assert_eq!(path, store_dir.path().join("alice.jpg"));

        // Second run finds the sniffed copy without touching the source
        fs::remove_file(&src).unwrap();
        let mut again = Card::new("Alice", None, Rarity::Common);
        again.image_file_uri = Some(file_uri(&src));
        assert_eq!(store.materialize(&mut again).unwrap(), Some(path));
    }

    #[test]
    fn test_open_image_ignores_misleading_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alice.png");
        fs::write(&path, jpeg_bytes()).unwrap();

        assert_eq!(image_dimensions(&path).unwrap(), (8, 6));
        let decoded = open_image(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn test_sniffed_extension() {
        assert_eq!(sniffed_extension(&jpeg_bytes()), ".jpg");
        assert_eq!(sniffed_extension(b"not an image"), ".png");
    }

    #[test]
    fn test_materialize_without_uri() {
        let store_dir = tempfile::tempdir().unwrap();
        let mut card = Card::new("Alice", None, Rarity::Common);

        let store = ImageStore::new(store_dir.path()).unwrap();
        assert_eq!(store.materialize(&mut card).unwrap(), None);
        assert_eq!(card.local_image_path, None);
    }

    #[test]
    fn test_materialize_missing_source() {
        let store_dir = tempfile::tempdir().unwrap();
        let mut card = Card::new("Alice", None, Rarity::Common);
        card.image_file_uri = Some("/nonexistent/alice.png".to_string());

        let store = ImageStore::new(store_dir.path()).unwrap();
        let err = store.materialize(&mut card).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
