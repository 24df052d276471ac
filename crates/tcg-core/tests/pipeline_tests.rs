use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tcg_core::images::file_uri;
use tcg_core::{run_pipeline, Error, Pack, PipelineConfig, Rarity};
use tempfile::TempDir;

fn write_art(dir: &Path, name: &str, w: u32, h: u32) -> String {
    let path = dir.join(name);
    RgbaImage::from_pixel(w, h, Rgba([30, 60, 90, 255]))
        .save(&path)
        .unwrap();
    file_uri(&path)
}

/// Workbook with one plain card, one variant, a row without rarity and a
/// card without artwork
fn create_workbook(root: &Path) -> std::path::PathBuf {
    let art = root.join("art");
    let sheets = root.join("sheets");
    fs::create_dir_all(&art).unwrap();
    fs::create_dir_all(&sheets).unwrap();

    let alice = write_art(&art, "Alice Original.png", 800, 600);
    let holiday = write_art(&art, "holiday.png", 400, 900);

    fs::write(
        sheets.join("Cards.csv"),
        format!(
            "Name,Variant,Group,Company,Rarity,Credit,Source URL,File URI\n\
             Alice,,,Acme,Common,@artist,https://example.com/alice,{alice}\n\
             Alice,Holiday,Alice,Acme,SpecialRare,@artist,,{holiday}\n\
             Bob,,,Globex,,,,\n\
             Carol,,,Globex,Rare,,,\n"
        ),
    )
    .unwrap();
    fs::write(
        sheets.join("Card Groups.csv"),
        "Name,Variant,Group Name\nAlice,Holiday,Starter\nBob,,Starter\n",
    )
    .unwrap();
    fs::write(
        sheets.join("Character Groups.csv"),
        "Name,Variant,Group Name\nAlice,,Starter\nNobody,,Ghosts\nCarol,,Friends\n",
    )
    .unwrap();
    fs::write(
        sheets.join("Meta Groups.csv"),
        "Name,Group Name\nStarter,Everything\nFriends,Everything\n",
    )
    .unwrap();

    sheets
}

fn config_for(root: &TempDir) -> PipelineConfig {
    let sheets = create_workbook(root.path());
    let mut config = PipelineConfig::new(sheets, root.path().join("export"), "First Edition");
    config.card_file = Some("card_data.json".into());
    config.bundle_file = Some("bundle_data.json".into());
    config
}

#[test]
fn test_full_pipeline() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);

    let summary = run_pipeline(&config).unwrap();
    assert_eq!(summary.cards, 3);
    assert_eq!(summary.bundles, 3);
    assert_eq!(summary.images, 2);
    assert_eq!(summary.crops, 2);
    assert_eq!(summary.previews, 0);
    assert_eq!(summary.files_written.len(), 4);

    let pack = Pack::load(&summary.pack_path).unwrap();
    assert_eq!(pack.name, "First Edition");

    let names: Vec<&str> = pack.cards.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Alice (Holiday)", "Carol"]);

    let alice = pack.find_card("Alice").unwrap();
    assert_eq!(alice.character.as_deref(), Some("Alice"));
    assert_eq!(alice.subtext.as_deref(), Some("Acme"));
    assert_eq!(alice.image_url.as_deref(), Some("alice.png"));
    assert_eq!(alice.image_source.as_deref(), Some("https://example.com/alice"));

    let holiday = pack.find_card("Alice (Holiday)").unwrap();
    assert_eq!(holiday.rarity, Rarity::SpecialRare);
    assert_eq!(holiday.character, None);
    assert_eq!(holiday.image_url.as_deref(), Some("alice_holiday.png"));

    let carol = pack.find_card("Carol").unwrap();
    assert_eq!(carol.image_url, None);

    let bundle_names: Vec<&str> = pack.bundles.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(bundle_names, vec!["Starter", "Friends", "Everything"]);

    let starter = pack.find_bundle("Starter").unwrap();
    assert_eq!(starter.cards, vec!["Alice (Holiday)"]);
    assert_eq!(starter.characters, vec!["Alice"]);

    let everything = pack.find_bundle("Everything").unwrap();
    assert_eq!(everything.sub_bundles, vec!["Starter", "Friends"]);
    assert!(pack.find_bundle("Ghosts").is_none());

    let export = config.export_dir.clone();
    assert_eq!(
        image::image_dimensions(export.join("cropped").join("alice.png")).unwrap(),
        (550, 750)
    );
    assert!(export.join("images").join("alice.png").exists());
    assert!(export.join("card_data.json").exists());
    assert!(export.join("bundle_data.json").exists());

    let stats = fs::read_to_string(export.join("stats.txt")).unwrap();
    assert!(stats.contains("Totals:"));
}

#[test]
fn test_pipeline_output_is_deterministic() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);

    let first = run_pipeline(&config).unwrap();
    let first_bytes = fs::read(&first.pack_path).unwrap();

    // Second run reuses cached artwork and crops
    let second = run_pipeline(&config).unwrap();
    let second_bytes = fs::read(&second.pack_path).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn test_untimestamped_stats_are_reproducible() {
    let root = TempDir::new().unwrap();
    let mut config = config_for(&root);
    config.stats_timestamp = false;

    let first = run_pipeline(&config).unwrap();
    let stats_path = config.stats_path().unwrap();
    let first_stats = fs::read(&stats_path).unwrap();
    run_pipeline(&config).unwrap();

    assert!(first.files_written.contains(&stats_path));
    assert_eq!(first_stats, fs::read(&stats_path).unwrap());
}

#[test]
fn test_pipeline_renders_previews() {
    let root = TempDir::new().unwrap();
    let mut config = config_for(&root);
    config.preview_dir = Some("previews".into());

    let summary = run_pipeline(&config).unwrap();
    assert_eq!(summary.previews, 2);

    let preview = config.export_dir.join("previews").join("alice_holiday.png");
    assert_eq!(image::image_dimensions(preview).unwrap(), (600, 800));
    assert!(!config.export_dir.join("previews").join("carol.png").exists());
}

#[test]
fn test_extensionless_artwork_is_sniffed() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);

    // JPEG bytes behind a name with no extension, like a media URL
    let art = root.path().join("art").join("media_XYZ");
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(400, 900, image::Rgb([1, 2, 3])))
        .save_with_format(&art, image::ImageFormat::Jpeg)
        .unwrap();
    fs::write(
        config.workbook.join("Cards.csv"),
        format!("Name,Rarity,File URI\nAlice,Common,{}\n", file_uri(&art)),
    )
    .unwrap();

    let summary = run_pipeline(&config).unwrap();
    assert_eq!(summary.crops, 1);
    assert!(config.image_path().join("alice.jpg").exists());
    assert_eq!(
        image::image_dimensions(config.crop_path().join("alice.png")).unwrap(),
        (550, 750)
    );
}

#[test]
fn test_invalid_rarity_aborts_before_writing() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);
    fs::write(
        config.workbook.join("Cards.csv"),
        "Name,Rarity\nAlice,Common\nBob,Legendary\n",
    )
    .unwrap();

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, Error::InvalidRarity(ref r) if r == "Legendary"));
    assert!(!config.pack_path().exists());
}

#[test]
fn test_missing_bundle_column_aborts() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);
    fs::write(
        config.workbook.join("Card Groups.csv"),
        "Name,Variant\nAlice,Holiday\n",
    )
    .unwrap();

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, Error::MissingColumn { ref column, .. } if column == "Group Name"));
}
