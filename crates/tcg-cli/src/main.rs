//! TCG pack builder CLI
//!
//! Command-line tool for turning a card-set spreadsheet export into a pack.

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tcg_core::{
    fixup_file_uris, load_font, parse_csv, resolve_workbook, run_pipeline, write_csv, CropPlan,
    ImageStore, Pack, PipelineConfig, PreviewRenderer, StatsContext, Workbook,
};

#[derive(Parser)]
#[command(name = "tcg-cli")]
#[command(about = "Trading card pack builder", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the whole pipeline and write the pack
    Build {
        /// Pipeline config file (JSON)
        #[arg(short, long, conflicts_with_all = ["workbook", "export_dir", "name"])]
        config: Option<PathBuf>,

        /// Directory of sheet CSV exports
        #[arg(short, long, required_unless_present = "config")]
        workbook: Option<PathBuf>,

        /// Directory to export the pack and images to
        #[arg(short, long, required_unless_present = "config")]
        export_dir: Option<PathBuf>,

        /// Pack name
        #[arg(short, long, required_unless_present = "config")]
        name: Option<String>,

        /// Crop plan file (JSON)
        #[arg(long)]
        crop_plan: Option<PathBuf>,
    },

    /// Resolve and list the cards of a workbook
    Cards {
        /// Directory of sheet CSV exports
        #[arg(short, long)]
        workbook: PathBuf,
    },

    /// Resolve and list the bundles of a workbook
    Bundles {
        /// Directory of sheet CSV exports
        #[arg(short, long)]
        workbook: PathBuf,
    },

    /// Print statistics for an existing pack
    Stats {
        /// Pack file (JSON)
        #[arg(short, long)]
        pack: PathBuf,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Leave the generation time out of the report
        #[arg(long)]
        no_timestamp: bool,
    },

    /// Render framed previews for the cards of an existing pack
    Preview {
        /// Pack file (JSON)
        #[arg(short, long)]
        pack: PathBuf,

        /// Directory holding the cropped card images
        #[arg(short, long)]
        crop_dir: PathBuf,

        /// Directory to write previews to
        #[arg(short, long)]
        output: PathBuf,

        /// TrueType/OpenType font for the card text
        #[arg(short, long)]
        font: Option<PathBuf>,
    },

    /// Parse and display a single sheet CSV
    Parse {
        /// Path to CSV file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Copy local artwork into one directory and rewrite the File URI column
    FixupPaths {
        /// Card sheet CSV to read
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the rewritten sheet
        #[arg(short, long)]
        output: PathBuf,

        /// Directory to gather artwork into
        #[arg(short, long)]
        export_dir: PathBuf,
    },

    /// Fetch artwork and write a crop plan with centered regions
    CropPlan {
        /// Directory of sheet CSV exports
        #[arg(short, long)]
        workbook: PathBuf,

        /// Directory to put local artwork in
        #[arg(short, long)]
        image_dir: PathBuf,

        /// Output path for the crop plan
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Create a pipeline config template
    CreateConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,

        /// Directory of sheet CSV exports
        #[arg(short, long)]
        workbook: PathBuf,

        /// Directory to export to
        #[arg(short, long)]
        export_dir: PathBuf,

        /// Pack name
        #[arg(short, long)]
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level.as_str()),
    )
    .init();

    if let Err(e) = run(cli.command) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> tcg_core::Result<()> {
    match command {
        Commands::Build {
            config,
            workbook,
            export_dir,
            name,
            crop_plan,
        } => cmd_build(config, workbook, export_dir, name, crop_plan),
        Commands::Cards { workbook } => cmd_cards(&workbook),
        Commands::Bundles { workbook } => cmd_bundles(&workbook),
        Commands::Stats {
            pack,
            output,
            no_timestamp,
        } => cmd_stats(&pack, output.as_ref(), !no_timestamp),
        Commands::Preview {
            pack,
            crop_dir,
            output,
            font,
        } => cmd_preview(&pack, &crop_dir, &output, font.as_ref()),
        Commands::Parse { file } => cmd_parse(&file),
        Commands::FixupPaths {
            input,
            output,
            export_dir,
        } => cmd_fixup_paths(&input, &output, &export_dir),
        Commands::CropPlan {
            workbook,
            image_dir,
            output,
        } => cmd_crop_plan(&workbook, &image_dir, &output),
        Commands::CreateConfig {
            output,
            workbook,
            export_dir,
            name,
        } => cmd_create_config(&output, workbook, export_dir, name),
    }
}

fn cmd_build(
    config: Option<PathBuf>,
    workbook: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    name: Option<String>,
    crop_plan: Option<PathBuf>,
) -> tcg_core::Result<()> {
    // clap requires the three flags whenever --config is absent
    let mut config = match config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::new(
            workbook.unwrap_or_default(),
            export_dir.unwrap_or_default(),
            name.unwrap_or_default(),
        ),
    };
    if crop_plan.is_some() {
        config.crop_plan = crop_plan;
    }

    let summary = run_pipeline(&config)?;

    println!("Pack '{}' built:", config.pack_name);
    println!("  {} cards", summary.cards);
    println!("  {} bundles", summary.bundles);
    println!("  {} cards with artwork", summary.images);
    println!("  {} cards with card images", summary.crops);
    if config.preview_dir.is_some() {
        println!("  {} previews", summary.previews);
    }
    println!();
    println!("Files written:");
    for path in &summary.files_written {
        println!("  - {}", path.display());
    }

    if summary.crops < summary.cards {
        println!();
        println!(
            "Warning: {} cards have no card image",
            summary.cards - summary.crops
        );
    }

    Ok(())
}

fn cmd_cards(workbook: &PathBuf) -> tcg_core::Result<()> {
    let (cards, _) = resolve_workbook(workbook)?;

    println!("Cards ({}):", cards.len());
    println!();
    println!("Name\tRarity\tCharacter\tCompany");
    println!("{}", "-".repeat(48));
    for card in &cards {
        println!(
            "{}\t{}\t{}\t{}",
            card.card_name(),
            card.rarity.short_name(),
            card.character.as_deref().unwrap_or("-"),
            card.company.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

fn cmd_bundles(workbook: &PathBuf) -> tcg_core::Result<()> {
    let (_, bundles) = resolve_workbook(workbook)?;

    println!("Bundles ({}):", bundles.len());
    println!();
    for bundle in &bundles {
        println!("{}", bundle.name);
        if !bundle.cards.is_empty() {
            println!("  cards: {}", bundle.cards.join(", "));
        }
        if !bundle.characters.is_empty() {
            println!("  characters: {}", bundle.characters.join(", "));
        }
        if !bundle.sub_bundles.is_empty() {
            println!("  bundles: {}", bundle.sub_bundles.join(", "));
        }
    }

    Ok(())
}

fn cmd_stats(
    pack_path: &PathBuf,
    output: Option<&PathBuf>,
    timestamp: bool,
) -> tcg_core::Result<()> {
    let pack = Pack::load(pack_path)?;
    let stats = StatsContext::from_pack(&pack)?.with_timestamp(timestamp);

    match output {
        Some(path) => {
            stats.write_report_file(path)?;
            println!("Wrote stats for '{}' to {}", pack.name, path.display());
        }
        None => stats.write_report(&mut io::stdout().lock())?,
    }

    Ok(())
}

fn cmd_preview(
    pack_path: &PathBuf,
    crop_dir: &PathBuf,
    output: &PathBuf,
    font: Option<&PathBuf>,
) -> tcg_core::Result<()> {
    let pack = Pack::load(pack_path)?;
    let mut renderer = PreviewRenderer::new(crop_dir, output)?;
    if let Some(path) = font {
        renderer = renderer.with_font(load_font(path)?);
    }

    let count = renderer.render_all(&pack.cards)?;
    println!(
        "Rendered {} of {} previews to {}",
        count,
        pack.cards.len(),
        output.display()
    );

    Ok(())
}

fn cmd_parse(file: &PathBuf) -> tcg_core::Result<()> {
    let table = parse_csv(file)?;

    println!("File: {}", file.display());
    println!("Sheet: {}", table.name);
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    let header: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    for row in table.rows.iter().take(10) {
        let values: Vec<&str> = (0..table.column_count())
            .map(|i| row.get(i).unwrap_or(""))
            .collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > 10 {
        println!("... ({} more rows)", table.row_count() - 10);
    }

    Ok(())
}

fn cmd_fixup_paths(
    input: &PathBuf,
    output: &PathBuf,
    export_dir: &PathBuf,
) -> tcg_core::Result<()> {
    let mut table = parse_csv(input)?;
    let rewritten = fixup_file_uris(&mut table, export_dir)?;
    write_csv(&table, output)?;

    println!(
        "Rewrote {} of {} rows, wrote {}",
        rewritten,
        table.row_count(),
        output.display()
    );

    Ok(())
}

fn cmd_crop_plan(workbook: &PathBuf, image_dir: &PathBuf, output: &PathBuf) -> tcg_core::Result<()> {
    let mut cards = Workbook::open(workbook)?.read_cards()?;
    let store = ImageStore::new(image_dir)?;
    store.materialize_all(&mut cards)?;

    let plan = CropPlan::for_cards(&cards)?;
    plan.save(output)?;

    println!("Created crop plan: {}", output.display());
    println!("Cards: {}", plan.cards.len());
    println!();
    println!("Adjust the regions, then run:");
    println!(
        "  tcg-cli build --workbook {} --export-dir <dir> --name <pack> --crop-plan {}",
        workbook.display(),
        output.display()
    );

    Ok(())
}

fn cmd_create_config(
    output: &PathBuf,
    workbook: PathBuf,
    export_dir: PathBuf,
    name: String,
) -> tcg_core::Result<()> {
    let mut config = PipelineConfig::new(workbook, export_dir, name);
    config.card_file = Some(PathBuf::from("card_data.json"));
    config.bundle_file = Some(PathBuf::from("bundle_data.json"));

    config.save(output)?;
    println!("Created config file: {}", output.display());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!();
    println!("Edit the file to configure your build, then run:");
    println!("  tcg-cli build --config {}", output.display());

    Ok(())
}
