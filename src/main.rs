//! # labelsheet CLI
//!
//! Command-line interface for printable code label sheets.
//!
//! ## Usage
//!
//! ```bash
//! # Export a label list as a PDF sheet
//! labelsheet export --labels labels.json --settings settings.json
//!
//! # PNG pages (a ZIP when there is more than one page)
//! labelsheet export --labels labels.json --format png --out out/
//!
//! # How many 4 x 3 cm labels fit on A4?
//! labelsheet capacity --width 4 --height 3
//!
//! # Label size for a 3 x 8 grid
//! labelsheet capacity --grid 3x8
//!
//! # Serve the HTTP API
//! labelsheet serve --listen 0.0.0.0:8080
//! ```

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use labelsheet::{
    assets,
    export::{self, ExportRequest, DEFAULT_BASE_NAME},
    layout::PageGeometry,
    paper::PaperConfig,
    render::SymbolRenderer,
    serialize::SerializeOptions,
    server::{self, ServerConfig},
    settings::{ExportFormat, PageLayoutSettings, PrintSettings, DEFAULT_SPACING_CM},
    Label, SheetError,
};

/// labelsheet - QR, barcode and Data Matrix label sheets for A4
#[derive(Parser, Debug)]
#[command(name = "labelsheet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a label list to a PDF, PNG or SVG sheet
    Export {
        /// JSON array of labels
        #[arg(long, value_name = "FILE")]
        labels: PathBuf,

        /// JSON print settings (defaults apply to missing fields)
        #[arg(long, value_name = "FILE")]
        settings: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Pdf)]
        format: ExportFormat,

        /// Output file or directory (defaults to the current directory)
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Base file name
        #[arg(long, default_value = DEFAULT_BASE_NAME)]
        name: String,
    },

    /// Show how many labels fit on one A4 page
    Capacity {
        /// Label width in cm
        #[arg(long, default_value_t = 4.0)]
        width: f64,

        /// Label height in cm
        #[arg(long, default_value_t = 3.0)]
        height: f64,

        /// Spacing between labels in cm
        #[arg(long, default_value_t = DEFAULT_SPACING_CM)]
        spacing: f64,

        /// Force a column count
        #[arg(long)]
        columns: Option<u32>,

        /// Size labels from a grid instead, e.g. "3x8"
        #[arg(long, value_name = "CxR", value_parser = parse_grid)]
        grid: Option<(u32, u32)>,
    },

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,
    },
}

fn parse_grid(value: &str) -> Result<(u32, u32), String> {
    let (c, r) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected CxR, got '{}'", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("invalid grid count '{}'", s))
    };
    Ok((parse(c)?, parse(r)?))
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), SheetError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            labels,
            settings,
            format,
            out,
            name,
        } => {
            let labels: Vec<Label> = read_json(&labels)?;
            let settings: PrintSettings = match settings {
                Some(path) => read_json(&path)?,
                None => PrintSettings::default(),
            };
            let request = ExportRequest {
                labels,
                settings,
                format,
                base_name: name,
            };

            let runtime = tokio::runtime::Runtime::new()?;
            let assets = runtime.block_on(async {
                let client = assets::http_client()?;
                Ok::<_, SheetError>(assets::resolve(&request.settings, &client).await)
            })?;

            let options = SerializeOptions {
                creation_date: Some(Utc::now()),
                ..Default::default()
            };
            let file = export::run_with(&request, &assets, &SymbolRenderer, &options)?;

            let path = match out {
                Some(out) if out.is_dir() => out.join(&file.filename),
                Some(out) => out,
                None => PathBuf::from(&file.filename),
            };
            std::fs::write(&path, &file.bytes)?;
            println!(
                "Wrote {} ({} page{}, {} bytes)",
                path.display(),
                file.pages,
                if file.pages == 1 { "" } else { "s" },
                file.bytes.len()
            );
        }

        Commands::Capacity {
            width,
            height,
            spacing,
            columns,
            grid,
        } => {
            let layout = match grid {
                Some((c, r)) => PageLayoutSettings::from_grid(c, r, spacing),
                None => PageLayoutSettings {
                    label_width_cm: width,
                    label_height_cm: height,
                    spacing_x_cm: spacing,
                    spacing_y_cm: spacing,
                    forced_columns_per_row: columns.filter(|&c| c > 0),
                },
            };
            let geometry = PageGeometry::for_paper(&PaperConfig::A4, &layout)?;
            println!(
                "Label: {:.2} x {:.2} cm, spacing {:.2} cm",
                layout.label_width_cm, layout.label_height_cm, layout.spacing_x_cm
            );
            println!(
                "Grid:  {} columns x {} rows = {} labels per page",
                geometry.columns, geometry.rows, geometry.labels_per_page
            );
        }

        Commands::Serve { listen } => {
            info!(listen = %listen, "starting server");
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(ServerConfig {
                listen_addr: listen,
            }))?;
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SheetError> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| {
        SheetError::InvalidRequest(format!("{}: {}", path.display(), e))
    })
}
