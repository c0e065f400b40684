use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use scraper::Html;
use tracing::info;
use tracing_subscriber::EnvFilter;

use listing_parser::preview::describe;
use listing_parser::{
    export_from_store, load_config, ExportError, ExportFormat, Exporter, JsonFileStore,
    ListingScanner, PreviewState, RecordStore,
};

#[derive(Debug, Parser)]
#[command(name = "listing-parser")]
#[command(about = "Collect product listings from saved results pages and export them")]
struct Cli {
    /// Store file (overrides LISTING_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract products from an HTML file and add them to the store
    Scan {
        file: PathBuf,
        /// URL the page was saved from
        #[arg(long)]
        page_url: Option<String>,
    },
    /// Report whether an HTML file looks like a results page
    Detect { file: PathBuf },
    /// Write the stored products to a file
    Export {
        #[arg(value_enum)]
        format: Format,
        /// URL of the current page, used to pick the file keyword
        #[arg(long)]
        page_url: Option<String>,
        /// Output directory (overrides LISTING_EXPORT_DIR)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Show one page of stored products
    Preview {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Print the number of stored products
    Count,
    /// Delete all stored products (export naming is kept)
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for ExportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => ExportFormat::Csv,
            Format::Json => ExportFormat::Json,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config()?;
    let store = JsonFileStore::new(cli.store.clone().unwrap_or_else(|| config.store_path.clone()));
    let scanner = ListingScanner::from_config(&config);

    match cli.command {
        Commands::Scan { file, page_url } => {
            if let Some(url) = page_url.as_deref() {
                if !scanner.is_supported_page(url) {
                    bail!(
                        "unsupported page: {url} (expected {} or a product listing)",
                        scanner.origin()
                    );
                }
            }
            let html = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;

            let records = scanner.scan_html(&html);
            if records.is_empty() {
                bail!("no items found; is {} a results page?", file.display());
            }
            let total = store.append_all(&records)?;
            println!("{} products extracted ({total} stored)", records.len());
        }
        Commands::Detect { file } => {
            let html = fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let listing = scanner.is_listing_page(&Html::parse_document(&html));
            println!("{}", if listing { "listing page" } else { "not a listing page" });
        }
        Commands::Export {
            format,
            page_url,
            out_dir,
        } => {
            let exporter = Exporter::new(config.export_prefix.clone());
            let artifact =
                match export_from_store(&store, &exporter, format.into(), page_url.as_deref()) {
                    Ok(artifact) => artifact,
                    Err(ExportError::NothingToExport) => bail!("nothing to export"),
                    Err(e) => return Err(e.into()),
                };

            let dir = out_dir.unwrap_or_else(|| config.export_dir.clone());
            fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
            let path = dir.join(&artifact.filename);
            fs::write(&path, &artifact.bytes)
                .with_context(|| format!("writing {}", path.display()))?;

            info!(path = %path.display(), format = %artifact.format, "export written");
            println!("saved {}", path.display());
        }
        Commands::Preview { page } => {
            let records = store.get_all()?;
            if records.is_empty() {
                bail!("nothing to preview");
            }

            let mut state = PreviewState::new(records.len(), config.page_size);
            state.go_to(page);
            for (offset, record) in state.page_items(&records).iter().enumerate() {
                println!("#{}", state.range().start + offset + 1);
                for line in describe(record) {
                    println!("  {line}");
                }
            }
            println!("page {}", state.label());
        }
        Commands::Count => {
            println!("{} ({})", store.count()?, store.path().display());
        }
        Commands::Clear => {
            store.clear()?;
            println!("all products deleted from {}", store.path().display());
        }
    }

    Ok(())
}
