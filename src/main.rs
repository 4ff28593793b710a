use std::path::PathBuf;

use chroma_sort::coordinator::CoordinatorBuilder;
use chroma_sort::error::AppError;
use chroma_sort::pipeline::services::export::{write_export, KeyCasing};
use chroma_sort::pipeline::{Image, ImageSource};
use chroma_sort::Configuration;
use clap::Parser;
use tracing::{error, info, Level};

/// Extracts dominant colors from images, sorts them into groups and prints
/// the result as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of color groups to create before sorting
    #[arg(short, long, default_value_t = 4)]
    groups: usize,

    /// Export keys in snake_case
    #[arg(long)]
    snake_case: bool,

    /// Directory to also write the export file into
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();
}

async fn run(args: Args) -> Result<(), AppError> {
    let mut configuration = Configuration::load(args.config.as_deref())?;
    if args.snake_case {
        configuration.export.key_casing = KeyCasing::Snake;
    }
    let mut coordinator = CoordinatorBuilder::new(configuration).build()?;

    let sources: Vec<_> = args
        .images
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let image_id =
                coordinator.add_image(Image::from_file(name, path.display().to_string()));
            (image_id, ImageSource::Path(path.clone()))
        })
        .collect();

    for (path, result) in args
        .images
        .iter()
        .zip(coordinator.extract_all(sources).await)
    {
        match result {
            Ok(amount) => info!("{}: {} colors", path.display(), amount),
            Err(e) => error!("{}: {}", path.display(), e),
        }
    }

    for _ in 0..args.groups {
        coordinator.create_group()?;
    }
    coordinator.auto_sort();

    let report = coordinator.export();
    println!("{}", report.to_json_pretty()?);

    if let Some(dir) = &args.output {
        write_export(dir, "chroma-sort", &report)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        error!("{}", e);
        return Err(e);
    }
    Ok(())
}
