use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use legacy_asset_loader::formats::{
    load_palette, load_pixel_surface, load_string, Rgb, SurfaceEncoding,
};
use legacy_asset_loader::{AssetError, AssetFile, LoaderConfig, SearchPath, SeekOrigin};

#[derive(Parser)]
#[command(about = "Decode palettes, surfaces and strings from legacy asset files")]
struct Cli {
    /// Directory to search for assets; later directories take precedence
    #[arg(long = "path", value_name = "DIR")]
    paths: Vec<PathBuf>,

    /// JSON file with a `search_paths` list, registered before --path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the path an asset name resolves to
    Resolve { name: String },
    /// Print the resolved path and size of an asset
    Info { name: String },
    /// Decode a 256 colour palette
    Palette {
        name: String,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Palette is stored uncompressed
        #[arg(long)]
        raw: bool,
        /// Widen 6-bit VGA components to 8 bits
        #[arg(long)]
        vga: bool,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode an indexed pixel surface
    Surface {
        name: String,
        #[arg(long)]
        width: usize,
        #[arg(long)]
        height: usize,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, value_enum, default_value_t = SurfaceEncoding::Rle)]
        encoding: SurfaceEncoding,
        /// Transparency key passed through with the pixels
        #[arg(long)]
        key: Option<u8>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode a length-prefixed string
    #[command(name = "string")]
    Text {
        name: String,
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
}

#[derive(Serialize)]
struct PaletteSummary<'a> {
    path: String,
    offset: u64,
    colours: &'a [Rgb],
}

#[derive(Serialize)]
struct SurfaceSummary {
    path: String,
    offset: u64,
    width: usize,
    height: usize,
    encoding: SurfaceEncoding,
    transparent_key: Option<u8>,
    distinct_indices: usize,
    bytes_read: u64,
}

fn build_search_path(cli: &Cli) -> Result<SearchPath, AssetError> {
    let mut config = match &cli.config {
        Some(path) => LoaderConfig::from_json_file(path)?,
        None => LoaderConfig::default(),
    };
    config.extend_from_env();
    for path in &cli.paths {
        config.push(path);
    }
    Ok(config.into_search_path())
}

fn open_at(search_path: &SearchPath, name: &str, offset: u64) -> Result<AssetFile, AssetError> {
    let mut file = search_path.open(name)?;
    let offset = i64::try_from(offset).map_err(|_| AssetError::SeekOutOfRange {
        target: i64::MAX,
        size: file.size(),
    })?;
    file.seek(offset, SeekOrigin::Start)?;
    Ok(file)
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), AssetError> {
    fs::write(path, bytes).map_err(|source| AssetError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote decoded data");
    Ok(())
}

fn run(cli: Cli) -> Result<String, AssetError> {
    let search_path = build_search_path(&cli)?;

    let summary = match cli.command {
        Command::Resolve { name } => {
            let path = search_path.resolve(&name)?;
            serde_json::json!({ "name": name, "path": path.display().to_string() })
        }
        Command::Info { name } => {
            let file = search_path.open(&name)?;
            serde_json::json!({
                "name": name,
                "path": file.path().display().to_string(),
                "size": file.size(),
            })
        }
        Command::Palette {
            name,
            offset,
            raw,
            vga,
            out,
        } => {
            let mut file = open_at(&search_path, &name, offset)?;
            let mut palette = load_palette(&mut file, !raw)?;
            if vga {
                palette = palette.to_rgb8();
            }
            if let Some(out) = &out {
                write_output(out, &palette.to_bytes())?;
            }
            serde_json::to_value(PaletteSummary {
                path: file.path().display().to_string(),
                offset,
                colours: &palette.colours,
            })?
        }
        Command::Surface {
            name,
            width,
            height,
            offset,
            encoding,
            key,
            out,
        } => {
            let mut file = open_at(&search_path, &name, offset)?;
            let surface = load_pixel_surface(&mut file, width, height, encoding, key)?;
            if let Some(out) = &out {
                write_output(out, &surface.pixels)?;
            }

            let mut seen = [false; 256];
            for &index in &surface.pixels {
                seen[index as usize] = true;
            }

            serde_json::to_value(SurfaceSummary {
                path: file.path().display().to_string(),
                offset,
                width,
                height,
                encoding,
                transparent_key: surface.transparent_key,
                distinct_indices: seen.iter().filter(|&&s| s).count(),
                bytes_read: file.tell() - offset,
            })?
        }
        Command::Text { name, offset } => {
            let mut file = open_at(&search_path, &name, offset)?;
            let text = load_string(&mut file)?;
            serde_json::json!({ "path": file.path().display().to_string(), "text": text })
        }
    };

    Ok(serde_json::to_string_pretty(&summary)?)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "legacy_asset_loader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Cli::parse()) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(%err, "asset load failed");
            ExitCode::FAILURE
        }
    }
}
