use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use chapelmap::api::fetch_buildings;
use chapelmap::config::{DEFAULT_CENTER, DEFAULT_RADIUS_M, FileConfig, OverpassConfig};
use chapelmap::error::AppError;
use chapelmap::map::{Filter, HtmlBackend, Presenter};
use chapelmap::osm::normalize_buildings;

/// Find and map LDS church buildings from OpenStreetMap data
///
/// Examples:
///   # Map everything within 100km of Kansas City (the default)
///   chapelmap
///
///   # Temples around Salt Lake City, 250km radius
///   chapelmap --lat 40.7608 --lon -111.8910 -r 250000 --filter temple
///
///   # Use a config file and a custom output path
///   chapelmap --config my-settings.toml -o slc.html
#[derive(Parser, Debug)]
#[command(name = "chapelmap")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches chapelmap.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Latitude of the search center
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of the search center
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Search radius in meters (changing it reloads everything from Overpass)
    #[arg(short = 'r', long, default_value = "100000")]
    radius: u32,

    /// Subtype filter: all, temple, or meetinghouse
    #[arg(short = 'f', long, default_value = "all")]
    filter: Filter,

    /// Output HTML file path
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Some(toml::from_str(&contents).context("Failed to parse config file")?)
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };

    let lat = args
        .lat
        .or_else(|| file_config.as_ref().and_then(|c| c.lat))
        .unwrap_or(DEFAULT_CENTER.0);
    let lon = args
        .lon
        .or_else(|| file_config.as_ref().and_then(|c| c.lon))
        .unwrap_or(DEFAULT_CENTER.1);
    let radius = if args.radius != DEFAULT_RADIUS_M {
        args.radius
    } else {
        file_config
            .as_ref()
            .map(|c| c.radius)
            .unwrap_or(DEFAULT_RADIUS_M)
    };
    let filter = if args.filter != Filter::All {
        args.filter
    } else {
        file_config
            .as_ref()
            .and_then(|c| c.filter)
            .unwrap_or(Filter::All)
    };
    let verbose = args.verbose || file_config.as_ref().map(|c| c.verbose).unwrap_or(false);
    let output = args
        .output
        .clone()
        .or_else(|| file_config.as_ref().and_then(|c| c.output.clone()))
        .unwrap_or_else(|| PathBuf::from("chapelmap.html"));

    let overpass_config = file_config
        .as_ref()
        .and_then(|c| c.overpass.clone())
        .unwrap_or_default();

    println!("chapelmap - LDS Church Buildings Map");
    println!("====================================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Center: ({:.4}, {:.4})", lat, lon);
        println!("  Radius: {}m", radius);
        println!("  Filter: {}", filter);
        println!("  Output: {}", output.display());
        println!("  Overpass mirrors: {}", overpass_config.urls.len());
        println!();
    }

    run((lat, lon), radius, filter, &output, &overpass_config, verbose)?;

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    println!("Output: {}", output.display());

    Ok(())
}

/// One full fetch/normalize/render cycle. Runs to completion before
/// another can start, so overlapping reloads cannot race.
fn run(
    center: (f64, f64),
    radius: u32,
    filter: Filter,
    output: &PathBuf,
    overpass_config: &OverpassConfig,
    verbose: bool,
) -> Result<()> {
    let mut presenter =
        Presenter::new(HtmlBackend::new(), center).map_err(AppError::from)?;

    let spinner = create_spinner("Fetching LDS buildings from Overpass...");
    let start = Instant::now();
    let elements = match fetch_buildings(center, radius, overpass_config) {
        Ok(elements) => {
            spinner.finish_with_message(format!(
                "Fetched {} elements [{:.1}s]",
                elements.len(),
                start.elapsed().as_secs_f32()
            ));
            elements
        }
        Err(e) => {
            spinner.finish_and_clear();
            return Err(AppError::from(e).into());
        }
    };

    let buildings = normalize_buildings(&elements);
    if verbose {
        println!("  Normalized {} buildings", buildings.len());
    }
    if buildings.is_empty() {
        return Err(AppError::NoBuildings { radius_m: radius }.into());
    }

    presenter.render(buildings);
    let summary = presenter.filter(filter);

    let spinner = create_spinner("Writing map...");
    let mut backend = presenter.into_backend();
    backend.set_caption(summary.to_string());
    match backend.write(output) {
        Ok(()) => spinner.finish_with_message(format!("Wrote {}", output.display())),
        Err(e) => {
            spinner.finish_and_clear();
            return Err(AppError::from(e).into());
        }
    }

    println!();
    println!("{}", summary);

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
