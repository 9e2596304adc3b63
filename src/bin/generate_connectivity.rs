//! Generate a grid connectivity file from a latitude-longitude grid.
//!
//! ```text
//! generate_connectivity --lat 90 --lon 180 --out global.grid
//! generate_connectivity --lat 40 --lon 60 --regional \
//!     --lat-min 30 --lat-max 70 --lon-min -20 --lon-max 40 --out europe.grid
//! generate_connectivity --data t2m.nc --lat-name latitude --lon-name longitude --out t2m.grid
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use simple_grid::{LatLonAxes, SimpleGrid};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "generate_connectivity")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Write the connectivity file of a latitude-longitude grid", long_about = None)]
struct Cli {
    /// Number of latitude bands
    #[arg(long)]
    lat: Option<usize>,

    /// Number of longitude columns
    #[arg(long)]
    lon: Option<usize>,

    /// Treat the grid as regional (no longitude wrap, no polar closure)
    #[arg(long)]
    regional: bool,

    /// Southern bound in degrees
    #[arg(long, default_value_t = -90.0, allow_negative_numbers = true)]
    lat_min: f64,

    /// Northern bound in degrees
    #[arg(long, default_value_t = 90.0, allow_negative_numbers = true)]
    lat_max: f64,

    /// Western bound in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lon_min: f64,

    /// Eastern bound in degrees
    #[arg(long, default_value_t = 360.0, allow_negative_numbers = true)]
    lon_max: f64,

    /// Read grid axes from a netCDF file instead
    #[cfg(feature = "netcdf")]
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    data: Option<PathBuf>,

    /// Latitude dimension/variable name in the data file
    #[cfg(feature = "netcdf")]
    #[arg(long, default_value = "lat")]
    lat_name: String,

    /// Longitude dimension/variable name in the data file
    #[cfg(feature = "netcdf")]
    #[arg(long, default_value = "lon")]
    lon_name: String,

    /// Output connectivity file
    #[arg(short, long)]
    out: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut grid = SimpleGrid::new();

    #[cfg(feature = "netcdf")]
    if let Some(path) = &cli.data {
        let source = simple_grid::NetcdfSource::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let names = simple_grid::LatLonVariables::new(cli.lat_name.as_str(), cli.lon_name.as_str());
        grid.generate_lat_lon_from_source(&source, cli.regional, &names)?;
    }

    if !grid.is_initialized() {
        let (Some(n_lat), Some(n_lon)) = (cli.lat, cli.lon) else {
            bail!("Both --lat and --lon are required");
        };
        let axes = LatLonAxes::region(
            (cli.lat_min, cli.lat_max),
            (cli.lon_min, cli.lon_max),
            n_lat,
            n_lon,
        );
        grid.generate_lat_lon(&axes.lat, &axes.lon, cli.regional)
            .context("Failed to generate latitude-longitude grid")?;
    }

    grid.to_file(&cli.out)
        .with_context(|| format!("Failed to write {}", cli.out.display()))?;
    info!(
        "Wrote {} cells (dims {:?}) to {}",
        grid.len(),
        grid.dims(),
        cli.out.display()
    );

    Ok(())
}
