//! One-shot apiary siting check from the command line.
//!
//! Runs the same resolve -> fetch -> evaluate pipeline as the server and
//! prints the report to stdout. Exits non-zero when any rule is violated,
//! so it can gate scripts.

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pasieka::overpass::{self, OverpassClient};
use pasieka::uldk::{self, UldkClient};
use pasieka::{rules, Parcel};

#[derive(Parser, Debug)]
#[command(name = "check")]
#[command(about = "Apiary siting pre-check for a single parcel")]
struct Args {
    /// WGS84 latitude of a point on the parcel
    #[arg(long)]
    lat: Option<f64>,

    /// WGS84 longitude of a point on the parcel
    #[arg(long)]
    lon: Option<f64>,

    /// Cadastral parcel identifier (alternative to --lat/--lon)
    #[arg(long)]
    parcel: Option<String>,

    /// ULDK base URL
    #[arg(long, default_value = uldk::client::DEFAULT_URL)]
    uldk_url: String,

    /// Overpass interpreter URL
    #[arg(long, default_value = overpass::client::DEFAULT_URL)]
    overpass_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();

    let uldk = UldkClient::new(&args.uldk_url)?;
    let overpass = OverpassClient::new(&args.overpass_url)?;

    let parcel: Parcel = match (&args.parcel, args.lat, args.lon) {
        (Some(id), _, _) => uldk.parcel_by_id(id).await?,
        (None, Some(lat), Some(lon)) => {
            let id = uldk.parcel_id_by_coords(lat, lon).await?;
            uldk.parcel_by_id(&id).await?
        }
        _ => bail!("pass either --parcel or both --lat and --lon"),
    };

    println!("Parcel {}", parcel.id);

    let features = overpass.features_around(&parcel.boundary).await?;
    let violations = rules::evaluate(&parcel.boundary, &features)?;

    if violations.is_empty() {
        println!("All checks passed!");
    } else {
        for violation in &violations {
            println!("{violation}");
        }
        std::process::exit(1);
    }

    Ok(())
}
