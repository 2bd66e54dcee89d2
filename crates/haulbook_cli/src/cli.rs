//! Command-line definition.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use haulbook_core::{DriverId, Province, TripId};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "haulbook")]
#[command(version)]
#[command(about = "Drivers, vehicles and trips of a haulage fleet")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database file (overrides HAULBOOK_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List drivers
    Drivers,

    /// List vehicles with their assigned driver
    Vehicles,

    /// List trips, most recent load first
    Trips(TripFilterArgs),

    /// Show a driver with its vehicle and trip history
    DriverDetail { driver_id: DriverId },

    /// Show a trip with its driver and vehicle
    TripDetail { trip_id: TripId },

    /// Register a driver (re-uses an existing one with the same
    /// identification number), optionally with a vehicle
    AddDriver(AddDriverArgs),

    /// Register a trip for a driver
    AddTrip(AddTripArgs),

    /// Delete a driver with its trips and release its vehicle
    RemoveDriver { driver_id: DriverId },

    /// Delete every trip, vehicle and driver
    Wipe {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// List the accepted province names
    Provinces,
}

#[derive(Debug, Args, Default)]
pub struct TripFilterArgs {
    #[arg(long)]
    pub driver: Option<DriverId>,

    #[arg(long)]
    pub province: Option<Province>,

    /// Substring of the product label
    #[arg(long)]
    pub product: Option<String>,

    /// Substring of the container number
    #[arg(long)]
    pub container: Option<String>,

    /// First load date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last load date (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long)]
    pub min_payment: Option<String>,

    #[arg(long)]
    pub max_payment: Option<String>,

    #[arg(long)]
    pub limit: Option<u32>,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, Args)]
pub struct AddDriverArgs {
    #[arg(long)]
    pub full_name: String,

    #[arg(long)]
    pub identification_number: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub license: Option<String>,

    #[arg(long)]
    pub cuna_plate: Option<String>,

    #[arg(long)]
    pub plancha_plate: Option<String>,

    #[arg(long)]
    pub cuna_circulation: Option<String>,

    #[arg(long)]
    pub plancha_circulation: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddTripArgs {
    #[arg(long)]
    pub driver: DriverId,

    #[arg(long)]
    pub container: Option<String>,

    /// Load date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Load time (HH:MM or HH:MM:SS)
    #[arg(long)]
    pub time: Option<String>,

    /// Amount paid, e.g. 175.50
    #[arg(long)]
    pub payment: Option<String>,

    #[arg(long)]
    pub province: Option<Province>,

    #[arg(long)]
    pub product: Option<String>,
}
