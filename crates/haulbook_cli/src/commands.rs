//! Command execution.
//!
//! # Responsibility
//! - Resolve configuration, open the database and dispatch one command.
//! - Print results as JSON on stdout.

use crate::cli::{AddDriverArgs, AddTripArgs, Cli, Command, TripFilterArgs};
use haulbook_core::{
    init_logging, open_db, sqlite_fleet_service, Connection, DbError, DriverRepository,
    HaulbookConfig, LifecycleService, LoggingError, NewDriver, NewTrip, NewVehicle, Province,
    RepoError, TripListQuery, TripRepository, VehicleRepository,
};
use log::info;
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CliError {
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    Json(serde_json::Error),
    NotFound { entity: &'static str, id: i64 },
    Refused(&'static str),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Refused(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::NotFound { .. } | Self::Refused(_) => None,
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Runs one parsed command line.
pub fn execute(cli: Cli) -> Result<(), CliError> {
    let config = HaulbookConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir, true)?;
    }

    if let Command::Provinces = cli.command {
        return print_json(&Province::ALL, cli.pretty);
    }

    let db_path = cli.db.unwrap_or(config.db_path);
    let mut conn = open_db(&db_path)?;
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match cli.command {
        Command::Wipe { yes } => {
            if !yes {
                return Err(CliError::Refused("refusing to wipe without --yes"));
            }
            let report = LifecycleService::new(&mut conn).wipe_all()?;
            print_json(&report, cli.pretty)
        }
        Command::RemoveDriver { driver_id } => {
            let removal = LifecycleService::new(&mut conn).remove_driver(driver_id)?;
            print_json(&removal, cli.pretty)
        }
        command => run_fleet_command(&conn, command, cli.pretty),
    }
}

fn run_fleet_command(conn: &Connection, command: Command, pretty: bool) -> Result<(), CliError> {
    let service = sqlite_fleet_service(conn)?;
    match command {
        Command::Drivers => print_json(&service.drivers().list()?, pretty),
        Command::Vehicles => print_json(&service.vehicles().list()?, pretty),
        Command::Trips(filter) => {
            print_json(&service.trips().list_filtered(&trip_query(filter))?, pretty)
        }
        Command::DriverDetail { driver_id } => {
            let detail = service
                .get_driver_detail(driver_id)?
                .ok_or(CliError::NotFound {
                    entity: "driver",
                    id: driver_id,
                })?;
            print_json(&detail, pretty)
        }
        Command::TripDetail { trip_id } => {
            let detail = service.get_trip_detail(trip_id)?.ok_or(CliError::NotFound {
                entity: "trip",
                id: trip_id,
            })?;
            print_json(&detail, pretty)
        }
        Command::AddDriver(args) => {
            let (driver, vehicle) = driver_payloads(args);
            let created = service.create_driver_with_optional_vehicle(&driver, vehicle.as_ref())?;
            let detail = service
                .get_driver_detail(created.driver_id)?
                .ok_or(CliError::NotFound {
                    entity: "driver",
                    id: created.driver_id,
                })?;
            print_json(&detail, pretty)
        }
        Command::AddTrip(args) => {
            print_json(&service.trips().create(&trip_payload(args))?, pretty)
        }
        Command::Wipe { .. } | Command::RemoveDriver { .. } | Command::Provinces => Ok(()),
    }
}

fn trip_query(filter: TripFilterArgs) -> TripListQuery {
    TripListQuery {
        driver_id: filter.driver,
        province: filter.province,
        product: filter.product,
        container_number: filter.container,
        load_date_from: filter.from,
        load_date_to: filter.to,
        payment_min: filter.min_payment,
        payment_max: filter.max_payment,
        limit: filter.limit,
        offset: filter.offset,
    }
}

/// Splits the flags into a driver payload and, when any identifier was
/// given, a vehicle payload.
fn driver_payloads(args: AddDriverArgs) -> (NewDriver, Option<NewVehicle>) {
    let mut driver = NewDriver::new(args.full_name, args.identification_number, args.phone);
    driver.operative_license = args.license;

    let vehicle = NewVehicle {
        cuna_circulation_number: args.cuna_circulation,
        plancha_circulation_number: args.plancha_circulation,
        cuna_plate_number: args.cuna_plate,
        plancha_plate_number: args.plancha_plate,
        driver_id: None,
    };
    let vehicle = vehicle.has_identifier().then_some(vehicle);

    (driver, vehicle)
}

fn trip_payload(args: AddTripArgs) -> NewTrip {
    NewTrip {
        container_number: args.container,
        load_date: args.date,
        load_time: args.time,
        trip_payment: args.payment,
        province: args.province,
        product: args.product,
        ..NewTrip::for_driver(args.driver)
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Drivers => "drivers",
        Command::Vehicles => "vehicles",
        Command::Trips(_) => "trips",
        Command::DriverDetail { .. } => "driver-detail",
        Command::TripDetail { .. } => "trip-detail",
        Command::AddDriver(_) => "add-driver",
        Command::AddTrip(_) => "add-trip",
        Command::RemoveDriver { .. } => "remove-driver",
        Command::Wipe { .. } => "wipe",
        Command::Provinces => "provinces",
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<(), CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{rendered}");
    Ok(())
}
