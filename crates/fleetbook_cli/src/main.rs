//! Command-line front end for the vehicle registry.
//!
//! # Responsibility
//! - Map subcommands onto `VehicleService` operations.
//! - Print results as JSON on stdout and failures on stderr.

use clap::{Parser, Subcommand};
use fleetbook_core::db::open_db;
use fleetbook_core::{
    default_log_level, init_logging, RepoError, SqliteVehicleRepository, Vehicle, VehicleId,
    VehicleListQuery, VehicleService, DEFAULT_PAGE_SIZE, UNASSIGNED_VEHICLE_ID,
};
use log::info;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "fleetbook", version, about = "Manage a SQLite vehicle registry")]
struct Cli {
    /// SQLite database file; created and migrated when missing.
    #[arg(long, default_value = "fleetbook.db")]
    db: PathBuf,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<String>,
    /// trace|debug|info|warn|error. Only meaningful together with `--log-dir`.
    #[arg(long, requires = "log_dir")]
    log_level: Option<String>,
    /// Vehicles per `list` page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List one page of vehicles, ordered by id.
    List {
        #[arg(long)]
        page: Option<u32>,
        /// Case-insensitive substring filter on name.
        #[arg(long)]
        name: Option<String>,
        /// Case-insensitive substring filter on brand.
        #[arg(long)]
        brand: Option<String>,
    },
    /// Show one vehicle.
    Get { id: VehicleId },
    /// Register a vehicle. Without `--id` the store assigns one.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        year: i32,
        #[arg(long, default_value_t = UNASSIGNED_VEHICLE_ID)]
        id: VehicleId,
    },
    /// Replace name, brand and year of an existing vehicle.
    Update {
        id: VehicleId,
        #[arg(long)]
        name: String,
        #[arg(long)]
        brand: String,
        #[arg(long)]
        year: i32,
    },
    /// Delete a vehicle.
    Delete { id: VehicleId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        fleetbook_core::core_version()
    );

    let conn = open_db(&cli.db)?;
    let repo = SqliteVehicleRepository::try_new(&conn)?.with_page_size(cli.page_size);
    let service = VehicleService::new(repo);

    match cli.command {
        Command::List { page, name, brand } => {
            let query = VehicleListQuery { page, name, brand };
            print_json(&service.list_vehicles(&query)?)?;
        }
        Command::Get { id } => {
            let found = service.find_vehicle_by_id(id)?;
            print_json(&found)?;
            if found.is_none() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Create {
            name,
            brand,
            year,
            id,
        } => {
            let vehicle = Vehicle {
                id,
                name,
                brand,
                year,
            };
            let id = service.create_vehicle(&vehicle)?;
            print_json(&read_back(&service, id)?)?;
        }
        Command::Update {
            id,
            name,
            brand,
            year,
        } => {
            service.update_vehicle(&Vehicle::with_id(id, name, brand, year)?)?;
            print_json(&read_back(&service, id)?)?;
        }
        Command::Delete { id } => {
            service.delete_vehicle(&key_only(id))?;
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_back(
    service: &VehicleService<SqliteVehicleRepository<'_>>,
    id: VehicleId,
) -> Result<Vehicle, RepoError> {
    service
        .find_vehicle_by_id(id)?
        .ok_or(RepoError::NotFound(id))
}

// Delete matches on id only; the other fields are never read.
fn key_only(id: VehicleId) -> Vehicle {
    Vehicle {
        id,
        ..Vehicle::new("", "", 0)
    }
}

fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{key_only, Cli, Command};
    use clap::Parser;
    use fleetbook_core::DEFAULT_PAGE_SIZE;

    #[test]
    fn list_defaults_leave_filters_unset() {
        let cli = Cli::try_parse_from(["fleetbook", "list"]).unwrap();
        assert_eq!(cli.db.to_str(), Some("fleetbook.db"));
        assert_eq!(cli.page_size, DEFAULT_PAGE_SIZE);
        assert!(matches!(
            cli.command,
            Command::List {
                page: None,
                name: None,
                brand: None
            }
        ));
    }

    #[test]
    fn create_parses_fields_and_defaults_id_to_unassigned() {
        let cli = Cli::try_parse_from([
            "fleetbook",
            "--db",
            "/tmp/cars.db",
            "create",
            "--name",
            "Fiat Uno",
            "--brand",
            "Fiat",
            "--year",
            "1995",
        ])
        .unwrap();

        match cli.command {
            Command::Create {
                name,
                brand,
                year,
                id,
            } => {
                assert_eq!(name, "Fiat Uno");
                assert_eq!(brand, "Fiat");
                assert_eq!(year, 1995);
                assert_eq!(id, 0);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn update_requires_all_fields() {
        assert!(Cli::try_parse_from(["fleetbook", "update", "3", "--name", "Uno"]).is_err());
    }

    #[test]
    fn log_level_without_log_dir_is_rejected() {
        let err = Cli::try_parse_from(["fleetbook", "--log-level", "debug", "list"])
            .expect_err("--log-level alone should not parse");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from([
            "fleetbook",
            "--log-dir",
            "/tmp/fleetbook-logs",
            "--log-level",
            "debug",
            "list",
        ])
        .expect("--log-level with --log-dir should parse");
        assert_eq!(cli.log_dir.as_deref(), Some("/tmp/fleetbook-logs"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn key_only_carries_just_the_id() {
        assert_eq!(key_only(12).id, 12);
    }
}
