//! Vehicle repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `vehicles` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Vehicle::validate()` before SQL mutations.
//! - Update/delete locate the target by `id` only.
//! - List order is `id ASC`; pages are 1-based.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::vehicle::{Vehicle, VehicleId, VehicleValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

const VEHICLE_SELECT_SQL: &str = "SELECT
    id,
    name,
    brand,
    year
FROM vehicles";

const REQUIRED_VEHICLE_COLUMNS: [&str; 6] =
    ["id", "name", "brand", "year", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for vehicle persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Payload failed structural validation.
    Validation(VehicleValidationError),
    /// Backing-store failure, propagated unchanged.
    Db(DbError),
    /// No vehicle exists with the given id.
    NotFound(VehicleId),
    /// A vehicle with the given id already exists.
    Conflict(VehicleId),
    /// The largest id is taken; the store cannot assign another one.
    IdSpaceExhausted,
    /// Persisted row cannot be mapped to a valid vehicle.
    InvalidData(String),
    /// Connection was not opened through `db::open_db*`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "vehicle not found: {id}"),
            Self::Conflict(id) => write!(f, "vehicle already exists: {id}"),
            Self::IdSpaceExhausted => {
                write!(f, "vehicle id space exhausted; no id can be assigned")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted vehicle data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<VehicleValidationError> for RepoError {
    fn from(value: VehicleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing vehicles.
///
/// All fields are optional:
/// - `page` defaults to 1; `Some(0)` is treated as 1.
/// - `name`/`brand` are case-insensitive (ASCII) substring filters; blank
///   values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleListQuery {
    pub page: Option<u32>,
    pub name: Option<String>,
    pub brand: Option<String>,
}

impl VehicleListQuery {
    /// Unfiltered query for one page.
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    /// Effective 1-based page number.
    pub fn effective_page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Number of rows to skip for the given page size.
    pub fn offset(&self, page_size: u32) -> u64 {
        u64::from(self.effective_page() - 1) * u64::from(page_size)
    }

    /// Trimmed name filter, `None` when absent or blank.
    pub fn name_filter(&self) -> Option<&str> {
        normalize_filter(self.name.as_deref())
    }

    /// Trimmed brand filter, `None` when absent or blank.
    pub fn brand_filter(&self) -> Option<&str> {
        normalize_filter(self.brand.as_deref())
    }

    /// Returns whether `vehicle` passes both filters.
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        let name_ok = self
            .name_filter()
            .map_or(true, |needle| contains_ignore_ascii_case(&vehicle.name, needle));
        let brand_ok = self
            .brand_filter()
            .map_or(true, |needle| contains_ignore_ascii_case(&vehicle.brand, needle));
        name_ok && brand_ok
    }
}

/// Repository interface for vehicle CRUD operations.
pub trait VehicleRepository {
    /// Lists one page of vehicles matching the query, ordered by id.
    ///
    /// Returns an empty vector when nothing matches or the page is past the end.
    fn list_vehicles(&self, query: &VehicleListQuery) -> RepoResult<Vec<Vehicle>>;
    /// Gets one vehicle by id; absence is `Ok(None)`.
    fn find_vehicle_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>>;
    /// Persists a new vehicle and returns its identity.
    ///
    /// An unassigned id (`0`) is allocated by the store; a positive id is
    /// used as-is and fails with `Conflict` when already taken.
    fn create_vehicle(&self, vehicle: &Vehicle) -> RepoResult<VehicleId>;
    /// Replaces the mutable fields of the vehicle with the same id.
    fn update_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()>;
    /// Removes the vehicle with the same id; other fields are ignored.
    fn delete_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()>;
}

impl<R: VehicleRepository + ?Sized> VehicleRepository for &R {
    fn list_vehicles(&self, query: &VehicleListQuery) -> RepoResult<Vec<Vehicle>> {
        (**self).list_vehicles(query)
    }

    fn find_vehicle_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        (**self).find_vehicle_by_id(id)
    }

    fn create_vehicle(&self, vehicle: &Vehicle) -> RepoResult<VehicleId> {
        (**self).create_vehicle(vehicle)
    }

    fn update_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()> {
        (**self).update_vehicle(vehicle)
    }

    fn delete_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()> {
        (**self).delete_vehicle(vehicle)
    }
}

/// SQLite-backed vehicle repository.
pub struct SqliteVehicleRepository<'conn> {
    conn: &'conn Connection,
    page_size: u32,
}

impl<'conn> SqliteVehicleRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is incomplete.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_vehicle_connection_ready(conn)?;
        Ok(Self {
            conn,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Overrides the list page size. `0` restores the default.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = normalize_page_size(page_size);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn id_sequence_exhausted(&self) -> RepoResult<bool> {
        let max_id: Option<i64> = self.conn.query_row(
            "SELECT MAX(seq) FROM sqlite_sequence WHERE name = 'vehicles';",
            [],
            |row| row.get(0),
        )?;
        Ok(max_id == Some(VehicleId::MAX))
    }
}

impl VehicleRepository for SqliteVehicleRepository<'_> {
    fn list_vehicles(&self, query: &VehicleListQuery) -> RepoResult<Vec<Vehicle>> {
        let mut sql = format!("{VEHICLE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(name) = query.name_filter() {
            sql.push_str(" AND name LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_pattern(name)));
        }

        if let Some(brand) = query.brand_filter() {
            sql.push_str(" AND brand LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_pattern(brand)));
        }

        sql.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");
        bind_values.push(Value::Integer(i64::from(self.page_size)));
        let offset = i64::try_from(query.offset(self.page_size)).unwrap_or(i64::MAX);
        bind_values.push(Value::Integer(offset));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut vehicles = Vec::new();

        while let Some(row) = rows.next()? {
            vehicles.push(parse_vehicle_row(row)?);
        }

        Ok(vehicles)
    }

    fn find_vehicle_by_id(&self, id: VehicleId) -> RepoResult<Option<Vehicle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{VEHICLE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_vehicle_row(row)?));
        }

        Ok(None)
    }

    fn create_vehicle(&self, vehicle: &Vehicle) -> RepoResult<VehicleId> {
        vehicle.validate()?;

        if !vehicle.has_id() {
            let inserted = self.conn.execute(
                "INSERT INTO vehicles (name, brand, year) VALUES (?1, ?2, ?3);",
                params![vehicle.name.as_str(), vehicle.brand.as_str(), vehicle.year],
            );
            return match inserted {
                Ok(_) => Ok(self.conn.last_insert_rowid()),
                // AUTOINCREMENT reports SQLITE_FULL once the sequence reaches i64::MAX.
                Err(err) if is_disk_full(&err) => {
                    if self.id_sequence_exhausted()? {
                        Err(RepoError::IdSpaceExhausted)
                    } else {
                        Err(err.into())
                    }
                }
                Err(err) => Err(err.into()),
            };
        }

        let inserted = self.conn.execute(
            "INSERT INTO vehicles (id, name, brand, year) VALUES (?1, ?2, ?3, ?4);",
            params![
                vehicle.id,
                vehicle.name.as_str(),
                vehicle.brand.as_str(),
                vehicle.year,
            ],
        );

        match inserted {
            Ok(_) => Ok(vehicle.id),
            Err(err) if is_constraint_violation(&err) => Err(RepoError::Conflict(vehicle.id)),
            Err(err) => Err(err.into()),
        }
    }

    fn update_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()> {
        vehicle.validate()?;

        let changed = self.conn.execute(
            "UPDATE vehicles
             SET
                name = ?1,
                brand = ?2,
                year = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                vehicle.name.as_str(),
                vehicle.brand.as_str(),
                vehicle.year,
                vehicle.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(vehicle.id));
        }

        Ok(())
    }

    fn delete_vehicle(&self, vehicle: &Vehicle) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM vehicles WHERE id = ?1;", [vehicle.id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(vehicle.id));
        }

        Ok(())
    }
}

/// Normalizes a configured page size; `0` falls back to `DEFAULT_PAGE_SIZE`.
pub fn normalize_page_size(page_size: u32) -> u32 {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    }
}

fn normalize_filter(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

// Mirrors SQLite `LIKE` with `case_sensitive_like=OFF`: ASCII folding only.
fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

fn is_disk_full(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::DiskFull
    )
}

fn parse_vehicle_row(row: &Row<'_>) -> RepoResult<Vehicle> {
    let vehicle = Vehicle {
        id: row.get("id")?,
        name: row.get("name")?,
        brand: row.get("brand")?,
        year: row.get("year")?,
    };

    vehicle
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("vehicles row {}: {err}", vehicle.id)))?;
    Ok(vehicle)
}

fn ensure_vehicle_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "vehicles")? {
        return Err(RepoError::MissingRequiredTable("vehicles"));
    }

    for column in REQUIRED_VEHICLE_COLUMNS {
        if !table_has_column(conn, "vehicles", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "vehicles",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{
        contains_ignore_ascii_case, like_pattern, normalize_page_size, VehicleListQuery,
        DEFAULT_PAGE_SIZE,
    };
    use crate::model::vehicle::Vehicle;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("fiat"), "%fiat%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn page_defaults_to_one_and_zero_is_clamped() {
        assert_eq!(VehicleListQuery::default().effective_page(), 1);
        assert_eq!(VehicleListQuery::page(0).effective_page(), 1);
        assert_eq!(VehicleListQuery::page(3).offset(10), 20);
        assert_eq!(
            VehicleListQuery::page(u32::MAX).offset(u32::MAX),
            u64::from(u32::MAX - 1) * u64::from(u32::MAX)
        );
    }

    #[test]
    fn blank_filters_are_ignored() {
        let query = VehicleListQuery {
            page: None,
            name: Some("   ".to_string()),
            brand: Some(" fiat ".to_string()),
        };
        assert_eq!(query.name_filter(), None);
        assert_eq!(query.brand_filter(), Some("fiat"));
    }

    #[test]
    fn matches_uses_case_insensitive_substring() {
        let vehicle = Vehicle::new("Fiat Uno", "Fiat", 1995);
        let query = VehicleListQuery {
            name: Some("UNO".to_string()),
            brand: Some("iat".to_string()),
            ..VehicleListQuery::default()
        };
        assert!(query.matches(&vehicle));

        let other_brand = VehicleListQuery {
            brand: Some("Ford".to_string()),
            ..VehicleListQuery::default()
        };
        assert!(!other_brand.matches(&vehicle));
        assert!(contains_ignore_ascii_case("Citroën", "CITRO"));
    }

    #[test]
    fn zero_page_size_falls_back_to_default() {
        assert_eq!(normalize_page_size(0), DEFAULT_PAGE_SIZE);
        assert_eq!(normalize_page_size(25), 25);
    }
}
