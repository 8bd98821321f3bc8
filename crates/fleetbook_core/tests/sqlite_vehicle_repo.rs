use fleetbook_core::db::migrations::latest_version;
use fleetbook_core::db::{open_db, open_db_in_memory};
use fleetbook_core::{
    RepoError, SqliteVehicleRepository, Vehicle, VehicleListQuery, VehicleRepository,
    DEFAULT_PAGE_SIZE,
};
use rusqlite::Connection;

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteVehicleRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_vehicles_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteVehicleRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("vehicles"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE vehicles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            brand TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteVehicleRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "vehicles",
            column: "year"
        })
    ));
}

#[test]
fn corrupt_rows_surface_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO vehicles (id, name, brand, year) VALUES (9, '', 'Fiat', 1990);",
        [],
    )
    .unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    let err = repo.find_vehicle_by_id(9).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref message) if message.contains("row 9")));

    let err = repo.list_vehicles(&VehicleListQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn custom_page_size_controls_slice_length() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn)
        .unwrap()
        .with_page_size(2);
    assert_eq!(repo.page_size(), 2);

    for name in ["A1", "A2", "A3", "A4", "A5"] {
        repo.create_vehicle(&Vehicle::new(name, "Audi", 2020))
            .unwrap();
    }

    let page3 = repo.list_vehicles(&VehicleListQuery::page(3)).unwrap();
    assert_eq!(page3.len(), 1);
    assert_eq!(page3[0].name, "A5");

    let reset = SqliteVehicleRepository::try_new(&conn)
        .unwrap()
        .with_page_size(0);
    assert_eq!(reset.page_size(), DEFAULT_PAGE_SIZE);
}

#[test]
fn update_bumps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();
    let id = repo
        .create_vehicle(&Vehicle::new("Uno", "Fiat", 1995))
        .unwrap();
    conn.execute("UPDATE vehicles SET updated_at = 1000;", [])
        .unwrap();

    repo.update_vehicle(&Vehicle::with_id(id, "Uno Mille", "Fiat", 1996).unwrap())
        .unwrap();

    let updated_at: i64 = conn
        .query_row("SELECT updated_at FROM vehicles WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .unwrap();
    assert!(updated_at > 1000);
}

#[test]
fn vehicles_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleet.db");

    let id = {
        let conn = open_db(&path).unwrap();
        let repo = SqliteVehicleRepository::try_new(&conn).unwrap();
        repo.create_vehicle(&Vehicle::new("Kombi", "Volkswagen", 1975))
            .unwrap()
    };

    let conn = open_db(&path).unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();
    let stored = repo.find_vehicle_by_id(id).unwrap().unwrap();
    assert_eq!(stored.name, "Kombi");
}
