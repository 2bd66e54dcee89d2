use haulbook_core::db::open_db_in_memory;
use haulbook_core::repo::vehicle_repo::VEHICLE_DRIVER_KEY;
use haulbook_core::{
    Driver, DriverRepository, NewDriver, NewVehicle, RepoError, SqliteDriverRepository,
    SqliteVehicleRepository, ValidationError, VehiclePatch, VehicleRepository,
};
use rusqlite::Connection;

fn seed_driver(conn: &Connection, identification_number: &str) -> Driver {
    SqliteDriverRepository::try_new(conn)
        .unwrap()
        .create(&NewDriver::new("Ana Ruiz", identification_number, "+53 5555 0101"))
        .unwrap()
}

#[test]
fn create_unassigned_vehicle() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    let vehicle = repo.create(&NewVehicle::with_cuna_plate("P123")).unwrap();

    assert!(vehicle.vehicle_id > 0);
    assert_eq!(vehicle.cuna_plate_number.as_deref(), Some("P123"));
    assert_eq!(vehicle.plancha_plate_number, None);
    assert_eq!(vehicle.driver_id, None);
    assert_eq!(vehicle.driver, None);
}

#[test]
fn vehicle_without_identifier_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    let blank = NewVehicle {
        cuna_plate_number: Some("   ".to_string()),
        ..NewVehicle::default()
    };
    for payload in [NewVehicle::default(), blank] {
        assert!(matches!(
            repo.create(&payload),
            Err(RepoError::Validation(ValidationError::NoVehicleIdentifier))
        ));
    }
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn blank_identifiers_are_stored_as_null() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    let payload = NewVehicle {
        plancha_circulation_number: Some("".to_string()),
        plancha_plate_number: Some("T-9".to_string()),
        ..NewVehicle::default()
    };
    let vehicle = repo.create(&payload).unwrap();
    assert_eq!(vehicle.plancha_circulation_number, None);
    assert_eq!(vehicle.plancha_plate_number.as_deref(), Some("T-9"));
}

#[test]
fn reads_embed_the_assigned_driver() {
    let conn = open_db_in_memory().unwrap();
    let driver = seed_driver(&conn, "D1");
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    let created = repo
        .create(&NewVehicle::with_cuna_plate("P123").assigned_to(driver.driver_id))
        .unwrap();
    repo.create(&NewVehicle::with_cuna_plate("P456")).unwrap();

    assert_eq!(created.driver_id, Some(driver.driver_id));
    assert_eq!(created.driver.as_ref(), Some(&driver));

    let listed = repo.list().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].driver.as_ref(), Some(&driver));
    assert_eq!(listed[1].driver, None);
}

#[test]
fn find_by_driver_returns_only_that_drivers_vehicle() {
    let conn = open_db_in_memory().unwrap();
    let ana = seed_driver(&conn, "D1");
    let luis = seed_driver(&conn, "D2");
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    repo.create(&NewVehicle::with_cuna_plate("P-ANA").assigned_to(ana.driver_id))
        .unwrap();
    repo.create(&NewVehicle::with_cuna_plate("P-FREE")).unwrap();

    let found = repo.find_by_driver(ana.driver_id).unwrap().unwrap();
    assert_eq!(found.cuna_plate_number.as_deref(), Some("P-ANA"));
    assert!(repo.find_by_driver(luis.driver_id).unwrap().is_none());
}

#[test]
fn second_vehicle_for_same_driver_is_conflict() {
    let conn = open_db_in_memory().unwrap();
    let driver = seed_driver(&conn, "D1");
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    repo.create(&NewVehicle::with_cuna_plate("P1").assigned_to(driver.driver_id))
        .unwrap();
    let err = repo
        .create(&NewVehicle::with_cuna_plate("P2").assigned_to(driver.driver_id))
        .unwrap_err();

    assert!(err.is_conflict_on(VEHICLE_DRIVER_KEY), "got {err}");
    assert_eq!(repo.list().unwrap().len(), 1);
}

#[test]
fn many_vehicles_may_be_unassigned() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    for plate in ["A", "B", "C"] {
        repo.create(&NewVehicle::with_cuna_plate(plate)).unwrap();
    }
    assert_eq!(repo.list().unwrap().len(), 3);
}

#[test]
fn unknown_driver_reference_is_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.create(&NewVehicle::with_cuna_plate("P1").assigned_to(42)),
        Err(RepoError::Validation(ValidationError::UnknownDriver(42)))
    ));
}

#[test]
fn update_reassigns_and_unassigns_driver() {
    let conn = open_db_in_memory().unwrap();
    let driver = seed_driver(&conn, "D1");
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();
    let vehicle = repo.create(&NewVehicle::with_cuna_plate("P1")).unwrap();

    let assign = VehiclePatch {
        driver_id: Some(Some(driver.driver_id)),
        ..VehiclePatch::default()
    };
    let assigned = repo.update(vehicle.vehicle_id, &assign).unwrap();
    assert_eq!(assigned.driver.as_ref(), Some(&driver));
    assert_eq!(assigned.cuna_plate_number.as_deref(), Some("P1"));

    let unassign = VehiclePatch {
        driver_id: Some(None),
        ..VehiclePatch::default()
    };
    let unassigned = repo.update(vehicle.vehicle_id, &unassign).unwrap();
    assert_eq!(unassigned.driver_id, None);
    assert_eq!(unassigned.driver, None);
}

#[test]
fn update_missing_vehicle_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();

    let patch = VehiclePatch {
        cuna_plate_number: Some(Some("P9".to_string())),
        ..VehiclePatch::default()
    };
    assert!(matches!(
        repo.update(5, &patch),
        Err(RepoError::NotFound {
            entity: "vehicle",
            id: 5
        })
    ));
    assert!(matches!(
        repo.update(5, &VehiclePatch::default()),
        Err(RepoError::NoFields("vehicle"))
    ));
}

#[test]
fn update_cannot_clear_the_last_identifier() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();
    let only_plate = repo.create(&NewVehicle::with_cuna_plate("P1")).unwrap();

    let clear_plate = VehiclePatch {
        cuna_plate_number: Some(None),
        ..VehiclePatch::default()
    };
    let blank_plate = VehiclePatch {
        cuna_plate_number: Some(Some("  ".to_string())),
        ..VehiclePatch::default()
    };
    for patch in [&clear_plate, &blank_plate] {
        assert!(matches!(
            repo.update(only_plate.vehicle_id, patch),
            Err(RepoError::Validation(ValidationError::NoVehicleIdentifier))
        ));
    }
    assert_eq!(
        repo.get_by_id(only_plate.vehicle_id).unwrap(),
        Some(only_plate.clone())
    );

    let swap = VehiclePatch {
        cuna_plate_number: Some(None),
        plancha_plate_number: Some(Some("T-9".to_string())),
        ..VehiclePatch::default()
    };
    let swapped = repo.update(only_plate.vehicle_id, &swap).unwrap();
    assert_eq!(swapped.cuna_plate_number, None);
    assert_eq!(swapped.plancha_plate_number.as_deref(), Some("T-9"));

    let cleared = repo.update(swapped.vehicle_id, &clear_plate).unwrap();
    assert_eq!(cleared.plancha_plate_number.as_deref(), Some("T-9"));
}

#[test]
fn unassign_driver_clears_reference_and_keeps_vehicle() {
    let conn = open_db_in_memory().unwrap();
    let driver = seed_driver(&conn, "D1");
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();
    let vehicle = repo
        .create(&NewVehicle::with_cuna_plate("P1").assigned_to(driver.driver_id))
        .unwrap();

    assert_eq!(repo.unassign_driver(driver.driver_id).unwrap(), 1);
    assert_eq!(repo.unassign_driver(driver.driver_id).unwrap(), 0);

    let reloaded = repo.get_by_id(vehicle.vehicle_id).unwrap().unwrap();
    assert_eq!(reloaded.driver_id, None);
}

#[test]
fn delete_is_idempotent_and_delete_all_counts() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteVehicleRepository::try_new(&conn).unwrap();
    let first = repo.create(&NewVehicle::with_cuna_plate("P1")).unwrap();
    repo.create(&NewVehicle::with_cuna_plate("P2")).unwrap();

    repo.delete(first.vehicle_id).unwrap();
    repo.delete(first.vehicle_id).unwrap();
    assert!(repo.get_by_id(first.vehicle_id).unwrap().is_none());

    assert_eq!(repo.delete_all().unwrap(), 1);
}
