use chrono::NaiveDate;
use haulbook_core::db::open_db_in_memory;
use haulbook_core::{
    DriverId, DriverRepository, NewDriver, NewTrip, Province, RepoError, SqliteDriverRepository,
    SqliteTripRepository, TripListQuery, TripPatch, TripRepository, ValidationError,
};
use rusqlite::Connection;

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

fn seed_driver(conn: &Connection, identification_number: &str) -> DriverId {
    SqliteDriverRepository::try_new(conn)
        .unwrap()
        .create(&NewDriver::new("Ana Ruiz", identification_number, "+1"))
        .unwrap()
        .driver_id
}

#[test]
fn create_persists_every_field() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    let payload = NewTrip {
        container_number: Some("MSCU1234567".to_string()),
        trip_payment: Some("175.50".to_string()),
        province: Some(Province::PinarDelRio),
        product: Some("Arroz".to_string()),
        ..NewTrip::for_driver(driver_id).loaded_at(date("2024-03-01"), "08:00")
    };
    let trip = repo.create(&payload).unwrap();

    assert!(trip.trip_id > 0);
    assert_eq!(trip.driver_id, driver_id);
    assert_eq!(trip.container_number.as_deref(), Some("MSCU1234567"));
    assert_eq!(trip.load_date, Some(date("2024-03-01")));
    assert_eq!(trip.load_time.as_deref(), Some("08:00:00"));
    assert_eq!(trip.trip_payment.as_deref(), Some("175.50"));
    assert_eq!(trip.province, Some(Province::PinarDelRio));
    assert_eq!(trip.product.as_deref(), Some("Arroz"));

    assert_eq!(repo.get_by_id(trip.trip_id).unwrap(), Some(trip));
}

#[test]
fn province_is_stored_by_display_name() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    let trip = repo
        .create(&NewTrip {
            province: Some(Province::IslaDeLaJuventud),
            ..NewTrip::for_driver(driver_id)
        })
        .unwrap();

    let stored: String = conn
        .query_row(
            "SELECT province FROM trips WHERE trip_id = ?1;",
            [trip.trip_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, "Isla de la Juventud");
}

#[test]
fn unknown_driver_is_validation_error() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.create(&NewTrip::for_driver(31)),
        Err(RepoError::Validation(ValidationError::UnknownDriver(31)))
    ));
}

#[test]
fn invalid_payment_and_time_are_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    let bad_payment = NewTrip {
        trip_payment: Some("12,50".to_string()),
        ..NewTrip::for_driver(driver_id)
    };
    assert!(matches!(
        repo.create(&bad_payment),
        Err(RepoError::Validation(ValidationError::InvalidPayment(_)))
    ));

    let bad_time = NewTrip::for_driver(driver_id).loaded_at(date("2024-03-01"), "25:00");
    assert!(matches!(
        repo.create(&bad_time),
        Err(RepoError::Validation(ValidationError::InvalidLoadTime(_)))
    ));
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn driver_history_is_most_recent_first() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let other_id = seed_driver(&conn, "D2");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    let early = repo
        .create(&NewTrip::for_driver(driver_id).loaded_at(date("2024-03-01"), "08:00"))
        .unwrap();
    let later_same_day = repo
        .create(&NewTrip::for_driver(driver_id).loaded_at(date("2024-03-01"), "14:30"))
        .unwrap();
    let next_day = repo
        .create(&NewTrip::for_driver(driver_id).loaded_at(date("2024-03-02"), "06:00"))
        .unwrap();
    repo.create(&NewTrip::for_driver(other_id).loaded_at(date("2024-03-05"), "06:00"))
        .unwrap();

    let ids: Vec<_> = repo
        .list_by_driver(driver_id)
        .unwrap()
        .into_iter()
        .map(|trip| trip.trip_id)
        .collect();
    assert_eq!(
        ids,
        vec![next_day.trip_id, later_same_day.trip_id, early.trip_id]
    );
}

#[test]
fn short_and_long_time_forms_order_together() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    let nine = repo
        .create(&NewTrip::for_driver(driver_id).loaded_at(date("2024-03-01"), "09:00"))
        .unwrap();
    let eight_thirty = repo
        .create(&NewTrip::for_driver(driver_id).loaded_at(date("2024-03-01"), "08:30:15"))
        .unwrap();

    let ids: Vec<_> = repo
        .list_by_driver(driver_id)
        .unwrap()
        .into_iter()
        .map(|trip| trip.trip_id)
        .collect();
    assert_eq!(ids, vec![nine.trip_id, eight_thirty.trip_id]);
}

#[test]
fn list_filtered_combines_conditions() {
    let conn = open_db_in_memory().unwrap();
    let ana = seed_driver(&conn, "D1");
    let luis = seed_driver(&conn, "D2");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    let trip = |driver_id, day: &str, province, product: &str, payment: &str| NewTrip {
        province: Some(province),
        product: Some(product.to_string()),
        trip_payment: Some(payment.to_string()),
        container_number: Some(format!("CONT-{day}")),
        ..NewTrip::for_driver(driver_id).loaded_at(date(day), "10:00")
    };
    let a1 = repo
        .create(&trip(ana, "2024-03-01", Province::Holguin, "Arroz", "100"))
        .unwrap();
    let a2 = repo
        .create(&trip(ana, "2024-03-10", Province::Holguin, "Azúcar", "250.75"))
        .unwrap();
    let a3 = repo
        .create(&trip(ana, "2024-04-01", Province::Granma, "arroz integral", "90"))
        .unwrap();
    repo.create(&trip(luis, "2024-03-05", Province::Holguin, "Arroz", "300"))
        .unwrap();

    let ids = |query: TripListQuery| -> Vec<i64> {
        repo.list_filtered(&query)
            .unwrap()
            .into_iter()
            .map(|trip| trip.trip_id)
            .collect()
    };

    assert_eq!(ids(TripListQuery::default()).len(), 4);
    assert_eq!(
        ids(TripListQuery {
            driver_id: Some(ana),
            province: Some(Province::Holguin),
            ..TripListQuery::default()
        }),
        vec![a2.trip_id, a1.trip_id]
    );
    assert_eq!(
        ids(TripListQuery {
            driver_id: Some(ana),
            product: Some("ARROZ".to_string()),
            ..TripListQuery::default()
        }),
        vec![a3.trip_id, a1.trip_id]
    );
    assert_eq!(
        ids(TripListQuery {
            load_date_from: Some(date("2024-03-01")),
            load_date_to: Some(date("2024-03-10")),
            payment_min: Some("100".to_string()),
            payment_max: Some("260".to_string()),
            ..TripListQuery::default()
        }),
        vec![a2.trip_id, a1.trip_id]
    );
    assert_eq!(
        ids(TripListQuery {
            container_number: Some("cont-2024-04".to_string()),
            ..TripListQuery::default()
        }),
        vec![a3.trip_id]
    );
}

#[test]
fn list_filtered_pages_results() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();
    for day in ["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04"] {
        repo.create(&NewTrip::for_driver(driver_id).loaded_at(date(day), "07:00"))
            .unwrap();
    }

    let dates = |limit, offset| -> Vec<NaiveDate> {
        repo.list_filtered(&TripListQuery {
            limit,
            offset,
            ..TripListQuery::default()
        })
        .unwrap()
        .into_iter()
        .filter_map(|trip| trip.load_date)
        .collect()
    };

    assert_eq!(dates(Some(2), 0), vec![date("2024-01-04"), date("2024-01-03")]);
    assert_eq!(dates(Some(2), 2), vec![date("2024-01-02"), date("2024-01-01")]);
    assert_eq!(dates(None, 3), vec![date("2024-01-01")]);
}

#[test]
fn list_filtered_rejects_malformed_payment_bound() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    let query = TripListQuery {
        payment_min: Some("1; DROP TABLE trips".to_string()),
        ..TripListQuery::default()
    };
    assert!(matches!(
        repo.list_filtered(&query),
        Err(RepoError::Validation(ValidationError::InvalidPayment(_)))
    ));
}

#[test]
fn update_patches_and_clears_fields() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let other_id = seed_driver(&conn, "D2");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();
    let trip = repo
        .create(&NewTrip {
            product: Some("Arroz".to_string()),
            ..NewTrip::for_driver(driver_id).loaded_at(date("2024-03-01"), "08:00")
        })
        .unwrap();

    let patch = TripPatch {
        driver_id: Some(other_id),
        load_time: Some(Some("9:15".to_string())),
        product: Some(None),
        province: Some(Some(Province::Camaguey)),
        ..TripPatch::default()
    };
    assert!(matches!(
        repo.update(trip.trip_id, &patch),
        Err(RepoError::Validation(ValidationError::InvalidLoadTime(_)))
    ));

    let patch = TripPatch {
        load_time: Some(Some("09:15".to_string())),
        ..patch
    };
    let updated = repo.update(trip.trip_id, &patch).unwrap();
    assert_eq!(updated.driver_id, other_id);
    assert_eq!(updated.load_time.as_deref(), Some("09:15:00"));
    assert_eq!(updated.product, None);
    assert_eq!(updated.province, Some(Province::Camaguey));
    assert_eq!(updated.load_date, Some(date("2024-03-01")));
}

#[test]
fn update_to_unknown_driver_and_missing_trip() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();
    let trip = repo.create(&NewTrip::for_driver(driver_id)).unwrap();

    let reassign = TripPatch {
        driver_id: Some(500),
        ..TripPatch::default()
    };
    assert!(matches!(
        repo.update(trip.trip_id, &reassign),
        Err(RepoError::Validation(ValidationError::UnknownDriver(500)))
    ));

    let patch = TripPatch {
        product: Some(Some("Café".to_string())),
        ..TripPatch::default()
    };
    assert!(matches!(
        repo.update(trip.trip_id + 100, &patch),
        Err(RepoError::NotFound { entity: "trip", .. })
    ));
}

#[test]
fn update_with_empty_patch_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();
    let trip = repo.create(&NewTrip::for_driver(driver_id)).unwrap();

    assert!(matches!(
        repo.update(trip.trip_id, &TripPatch::default()),
        Err(RepoError::NoFields("trip"))
    ));
    assert!(matches!(
        repo.update(trip.trip_id + 1, &TripPatch::default()),
        Err(RepoError::NoFields("trip"))
    ));
    assert_eq!(repo.get_by_id(trip.trip_id).unwrap(), Some(trip));
}

#[test]
fn unknown_stored_province_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let driver_id = seed_driver(&conn, "D1");
    conn.execute(
        "INSERT INTO trips (driver_id, province) VALUES (?1, 'Atlantis');",
        [driver_id],
    )
    .unwrap();
    let bad_trip = conn.last_insert_rowid();
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    match repo.list() {
        Err(RepoError::InvalidData(message)) => {
            assert!(message.contains("Atlantis"), "{message}");
            assert!(message.contains(&format!("trip_id={bad_trip}")), "{message}");
        }
        other => panic!("expected invalid data, got {other:?}"),
    }
}

#[test]
fn deletes_by_id_by_driver_and_all() {
    let conn = open_db_in_memory().unwrap();
    let ana = seed_driver(&conn, "D1");
    let luis = seed_driver(&conn, "D2");
    let repo = SqliteTripRepository::try_new(&conn).unwrap();

    let first = repo.create(&NewTrip::for_driver(ana)).unwrap();
    repo.create(&NewTrip::for_driver(ana)).unwrap();
    repo.create(&NewTrip::for_driver(ana)).unwrap();
    repo.create(&NewTrip::for_driver(luis)).unwrap();

    repo.delete(first.trip_id).unwrap();
    repo.delete(first.trip_id).unwrap();
    assert_eq!(repo.delete_by_driver(ana).unwrap(), 2);
    assert!(repo.list_by_driver(ana).unwrap().is_empty());
    assert_eq!(repo.delete_all().unwrap(), 1);
}
