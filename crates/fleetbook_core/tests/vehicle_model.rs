use fleetbook_core::{Vehicle, VehicleValidationError, UNASSIGNED_VEHICLE_ID};

#[test]
fn vehicle_new_starts_without_identity() {
    let vehicle = Vehicle::new("Fiat Uno", "Fiat", 1995);

    assert_eq!(vehicle.id, UNASSIGNED_VEHICLE_ID);
    assert!(!vehicle.has_id());
    assert_eq!(vehicle.name, "Fiat Uno");
    assert_eq!(vehicle.brand, "Fiat");
    assert_eq!(vehicle.year, 1995);
    assert!(vehicle.validate().is_ok());
}

#[test]
fn with_id_rejects_non_positive_ids() {
    assert_eq!(
        Vehicle::with_id(0, "Gol", "Volkswagen", 2010).unwrap_err(),
        VehicleValidationError::NonPositiveId(0)
    );
    assert_eq!(
        Vehicle::with_id(-3, "Gol", "Volkswagen", 2010).unwrap_err(),
        VehicleValidationError::NonPositiveId(-3)
    );
    assert!(Vehicle::with_id(42, "Gol", "Volkswagen", 2010)
        .unwrap()
        .has_id());
}

#[test]
fn validate_rejects_blank_and_oversized_text() {
    assert_eq!(
        Vehicle::new("   ", "Fiat", 2000).validate().unwrap_err(),
        VehicleValidationError::BlankName
    );
    assert_eq!(
        Vehicle::new("Uno", "", 2000).validate().unwrap_err(),
        VehicleValidationError::BlankBrand
    );
    assert_eq!(
        Vehicle::new("x".repeat(151), "Fiat", 2000)
            .validate()
            .unwrap_err(),
        VehicleValidationError::NameTooLong { chars: 151 }
    );
    assert_eq!(
        Vehicle::new("Uno", "b".repeat(101), 2000)
            .validate()
            .unwrap_err(),
        VehicleValidationError::BrandTooLong { chars: 101 }
    );
    assert!(Vehicle::new("é".repeat(150), "Fiat", 2000).validate().is_ok());
}

#[test]
fn validate_rejects_years_before_1950_and_negative_ids() {
    assert_eq!(
        Vehicle::new("Model T", "Ford", 1927).validate().unwrap_err(),
        VehicleValidationError::YearTooOld { year: 1927 }
    );
    assert!(Vehicle::new("Beetle", "Volkswagen", 1950).validate().is_ok());

    let mut vehicle = Vehicle::new("Beetle", "Volkswagen", 1960);
    vehicle.id = -1;
    assert_eq!(
        vehicle.validate().unwrap_err(),
        VehicleValidationError::NegativeId(-1)
    );
}

#[test]
fn vehicle_serialization_uses_expected_wire_fields() {
    let vehicle = Vehicle::with_id(7, "Fiat Uno", "Fiat", 1995).unwrap();

    let json = serde_json::to_value(&vehicle).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"id": 7, "name": "Fiat Uno", "brand": "Fiat", "year": 1995})
    );

    let decoded: Vehicle = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, vehicle);
}

#[test]
fn deserialize_defaults_missing_id_to_unassigned() {
    let decoded: Vehicle =
        serde_json::from_str(r#"{"name":"Palio","brand":"Fiat","year":2004}"#).unwrap();
    assert_eq!(decoded.id, UNASSIGNED_VEHICLE_ID);
}
