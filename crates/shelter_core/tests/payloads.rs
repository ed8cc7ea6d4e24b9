use serde_json::json;
use shelter_core::{
    collection_locator, Gender, Locator, PetFields, PetStore, StorageLocation, StoreConfig,
    StoreError, SCHEMA_VERSION,
};
use std::path::PathBuf;

fn fields(value: serde_json::Value) -> PetFields {
    serde_json::from_value(value).unwrap()
}

#[test]
fn field_map_drives_insert_and_update() {
    let store = PetStore::connect(StoreConfig::in_memory()).unwrap();

    let locator = store
        .insert(
            &collection_locator(),
            &fields(json!({"name": "Toto", "breed": "Terrier", "gender": 1, "weight": 7})),
        )
        .unwrap();
    store
        .update(&locator, &fields(json!({"weight": 8})))
        .unwrap();

    let pet = store.query_one(&locator).unwrap().unwrap();
    assert_eq!(pet.gender, Gender::Male);
    assert_eq!(pet.weight, 8);
    assert_eq!(pet.breed, "Terrier");
}

#[test]
fn out_of_domain_gender_is_rejected_at_validation() {
    let store = PetStore::connect(StoreConfig::in_memory()).unwrap();
    let err = store
        .insert(
            &collection_locator(),
            &fields(json!({"name": "Rex", "gender": 3})),
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidRecord(_)));
}

#[test]
fn unknown_field_names_are_rejected() {
    let result = serde_json::from_value::<PetFields>(json!({"name": "Rex", "colour": "red"}));
    assert!(result.is_err());
}

#[test]
fn locator_text_resolves_against_store() {
    let store = PetStore::connect(StoreConfig::in_memory()).unwrap();
    let locator = store
        .insert(&collection_locator(), &PetFields::new().name("Toto"))
        .unwrap();

    let parsed: Locator = locator.to_string().parse().unwrap();
    assert_eq!(parsed, locator);
    assert_eq!(store.query(&parsed).unwrap().len(), 1);

    let content: Locator = format!("content://com.example.android.pets/{locator}")
        .parse()
        .unwrap();
    assert_eq!(content, locator);
}

#[test]
fn store_config_deserializes_with_defaults() {
    let config: StoreConfig =
        serde_json::from_value(json!({"location": {"file": "/var/lib/shelter/shelter.db"}}))
            .unwrap();
    assert_eq!(
        config.location,
        StorageLocation::File(PathBuf::from("/var/lib/shelter/shelter.db"))
    );
    assert_eq!(config.schema_version, SCHEMA_VERSION);

    let memory: StoreConfig =
        serde_json::from_value(json!({"location": "memory", "schema_version": 3})).unwrap();
    assert_eq!(memory.location, StorageLocation::Memory);
    assert_eq!(memory.schema_version, 3);
}
