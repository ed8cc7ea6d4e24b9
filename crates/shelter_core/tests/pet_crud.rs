use shelter_core::{
    collection_locator, item_locator, Gender, Locator, Pet, PetFields, PetListQuery,
    PetStore, PetValidationError, StoreConfig, StoreError,
};
use std::collections::HashSet;

fn open_store() -> PetStore {
    PetStore::connect(StoreConfig::in_memory()).unwrap()
}

fn toto() -> PetFields {
    PetFields::new()
        .name("Toto")
        .breed("Terrier")
        .gender(Gender::Male)
        .weight(7)
}

#[test]
fn insert_and_query_roundtrip() {
    let store = open_store();

    let locator = store.insert(&collection_locator(), &toto()).unwrap();
    let Locator::Item(id) = locator else {
        panic!("insert must return an item locator, got {locator}");
    };

    let rows = store.query(&locator).unwrap();
    assert_eq!(
        rows,
        vec![Pet {
            id,
            name: "Toto".to_string(),
            breed: "Terrier".to_string(),
            gender: Gender::Male,
            weight: 7,
        }]
    );
}

#[test]
fn insert_applies_defaults_and_appears_in_collection() {
    let store = open_store();

    let locator = store
        .insert(&collection_locator(), &PetFields::new().name("Binx"))
        .unwrap();

    let all = store.query(&collection_locator()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(Locator::Item(all[0].id), locator);
    assert_eq!(all[0].name, "Binx");
    assert_eq!(all[0].breed, "");
    assert_eq!(all[0].gender, Gender::Unknown);
    assert_eq!(all[0].weight, 0);
}

#[test]
fn inserted_ids_are_fresh_and_ascending() {
    let store = open_store();
    let mut seen = HashSet::new();
    let mut last = -1;

    for name in ["a", "b", "c", "d"] {
        let locator = store
            .insert(&collection_locator(), &PetFields::new().name(name))
            .unwrap();
        let id = locator.item_id().unwrap();
        assert!(seen.insert(id), "id {id} was reused");
        assert!(id > last);
        last = id;
    }

    let ids = store
        .query(&collection_locator())
        .unwrap()
        .into_iter()
        .map(|pet| pet.id)
        .collect::<Vec<_>>();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let store = open_store();
    let first = store.insert(&collection_locator(), &toto()).unwrap();
    assert_eq!(store.delete(&collection_locator()).unwrap(), 1);

    let second = store.insert(&collection_locator(), &toto()).unwrap();
    assert!(second.item_id().unwrap() > first.item_id().unwrap());
}

#[test]
fn insert_with_blank_name_fails_without_writing() {
    let store = open_store();
    store.insert(&collection_locator(), &toto()).unwrap();

    let err = store
        .insert(&collection_locator(), &PetFields::new().name("").weight(4))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidRecord(PetValidationError::BlankName)
    ));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn insert_rejects_invalid_domains() {
    let store = open_store();

    let negative = PetFields::new().name("Rex").weight(-2);
    assert!(matches!(
        store.insert(&collection_locator(), &negative).unwrap_err(),
        StoreError::InvalidRecord(PetValidationError::NegativeWeight(-2))
    ));

    let gender = PetFields::new().name("Rex").gender_code(5);
    assert!(matches!(
        store.insert(&collection_locator(), &gender).unwrap_err(),
        StoreError::InvalidRecord(PetValidationError::InvalidGender(5))
    ));

    assert!(matches!(
        store
            .insert(&collection_locator(), &PetFields::new().breed("Pug"))
            .unwrap_err(),
        StoreError::InvalidRecord(PetValidationError::MissingName)
    ));

    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn insert_into_item_locator_is_rejected() {
    let store = open_store();
    let err = store.insert(&Locator::Item(1), &toto()).unwrap_err();
    assert!(matches!(err, StoreError::InvalidIdentifier(_)));
}

#[test]
fn partial_update_changes_only_supplied_fields() {
    let store = open_store();
    let locator = store.insert(&collection_locator(), &toto()).unwrap();

    let changed = store
        .update(&locator, &PetFields::new().weight(9))
        .unwrap();
    assert_eq!(changed, 1);

    let pet = store.query_one(&locator).unwrap().unwrap();
    assert_eq!(pet.name, "Toto");
    assert_eq!(pet.breed, "Terrier");
    assert_eq!(pet.gender, Gender::Male);
    assert_eq!(pet.weight, 9);
}

#[test]
fn update_can_clear_breed_and_change_gender() {
    let store = open_store();
    let locator = store.insert(&collection_locator(), &toto()).unwrap();

    store
        .update(
            &locator,
            &PetFields::new().breed("").gender(Gender::Female),
        )
        .unwrap();

    let pet = store.query_one(&locator).unwrap().unwrap();
    assert_eq!(pet.breed, "");
    assert_eq!(pet.gender, Gender::Female);
    assert_eq!(pet.weight, 7);
}

#[test]
fn update_missing_id_returns_zero() {
    let store = open_store();
    let changed = store
        .update(&item_locator(42).unwrap(), &PetFields::new().name("Ghost"))
        .unwrap();
    assert_eq!(changed, 0);
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn update_with_invalid_value_leaves_record_untouched() {
    let store = open_store();
    let locator = store.insert(&collection_locator(), &toto()).unwrap();

    let err = store
        .update(&locator, &PetFields::new().weight(11).name("  "))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidRecord(PetValidationError::BlankName)
    ));

    let pet = store.query_one(&locator).unwrap().unwrap();
    assert_eq!(pet.weight, 7);
    assert_eq!(pet.name, "Toto");
}

#[test]
fn update_with_empty_payload_changes_nothing() {
    let store = open_store();
    let locator = store.insert(&collection_locator(), &toto()).unwrap();
    assert_eq!(store.update(&locator, &PetFields::new()).unwrap(), 0);
}

#[test]
fn update_requires_item_locator() {
    let store = open_store();
    let err = store
        .update(&collection_locator(), &PetFields::new().weight(1))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotAnItemLocator(Locator::Collection)));
}

#[test]
fn hand_built_negative_item_locator_is_rejected() {
    let store = open_store();
    store.insert(&collection_locator(), &toto()).unwrap();
    let negative = Locator::Item(-5);

    for err in [
        store.update(&negative, &PetFields::new().weight(1)).unwrap_err(),
        store.delete(&negative).unwrap_err(),
        store.query(&negative).unwrap_err(),
        store.query_one(&negative).unwrap_err(),
        store.register_observer(&negative, || {}).unwrap_err(),
    ] {
        assert!(
            matches!(err, StoreError::InvalidIdentifier(ref id) if id == "-5"),
            "unexpected error: {err}"
        );
    }
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn delete_item_removes_only_that_record() {
    let store = open_store();
    let keep = store.insert(&collection_locator(), &toto()).unwrap();
    let gone = store
        .insert(&collection_locator(), &PetFields::new().name("Binx"))
        .unwrap();

    assert_eq!(store.delete(&gone).unwrap(), 1);
    assert!(store.query(&gone).unwrap().is_empty());
    assert!(store.query_one(&gone).unwrap().is_none());
    assert_eq!(store.query(&keep).unwrap().len(), 1);

    assert_eq!(store.delete(&gone).unwrap(), 0);
}

#[test]
fn delete_collection_returns_prior_count() {
    let store = open_store();
    for name in ["a", "b", "c"] {
        store
            .insert(&collection_locator(), &PetFields::new().name(name))
            .unwrap();
    }

    assert_eq!(store.delete(&collection_locator()).unwrap(), 3);
    assert!(store.query(&collection_locator()).unwrap().is_empty());
    assert_eq!(store.delete(&collection_locator()).unwrap(), 0);
}

#[test]
fn query_with_filters_by_gender_and_paginates() {
    let store = open_store();
    let genders = [
        Gender::Male,
        Gender::Female,
        Gender::Male,
        Gender::Unknown,
        Gender::Male,
    ];
    for (index, gender) in genders.into_iter().enumerate() {
        store
            .insert(
                &collection_locator(),
                &PetFields::new().name(format!("pet-{index}")).gender(gender),
            )
            .unwrap();
    }

    let males = store
        .query_with(
            &collection_locator(),
            &PetListQuery {
                gender: Some(Gender::Male),
                ..PetListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(
        males.iter().map(|pet| pet.name.as_str()).collect::<Vec<_>>(),
        vec!["pet-0", "pet-2", "pet-4"]
    );

    let page = store
        .query_with(
            &collection_locator(),
            &PetListQuery {
                limit: Some(2),
                offset: 1,
                descending: true,
                ..PetListQuery::default()
            },
        )
        .unwrap();
    assert_eq!(
        page.iter().map(|pet| pet.name.as_str()).collect::<Vec<_>>(),
        vec!["pet-3", "pet-2"]
    );

    let female_filter = PetListQuery {
        gender: Some(Gender::Female),
        ..PetListQuery::default()
    };
    let first = Locator::Item(males[0].id);
    assert!(store.query_with(&first, &female_filter).unwrap().is_empty());
}

#[test]
fn query_is_a_fresh_read_each_time() {
    let store = open_store();
    let before = store.query(&collection_locator()).unwrap();
    store.insert(&collection_locator(), &toto()).unwrap();
    let after = store.query(&collection_locator()).unwrap();

    assert!(before.is_empty());
    assert_eq!(after.len(), 1);
}

#[test]
fn query_one_requires_item_locator() {
    let store = open_store();
    assert!(matches!(
        store.query_one(&collection_locator()).unwrap_err(),
        StoreError::NotAnItemLocator(Locator::Collection)
    ));
}
