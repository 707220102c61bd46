//! Document Pathway Tests
//!
//! create / save with a field list configuration:
//! - Scenario A: tracked fields stamped on create, untracked ones not
//! - Scenario B: a later save refreshes only what it changed
//! - Per-call opt-out on save

use crate::common::*;
use std::time::Duration;

fn cats() -> Model {
    pet_model(ModifiedAt::new(["name", "age"]).expect("valid options"))
}

#[tokio::test]
async fn test_create_stamps_tracked_fields() {
    let model = cats();
    let start = Timestamp::now();
    let kitty = model
        .create(fields(json!({"name": "Kitty", "age": 1})))
        .await
        .unwrap();
    let end = Timestamp::now();

    let name_at = assert_stamped_within(&kitty, "name_modifiedAt", start, end);
    let age_at = assert_stamped_within(&kitty, "age_modifiedAt", start, end);
    assert_eq!(name_at, age_at, "tracked fields share one write time");
    assert_not_stamped(&kitty, "sex_modifiedAt");

    let stored = model.find_by_id(kitty.id().unwrap()).unwrap().unwrap();
    assert_eq!(stored.get_date("name_modifiedAt"), Some(name_at));
}

#[tokio::test]
async fn test_create_only_stamps_provided_fields() {
    let model = cats();
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert!(doc.get_date("name_modifiedAt").is_some());
    assert_not_stamped(&doc, "age_modifiedAt");
}

#[tokio::test]
async fn test_save_refreshes_changed_field_only() {
    let model = cats();
    let mut kitty = model
        .create(fields(json!({"name": "Kitty", "age": 1})))
        .await
        .unwrap();
    let name_at = kitty.get_date("name_modifiedAt").unwrap();
    let age_at = kitty.get_date("age_modifiedAt").unwrap();

    tokio::time::sleep(Duration::from_millis(2)).await;
    kitty.set("age", 2i64);
    let start = Timestamp::now();
    model.save(&mut kitty, SaveOptions::default()).await.unwrap();
    let end = Timestamp::now();

    let new_age_at = assert_stamped_within(&kitty, "age_modifiedAt", start, end);
    assert!(new_age_at > age_at);
    assert_eq!(kitty.get_date("name_modifiedAt"), Some(name_at));

    let stored = model.find_by_id(kitty.id().unwrap()).unwrap().unwrap();
    assert_eq!(stored.get_date("age_modifiedAt"), Some(new_age_at));
    assert_eq!(stored.get_date("name_modifiedAt"), Some(name_at));
}

#[tokio::test]
async fn test_save_of_loaded_document() {
    let model = cats();
    let created = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();

    let mut loaded = model.find_by_id(created.id().unwrap()).unwrap().unwrap();
    loaded.set("age", 4i64);
    model.save(&mut loaded, SaveOptions::default()).await.unwrap();

    let stored = model.find_by_id(created.id().unwrap()).unwrap().unwrap();
    assert!(stored.get_date("age_modifiedAt").is_some());
    assert_eq!(
        stored.get_date("name_modifiedAt"),
        created.get_date("name_modifiedAt")
    );
}

#[tokio::test]
async fn test_save_without_changes_stamps_nothing() {
    let model = cats();
    let mut kitty = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    let before = kitty.fields().clone();
    model.save(&mut kitty, SaveOptions::default()).await.unwrap();
    assert_eq!(kitty.fields(), &before);
}

#[tokio::test]
async fn test_setting_unchanged_value_does_not_restamp() {
    let model = cats();
    let mut kitty = model
        .create(fields(json!({"name": "Kitty", "age": 1})))
        .await
        .unwrap();
    let age_at = kitty.get_date("age_modifiedAt").unwrap();

    tokio::time::sleep(Duration::from_millis(2)).await;
    kitty.set("age", 1i64);
    model.save(&mut kitty, SaveOptions::default()).await.unwrap();

    let stored = model.find_by_id(kitty.id().unwrap()).unwrap().unwrap();
    assert_eq!(stored.get_date("age_modifiedAt"), Some(age_at));
}

#[tokio::test]
async fn test_save_opt_out() {
    let model = cats();
    let kitty = model
        .create_with(
            fields(json!({"name": "Kitty", "age": 1})),
            SaveOptions::default().with_modified_at(false),
        )
        .await
        .unwrap();
    assert_not_stamped(&kitty, "name_modifiedAt");
    assert_not_stamped(&kitty, "age_modifiedAt");

    let mut kitty = kitty;
    kitty.set("age", 2i64);
    model
        .save(&mut kitty, SaveOptions::default().with_modified_at(false))
        .await
        .unwrap();
    let stored = model.find_by_id(kitty.id().unwrap()).unwrap().unwrap();
    assert_not_stamped(&stored, "age_modifiedAt");
}

#[tokio::test]
async fn test_create_many_stamps_each() {
    let model = cats();
    let start = Timestamp::now();
    let docs = model
        .create_many(
            vec![
                fields(json!({"name": "Kitty"})),
                fields(json!({"age": 3})),
            ],
            SaveOptions::default(),
        )
        .await
        .unwrap();
    let end = Timestamp::now();

    assert_stamped_within(&docs[0], "name_modifiedAt", start, end);
    assert_not_stamped(&docs[0], "age_modifiedAt");
    assert_stamped_within(&docs[1], "age_modifiedAt", start, end);
    assert_not_stamped(&docs[1], "name_modifiedAt");
}

#[tokio::test]
async fn test_injected_clock_is_used() {
    let at = Timestamp::from_secs(1_700_000_000);
    let plugin = ModifiedAt::new(["name"])
        .unwrap()
        .with_clock(std::sync::Arc::new(FixedClock(at)));
    let model = pet_model(plugin);
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert_eq!(doc.get_date("name_modifiedAt"), Some(at));
}
