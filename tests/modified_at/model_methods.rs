//! Bulk Insert Pathway Tests
//!
//! insert_many treats every key of each raw document as modified.

use crate::common::*;

fn cats() -> Model {
    pet_model(ModifiedAt::new(["name", "age"]).expect("valid options"))
}

#[tokio::test]
async fn test_insert_many_stamps_present_keys() {
    let model = cats();
    let start = Timestamp::now();
    let docs = model
        .insert_many(
            vec![
                fields(json!({"name": "Kitty", "age": 1})),
                fields(json!({"name": "Snow", "sex": "f"})),
            ],
            InsertManyOptions::default(),
        )
        .await
        .unwrap();
    let end = Timestamp::now();

    assert_stamped_within(&docs[0], "name_modifiedAt", start, end);
    assert_stamped_within(&docs[0], "age_modifiedAt", start, end);
    assert_stamped_within(&docs[1], "name_modifiedAt", start, end);
    assert_not_stamped(&docs[1], "age_modifiedAt");
    assert_not_stamped(&docs[1], "sex_modifiedAt");

    let stored = model.find(&FieldMap::new(), &Projection::Default).unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|d| d.get_date("name_modifiedAt").is_some()));
}

#[tokio::test]
async fn test_insert_many_opt_out() {
    let model = cats();
    let docs = model
        .insert_many(
            vec![fields(json!({"name": "Kitty", "age": 1}))],
            InsertManyOptions::default().with_modified_at(false),
        )
        .await
        .unwrap();
    assert_not_stamped(&docs[0], "name_modifiedAt");
    assert_not_stamped(&docs[0], "age_modifiedAt");
}

#[tokio::test]
async fn test_insert_many_evaluates_predicates_per_document() {
    let model = order_model(
        ModifiedAt::new(ModifiedAtOptions::new().predicate("boughtAt", status_is(2))).unwrap(),
    );
    let docs = model
        .insert_many(
            vec![
                fields(json!({"name": "a", "status": 1})),
                fields(json!({"name": "b", "status": 2})),
            ],
            InsertManyOptions::default(),
        )
        .await
        .unwrap();
    assert_not_stamped(&docs[0], "boughtAt");
    assert!(docs[1].get_date("boughtAt").is_some());
}

#[tokio::test]
async fn test_insert_many_predicate_failure_inserts_nothing() {
    let failing = predicate::try_from_fn(|doc: &FieldMap| {
        if doc.get("status") == Some(&Value::Int(9)) {
            Err("status 9 is reserved")
        } else {
            Ok(false)
        }
    });
    let model = order_model(
        ModifiedAt::new(ModifiedAtOptions::new().fields(["name"]).predicate("checkedAt", failing)).unwrap(),
    );

    let err = model
        .insert_many(
            vec![
                fields(json!({"name": "a", "status": 1})),
                fields(json!({"name": "b", "status": 9})),
            ],
            InsertManyOptions::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HookFailed { event: WriteEvent::InsertMany, .. }));
    assert_eq!(model.count(), 0);
}
