//! Options Object Tests
//!
//! Custom suffix, selectability and custom predicates (Scenario C).

use crate::common::*;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Suffix and select
// ============================================================================

#[tokio::test]
async fn test_custom_suffix() {
    let model = pet_model(
        ModifiedAt::new(ModifiedAtOptions::new().suffix("_updatedAt").fields(["name"])).unwrap(),
    );
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert!(doc.get_date("name_updatedAt").is_some());
    assert_not_stamped(&doc, "name_modifiedAt");
}

#[tokio::test]
async fn test_unselected_derived_fields_need_explicit_projection() {
    let model = pet_model(
        ModifiedAt::new(ModifiedAtOptions::new().select(false).fields(["name"])).unwrap(),
    );
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    let stamped = doc.get_date("name_modifiedAt").expect("stamped in memory");

    let default = model.find_by_id(doc.id().unwrap()).unwrap().unwrap();
    assert_not_stamped(&default, "name_modifiedAt");

    let explicit = model
        .find_by_id_with(doc.id().unwrap(), &Projection::include(["name_modifiedAt"]))
        .unwrap()
        .unwrap();
    assert_eq!(explicit.get_date("name_modifiedAt"), Some(stamped));
}

#[tokio::test]
async fn test_save_of_loaded_document_keeps_unselected_stamps() {
    let model = pet_model(
        ModifiedAt::new(ModifiedAtOptions::new().select(false).fields(["name", "age"])).unwrap(),
    );
    let created = model
        .create(fields(json!({"name": "Kitty", "age": 1})))
        .await
        .unwrap();
    let name_at = created.get_date("name_modifiedAt").expect("stamped on create");

    let mut loaded = model.find_by_id(created.id().unwrap()).unwrap().unwrap();
    assert_not_stamped(&loaded, "name_modifiedAt");
    tokio::time::sleep(Duration::from_millis(2)).await;
    loaded.set("age", 2i64);
    let start = Timestamp::now();
    model.save(&mut loaded, SaveOptions::default()).await.unwrap();
    let end = Timestamp::now();

    let stored = reload(&model, &created, &["name_modifiedAt", "age_modifiedAt"]);
    assert_eq!(stored.get("age"), Some(&Value::Int(2)));
    assert_eq!(stored.get_date("name_modifiedAt"), Some(name_at));
    assert_stamped_within(&stored, "age_modifiedAt", start, end);
}

// ============================================================================
// Custom predicates
// ============================================================================

#[tokio::test]
async fn test_predicate_stamps_when_condition_becomes_true() {
    let model = order_model(
        ModifiedAt::new(ModifiedAtOptions::new().predicate("boughtAt", status_is(2))).unwrap(),
    );

    let mut order = model
        .create(fields(json!({"name": "Kitty", "status": 1})))
        .await
        .unwrap();
    assert_not_stamped(&order, "boughtAt");

    order.set("status", 2i64);
    let start = Timestamp::now();
    model.save(&mut order, SaveOptions::default()).await.unwrap();
    let end = Timestamp::now();
    let bought_at = assert_stamped_within(&order, "boughtAt", start, end);

    tokio::time::sleep(Duration::from_millis(2)).await;
    order.set("status", 3i64);
    model.save(&mut order, SaveOptions::default()).await.unwrap();

    let stored = model.find_by_id(order.id().unwrap()).unwrap().unwrap();
    assert_eq!(stored.get("status"), Some(&Value::Int(3)));
    assert_eq!(stored.get_date("boughtAt"), Some(bought_at));
}

#[tokio::test]
async fn test_predicate_sees_merged_update_candidate() {
    let model = order_model(
        ModifiedAt::new(ModifiedAtOptions::new().predicate("boughtAt", status_is(2))).unwrap(),
    );
    let order = model
        .create(fields(json!({"name": "Kitty", "status": 1})))
        .await
        .unwrap();

    model
        .update_one(fields(json!({"name": "Kitty"})), update(json!({"status": 2})), UpdateOptions::default())
        .await
        .unwrap();
    let stored = model.find_by_id(order.id().unwrap()).unwrap().unwrap();
    assert!(stored.get_date("boughtAt").is_some());
}

#[tokio::test]
async fn test_each_matching_predicate_gets_its_own_time() {
    let slow_paid = predicate::from_async_fn(|doc: FieldMap| async move {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(doc.get("status") == Some(&Value::Int(2)))
    });
    let model = order_model(
        ModifiedAt::new(
            ModifiedAtOptions::new()
                .fields(["status"])
                .predicate("boughtAt", status_is(2))
                .predicate("paidAt", slow_paid),
        )
        .unwrap(),
    );

    let start = Timestamp::now();
    let order = model
        .create(fields(json!({"name": "Kitty", "status": 2})))
        .await
        .unwrap();
    let end = Timestamp::now();

    let status_at = assert_stamped_within(&order, "status_modifiedAt", start, end);
    let bought_at = assert_stamped_within(&order, "boughtAt", start, end);
    let paid_at = assert_stamped_within(&order, "paidAt", start, end);
    assert!(status_at <= bought_at);
    assert!(paid_at > bought_at, "slow predicate is stamped after it resolves");
}

#[tokio::test]
async fn test_indeterminate_predicate_does_not_stamp() {
    let model = order_model(
        ModifiedAt::new(ModifiedAtOptions::new().predicate(
            "reviewedAt",
            predicate::from_fn(|doc: &FieldMap| doc.get("status").and_then(Value::as_int).map(|s| s > 5)),
        ))
        .unwrap(),
    );
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert_not_stamped(&doc, "reviewedAt");
    let doc = model.create(fields(json!({"status": 7}))).await.unwrap();
    assert!(doc.get_date("reviewedAt").is_some());
}

#[tokio::test]
async fn test_predicate_failure_aborts_create() {
    let model = order_model(
        ModifiedAt::new(
            ModifiedAtOptions::new()
                .fields(["name"])
                .predicate(
                    "auditedAt",
                    predicate::from_async_fn(|_: FieldMap| async move {
                        Err::<bool, HookError>("audit service unavailable".into())
                    }),
                ),
        )
        .unwrap(),
    );

    let err = model
        .create(fields(json!({"name": "Kitty", "status": 1})))
        .await
        .unwrap_err();
    match &err {
        Error::HookFailed { event, source } => {
            assert_eq!(*event, WriteEvent::Save);
            let predicate_err = source
                .downcast_ref::<PredicateError>()
                .expect("source should be the predicate error");
            assert_eq!(predicate_err.field, "auditedAt");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(model.count(), 0);
}

#[tokio::test]
async fn test_predicate_failure_aborts_update() {
    let fail_on_three = predicate::try_from_fn(|doc: &FieldMap| {
        if doc.get("status") == Some(&Value::Int(3)) {
            Err("status 3 rejected")
        } else {
            Ok(false)
        }
    });
    let model = order_model(
        ModifiedAt::new(
            ModifiedAtOptions::new()
                .fields(["status"])
                .predicate("checkedAt", fail_on_three),
        )
        .unwrap(),
    );
    let order = model
        .create(fields(json!({"name": "Kitty", "status": 1})))
        .await
        .unwrap();
    let status_at = order.get_date("status_modifiedAt");

    let err = model
        .update_one(fields(json!({"name": "Kitty"})), update(json!({"status": 3})), UpdateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HookFailed { event: WriteEvent::UpdateOne, .. }));

    let stored = model.find_by_id(order.id().unwrap()).unwrap().unwrap();
    assert_eq!(stored.get("status"), Some(&Value::Int(1)));
    assert_eq!(stored.get_date("status_modifiedAt"), status_at);
}

#[tokio::test]
async fn test_opt_out_skips_predicates() {
    let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = calls.clone();
    let model = order_model(
        ModifiedAt::new(ModifiedAtOptions::new().predicate(
            "boughtAt",
            predicate::from_fn(move |_: &FieldMap| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                true
            }),
        ))
        .unwrap(),
    );
    let doc = model
        .create_with(
            fields(json!({"status": 2})),
            SaveOptions::default().with_modified_at(false),
        )
        .await
        .unwrap();
    assert_not_stamped(&doc, "boughtAt");
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}
