//! Schema Default Tests
//!
//! Values filled in from schema defaults are not modifications.

use crate::common::*;

fn cats_with_default_age() -> Model {
    init_tracing();
    let mut schema = Schema::new()
        .field("name", FieldType::String)
        .field_with("age", FieldType::Number, FieldOptions::default().with_default(1i64));
    schema.plugin(&ModifiedAt::new(["name", "age"]).unwrap()).unwrap();
    Model::new(random_name(), schema)
}

#[tokio::test]
async fn test_default_filled_field_is_not_stamped() {
    let model = cats_with_default_age();
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert_eq!(doc.get("age"), Some(&Value::Int(1)));
    assert!(doc.get_date("name_modifiedAt").is_some());
    assert_not_stamped(&doc, "age_modifiedAt");
}

#[tokio::test]
async fn test_explicit_value_equal_to_default_is_stamped() {
    let model = cats_with_default_age();
    let doc = model
        .create(fields(json!({"name": "Kitty", "age": 1})))
        .await
        .unwrap();
    assert!(doc.get_date("age_modifiedAt").is_some());
}

#[tokio::test]
async fn test_insert_many_default_not_stamped() {
    let model = cats_with_default_age();
    let docs = model
        .insert_many(vec![fields(json!({"name": "Kitty"}))], InsertManyOptions::default())
        .await
        .unwrap();
    assert_eq!(docs[0].get("age"), Some(&Value::Int(1)));
    assert_not_stamped(&docs[0], "age_modifiedAt");
}
