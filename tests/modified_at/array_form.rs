//! Field List Tests
//!
//! Plain field lists, typed and loosely typed.

use crate::common::*;

#[tokio::test]
async fn test_field_list_from_json_array() {
    let model = pet_model(ModifiedAt::from_value(&json!(["name", "age"])).unwrap());
    let doc = model
        .create(fields(json!({"name": "Kitty", "age": 1, "sex": "f"})))
        .await
        .unwrap();
    assert!(doc.get_date("name_modifiedAt").is_some());
    assert!(doc.get_date("age_modifiedAt").is_some());
    assert_not_stamped(&doc, "sex_modifiedAt");
}

#[test]
fn test_derived_fields_are_dates_and_selected() {
    let mut schema = pet_schema();
    schema
        .plugin(&ModifiedAt::new(vec!["name".to_string()]).unwrap())
        .unwrap();
    let def = schema.field_def("name_modifiedAt").unwrap();
    assert_eq!(def.field_type, FieldType::Date);
    assert!(def.options.select);
    assert!(schema.field_def("age_modifiedAt").is_none());
}

#[tokio::test]
async fn test_empty_field_list_stamps_nothing() {
    let model = pet_model(ModifiedAt::new(Vec::<String>::new()).unwrap());
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert_eq!(doc.fields().len(), 2, "name and _id only: {:?}", doc.fields());
}
