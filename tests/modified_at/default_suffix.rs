//! Default Suffix Tests
//!
//! The default suffix is `_modifiedAt` and can be replaced per resolver,
//! without any process-wide state.

use crate::common::*;

#[test]
fn test_standard_default_suffix() {
    assert_eq!(DEFAULT_SUFFIX, "_modifiedAt");
    assert_eq!(Resolver::new().defaults().suffix, DEFAULT_SUFFIX);
}

#[tokio::test]
async fn test_resolver_default_suffix() {
    let resolver = Resolver::with_defaults(Defaults::default().with_suffix("_changedAt"));
    let model = pet_model(ModifiedAt::with_resolver(&resolver, ["name"]).unwrap());
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert!(doc.get_date("name_changedAt").is_some());
    assert_not_stamped(&doc, "name_modifiedAt");
}

#[tokio::test]
async fn test_custom_defaults_do_not_leak() {
    let resolver = Resolver::with_defaults(Defaults::default().with_suffix("_changedAt"));
    let _custom = ModifiedAt::with_resolver(&resolver, ["name"]).unwrap();

    let model = pet_model(ModifiedAt::new(["name"]).unwrap());
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert!(doc.get_date("name_modifiedAt").is_some());
}

#[tokio::test]
async fn test_default_select_off() {
    let resolver = Resolver::with_defaults(Defaults {
        select: false,
        ..Defaults::default()
    });
    let model = pet_model(ModifiedAt::with_resolver(&resolver, ["name"]).unwrap());
    let doc = model.create(fields(json!({"name": "Kitty"}))).await.unwrap();
    assert!(doc.get_date("name_modifiedAt").is_some());
    let loaded = model.find_by_id(doc.id().unwrap()).unwrap().unwrap();
    assert_not_stamped(&loaded, "name_modifiedAt");
}
