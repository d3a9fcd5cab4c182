use stagehand_model::FieldValue;
use stagehand_store::{Entity, EntityStore, MemoryStore, StoreError};

fn node(bundle: &str) -> Entity {
    Entity::stub("node", bundle)
}

#[test]
fn assigns_monotonic_ids_per_type() {
    let mut store = MemoryStore::new();

    let first = store.save(&mut node("landing_page")).expect("save node");
    let second = store.save(&mut node("article")).expect("save node");
    let paragraph = store
        .save(&mut Entity::stub("paragraph", "hero"))
        .expect("save paragraph");

    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);
    assert_eq!(paragraph.id, 1, "paragraph ids run on their own sequence");
}

#[test]
fn revision_ids_are_global() {
    let mut store = MemoryStore::new();

    let first = store.save(&mut node("landing_page")).expect("save node");
    let second = store
        .save(&mut Entity::stub("paragraph", "hero"))
        .expect("save paragraph");

    assert_eq!(first.revision_id, 1);
    assert_eq!(second.revision_id, 2);
}

#[test]
fn resave_keeps_id_and_bumps_revision() {
    let mut store = MemoryStore::new();

    let mut entity = node("landing_page");
    let first = store.save(&mut entity).expect("first save");

    entity.set_value("field_summary", vec![FieldValue::Text("updated".to_string())]);
    let second = store.save(&mut entity).expect("second save");

    assert_eq!(first.id, second.id);
    assert!(second.revision_id > first.revision_id);

    let stored = store.load("node", first.id).expect("load entity");
    assert_eq!(
        stored.first_value("field_summary").and_then(|v| v.as_str()),
        Some("updated")
    );
}

#[test]
fn preset_ids_advance_the_sequence() {
    let mut store = MemoryStore::new();

    let mut imported = node("landing_page");
    imported.id = Some(10);
    store.save(&mut imported).expect("save imported");

    let next = store.save(&mut node("landing_page")).expect("save fresh");
    assert_eq!(next.id, 11);
}

#[test]
fn ids_of_bundle_filters_and_sorts() {
    let mut store = MemoryStore::new();
    store.save(&mut node("landing_page")).expect("save");
    store.save(&mut node("article")).expect("save");
    store.save(&mut node("landing_page")).expect("save");

    assert_eq!(store.ids_of_bundle("node", "landing_page"), vec![1, 3]);
    assert_eq!(store.ids_of_bundle("node", "article"), vec![2]);
    assert!(store.ids_of_bundle("paragraph", "hero").is_empty());
}

#[test]
fn delete_removes_only_listed_ids() {
    let mut store = MemoryStore::new();
    for _ in 0..3 {
        store.save(&mut node("landing_page")).expect("save");
    }

    let removed = store.delete("node", &[1, 3, 99]).expect("delete");
    assert_eq!(removed, 2);
    assert_eq!(store.count("node"), 1);
    assert!(store.load("node", 2).is_some());

    let removed = store.delete("media", &[1]).expect("delete unknown type");
    assert_eq!(removed, 0);
}

#[test]
fn rejects_entities_without_bundle() {
    let mut store = MemoryStore::new();
    let result = store.save(&mut Entity::stub("node", ""));
    assert!(matches!(result, Err(StoreError::InvalidEntity(_))));
}

#[test]
fn all_orders_by_type_then_id() {
    let mut store = MemoryStore::new();
    store
        .save(&mut Entity::stub("paragraph", "hero"))
        .expect("save");
    store.save(&mut node("landing_page")).expect("save");
    store
        .save(&mut Entity::stub("paragraph", "quote"))
        .expect("save");

    let order: Vec<(String, i64)> = store
        .all()
        .into_iter()
        .map(|entity| (entity.entity_type, entity.id.unwrap_or_default()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("node".to_string(), 1),
            ("paragraph".to_string(), 1),
            ("paragraph".to_string(), 2),
        ]
    );
}
