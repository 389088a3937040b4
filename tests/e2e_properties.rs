//! End-to-end tests for scalar property accessors and the id accessor.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use entigraph::{
    Action, CallArg, CallOutcome, Error, EntityTypeDef, MemoryStore, Session, SessionFactory,
    Value,
};

fn person_session() -> Session<MemoryStore> {
    let person = EntityTypeDef::builder("Person")
        .id("id")
        .property("name", "name", Action::Read)
        .property("set_name", "name", Action::Write)
        .property("age", "age", Action::Read)
        .property("set_age", "age", Action::Write)
        .build()
        .unwrap();
    SessionFactory::builder()
        .store(Arc::new(MemoryStore::new()))
        .register(person)
        .build()
        .unwrap()
        .session()
}

// ============================================================================
// 1. Write a property, read it back
// ============================================================================

#[test]
fn test_property_round_trip() {
    let session = person_session();
    let ada = session.create("Person").unwrap();

    ada.set("set_name", "Ada").unwrap();
    ada.set("set_age", 36).unwrap();

    assert_eq!(ada.get("name").unwrap(), Some(Value::from("Ada")));
    assert_eq!(ada.get("age").unwrap(), Some(Value::from(36)));
}

// ============================================================================
// 2. Absent property reads as None
// ============================================================================

#[test]
fn test_absent_property_is_none() {
    let session = person_session();
    let ada = session.create("Person").unwrap();
    assert_eq!(ada.get("name").unwrap(), None);
}

// ============================================================================
// 3. Writing null removes the key
// ============================================================================

#[test]
fn test_null_write_removes() {
    let session = person_session();
    let ada = session.create("Person").unwrap();

    ada.set("set_name", "Ada").unwrap();
    ada.set("set_name", Value::Null).unwrap();
    assert_eq!(ada.get("name").unwrap(), None);
}

// ============================================================================
// 4. Properties are independent per key and per entity
// ============================================================================

#[test]
fn test_properties_independent() {
    let session = person_session();
    let ada = session.create("Person").unwrap();
    let bob = session.create("Person").unwrap();

    ada.set("set_name", "Ada").unwrap();
    bob.set("set_name", "Bob").unwrap();
    ada.set("set_age", 36).unwrap();

    assert_eq!(ada.get("name").unwrap(), Some(Value::from("Ada")));
    assert_eq!(bob.get("name").unwrap(), Some(Value::from("Bob")));
    assert_eq!(bob.get("age").unwrap(), None);
}

// ============================================================================
// 5. Id accessor returns the engine-assigned node id
// ============================================================================

#[test]
fn test_id_accessor() {
    let session = person_session();
    let ada = session.create("Person").unwrap();

    match ada.invoke("id", &[]).unwrap() {
        CallOutcome::Id(id) => assert_eq!(id, ada.id()),
        other => panic!("unexpected outcome {other:?}"),
    }
}

// ============================================================================
// 6. Dynamic invocation path agrees with the typed surface
// ============================================================================

#[test]
fn test_invoke_matches_typed_surface() {
    let session = person_session();
    let ada = session.create("Person").unwrap();

    ada.invoke("set_name", &[CallArg::Value(Value::from("Ada"))])
        .unwrap();
    match ada.invoke("name", &[]).unwrap() {
        CallOutcome::Value(value) => assert_eq!(value, Some(Value::from("Ada"))),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(ada.get("name").unwrap(), Some(Value::from("Ada")));
}

// ============================================================================
// 7. Declared action is enforced
// ============================================================================

#[test]
fn test_read_accessor_rejects_write() {
    let session = person_session();
    let ada = session.create("Person").unwrap();

    assert!(matches!(
        ada.set("name", "Ada"),
        Err(Error::ActionMismatch { .. })
    ));
    assert_eq!(ada.get("name").unwrap(), None);
}
