//! Tests for constraint collections: routing, local indices, ordering.

use crate::constraint::{Constraint, ConstraintStore};
use crate::entity::EntityId;

fn coincident(a: u32, b: u32) -> Constraint {
    Constraint::Coincident {
        points: [EntityId(a), EntityId(b)],
    }
}

#[test]
fn test_registration_order_is_fixed() {
    let store = ConstraintStore::new();
    let names: Vec<&str> = store.collections().iter().map(|c| c.name()).collect();
    assert_eq!(
        names,
        vec![
            "coincident",
            "horizontal",
            "vertical",
            "midpoint",
            "parallel",
            "perpendicular",
            "equal",
            "distance",
            "diameter",
            "angle",
            "ratio",
        ]
    );

    // Geometric kinds come before dimensional kinds.
    let distance_pos = names.iter().position(|n| *n == "distance").unwrap();
    let coincident_pos = names.iter().position(|n| *n == "coincident").unwrap();
    assert!(coincident_pos < distance_pos);
}

#[test]
fn test_add_routes_by_kind() {
    let mut store = ConstraintStore::new();
    store.add(coincident(1, 2));
    store.add(Constraint::Distance {
        points: [EntityId(1), EntityId(2)],
        value: 5.0,
    });
    store.add(coincident(2, 3));

    let by_name = |name: &str| {
        store
            .collections()
            .iter()
            .find(|c| c.name() == name)
            .unwrap()
    };
    assert_eq!(by_name("coincident").len(), 2);
    assert_eq!(by_name("distance").len(), 1);
    assert_eq!(store.len(), 3);
}

#[test]
fn test_indices_referencing_ascending() {
    let mut store = ConstraintStore::new();
    store.add(coincident(1, 2));
    store.add(coincident(3, 4));
    store.add(coincident(1, 5));

    let coll = &store.collections()[0];
    assert_eq!(coll.indices_referencing(EntityId(1)), vec![0, 2]);
    assert_eq!(coll.indices_referencing(EntityId(4)), vec![1]);
    assert!(coll.indices_referencing(EntityId(9)).is_empty());
}

#[test]
fn test_remove_at_descending_is_safe() {
    let mut store = ConstraintStore::new();
    store.add(coincident(1, 2));
    store.add(coincident(3, 4));
    store.add(coincident(1, 5));

    let coll = &mut store.collections_mut()[0];
    let indices = coll.indices_referencing(EntityId(1));
    for &i in indices.iter().rev() {
        assert!(coll.remove_at(i).is_some());
    }

    // The untouched middle entry survives with its membership intact.
    assert_eq!(coll.len(), 1);
    assert!(coll.references(EntityId(3)));
    assert!(!coll.references(EntityId(1)));
}

#[test]
fn test_remove_at_out_of_range() {
    let mut store = ConstraintStore::new();
    store.add(coincident(1, 2));
    let coll = &mut store.collections_mut()[0];
    assert!(coll.remove_at(5).is_none());
    assert_eq!(coll.len(), 1);
}

#[test]
fn test_store_references() {
    let mut store = ConstraintStore::new();
    store.add(Constraint::Diameter {
        entity: EntityId(7),
        value: 2.0,
    });
    assert!(store.references(EntityId(7)));
    assert!(!store.references(EntityId(8)));
}

#[test]
fn test_constraint_display() {
    let c = Constraint::Distance {
        points: [EntityId(3), EntityId(4)],
        value: 10.0,
    };
    assert_eq!(c.to_string(), "Distance (3, 4)");
}
