//! Property tests over generated values.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use docpatch_diff::{diff, diff_with_config, ArrayStrategy, DiffConfig, Patch, Value, SET, UNSET};
use docpatch_types::introspect_struct;

#[derive(Clone, Debug)]
struct Address {
    city: String,
    zip: u32,
}

#[derive(Clone, Debug)]
struct Profile {
    name: String,
    age: i32,
    score: f64,
    active: bool,
    tags: Vec<String>,
    attrs: BTreeMap<String, String>,
    home: Address,
    backup: Option<Box<Address>>,
}

introspect_struct!(Address { city, zip => "postal_code" });
introspect_struct!(Profile {
    name,
    age,
    score,
    active,
    tags,
    attrs,
    home,
    backup,
});

fn address() -> impl Strategy<Value = Address> {
    ("[a-z]{0,6}", any::<u32>()).prop_map(|(city, zip)| Address { city, zip })
}

/// Any profile, zero-valued leaves included.
fn profile() -> impl Strategy<Value = Profile> {
    (
        "[a-z]{0,8}",
        any::<i32>(),
        -1.0e6..1.0e6f64,
        any::<bool>(),
        prop::collection::vec("[a-z]{0,4}", 0..4),
        prop::collection::btree_map("[a-z]{1,4}", "[a-z]{0,4}", 0..4),
        address(),
        prop::option::of(address().prop_map(Box::new)),
    )
        .prop_map(
            |(name, age, score, active, tags, attrs, home, backup)| Profile {
                name,
                age,
                score,
                active,
                tags,
                attrs,
                home,
                backup,
            },
        )
}

fn populated_address() -> impl Strategy<Value = Address> {
    ("[a-z]{1,6}", 1..u32::MAX).prop_map(|(city, zip)| Address { city, zip })
}

/// Profiles whose every leaf is non-zero.
fn populated_profile() -> impl Strategy<Value = Profile> {
    (
        "[a-z]{1,8}",
        1..i32::MAX,
        1.0..1.0e6f64,
        prop::collection::vec("[a-z]{1,4}", 1..4),
        prop::collection::btree_map("[a-z]{1,4}", "[a-z]{1,4}", 1..4),
        populated_address(),
        populated_address(),
    )
        .prop_map(|(name, age, score, tags, attrs, home, backup)| Profile {
            name,
            age,
            score,
            active: true,
            tags,
            attrs,
            home,
            backup: Some(Box::new(backup)),
        })
}

fn paths(patch: &Patch, operator: &str) -> BTreeSet<String> {
    patch
        .operations()
        .get(operator)
        .map(|fields| fields.keys().cloned().collect())
        .unwrap_or_default()
}

fn strategy() -> impl Strategy<Value = ArrayStrategy> {
    prop_oneof![
        Just(ArrayStrategy::Replace),
        Just(ArrayStrategy::Append),
        Just(ArrayStrategy::Smart),
        Just(ArrayStrategy::Merge),
    ]
}

proptest! {
    #[test]
    fn diffing_a_value_with_itself_is_empty(p in profile(), s in strategy()) {
        let config = DiffConfig::new().array_strategy(s);
        let patch = diff_with_config(Some(&p), Some(&p), &config).unwrap();
        prop_assert!(patch.is_empty());
    }

    #[test]
    fn diffing_equal_copies_is_empty(p in profile()) {
        let copy = p.clone();
        let patch = diff(Some(&p), Some(&copy)).unwrap();
        prop_assert!(patch.is_empty());
        prop_assert_eq!(patch.metadata().total_changes, 0);
    }

    #[test]
    fn adding_and_removing_touch_the_same_paths(p in populated_profile()) {
        let added = diff(None::<&Profile>, Some(&p)).unwrap();
        let removed = diff(Some(&p), None::<&Profile>).unwrap();

        prop_assert!(!added.operations().contains_key(UNSET));
        prop_assert!(!removed.operations().contains_key(SET));
        prop_assert_eq!(paths(&added, SET), paths(&removed, UNSET));
    }

    #[test]
    fn changed_name_is_the_only_operation(p in profile(), name in "[a-z]{1,8}") {
        prop_assume!(p.name != name);
        let mut q = p.clone();
        q.name = name.clone();
        let patch = diff(Some(&p), Some(&q)).unwrap();
        prop_assert_eq!(patch.len(), 1);
        prop_assert_eq!(patch.get(SET, "name"), Some(&Value::from(name.as_str())));
    }
}
