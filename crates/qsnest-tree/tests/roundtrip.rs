//! Property tests: building then parsing gives the same tree back.

use proptest::prelude::*;
use qsnest_tree::{self as qs, AdjacentContainers, BuildOptions, Mapping, ParseOptions, Value};

/// Scalar text, including characters that must be escaped.
fn text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 &=%+#\\[\\]é-]{0,8}").unwrap()
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => text().prop_map(Value::scalar),
        1 => Just(Value::null()),
    ]
}

/// Mapping keys that cannot be mistaken for an index or a push.
fn key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z_]{0,5}").unwrap()
}

/// Trees whose containers may be empty.
fn tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::seq),
            prop::collection::vec((key(), inner), 0..4)
                .prop_map(|entries| Value::Mapping(entries.into_iter().collect())),
        ]
    })
}

fn root() -> impl Strategy<Value = Value> {
    prop::collection::vec((key(), tree()), 0..4)
        .prop_map(|entries| Value::Mapping(entries.into_iter().collect::<Mapping>()))
}

/// `[key, value]` pairs whose keys are never empty.
fn pairs() -> impl Strategy<Value = Value> {
    let pair = (
        prop::string::string_regex("[a-z\\[\\]&=% +]{1,6}").unwrap(),
        prop::option::of(text()),
    )
        .prop_map(|(key, value)| Value::seq([Value::scalar(key), Value::from(value)]));
    prop::collection::vec(pair, 0..6).prop_map(Value::seq)
}

fn has_empty_container(value: &Value) -> bool {
    match value {
        Value::Scalar(_) => false,
        Value::Sequence(seq) => seq.is_empty() || seq.iter().any(has_empty_container),
        Value::Mapping(map) => map.is_empty() || map.iter().any(|(_, child)| has_empty_container(child)),
    }
}

/// Build, parse and build again.
///
/// Mapping equality ignores entry order, so the second build must also give
/// back the first query string byte for byte.
fn assert_round_trip(value: &Value, options: &BuildOptions) -> Result<(), TestCaseError> {
    let root = value.as_mapping().expect("generated roots are mappings");
    if root.iter().any(|(_, child)| has_empty_container(child)) {
        let err = qs::build_with_options(value, qs::Strategy::Nested, options).unwrap_err();
        prop_assert!(err.is_unsupported_shape(), "{err}");
        return Ok(());
    }

    let query = qs::build_with_options(value, qs::Strategy::Nested, options).unwrap();
    let parsed =
        qs::parse_with_options(&query, qs::Strategy::Nested, &ParseOptions::default()).unwrap();
    prop_assert!(parsed.diagnostics.is_empty(), "{query}: {:?}", parsed.diagnostics);
    prop_assert_eq!(&parsed.value, value);
    let rebuilt = qs::build_with_options(&parsed.value, qs::Strategy::Nested, options).unwrap();
    prop_assert_eq!(rebuilt, query);
    Ok(())
}

proptest! {
    #[test]
    fn indexed_round_trip(value in root()) {
        let options = BuildOptions::default().indexed();
        assert_round_trip(&value, &options)?;
    }

    #[test]
    fn pushed_round_trip_with_indexed_neighbours(value in root()) {
        let options = BuildOptions::default().adjacent_containers(AdjacentContainers::Index);
        assert_round_trip(&value, &options)?;
    }

    #[test]
    fn simplistic_round_trip(value in pairs()) {
        let query = qs::build(&value, qs::Strategy::Simplistic).unwrap();
        let parsed = qs::parse(&query, qs::Strategy::Simplistic).unwrap();
        prop_assert_eq!(&parsed, &value);
        prop_assert_eq!(qs::build(&parsed, qs::Strategy::Simplistic).unwrap(), query);
    }
}
