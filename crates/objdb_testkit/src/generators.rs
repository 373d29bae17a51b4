//! Property-based test generators using proptest.

use crate::fixtures::contact_groups;
use objdb_value::{Value, ValueType};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

/// Strategy for contact names: a capital letter then lowercase letters.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-z]{0,11}").expect("Invalid regex")
}

/// Strategy for plausible birth years.
pub fn birth_year_strategy() -> impl Strategy<Value = u32> {
    1900u32..2030
}

/// Strategy for a batch of contacts with distinct names.
pub fn contacts_strategy(max: usize) -> impl Strategy<Value = Vec<(String, u32)>> {
    prop::collection::btree_map(name_strategy(), birth_year_strategy(), 1..=max.max(1))
        .prop_map(|people| people.into_iter().collect())
}

/// Strategy for a non-empty value of one of the scalar types.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::int32),
        any::<u32>().prop_map(Value::uint32),
        any::<i64>().prop_map(Value::int64),
        any::<u64>().prop_map(Value::uint64),
        "[ -~]{0,24}".prop_map(Value::text),
        (0usize..3).prop_map(|i| {
            let member = contact_groups()
                .iter()
                .nth(i)
                .cloned()
                .expect("three groups");
            Value::enumeration(member)
        }),
    ]
}

/// Strategy for an integer value of any width.
pub fn integer_value_strategy() -> impl Strategy<Value = Value> {
    value_strategy().prop_filter("integer values only", |v| v.value_type().is_integer())
}

/// Strategy for one of the integer value types.
pub fn integer_type_strategy() -> impl Strategy<Value = ValueType> {
    prop_oneof![
        Just(ValueType::Int32),
        Just(ValueType::UInt32),
        Just(ValueType::Int64),
        Just(ValueType::UInt64),
    ]
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
