//! Property-based test generators using proptest.
//!
//! Keys are drawn from a small pool so that generated change sets hit
//! existing records often enough to exercise updates, duplicate adds and
//! deletes.

use crate::fixtures::{Shape, User};
use mobiledb_core::{ChangeOperation, ChangeSet};
use proptest::prelude::*;

/// Strategy for user ids drawn from a pool of `pool` keys.
pub fn user_id_strategy(pool: usize) -> impl Strategy<Value = String> {
    (0..pool.max(1)).prop_map(|i| format!("k{i:02}"))
}

/// Strategy for display names, including characters that need escaping.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 \"\\\\\n\r\t{}é漢]{0,24}").expect("Invalid regex")
}

/// Strategy for users keyed from a pool of `pool` ids.
pub fn user_strategy(pool: usize) -> impl Strategy<Value = User> {
    (
        user_id_strategy(pool),
        name_strategy(),
        prop::option::of("[a-z]{1,8}@[a-z]{1,6}\\.io"),
    )
        .prop_map(|(id, name, email)| User { id, name, email })
}

/// Strategy for a set of users with distinct ids.
pub fn distinct_users_strategy(max: usize) -> impl Strategy<Value = Vec<User>> {
    prop::collection::btree_map("[a-z0-9-]{1,12}", name_strategy(), 0..max).prop_map(|users| {
        users
            .into_iter()
            .map(|(id, name)| User::new(id, name))
            .collect()
    })
}

/// Strategy for a single add, update or delete of a pooled user.
pub fn change_operation_strategy(pool: usize) -> impl Strategy<Value = ChangeOperation<User>> {
    prop_oneof![
        3 => user_strategy(pool).prop_map(ChangeOperation::added),
        2 => user_strategy(pool).prop_map(ChangeOperation::updated),
        1 => user_strategy(pool).prop_map(ChangeOperation::deleted),
    ]
}

/// Strategy for a change set of up to `max_ops` operations.
pub fn change_set_strategy(pool: usize, max_ops: usize) -> impl Strategy<Value = ChangeSet<User>> {
    prop::collection::vec(change_operation_strategy(pool), 0..max_ops.max(1))
        .prop_map(|ops| ops.into_iter().collect())
}

/// Strategy for circles and squares.
pub fn shape_strategy(pool: usize) -> impl Strategy<Value = Shape> {
    let id = (0..pool.max(1)).prop_map(|i| format!("shape-{i}"));
    prop_oneof![
        (id.clone(), 0.1f64..100.0).prop_map(|(id, r)| Shape::circle(id, r)),
        (id, 0.1f64..100.0).prop_map(|(id, s)| Shape::square(id, s)),
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
            cases: 128,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Few cases, for tests that touch the disk or spawn threads.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 24,
            max_shrink_iters: 100,
        }
    }

    /// Many cases, for pure in-memory properties.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 512,
            max_shrink_iters: 5000,
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
