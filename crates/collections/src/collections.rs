//! Collection types used throughout nui.
//!
//! With the `test-support` feature enabled, hash maps and sets iterate in a
//! deterministic order so that test failures reproduce.

pub use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

pub use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

pub use indexmap::{IndexMap, IndexSet};

#[cfg(feature = "test-support")]
pub type HashMap<K, V> = IndexMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

#[cfg(feature = "test-support")]
pub type HashSet<T> = IndexSet<T, std::hash::BuildHasherDefault<FxHasher>>;

#[cfg(not(feature = "test-support"))]
pub type HashMap<K, V> = FxHashMap<K, V>;

#[cfg(not(feature = "test-support"))]
pub type HashSet<T> = FxHashSet<T>;
