//! Hash containers with deterministic hashing.
//!
//! [`HashMap`] and [`HashSet`] default to [`FixedHashState`], so iteration
//! order only depends on the inserted keys, never on a random seed.

// -----------------------------------------------------------------------------
// Modules

mod hasher;

// -----------------------------------------------------------------------------
// Exports

pub use hasher::{FixedHashState, FixedHasher};
pub use hasher::{NoOpHashState, NoOpHasher};

/// A [`hashbrown::HashMap`] using [`FixedHashState`] by default.
pub type HashMap<K, V, S = FixedHashState> = hashbrown::HashMap<K, V, S>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`] by default.
pub type HashSet<T, S = FixedHashState> = hashbrown::HashSet<T, S>;

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;

#[cfg(test)]
mod tests {
    use super::{HashMap, HashSet};

    #[test]
    fn fixed_state_containers() {
        let mut map: HashMap<&str, u32> = HashMap::default();
        map.insert("name", 0);
        map.insert("owner", 1);
        assert_eq!(map.get("owner"), Some(&1));

        let set: HashSet<u32> = [1, 2, 2, 3].into_iter().collect();
        assert_eq!(set.len(), 3);
    }
}
