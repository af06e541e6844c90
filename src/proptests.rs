//! Model-based property tests: every operation sequence must leave the
//! dense containers agreeing with the std containers.

use std::collections::HashMap;
use std::collections::HashSet;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

use crate::DenseMap;
use crate::DenseSet;

/// Keys are drawn from a small domain so sequences hit duplicates,
/// collisions, and remove-after-insert often.
#[derive(Arbitrary, Debug, Clone)]
enum MapAction {
    Insert {
        #[proptest(strategy = "0u64..64")]
        key: u64,
        value: u64,
    },
    Remove {
        #[proptest(strategy = "0u64..64")]
        key: u64,
    },
    Get {
        #[proptest(strategy = "0u64..64")]
        key: u64,
    },
    OrInsert {
        #[proptest(strategy = "0u64..64")]
        key: u64,
        value: u64,
    },
    Clear,
    ShrinkToFit,
}

#[derive(Arbitrary, Debug, Clone)]
enum SetAction {
    Insert {
        #[proptest(strategy = "0u64..64")]
        value: u64,
    },
    Remove {
        #[proptest(strategy = "0u64..64")]
        value: u64,
    },
    Contains {
        #[proptest(strategy = "0u64..64")]
        value: u64,
    },
    Clear,
}

proptest! {
    #[test]
    fn map_matches_std_model(
        actions in proptest::collection::vec(any::<MapAction>(), 0..256)
    ) {
        let mut map: DenseMap<u64, u64> = DenseMap::new();
        let mut model: HashMap<u64, u64> = HashMap::new();

        for action in actions {
            match action {
                MapAction::Insert { key, value } => {
                    prop_assert_eq!(map.insert(key, value), model.insert(key, value));
                }
                MapAction::Remove { key } => {
                    prop_assert_eq!(map.remove(&key), model.remove(&key));
                }
                MapAction::Get { key } => {
                    prop_assert_eq!(map.get(&key), model.get(&key));
                }
                MapAction::OrInsert { key, value } => {
                    let expected = *model.entry(key).or_insert(value);
                    prop_assert_eq!(*map.entry(key).or_insert(value), expected);
                }
                MapAction::Clear => {
                    map.clear();
                    model.clear();
                }
                MapAction::ShrinkToFit => {
                    map.shrink_to_fit();
                }
            }
            prop_assert_eq!(map.len(), model.len());
        }

        for (key, value) in &model {
            prop_assert_eq!(map.get(key), Some(value));
        }
        let keys: HashSet<u64> = map.keys().copied().collect();
        prop_assert_eq!(keys.len(), model.len());
    }

    #[test]
    fn set_matches_std_model(
        actions in proptest::collection::vec(any::<SetAction>(), 0..256)
    ) {
        let mut set: DenseSet<u64> = DenseSet::new();
        let mut model: HashSet<u64> = HashSet::new();

        for action in actions {
            match action {
                SetAction::Insert { value } => {
                    prop_assert_eq!(set.insert(value), model.insert(value));
                }
                SetAction::Remove { value } => {
                    prop_assert_eq!(set.remove(&value), model.remove(&value));
                }
                SetAction::Contains { value } => {
                    prop_assert_eq!(set.contains(&value), model.contains(&value));
                }
                SetAction::Clear => {
                    set.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(set.len(), model.len());
        }

        for value in &model {
            prop_assert!(set.contains(value));
        }
    }

    #[test]
    fn removal_only_perturbs_order_at_the_swap(
        len in 1usize..64,
        victim in any::<proptest::sample::Index>(),
    ) {
        let mut map: DenseMap<usize, usize> = (0..len).map(|k| (k, k)).collect();
        let victim = victim.index(len);

        map.remove(&victim);

        let keys: Vec<usize> = map.keys().copied().collect();
        let mut expected: Vec<usize> = (0..len).collect();
        expected.swap_remove(victim);
        prop_assert_eq!(keys, expected);
    }
}
