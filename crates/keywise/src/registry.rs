//! Process-wide kind registry.
//!
//! Every generated type registers a [`KindMetadata`] record at program
//! start (via `ctor`), giving runtime consumers a reflection-free path
//! from a produced type back to its key type and item surface. Derived
//! smart enums in other crates use this to describe external base enums.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

///
/// KindTag
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum KindTag {
    SmartEnum,
    Union,
    ValueObject,
}

///
/// KindMetadata
///
/// One record per generated type. `item_keys` is a conversion delegate
/// supplied by the generated registration; for value objects and unions it
/// yields an empty list.
///

#[derive(Clone, Debug)]
pub struct KindMetadata {
    pub type_path: &'static str,
    pub kind: KindTag,
    pub key_type_path: &'static str,
    pub validatable: bool,
    pub item_keys: fn() -> Vec<String>,
}

///
/// REGISTRY
/// the static data structure
///

static REGISTRY: LazyLock<RwLock<HashMap<&'static str, KindMetadata>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

fn registry_write() -> RwLockWriteGuard<'static, HashMap<&'static str, KindMetadata>> {
    REGISTRY
        .write()
        .expect("kind registry RwLock poisoned while acquiring write lock")
}

fn registry_read() -> RwLockReadGuard<'static, HashMap<&'static str, KindMetadata>> {
    REGISTRY
        .read()
        .expect("kind registry RwLock poisoned while acquiring read lock")
}

/// Register a generated type. Insert-if-absent: the first registration for
/// a path wins, a lost race with an equal record is harmless.
pub fn register(meta: KindMetadata) {
    registry_write().entry(meta.type_path).or_insert(meta);
}

/// Look up the metadata registered for a fully-qualified type path.
#[must_use]
pub fn kind_of(type_path: &str) -> Option<KindMetadata> {
    registry_read().get(type_path).cloned()
}

/// All registered kinds, ordered by type path for deterministic output.
#[must_use]
pub fn kinds() -> Vec<KindMetadata> {
    let mut all: Vec<KindMetadata> = registry_read().values().cloned().collect();
    all.sort_by_key(|meta| meta.type_path);

    all
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn no_keys() -> Vec<String> {
        Vec::new()
    }

    #[test]
    fn first_registration_wins() {
        register(KindMetadata {
            type_path: "tests::registry::Color",
            kind: KindTag::SmartEnum,
            key_type_path: "::std::string::String",
            validatable: false,
            item_keys: no_keys,
        });
        register(KindMetadata {
            type_path: "tests::registry::Color",
            kind: KindTag::ValueObject,
            key_type_path: "u32",
            validatable: true,
            item_keys: no_keys,
        });

        let meta = kind_of("tests::registry::Color").unwrap();
        assert_eq!(meta.kind, KindTag::SmartEnum);
        assert_eq!(meta.key_type_path, "::std::string::String");
    }

    #[test]
    fn kinds_are_sorted_by_path() {
        register(KindMetadata {
            type_path: "tests::registry::B",
            kind: KindTag::Union,
            key_type_path: "-",
            validatable: false,
            item_keys: no_keys,
        });
        register(KindMetadata {
            type_path: "tests::registry::A",
            kind: KindTag::Union,
            key_type_path: "-",
            validatable: false,
            item_keys: no_keys,
        });

        let paths: Vec<&str> = kinds().into_iter().map(|meta| meta.type_path).collect();
        let a = paths.iter().position(|p| *p == "tests::registry::A");
        let b = paths.iter().position(|p| *p == "tests::registry::B");
        assert!(a < b);
    }
}
