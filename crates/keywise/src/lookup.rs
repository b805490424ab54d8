use crate::comparer::KeyComparer;
use crate::error::DuplicateItemError;
use crate::traits::Keyed;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hasher};

///
/// ItemLookup
///
/// Eagerly-built, duplicate-checked index over a smart enum's item table.
/// Buckets are keyed by the comparer's hash so custom comparers (for
/// example the case-insensitive string default) stay consistent between
/// insertion and lookup.
///

#[derive(Debug)]
pub struct ItemLookup<T: Keyed + 'static, C> {
    items: &'static [T],
    comparer: C,
    buckets: HashMap<u64, Vec<usize>>,
}

impl<T, C> ItemLookup<T, C>
where
    T: Keyed,
    C: KeyComparer<T::Key>,
{
    /// Index `items`, rejecting the first key that collides under
    /// `comparer`. `describe` renders a key for the error message.
    pub fn try_new(
        type_name: &'static str,
        items: &'static [T],
        comparer: C,
        describe: fn(&T::Key) -> String,
    ) -> Result<Self, DuplicateItemError> {
        let mut buckets: HashMap<u64, Vec<usize>> = HashMap::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let hash = Self::hash_key(&comparer, item.key());
            let bucket = buckets.entry(hash).or_default();

            if bucket
                .iter()
                .any(|&seen| comparer.eq(items[seen].key(), item.key()))
            {
                return Err(DuplicateItemError::new(type_name, describe(item.key())));
            }

            bucket.push(index);
        }

        Ok(Self {
            items,
            comparer,
            buckets,
        })
    }

    #[must_use]
    pub fn get(&self, key: &T::Key) -> Option<&'static T> {
        let hash = Self::hash_key(&self.comparer, key);

        self.buckets.get(&hash)?.iter().find_map(|&index| {
            let item = &self.items[index];
            self.comparer.eq(item.key(), key).then_some(item)
        })
    }

    #[must_use]
    pub const fn items(&self) -> &'static [T] {
        self.items
    }

    fn hash_key(comparer: &C, key: &T::Key) -> u64 {
        let mut hasher = DefaultHasher::new();
        comparer.hash_one(key, &mut hasher);
        hasher.finish()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::{AsciiCaseInsensitive, DefaultComparer};
    use std::sync::LazyLock;

    #[derive(Debug)]
    struct Status {
        key: String,
    }

    impl Keyed for Status {
        type Key = String;

        fn key(&self) -> &String {
            &self.key
        }
    }

    fn status(key: &str) -> Status {
        Status {
            key: key.to_string(),
        }
    }

    static UNIQUE: LazyLock<Vec<Status>> =
        LazyLock::new(|| vec![status("active"), status("archived")]);

    static DUPLICATED: LazyLock<Vec<Status>> = LazyLock::new(|| {
        // Two distinct fields that collapse onto the same key.
        vec![status("A"), status("ok"), status("A")]
    });

    static CASE_COLLIDING: LazyLock<Vec<Status>> = LazyLock::new(|| vec![status("a"), status("A")]);

    #[test]
    fn lookup_finds_items_by_key() {
        let lookup =
            ItemLookup::try_new("Status", &UNIQUE, DefaultComparer, ToString::to_string).unwrap();

        assert_eq!(lookup.get(&"active".to_string()).unwrap().key, "active");
        assert!(lookup.get(&"missing".to_string()).is_none());
    }

    #[test]
    fn duplicate_key_is_rejected_naming_type_and_key() {
        let err = ItemLookup::try_new("Status", &DUPLICATED, DefaultComparer, ToString::to_string)
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("Status"));
        assert!(message.contains("`A`"));
    }

    #[test]
    fn comparer_decides_what_counts_as_duplicate() {
        // Distinct under the default comparer.
        assert!(ItemLookup::try_new(
            "Status",
            &CASE_COLLIDING,
            DefaultComparer,
            ToString::to_string
        )
        .is_ok());

        // Colliding under the case-insensitive comparer.
        assert!(ItemLookup::try_new(
            "Status",
            &CASE_COLLIDING,
            AsciiCaseInsensitive,
            ToString::to_string
        )
        .is_err());
    }

    #[test]
    fn case_insensitive_lookup_matches_any_casing() {
        let lookup = ItemLookup::try_new(
            "Status",
            &UNIQUE,
            AsciiCaseInsensitive,
            ToString::to_string,
        )
        .unwrap();

        assert!(lookup.get(&"ACTIVE".to_string()).is_some());
    }
}
