use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

///
/// KeyComparer
///
/// Equality, ordering and hashing for key values, decoupled from the key
/// type's own `Eq`/`Ord`/`Hash`. Generated equality and lookup code routes
/// through a comparer so per-member overrides and the string default below
/// stay consistent between `eq` and `hash`.
///

pub trait KeyComparer<K: ?Sized> {
    fn eq(&self, a: &K, b: &K) -> bool;

    fn hash_one<H: Hasher>(&self, value: &K, state: &mut H);

    fn compare(&self, a: &K, b: &K) -> Ordering;
}

///
/// DefaultComparer
///
/// Delegates straight to the key type's `Eq` + `Ord` + `Hash`.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DefaultComparer;

impl<K: Eq + Ord + Hash> KeyComparer<K> for DefaultComparer {
    fn eq(&self, a: &K, b: &K) -> bool {
        a == b
    }

    fn hash_one<H: Hasher>(&self, value: &K, state: &mut H) {
        value.hash(state);
    }

    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

///
/// AsciiCaseInsensitive
///
/// The default comparer for string keys: ordinal, ASCII case folded.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AsciiCaseInsensitive;

impl KeyComparer<String> for AsciiCaseInsensitive {
    fn eq(&self, a: &String, b: &String) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    fn hash_one<H: Hasher>(&self, value: &String, state: &mut H) {
        for byte in value.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }

    fn compare(&self, a: &String, b: &String) -> Ordering {
        a.bytes()
            .map(|b| b.to_ascii_lowercase())
            .cmp(b.bytes().map(|b| b.to_ascii_lowercase()))
    }
}

impl KeyComparer<str> for AsciiCaseInsensitive {
    fn eq(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }

    fn hash_one<H: Hasher>(&self, value: &str, state: &mut H) {
        for byte in value.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }

    fn compare(&self, a: &str, b: &str) -> Ordering {
        let folded = |s: &str| s.bytes().map(|b| b.to_ascii_lowercase()).collect::<Vec<_>>();
        folded(a).cmp(&folded(b))
    }
}

///
/// TESTS
///
