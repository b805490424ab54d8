//! Incremental cache-key contract and the process-wide render cache.
//!
//! Entity snapshots implement structural equality and hashing over exactly
//! the fields that affect generated text. Two equal snapshots must skip
//! regeneration; two unequal snapshots must regenerate. The render cache
//! below is the enforcement point: it is keyed by the snapshot itself, with
//! a deterministic 64-bit hash for bucketing and full structural equality
//! for verification.

use crate::state::{EnumEntityState, UnionEntityState, ValueObjectEntityState};
use crate::symbol::Location;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, RwLock};
use xxhash_rust::xxh3::Xxh3;

///
/// EntityState
///
/// The unified snapshot consumed by the cache and the generators.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum EntityState {
    Enum(EnumEntityState),
    Union(UnionEntityState),
    ValueObject(ValueObjectEntityState),
}

impl EntityState {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Enum(state) => &state.path,
            Self::Union(state) => &state.path,
            Self::ValueObject(state) => &state.path,
        }
    }

    #[must_use]
    pub fn ident(&self) -> &str {
        match self {
            Self::Enum(state) => &state.ident,
            Self::Union(state) => &state.ident,
            Self::ValueObject(state) => &state.ident,
        }
    }

    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::Enum(state) => &state.location,
            Self::Union(state) => &state.location,
            Self::ValueObject(state) => &state.location,
        }
    }
}

/// Deterministic 64-bit hash of a snapshot: xxh3 with a fixed seed, stable
/// across processes and runs.
#[must_use]
pub fn stable_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = Xxh3::with_seed(0);
    value.hash(&mut hasher);

    hasher.finish()
}

///
/// TypeIdentity
///
/// Deliberately coarse comparator over the fully-qualified type name only.
/// It exists for exactly one purpose: re-associating a derived type with
/// its previously-built base snapshot across pipeline passes. It must
/// never serve as the primary incremental cache key.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TypeIdentity(pub String);

impl From<&EnumEntityState> for TypeIdentity {
    fn from(state: &EnumEntityState) -> Self {
        Self(state.path.clone())
    }
}

impl From<&EntityState> for TypeIdentity {
    fn from(state: &EntityState) -> Self {
        Self(state.path().to_string())
    }
}

///
/// RenderCache
///
/// Snapshot → rendered text. Compute-once, then read-only forever:
/// insert-if-absent semantics where a lost race recomputes an identical
/// text and only the first inserted instance is retained.
///

#[derive(Debug, Default)]
pub struct RenderCache {
    buckets: RwLock<HashMap<u64, Vec<CacheSlot>>>,
}

#[derive(Debug)]
struct CacheSlot {
    state: EntityState,
    text: Arc<str>,
}

impl RenderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached render for a structurally equal snapshot, if any.
    #[must_use]
    pub fn lookup(&self, state: &EntityState) -> Option<Arc<str>> {
        let buckets = self
            .buckets
            .read()
            .expect("render cache RwLock poisoned while reading");

        buckets.get(&stable_hash(state))?.iter().find_map(|slot| {
            (slot.state == *state).then(|| Arc::clone(&slot.text))
        })
    }

    /// Insert-if-absent. Returns the retained text: the given one when the
    /// slot was empty, the previously stored one when another worker won
    /// the race.
    pub fn insert(&self, state: &EntityState, text: Arc<str>) -> Arc<str> {
        let mut buckets = self
            .buckets
            .write()
            .expect("render cache RwLock poisoned while writing");

        let slots = buckets.entry(stable_hash(state)).or_default();
        if let Some(slot) = slots.iter().find(|slot| slot.state == *state) {
            return Arc::clone(&slot.text);
        }

        slots.push(CacheSlot {
            state: state.clone(),
            text: Arc::clone(&text),
        });

        text
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets
            .read()
            .expect("render cache RwLock poisoned while reading")
            .values()
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static GLOBAL: LazyLock<RenderCache> = LazyLock::new(RenderCache::new);

/// The process-wide render cache shared by all pipeline hosts.
#[must_use]
pub fn global() -> &'static RenderCache {
    &GLOBAL
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{
        AttrBag, Location, MemberDecl, MemberKind, SpecialType, TypeDecl, TypeMarker, TypeRef,
        Visibility,
    };
    use proptest::prelude::*;

    fn vo_decl(member_names: &[&str]) -> TypeDecl {
        TypeDecl {
            path: "crate::Sample".to_string(),
            ident: "Sample".to_string(),
            marker: Some(TypeMarker::ValueObject),
            is_partial: true,
            generic_params: 0,
            is_abstract: false,
            has_layout_attr: false,
            has_custom_serde: false,
            has_custom_candid: false,
            has_custom_storable: false,
            members: member_names
                .iter()
                .map(|name| MemberDecl {
                    name: (*name).to_string(),
                    ty: TypeRef::Special(SpecialType::U64),
                    kind: MemberKind::Field,
                    visibility: Visibility::Private,
                    is_static: false,
                    is_readonly: true,
                    attrs: AttrBag::default(),
                    location: Location::default(),
                })
                .collect(),
            key_type: None,
            attrs: AttrBag::default(),
            base_enum: None,
            location: Location::default(),
        }
    }

    fn vo_state(member_names: &[&str]) -> EntityState {
        let (state, _) = ValueObjectEntityState::build(&vo_decl(member_names)).unwrap();
        EntityState::ValueObject(state)
    }

    #[test]
    fn lookup_misses_then_hits() {
        let cache = RenderCache::new();
        let state = vo_state(&["value"]);

        assert!(cache.lookup(&state).is_none());

        let text: Arc<str> = Arc::from("rendered");
        cache.insert(&state, Arc::clone(&text));

        let hit = cache.lookup(&state).unwrap();
        assert!(Arc::ptr_eq(&hit, &text));
    }

    #[test]
    fn lost_race_keeps_the_first_instance() {
        let cache = RenderCache::new();
        let state = vo_state(&["value"]);

        let first: Arc<str> = Arc::from("rendered");
        let second: Arc<str> = Arc::from("rendered");

        let kept_first = cache.insert(&state, Arc::clone(&first));
        let kept_second = cache.insert(&state, second);

        assert!(Arc::ptr_eq(&kept_first, &first));
        assert!(Arc::ptr_eq(&kept_second, &first));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reordering_members_changes_the_key() {
        let ab = vo_state(&["alpha", "beta"]);
        let ba = vo_state(&["beta", "alpha"]);

        assert_ne!(ab, ba);
        assert_ne!(stable_hash(&ab), stable_hash(&ba));
    }

    #[test]
    fn type_identity_is_coarser_than_the_snapshot() {
        let one = vo_state(&["value"]);
        let two = vo_state(&["value", "extra"]);

        assert_ne!(one, two);
        assert_eq!(TypeIdentity::from(&one), TypeIdentity::from(&two));
    }

    proptest! {
        /// Independently-built snapshots from identical declarations are
        /// equal and hash identically; adding a member flips both.
        #[test]
        fn cache_key_soundness(name in "[a-z][a-z0-9_]{0,12}") {
            let a = vo_state(&[&name]);
            let b = vo_state(&[&name]);

            prop_assert_eq!(&a, &b);
            prop_assert_eq!(stable_hash(&a), stable_hash(&b));

            let widened = vo_state(&[&name, "extra_member"]);
            prop_assert_ne!(&a, &widened);
        }
    }
}
