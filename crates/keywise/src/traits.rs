use crate::error::ValidationError;

///
/// Keyed
///
/// A type whose externally visible identity is a single key member.
///

pub trait Keyed {
    type Key;

    /// The key member backing this instance.
    fn key(&self) -> &Self::Key;
}

///
/// KeyFactory
///
/// Construction from a key value, with validation. Smart enums resolve the
/// key against their item table; value objects run their validation hook.
///

pub trait KeyFactory: Keyed + Sized {
    /// Type name used in error messages.
    const TYPE_NAME: &'static str;

    fn try_from_key(key: Self::Key) -> Result<Self, ValidationError>;
}

///
/// EnumItems
///
/// The generated item table of a smart enum. `items` lists every declared
/// item in declaration order, inherited base items first.
///

pub trait EnumItems: Keyed + Sized + 'static {
    fn items() -> &'static [Self];

    /// Reflection-free item lookup through the enum's key comparer.
    fn lookup(key: &Self::Key) -> Option<&'static Self>;
}

///
/// Validatable
///
/// A smart enum that can represent an unknown key instead of failing the
/// lookup. `invalid` must return an instance that reports
/// `is_valid() == false`; generated callers check this and panic on a
/// violating custom factory.
///

pub trait Validatable: Keyed + Sized {
    fn is_valid(&self) -> bool;

    /// Build an intentionally-invalid instance carrying `key`.
    fn invalid(key: Self::Key) -> Self;
}
