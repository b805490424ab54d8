use keywise::prelude::*;

///
/// Reference
/// a closed union over two payload shapes
///

#[union_type(
    variant(ident = "Name", ty = "text"),
    variant(ident = "Ordinal", ty = "u64"),
)]
pub struct Reference;

#[test]
fn payloads_convert_into_their_variant() {
    let by_name = Reference::from("alpha".to_string());
    let by_ordinal = Reference::from(3_u64);

    assert!(by_name.is_name());
    assert!(by_ordinal.is_ordinal());
    assert_eq!(by_name.as_name().unwrap().as_str(), "alpha");
    assert_eq!(by_ordinal.as_ordinal(), Some(&3));
}

#[test]
fn display_delegates_to_the_payload() {
    assert_eq!(Reference::from("alpha".to_string()).to_string(), "alpha");
    assert_eq!(Reference::from(3_u64).to_string(), "3");
}

#[test]
fn equality_and_hashing_cover_both_variants() {
    use std::collections::HashSet;

    let mut seen = HashSet::new();
    seen.insert(Reference::from(3_u64));

    assert!(seen.contains(&Reference::from(3_u64)));
    assert!(!seen.contains(&Reference::from("3".to_string())));
}

///
/// DoubleText
/// duplicated payload types lose their From impls but keep accessors
///

#[union_type(
    variant(ident = "First", ty = "text"),
    variant(ident = "Second", ty = "text"),
    variant(ident = "Count", ty = "u64"),
)]
pub struct DoubleText;

#[test]
fn uniquely_typed_payloads_still_convert() {
    let count = DoubleText::from(9_u64);
    assert!(count.is_count());
    assert!(count.as_first().is_none());
}
