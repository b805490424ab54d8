use keywise::prelude::*;

///
/// Color / ExtendedColor
/// one-level base chain bound through the public enum surface
///

#[smart_enum(
    key(ty = "text"),
    item(ident = "Red", key = "red", args(0xFF0000)),
    item(ident = "Green", key = "green", args(0x00FF00)),
    member(ident = "rgb", ty = "u32"),
    extensible,
)]
pub struct Color;

#[smart_enum(
    key(ty = "text"),
    item(ident = "Blue", key = "blue", args(0x0000FF)),
    member(ident = "rgb", ty = "u32"),
    base(
        path = "Color",
        ctor_arg(name = "key", ty = "text"),
        ctor_arg(name = "rgb", ty = "u32"),
    ),
)]
pub struct ExtendedColor;

#[test]
fn derived_lookup_contains_inherited_and_own_items() {
    let keys: Vec<&str> = ExtendedColor::items()
        .iter()
        .map(|item| item.key().as_str())
        .collect();

    assert_eq!(keys, ["red", "green", "blue"]);
}

#[test]
fn inherited_items_resolve_through_the_derived_type() {
    let red = ExtendedColor::get(&"red".to_string()).unwrap();

    assert_eq!(red.key().as_str(), "red");
    assert_eq!(red.rgb(), 0xFF0000);
}

#[test]
fn own_items_keep_their_arguments() {
    let blue = ExtendedColor::get(&"blue".to_string()).unwrap();
    assert_eq!(blue.rgb(), 0x0000FF);
}

#[test]
fn base_and_derived_lookups_are_independent() {
    assert!(Color::get(&"blue".to_string()).is_err());
    assert_eq!(Color::items().len(), 2);
    assert_eq!(ExtendedColor::items().len(), 3);
}

///
/// TintedColor
/// derived member renamed against the base accessor
///

#[smart_enum(
    key(ty = "text"),
    item(ident = "White", key = "white", args(0xFFFFFF)),
    member(ident = "tint", ty = "u32", maps_to = "rgb"),
    base(
        path = "Color",
        ctor_arg(name = "key", ty = "text"),
        ctor_arg(name = "rgb", ty = "u32"),
    ),
)]
pub struct TintedColor;

#[test]
fn renamed_members_map_onto_the_base_accessor() {
    let red = TintedColor::get(&"red".to_string()).unwrap();
    assert_eq!(red.tint(), 0xFF0000);

    let white = TintedColor::get(&"white".to_string()).unwrap();
    assert_eq!(white.tint(), 0xFFFFFF);
}
