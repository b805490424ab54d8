use keywise::prelude::*;

#[union_type(
    variant(ident = "Flag", ty = "bool"),
    variant(ident = "Level", ty = "u8"),
)]
pub struct Setting;

fn main() {
    assert!(Setting::from(true).is_flag());
    assert_eq!(Setting::from(2_u8).as_level(), Some(&2));
}
