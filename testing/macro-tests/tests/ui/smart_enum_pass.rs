use keywise::prelude::*;

#[smart_enum(
    key(ty = "text"),
    item(ident = "Simple", key = "simple"),
    item(ident = "Fancy", key = "fancy"),
)]
pub struct Flavor;

fn main() {
    assert!(Flavor::get(&"simple".to_string()).is_ok());
    assert!(Flavor::get(&"unknown".to_string()).is_err());
}
