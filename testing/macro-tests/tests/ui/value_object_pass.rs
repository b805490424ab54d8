use keywise::prelude::*;

#[value_object(member(ident = "value", ty = "i64"))]
pub struct Offset;

fn main() {
    let offset = Offset::try_create(-3).unwrap();
    assert_eq!(offset.into_key(), -3);
}
