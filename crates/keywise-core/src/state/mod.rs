mod member;
mod settings;
mod smart_enum;
mod typed_member;
mod union;
mod value_object;

pub use self::member::*;
pub use self::settings::*;
pub use self::smart_enum::*;
pub use self::typed_member::*;
pub use self::union::*;
pub use self::value_object::*;
