use crate::prelude::*;
use crate::symbol::adapter;

///
/// OperatorsMode
///
/// How an operator family is generated: not at all, against `Self` only,
/// or additionally against the bare key type.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum OperatorsMode {
    None,
    #[default]
    Default,
    WithKeyOverloads,
}

impl OperatorsMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "default" => Some(Self::Default),
            "key_overloads" => Some(Self::WithKeyOverloads),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::None)
    }

    #[must_use]
    pub const fn key_overloads(self) -> bool {
        matches!(self, Self::WithKeyOverloads)
    }
}

///
/// SerializationFrameworks
///
/// Which serializer glue fragments were requested for a type.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SerializationFrameworks {
    pub serde: bool,
    pub candid: bool,
    pub storable: bool,
}

impl SerializationFrameworks {
    fn from_attrs(decl: &TypeDecl) -> Self {
        Self {
            serde: decl.attrs.flag("serde"),
            candid: decl.attrs.flag("candid"),
            storable: decl.attrs.flag("storable"),
        }
    }
}

fn operators_mode(decl: &TypeDecl, name: &str) -> Result<OperatorsMode, SymbolError> {
    match adapter::opt_str(decl, name)? {
        None => Ok(OperatorsMode::default()),
        Some(value) => {
            OperatorsMode::parse(&value).ok_or_else(|| SymbolError::MalformedArgument {
                type_path: decl.path.clone(),
                name: name.to_string(),
                detail: format!("unknown operators mode `{value}`"),
            })
        }
    }
}

///
/// EnumSettings
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct EnumSettings {
    pub key_name: String,
    pub key_comparer: Option<String>,
    pub validatable: bool,
    pub extensible: bool,
    pub skip_format: bool,
    pub skip_parse: bool,
    pub skip_compare: bool,
    pub span_parse: bool,
    pub comparison_operators: OperatorsMode,
    pub frameworks: SerializationFrameworks,
    pub default_item: Option<String>,
    /// Path of a user-supplied invalid-item factory for validatable enums.
    pub invalid_factory: Option<String>,
    /// Path of a user-supplied key validation hook.
    pub validate_with: Option<String>,
}

impl EnumSettings {
    pub fn from_attrs(decl: &TypeDecl) -> Result<Self, SymbolError> {
        Ok(Self {
            key_name: adapter::key_property_name(decl)?,
            key_comparer: adapter::opt_path(decl, "comparer")?,
            validatable: decl.attrs.flag("validatable"),
            extensible: decl.attrs.flag("extensible"),
            skip_format: decl.attrs.flag("skip_format"),
            skip_parse: decl.attrs.flag("skip_parse"),
            skip_compare: decl.attrs.flag("skip_compare"),
            span_parse: decl.attrs.flag("span_parse"),
            comparison_operators: operators_mode(decl, "operators")?,
            frameworks: SerializationFrameworks::from_attrs(decl),
            default_item: adapter::opt_str(decl, "default_item")?,
            invalid_factory: adapter::opt_path(decl, "invalid_factory")?,
            validate_with: adapter::opt_path(decl, "validate_with")?,
        })
    }
}

///
/// ValueObjectSettings
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ValueObjectSettings {
    pub skip_factory: bool,
    pub skip_compare: bool,
    pub skip_format: bool,
    pub skip_parse: bool,
    pub span_parse: bool,
    /// Propagate `None` through the optional factory instead of failing.
    pub null_propagation: bool,
    pub comparison_operators: OperatorsMode,
    pub arithmetic_operators: OperatorsMode,
    pub frameworks: SerializationFrameworks,
    pub validate_with: Option<String>,
}

impl ValueObjectSettings {
    pub fn from_attrs(decl: &TypeDecl) -> Result<Self, SymbolError> {
        Ok(Self {
            skip_factory: decl.attrs.flag("skip_factory"),
            skip_compare: decl.attrs.flag("skip_compare"),
            skip_format: decl.attrs.flag("skip_format"),
            skip_parse: decl.attrs.flag("skip_parse"),
            span_parse: decl.attrs.flag("span_parse"),
            null_propagation: decl.attrs.flag("null_propagation"),
            comparison_operators: operators_mode(decl, "operators")?,
            arithmetic_operators: operators_mode(decl, "arithmetic")?,
            frameworks: SerializationFrameworks::from_attrs(decl),
            validate_with: adapter::opt_path(decl, "validate_with")?,
        })
    }
}

///
/// UnionSettings
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct UnionSettings {
    pub skip_format: bool,
    pub frameworks: SerializationFrameworks,
}

impl UnionSettings {
    pub fn from_attrs(decl: &TypeDecl) -> Result<Self, SymbolError> {
        Ok(Self {
            skip_format: decl.attrs.flag("skip_format"),
            frameworks: SerializationFrameworks::from_attrs(decl),
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{AttrBag, AttrValue, Location, SpecialType, TypeMarker};

    fn decl() -> TypeDecl {
        TypeDecl {
            path: "crate::Color".to_string(),
            ident: "Color".to_string(),
            marker: Some(TypeMarker::SmartEnum),
            is_partial: true,
            generic_params: 0,
            is_abstract: false,
            has_layout_attr: false,
            has_custom_serde: false,
            has_custom_candid: false,
            has_custom_storable: false,
            members: Vec::new(),
            key_type: Some(TypeRef::Special(SpecialType::Text)),
            attrs: AttrBag::default(),
            base_enum: None,
            location: Location::default(),
        }
    }

    #[test]
    fn defaults_are_stable() {
        let settings = EnumSettings::from_attrs(&decl()).unwrap();

        assert_eq!(settings.key_name, "key");
        assert!(!settings.validatable);
        assert_eq!(settings.comparison_operators, OperatorsMode::Default);
        assert!(!settings.frameworks.serde);
    }

    #[test]
    fn unknown_operators_mode_is_malformed() {
        let mut bad = decl();
        bad.attrs
            .set("operators", AttrValue::Str("sideways".to_string()));

        assert!(matches!(
            EnumSettings::from_attrs(&bad),
            Err(SymbolError::MalformedArgument { .. })
        ));
    }

    #[test]
    fn framework_flags_are_read_independently() {
        let mut with_serde = decl();
        with_serde.attrs.set("serde", AttrValue::Bool(true));
        with_serde.attrs.set("storable", AttrValue::Bool(true));

        let settings = EnumSettings::from_attrs(&with_serde).unwrap();
        assert!(settings.frameworks.serde);
        assert!(!settings.frameworks.candid);
        assert!(settings.frameworks.storable);
    }
}
