use crate::symbol::Location;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Severity
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Severity {
    #[display("error")]
    Error,
    #[display("warning")]
    Warning,
}

///
/// DiagnosticCode
///
/// Stable codes surfaced through the host toolchain. Codes are append-only;
/// renumbering breaks downstream suppressions.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum DiagnosticCode {
    ComparisonNotSupported,
    CtorArgsArityMismatch,
    DefaultDisallowed,
    DuplicateMemberName,
    GenericNotSupported,
    InternalError,
    InvalidDefaultItem,
    InvalidKeyName,
    KeyNameCollision,
    MalformedAttribute,
    MissingKeyType,
    NoItems,
    NonExtensibleBase,
    NonReadonlyMember,
    NotPartial,
    StaticMemberNotItem,
    UnknownBaseEnum,
}

impl DiagnosticCode {
    #[must_use]
    #[remain::check]
    pub const fn as_str(self) -> &'static str {
        #[remain::sorted]
        match self {
            Self::ComparisonNotSupported => "KW010",
            Self::CtorArgsArityMismatch => "KW007",
            Self::DefaultDisallowed => "KW014",
            Self::DuplicateMemberName => "KW012",
            Self::GenericNotSupported => "KW002",
            Self::InternalError => "KW013",
            Self::InvalidDefaultItem => "KW016",
            Self::InvalidKeyName => "KW004",
            Self::KeyNameCollision => "KW006",
            Self::MalformedAttribute => "KW011",
            Self::MissingKeyType => "KW003",
            Self::NoItems => "KW008",
            Self::NonExtensibleBase => "KW017",
            Self::NonReadonlyMember => "KW005",
            Self::NotPartial => "KW001",
            Self::StaticMemberNotItem => "KW009",
            Self::UnknownBaseEnum => "KW015",
        }
    }
}

///
/// Diagnostic
///
/// One structured report tied to the offending declaration. Generation
/// failures become diagnostics at the orchestration boundary; they are
/// never allowed to abort the batch.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

impl Diagnostic {
    #[must_use]
    pub fn error(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            location,
        }
    }

    #[must_use]
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, location: Location) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            location,
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {}: {}",
            self.severity,
            self.code.as_str(),
            self.location,
            self.message
        )
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(DiagnosticCode::NotPartial.as_str(), "KW001");
        assert_eq!(DiagnosticCode::UnknownBaseEnum.as_str(), "KW015");
    }

    #[test]
    fn display_carries_code_and_location() {
        let diag = Diagnostic::error(
            DiagnosticCode::NonReadonlyMember,
            "member `rgb` must be readonly",
            Location::new("src/color.rs", 3, 5),
        );

        let rendered = diag.to_string();
        assert!(rendered.contains("KW005"));
        assert!(rendered.contains("src/color.rs:3:5"));
    }
}
