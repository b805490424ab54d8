//! End-to-end fixtures for the keywise attribute macros.
//!
//! The types here are compiled through the real macros; the integration
//! tests under `tests/` drive the generated item tables, factories,
//! operators and serialization glue.
