//! Validation modules

pub mod identifiers;

pub use identifiers::{not_blank, parse_optional_id, parse_required_id};
