//! Typed addressing and mutation of the résumé document.

pub mod mutation;
pub mod path;
