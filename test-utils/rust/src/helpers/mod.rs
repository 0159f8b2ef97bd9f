//! Testing helpers and utilities

pub mod assertions;

pub use assertions::{assert_close, assert_dec_eq, Assertions};
