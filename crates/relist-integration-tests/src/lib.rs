//! Integration test crate for the Relist resale core.
//!
//! The crate body is empty; the flows under test live in `tests/`.

#![forbid(unsafe_code)]
