//! Property-based tests for ordering and parsing guarantees

mod determinism;
