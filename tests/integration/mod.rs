//! Integration tests for the ctos site builder

mod build_manifest;
mod config_integration;
mod counter_endpoint;
mod test_utils;
