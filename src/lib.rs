//! ctos: static builder for a browser desktop
//!
//! Walks a content tree, turns documents into served pages, copies standalone
//! apps verbatim, and emits the `init.json` manifest the desktop shell loads.
//! A small preview server adds the visit-counter endpoint.

pub mod build;
pub mod cli;
pub mod config;
pub mod counter;
pub mod emit;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod metadata;
pub mod render;
pub mod server;
pub mod tree;
pub mod types;
