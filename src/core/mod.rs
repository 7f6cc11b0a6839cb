//! Core library components.
//!
//! File discovery, the variable-set model, KMS integration and the
//! edit/export workflows. Nothing here parses arguments or prints.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod document;
pub mod edit;
pub mod export;
pub mod locate;
pub mod store;
