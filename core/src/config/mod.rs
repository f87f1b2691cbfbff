//! Minimal configuration module for pipegen core
//!
//! Only exports pure data types. All loading logic is in the server layer.

pub mod types;

pub use types::{ModelParams, ResolvedLlmConfig, ServerEndpoint};
