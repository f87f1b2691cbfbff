//! # pipegen server
//!
//! Settings loading and the HTTP surface for the pipegen service. The
//! `pipegen` binary wires these to a [`pipegen_core::ToolServerConnection`].

pub mod config;
pub mod http;
