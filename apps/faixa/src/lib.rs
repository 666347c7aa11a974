//! # faixa
//!
//! The Faixa application library: HTTP API and CLI layers over the
//! faixa-core rules engine. Exposed as a library so integration tests can
//! exercise the router and types directly.

pub mod api;
pub mod cli;
