//! Command-line companion for folio content trees: validate bundles, serve
//! them locally, and explain how a URL routes.

pub mod check;
pub mod serve;
pub mod source;
