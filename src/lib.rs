//! Reconciles employee hours between a Tempo timesheet export and a Time & Labor attendance
//! export.
//!
//! The engine lives in [`model`] and works on decoded [`model::RawSheet`]s. [`source`] turns
//! spreadsheet and CSV files into sheets, [`Session`] keeps the loaded pair and the category
//! selection between passes, and [`render`] turns a [`model::Report`] into text.

pub mod args;
pub mod commands;
mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod render;
pub mod session;
pub mod source;
mod utils;


pub use config::Config;
pub use error::{Error, ReconcileError, Result};
pub use session::Session;
