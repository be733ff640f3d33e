//! Data preparation and filtering pipeline for the traffic collision
//! dashboard.
//!
//! The pipeline runs in one direction:
//!
//! 1. [`loader::load`] reads the fact table and the lookup workbook and
//!    left-joins every lookup label onto the collisions.
//! 2. [`filter::domains`] lists the selectable values of each attribute.
//! 3. [`filter::apply`] narrows the table to a [`filter::Selection`].
//! 4. [`aggregate`] and [`reports`] compute the figures a presentation
//!    layer renders.
//!
//! [`session::Session`] memoizes the load for the lifetime of a session.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod lookup;
pub mod output;
pub mod reports;
pub mod session;
pub mod types;
pub mod util;

#[cfg(test)]
mod test_support;

pub use error::{AggregateError, ConfigError, FilterError, LoadError, UnknownColumn};
pub use filter::Selection;
pub use session::{Dataset, Session};
pub use types::{Attribute, CollisionRecord, Dimension, Measure};
