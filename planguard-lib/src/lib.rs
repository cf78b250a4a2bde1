#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for planguard
//!
//! This library consolidates all functionality for the planguard tool, which
//! checks infrastructure-as-code resources against user-defined policy rules.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`model`]: Resources, rules, exceptions and violations
//! - [`syntax`]: Unevaluated attribute expressions and call detection
//! - [`index`]: Resource lookup by type, type pattern and file
//! - [`expr`]: Rule expressions and the CEL evaluator
//! - [`functions`]: Built-in functions available to rule expressions
//! - [`engine`]: Rule evaluation and exception filtering
//! - [`reports`]: Report generation in multiple formats

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[cfg(any(debug_assertions, test))]
pub mod commands;
#[cfg(not(any(debug_assertions, test)))]
mod commands;

pub mod engine;
pub mod expr;
pub mod functions;
pub mod index;
pub mod model;
pub mod syntax;

#[cfg(any(debug_assertions, test))]
pub mod reports;
#[cfg(not(any(debug_assertions, test)))]
mod reports;

pub use crate::commands::{Host, run};
