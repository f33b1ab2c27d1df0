//! Pipenet Journal - a queryable record of how a pipe network's groups evolved.
//!
//! # Modules
//!
//! - [`journal`]: Topology journal that records every group-level change
//!   (creation, join, merge, shrink, split, destruction) with the cell whose
//!   event caused it.

#![deny(unsafe_code)]

pub mod journal;
