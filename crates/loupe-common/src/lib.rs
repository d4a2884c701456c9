//! Common utilities for the loupe HTML toolkit.
//!
//! This crate provides shared infrastructure used by every loupe crate:
//! - **Warning System** - deduplicated, colored terminal output for recovered
//!   markup and unsupported selector syntax

pub mod warning;
