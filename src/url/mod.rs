//! URL handling module for Topic-Harvest
//!
//! This module provides target URL parsing, origin extraction (the key used
//! for per-origin politeness), and display-name derivation for targets.

mod name;
mod origin;

// Re-export main functions
pub use name::derive_target_name;
pub use origin::{extract_origin, parse_target_url};
