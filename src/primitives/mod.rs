//! Low-level text utilities
//!
//! Grapheme-aware cursor arithmetic and markup sanitizing.

pub mod grapheme;
pub mod html;
