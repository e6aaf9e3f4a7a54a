//! Common test utilities for vegplot.
//!
//! This module provides shared utilities for the end-to-end plotting tests.

// Re-export all common test utilities
pub mod assertions;
pub mod image_utils;
pub mod test_data;
