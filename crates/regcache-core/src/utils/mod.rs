//! Utility functions for date parsing and HTML escaping.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    escape_html, format_date, format_optional_date, format_remote_datetime, parse_remote_datetime,
};
