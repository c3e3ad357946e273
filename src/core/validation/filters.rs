//! Reusable field filters
//!
//! These filters transform raw form strings before coercion and validation

use std::sync::Arc;

/// A transformation applied to a raw field string
pub type Filter = Arc<dyn Fn(&str, String) -> String + Send + Sync>;

/// Filter: trim whitespace from string
pub fn trim() -> Filter {
    Arc::new(|_: &str, value: String| value.trim().to_string())
}

/// Filter: convert string to lowercase
pub fn lowercase() -> Filter {
    Arc::new(|_: &str, value: String| value.to_lowercase())
}
