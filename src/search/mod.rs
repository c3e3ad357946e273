//! Search query reflection
//!
//! Keeps the invoice list's URL in step with the search box, so a filtered
//! view can be shared or restored from a link.

pub mod location;
pub mod reflector;

pub use location::{Location, PAGE_PARAM, QUERY_PARAM, UrlLocation, reflect};
pub use reflector::{DEFAULT_DEBOUNCE, SearchReflector};
