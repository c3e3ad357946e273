//! HTTP server for the invoice dashboard
//!
//! `ServerBuilder` wires a store, the mutation service and the view cache
//! into the route table built by [`router::build_router`].

pub mod builder;
pub mod handlers;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use router::build_router;
pub use state::AppState;
