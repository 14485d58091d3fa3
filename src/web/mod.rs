//! Web interface module
//!
//! Thin HTTP adapter exposing the store operations under `/datastore`.
//! It holds no state of its own beyond a shared handle to the store.

mod server;
mod handlers;

pub use handlers::AppState;
pub use server::{router, run_web_server};
