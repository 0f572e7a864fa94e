//! Request middleware.

pub mod fetch;

pub use fetch::{fetch_middleware, install_on, Fetch, FetchSlot};
