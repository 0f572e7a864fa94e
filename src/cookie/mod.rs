//! Cookie forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! upstream reqwest::Response
//!     → forward.rs (collect Set-Cookie values)
//!     → attributes.rs (strip Domain, apply PathPolicy)
//!     → outgoing response headers (appended after existing Set-Cookie)
//! ```

pub mod attributes;
pub mod forward;

pub use attributes::{rewrite_set_cookie, PathPolicy};
pub use forward::{append_set_cookies, forward_cookie, rewrite_set_cookies};
