//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware/fetch.rs (RequestContext + FetchSlot into extensions)
//!     → handler extracts `Fetch`, calls upstream, maybe forwards cookies
//!     → response.rs (queued cookies appended to the handler's response)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use middleware::{install_on, Fetch, FetchSlot};
pub use request::RequestContext;
pub use response::CookieSink;
pub use server::GatewayServer;
