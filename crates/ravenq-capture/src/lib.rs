//! Synchronous error capture: context enrichment, breadcrumbs and the
//! capture session that turns an error into a queued delivery envelope.

pub mod breadcrumb;
pub mod classify;
pub mod dsn;
pub mod enrich;
pub mod handler;
pub mod session;

pub use breadcrumb::*;
pub use classify::*;
pub use dsn::*;
pub use enrich::*;
pub use handler::*;
pub use session::*;

/// Client identifier advertised in the User-Agent and auth headers.
pub const CLIENT_AGENT: &str = concat!("ravenq/", env!("CARGO_PKG_VERSION"));
