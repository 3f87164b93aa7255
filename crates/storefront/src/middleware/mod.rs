//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (tower-sessions, `PostgreSQL` or memory)
//! 6. Rate limiting on login and registration (governor)

pub mod auth;
pub mod page_context;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_customer, set_current_customer};
pub use page_context::PageContext;
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{StorefrontSessionStore, create_session_layer};
