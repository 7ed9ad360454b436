//! Request authentication.
//!
//! Two gates, implemented as axum extractors:
//! - `DeviceAuth` guards ingestion endpoints with an API key/secret pair and
//!   a cache-then-database credential lookup.
//! - `UserAuth` guards user endpoints with a bearer access token (cookie
//!   fallback for browser clients).
//!
//! Both attach a verified principal; handlers never see unauthenticated
//! requests.

mod cookie;
mod device;
mod errors;
mod state;
mod user;

pub use cookie::{
    ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME, clear_cookie, get_cookie, session_cookie,
};
pub use device::DeviceAuth;
pub use errors::AuthError;
pub use state::{HasAuthState, HasDeviceAuthState};
pub use user::{AuthenticatedUser, UserAuth, bearer_or_cookie_token};
