//! dowhile-auth — GitHub OAuth session client for the dowhile API.
//!
//! DESIGN
//! ======
//! [`session::AuthSession`] is the single owner of auth state. Its
//! collaborators sit behind small traits ([`api::ApiClient`],
//! [`storage::TokenStore`], [`location::Location`]) so the session logic runs
//! unchanged against the real backend or in-memory doubles.

pub mod api;
pub mod callback;
pub mod config;
pub mod location;
pub mod oauth;
pub mod session;
pub mod storage;
pub mod types;

pub use api::{ApiClient, ApiError, HttpApiClient};
pub use config::AuthConfig;
pub use location::{Location, PageLocation};
pub use session::{AuthSession, RestoreOutcome, SessionError};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};
pub use types::{AuthSnapshot, AuthStatus, User};
