//! Authentication and session management

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod session;

pub use jwt::{Claims, TokenCodec};
pub use middleware::{require_auth, require_role, Authenticator, RoleGuard};
pub use models::{Identity, UserRole};
pub use session::{CookiePolicy, SameSite, SessionCookie};
