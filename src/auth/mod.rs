//! Credentials and sessions

pub mod password;
pub mod session;

pub use password::{PasswordError, PasswordHasher};
pub use session::{generate_token, hash_token, IssuedToken, Session, SessionError, SessionManager};
