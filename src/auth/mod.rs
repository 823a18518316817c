//! Password hashing and bearer tokens.

pub mod jwt;
pub mod password;

pub use jwt::{generate_token, validate_token, Claims, JwtConfig};
pub use password::{hash_password, verify_password};
