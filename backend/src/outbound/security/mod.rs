//! Security adapters: bcrypt password hashing and HS256 session tokens.

mod bcrypt_hasher;
mod jwt_tokens;

pub use bcrypt_hasher::{BcryptPasswordHasher, MAX_PASSWORD_COST, MIN_PASSWORD_COST};
pub use jwt_tokens::JwtSessionTokens;
