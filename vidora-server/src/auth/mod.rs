pub mod cookies;
pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::auth_middleware;
pub use token::{TokenCodec, TokenError, TokenPair};
