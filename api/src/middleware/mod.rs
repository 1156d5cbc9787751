mod auth;

pub use auth::{auth_middleware, bearer_token, AUTH_COOKIE};
