// Web layer of the repository hub: router, auth gate, handlers and views

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod templates;

pub use routes::create_router;
pub use state::AppState;
