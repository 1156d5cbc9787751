// Database layer module
// PostgreSQL connection pool plus the store traits and their implementations

pub mod pool;
pub mod stores;

pub use pool::DbPool;
pub use stores::{
    InMemoryRepositoryStore, InMemoryUserStore, PgRepositoryStore, PgUserStore, RepositoryStore,
    UserStore,
};
