// SQL query constants for the stores
// Centralizes repeated column lists

/// SQL query fragments for the repositories table
pub mod repository_queries {
    /// All columns for repositories table
    pub const SELECT_ALL_COLUMNS: &str = "id, url, description, user_id, created_at, updated_at";
}

/// SQL query fragments for the users table
pub mod user_queries {
    /// All columns for users table
    pub const SELECT_ALL_COLUMNS: &str =
        "id, username, password_hash, email, created_at, updated_at";
}
