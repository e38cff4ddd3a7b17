pub use self::error::DatabaseError;
pub use self::manager::DatabaseManager;
pub use self::models::{Department, Employee};
pub use self::stores::{QueryStore, ResultSet};

pub mod error;
pub mod manager;
pub mod models;
pub mod schema;
pub mod sqlite;
pub mod stores;
