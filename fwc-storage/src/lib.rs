//! SeaORM persistence for FWC
//!
//! Holds the two tables the access layer needs directly: user accounts
//! for the identity bridge and profiles for ownership resolution.

pub mod connection;
pub mod entities;
pub mod error;
pub mod profiles;
pub mod users;

pub use connection::{connect, create_schema};
pub use error::{StorageError, StorageResult};
pub use profiles::SeaOrmProfileStore;
pub use users::SeaOrmUserStore;
