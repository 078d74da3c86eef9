//! This module contains all the sqlx structs for the database tables.

/// sqlx structs for `pending_object_deletion` table.
pub mod pending_deletion;
/// sqlx structs for publication table.
pub mod publication;
/// sqlx structs for `publication_image` table.
pub mod publication_image;
/// sqlx structs for `publication_tag` table.
pub mod publication_tag;
/// sqlx structs for tag table.
pub mod tag;
/// sqlx structs for vote table.
pub mod vote;

/// Size of the batch for bulk inserts.
/// SQLite caps the number of bound parameters per statement, so bulk
/// inserts are chunked.
pub const BATCH_SIZE: usize = 1000;
