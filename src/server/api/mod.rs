//! This module contains the API endpoints for the server.
pub mod files;
pub mod identity;
pub mod publications;
pub mod routes;
pub mod state;
