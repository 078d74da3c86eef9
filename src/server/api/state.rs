//! Centralized state management for the Actix web server
use crate::publications::Publications;

/// Global, read-only state
pub trait Global {
    /// The publication lifecycle manager and its components.
    fn publications(&self) -> &Publications;
    /// Page size used when a request does not give one.
    fn default_page_size(&self) -> i64;
}

/// Application state
#[derive(Debug, Clone)]
pub struct App {
    /// Publication lifecycle manager
    pub publications: Publications,
    /// Default page size for listings
    pub default_page_size: i64,
}

impl Global for App {
    fn publications(&self) -> &Publications {
        &self.publications
    }

    fn default_page_size(&self) -> i64 {
        self.default_page_size
    }
}
