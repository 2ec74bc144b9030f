pub mod books;
pub mod highlights;
pub mod rest;
pub mod state;
pub mod tts;

// Re-export the router builder and OpenAPI document for the binary and
// for integration tests.
pub use rest::{build_router, ApiDoc};
