//! Krus Core - Domain models and form validation.
//!
//! This crate contains the core domain types for the Krus beer-logging
//! client. It has no dependencies on other Krus crates, performs no I/O,
//! and never panics on user input.

pub mod model;
pub mod validation;

// Re-exports for convenience
pub use model::{
    AuthResponse, BeerPost, CreateBeerPostInput, Friendship, FriendshipStatus, LoginCredentials,
    PostId, RegisterCredentials, UpdateBeerPostInput, UpdateProfileInput, User, UserSearchResult,
};
pub use validation::{FieldError, FormErrors, ValidationResult, Validator};
