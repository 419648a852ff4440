//! Krus Store - Client-side state stores.
//!
//! Owns the snapshots the UI observes: the authenticated session, the
//! posts collection with its optimistic-create overlay, and the friends
//! list. The remote authority stays the source of truth; every mutation
//! here either reconciles with it or rolls back to the last known-good
//! state before surfacing the error.

pub mod error;
pub mod friends;
pub mod posts;
pub mod session;

// Re-exports for convenience
pub use error::StoreError;
pub use friends::{FriendStore, FriendsSnapshot};
pub use posts::{PostStore, PostsSnapshot};
pub use session::{AuthState, Session, TokenStore, TokenStoreError};

#[cfg(any(test, feature = "test-utils"))]
pub use session::MemoryTokenStore;
