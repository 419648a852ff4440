use thiserror::Error;

use krus_api::ApiError;

use crate::session::TokenStoreError;

/// Error surfaced by the client-side stores.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The operation needs an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The post only exists as an optimistic entry; it cannot be updated
    /// or deleted until the authority has confirmed it.
    #[error("post has not been confirmed by the server yet")]
    ProvisionalPost,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    TokenStorage(#[from] TokenStoreError),
}

impl StoreError {
    /// Whether retrying the same operation could plausibly succeed.
    pub fn is_transport(&self) -> bool {
        matches!(self, StoreError::Api(e) if e.is_transport())
    }
}
