use std::future::Future;

use krus_core::model::{
    AuthResponse, BeerPost, CreateBeerPostInput, Friendship, LoginCredentials, PostId,
    RegisterCredentials, UpdateBeerPostInput, UpdateProfileInput, User, UserSearchResult,
};

use crate::error::ApiError;

/// Contract for the remote authority that owns the canonical state of
/// users, posts, and friendships.
///
/// Every operation either resolves with server data or fails with an
/// [`ApiError`]; there is no silent fallback. Callers pass the bearer
/// token explicitly for authenticated operations.
pub trait RemoteApi: Send + Sync {
    // Auth
    fn login(
        &self,
        credentials: &LoginCredentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    fn current_user(&self, token: &str) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn update_profile(
        &self,
        token: &str,
        input: &UpdateProfileInput,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;

    // Posts
    /// Full collection, newest first.
    fn list_posts(&self, token: &str)
        -> impl Future<Output = Result<Vec<BeerPost>, ApiError>> + Send;

    fn get_post(
        &self,
        token: &str,
        id: &PostId,
    ) -> impl Future<Output = Result<BeerPost, ApiError>> + Send;

    /// The authority assigns the id and the stored image URL.
    fn create_post(
        &self,
        token: &str,
        input: &CreateBeerPostInput,
    ) -> impl Future<Output = Result<BeerPost, ApiError>> + Send;

    fn update_post(
        &self,
        token: &str,
        input: &UpdateBeerPostInput,
    ) -> impl Future<Output = Result<BeerPost, ApiError>> + Send;

    fn delete_post(
        &self,
        token: &str,
        id: &PostId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    // Friends
    fn search_users(
        &self,
        token: &str,
        query: &str,
    ) -> impl Future<Output = Result<Vec<UserSearchResult>, ApiError>> + Send;

    fn list_friends(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Vec<Friendship>, ApiError>> + Send;

    fn send_friend_request(
        &self,
        token: &str,
        receiver_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn accept_friend_request(
        &self,
        token: &str,
        friendship_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn remove_friendship(
        &self,
        token: &str,
        friendship_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
