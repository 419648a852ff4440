use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use krus_api::RemoteApi;
use krus_core::model::{Friendship, UserSearchResult};

use crate::error::StoreError;
use crate::session::{Session, TokenStore};

/// Immutable view of the viewer's accepted friendships.
pub type FriendsSnapshot = Arc<Vec<Friendship>>;

/// Client-side store for the friends list and user search.
///
/// All mutations here follow the plain policy: the authority is asked
/// first, and only on success is the cached list re-fetched. Search
/// results are not cached; they go straight to the caller.
pub struct FriendStore<A, T> {
    api: Arc<A>,
    session: Arc<Session<A, T>>,
    friends: watch::Sender<FriendsSnapshot>,
    fetch_seq: AtomicU64,
    sending: AtomicUsize,
    accepting: AtomicUsize,
    removing: AtomicUsize,
}

impl<A: RemoteApi, T: TokenStore> FriendStore<A, T> {
    pub fn new(api: Arc<A>, session: Arc<Session<A, T>>) -> Self {
        let (friends, _) = watch::channel(FriendsSnapshot::default());
        Self {
            api,
            session,
            friends,
            fetch_seq: AtomicU64::new(0),
            sending: AtomicUsize::new(0),
            accepting: AtomicUsize::new(0),
            removing: AtomicUsize::new(0),
        }
    }

    pub fn friends(&self) -> FriendsSnapshot {
        self.friends.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FriendsSnapshot> {
        self.friends.subscribe()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::SeqCst) > 0
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst) > 0
    }

    pub fn is_removing(&self) -> bool {
        self.removing.load(Ordering::SeqCst) > 0
    }

    /// Re-fetch the friends list. Last-writer-wins, same policy as the
    /// posts store.
    pub async fn refresh(&self) -> Result<FriendsSnapshot, StoreError> {
        let (_, token) = self.session.authenticated()?;
        self.refresh_with(&token).await?;
        Ok(self.friends())
    }

    async fn refresh_with(&self, token: &str) -> Result<(), StoreError> {
        let ticket = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let friends = self.api.list_friends(token).await?;
        if self.fetch_seq.load(Ordering::SeqCst) == ticket {
            self.friends.send_replace(Arc::new(friends));
        } else {
            tracing::debug!(ticket, "discarding superseded friends fetch");
        }
        Ok(())
    }

    /// Search users by name or email. An empty query resolves to an empty
    /// result without touching the network.
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSearchResult>, StoreError> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let (_, token) = self.session.authenticated()?;
        Ok(self.api.search_users(&token, query).await?)
    }

    /// Send a friend request. The friends list is unaffected until the
    /// other user accepts, so nothing is re-fetched here.
    pub async fn send_request(&self, receiver_id: &str) -> Result<(), StoreError> {
        let (_, token) = self.session.authenticated()?;

        self.sending.fetch_add(1, Ordering::SeqCst);
        let result = self.api.send_friend_request(&token, receiver_id).await;
        self.sending.fetch_sub(1, Ordering::SeqCst);
        result?;
        Ok(())
    }

    /// Accept a pending request and re-fetch the friends list.
    pub async fn accept_request(&self, friendship_id: &str) -> Result<(), StoreError> {
        let (_, token) = self.session.authenticated()?;

        self.accepting.fetch_add(1, Ordering::SeqCst);
        let result = self.api.accept_friend_request(&token, friendship_id).await;
        self.accepting.fetch_sub(1, Ordering::SeqCst);
        result?;

        if let Err(e) = self.refresh_with(&token).await {
            tracing::warn!("re-fetch after accepting request failed: {e}");
        }
        Ok(())
    }

    /// Remove a friendship and re-fetch the friends list.
    pub async fn remove_friendship(&self, friendship_id: &str) -> Result<(), StoreError> {
        let (_, token) = self.session.authenticated()?;

        self.removing.fetch_add(1, Ordering::SeqCst);
        let result = self.api.remove_friendship(&token, friendship_id).await;
        self.removing.fetch_sub(1, Ordering::SeqCst);
        result?;

        if let Err(e) = self.refresh_with(&token).await {
            tracing::warn!("re-fetch after removing friendship failed: {e}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use krus_api::{ApiError, MockApi, MOCK_TOKEN};
    use krus_core::model::{FriendshipStatus, User};

    use crate::session::MemoryTokenStore;

    fn viewer() -> User {
        User {
            id: "1".to_string(),
            email: "demo@krus.app".to_string(),
            name: "Beer Lover".to_string(),
            avatar: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn make_store(api: Arc<MockApi>) -> FriendStore<MockApi, MemoryTokenStore> {
        let session = Arc::new(Session::authenticated_for_testing(
            api.clone(),
            Arc::new(MemoryTokenStore::with_token(MOCK_TOKEN)),
            viewer(),
            MOCK_TOKEN,
        ));
        FriendStore::new(api, session)
    }

    #[tokio::test]
    async fn test_empty_query_skips_network() {
        let api = Arc::new(MockApi::new());
        let store = make_store(api.clone());

        // Arm a failure; it must survive the empty-query search
        api.fail_next(ApiError::Transport("connection reset".to_string()));
        let results = store.search_users("").await.unwrap();
        assert!(results.is_empty());

        assert!(store.refresh().await.is_err());
    }

    #[tokio::test]
    async fn test_search_annotates_relationship() {
        let api = Arc::new(MockApi::new());
        let store = make_store(api);

        let results = store.search_users("craft").await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].friendship_status, FriendshipStatus::NotConnected);
    }

    #[tokio::test]
    async fn test_accept_refetches_friends() {
        let api = Arc::new(MockApi::new());
        let store = make_store(api);
        store.refresh().await.unwrap();
        assert!(store.friends().is_empty());

        store.send_request("2").await.unwrap();
        let results = store.search_users("craft").await.unwrap();
        assert_eq!(results[0].friendship_status, FriendshipStatus::RequestSent);
        let friendship_id = results[0].friendship_id.clone().unwrap();

        store.accept_request(&friendship_id).await.unwrap();

        let friends = store.friends();
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].user.id, "2");
    }

    #[tokio::test]
    async fn test_remove_refetches_friends() {
        let api = Arc::new(MockApi::new());
        let store = make_store(api);
        store.send_request("2").await.unwrap();
        let results = store.search_users("craft").await.unwrap();
        let friendship_id = results[0].friendship_id.clone().unwrap();
        store.accept_request(&friendship_id).await.unwrap();
        assert_eq!(store.friends().len(), 1);

        store.remove_friendship(&friendship_id).await.unwrap();

        assert!(store.friends().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_friends_unchanged() {
        let api = Arc::new(MockApi::new());
        let store = make_store(api.clone());
        store.refresh().await.unwrap();
        let before = store.friends();

        api.fail_next(ApiError::Status {
            status: 404,
            message: "friendship not found".to_string(),
        });
        assert!(store.remove_friendship("99").await.is_err());

        assert_eq!(*store.friends(), *before);
        assert!(!store.is_removing());
    }

    #[tokio::test]
    async fn test_mutations_require_authentication() {
        let api = Arc::new(MockApi::new());
        let session = Arc::new(Session::new(
            api.clone(),
            Arc::new(MemoryTokenStore::new()),
        ));
        let store = FriendStore::new(api, session);

        assert_eq!(
            store.send_request("2").await.unwrap_err(),
            StoreError::NotAuthenticated
        );
        assert_eq!(
            store.search_users("craft").await.unwrap_err(),
            StoreError::NotAuthenticated
        );
    }
}
