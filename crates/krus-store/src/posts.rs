use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Mutex};

use krus_api::RemoteApi;
use krus_core::model::{BeerPost, CreateBeerPostInput, PostId, UpdateBeerPostInput};

use crate::error::StoreError;
use crate::session::{Session, TokenStore};

/// Immutable, point-in-time view of the posts collection, newest first.
pub type PostsSnapshot = Arc<Vec<BeerPost>>;

/// Client-side store for the posts collection.
///
/// The remote authority owns canonical state. This store keeps the last
/// known-good snapshot, shows an optimistic overlay while a create is in
/// flight, and reconciles with the authority afterwards. Observers only
/// ever receive immutable snapshots; a failed mutation always restores
/// consistency before the error is surfaced.
pub struct PostStore<A, T> {
    api: Arc<A>,
    session: Arc<Session<A, T>>,
    snapshot: watch::Sender<PostsSnapshot>,
    /// Serializes optimistic creates. Holding this across the whole
    /// overlay lifetime means a rollback always restores the snapshot
    /// captured before its own mutation, never a stale one; a second
    /// create queues behind the first.
    create_gate: Mutex<()>,
    /// Ticket counter for last-writer-wins fetches. A fetch result is
    /// applied only if no newer ticket was issued while it was in flight.
    fetch_seq: AtomicU64,
    creating: AtomicUsize,
    updating: AtomicUsize,
    deleting: AtomicUsize,
}

impl<A: RemoteApi, T: TokenStore> PostStore<A, T> {
    pub fn new(api: Arc<A>, session: Arc<Session<A, T>>) -> Self {
        let (snapshot, _) = watch::channel(PostsSnapshot::default());
        Self {
            api,
            session,
            snapshot,
            create_gate: Mutex::new(()),
            fetch_seq: AtomicU64::new(0),
            creating: AtomicUsize::new(0),
            updating: AtomicUsize::new(0),
            deleting: AtomicUsize::new(0),
        }
    }

    /// Current snapshot. Cheap to clone; never mutated in place.
    pub fn snapshot(&self) -> PostsSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Observe snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<PostsSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn is_creating(&self) -> bool {
        self.creating.load(Ordering::SeqCst) > 0
    }

    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::SeqCst) > 0
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::SeqCst) > 0
    }

    fn next_ticket(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Invalidate fetches that are still in flight, so a stale result can
    /// never overwrite what is published next.
    fn supersede_inflight(&self) {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst);
    }

    /// Re-fetch the collection from the authority.
    ///
    /// Last-writer-wins: if a newer fetch (or a local mutation) started
    /// while this one was in flight, the result is discarded.
    pub async fn refresh(&self) -> Result<PostsSnapshot, StoreError> {
        let (_, token) = self.session.authenticated()?;
        self.refresh_with(&token).await?;
        Ok(self.snapshot())
    }

    async fn refresh_with(&self, token: &str) -> Result<(), StoreError> {
        let ticket = self.next_ticket();
        let posts = self.api.list_posts(token).await?;
        if self.fetch_seq.load(Ordering::SeqCst) == ticket {
            self.snapshot.send_replace(Arc::new(posts));
        } else {
            tracing::debug!(ticket, "discarding superseded posts fetch");
        }
        Ok(())
    }

    /// Fetch a single post from the authority.
    pub async fn get(&self, id: &PostId) -> Result<BeerPost, StoreError> {
        let (_, token) = self.session.authenticated()?;
        Ok(self.api.get_post(&token, id).await?)
    }

    /// Create a post with an optimistic overlay.
    ///
    /// A provisional entry is prepended and published before the authority
    /// answers. On success the collection is re-fetched so the temporary
    /// id never leaks into later operations; on failure the pre-create
    /// snapshot is restored exactly, then the error propagates.
    pub async fn create(&self, input: CreateBeerPostInput) -> Result<BeerPost, StoreError> {
        let _overlay = self.create_gate.lock().await;
        let (author, token) = self.session.authenticated()?;

        let previous = self.snapshot();
        let provisional = BeerPost::provisional(&author, &input, Utc::now());

        let mut optimistic = Vec::with_capacity(previous.len() + 1);
        optimistic.push(provisional);
        optimistic.extend(previous.iter().cloned());
        self.supersede_inflight();
        self.snapshot.send_replace(Arc::new(optimistic));

        self.creating.fetch_add(1, Ordering::SeqCst);
        let result = self.api.create_post(&token, &input).await;
        self.creating.fetch_sub(1, Ordering::SeqCst);

        match result {
            Ok(created) => {
                if let Err(e) = self.refresh_with(&token).await {
                    // The authority accepted the post but the reconciling
                    // re-fetch failed. Substitute the confirmed entity for
                    // the provisional one so the temporary id cannot leak;
                    // the next successful refresh converges to the
                    // authority's ordering.
                    tracing::warn!("reconciling re-fetch failed after create: {e}");
                    let mut merged = Vec::with_capacity(previous.len() + 1);
                    merged.push(created.clone());
                    merged.extend(previous.iter().cloned());
                    self.supersede_inflight();
                    self.snapshot.send_replace(Arc::new(merged));
                }
                Ok(created)
            }
            Err(e) => {
                self.supersede_inflight();
                self.snapshot.send_replace(previous);
                Err(e.into())
            }
        }
    }

    /// Update a post.
    ///
    /// No optimistic overlay: the snapshot changes only after the
    /// authority confirms, via a full re-fetch. On failure the snapshot is
    /// untouched.
    pub async fn update(&self, input: UpdateBeerPostInput) -> Result<BeerPost, StoreError> {
        if input.id.is_provisional() {
            return Err(StoreError::ProvisionalPost);
        }
        let (_, token) = self.session.authenticated()?;

        self.updating.fetch_add(1, Ordering::SeqCst);
        let result = self.api.update_post(&token, &input).await;
        self.updating.fetch_sub(1, Ordering::SeqCst);
        let updated = result?;

        if let Err(e) = self.refresh_with(&token).await {
            tracing::warn!("re-fetch after update failed: {e}");
        }
        Ok(updated)
    }

    /// Delete a post. Same policy as [`PostStore::update`].
    pub async fn delete(&self, id: &PostId) -> Result<(), StoreError> {
        if id.is_provisional() {
            return Err(StoreError::ProvisionalPost);
        }
        let (_, token) = self.session.authenticated()?;

        self.deleting.fetch_add(1, Ordering::SeqCst);
        let result = self.api.delete_post(&token, id).await;
        self.deleting.fetch_sub(1, Ordering::SeqCst);
        result?;

        if let Err(e) = self.refresh_with(&token).await {
            tracing::warn!("re-fetch after delete failed: {e}");
        }
        Ok(())
    }
}
