//! In-memory mock of the remote collection service.
//!
//! A deterministic stand-in for the backend, used by tests and local
//! development builds. Unlike the real service it is only ever reached by
//! constructing it explicitly; transport failures never fall back to it.

use std::sync::RwLock;

use chrono::{Duration, Utc};

use krus_core::model::{
    AuthResponse, BeerPost, CreateBeerPostInput, Friendship, FriendshipStatus, LoginCredentials,
    PostId, RegisterCredentials, UpdateBeerPostInput, UpdateProfileInput, User, UserSearchResult,
};

use crate::client::RemoteApi;
use crate::error::ApiError;

/// The token the mock service issues and accepts.
pub const MOCK_TOKEN: &str = "mock-jwt-token";

struct PendingRequest {
    id: String,
    user_id: String,
    incoming: bool,
}

struct MockState {
    user: User,
    posts: Vec<BeerPost>,
    directory: Vec<User>,
    pending: Vec<PendingRequest>,
    friendships: Vec<Friendship>,
    next_post_id: u64,
    next_friendship_id: u64,
    fail_next: Option<ApiError>,
}

/// In-memory remote service with a seeded demo dataset.
pub struct MockApi {
    state: RwLock<MockState>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        let now = Utc::now();
        let user = User {
            id: "1".to_string(),
            email: "demo@krus.app".to_string(),
            name: "Beer Lover".to_string(),
            avatar: Some("https://i.pravatar.cc/150?img=12".to_string()),
            created_at: now,
        };
        let other = User {
            id: "2".to_string(),
            email: "craft@krus.app".to_string(),
            name: "Craft Beer Fan".to_string(),
            avatar: Some("https://i.pravatar.cc/150?img=8".to_string()),
            created_at: now,
        };

        let posts = vec![
            BeerPost {
                id: PostId::new("2"),
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                user_avatar: user.avatar.clone(),
                beer_name: "American IPA".to_string(),
                place: "Local Brewery".to_string(),
                rating: 5,
                notes: Some("Amazing citrus notes with a smooth finish!".to_string()),
                image_url: "/hazy-ipa-beer-glass.jpg".to_string(),
                created_at: now - Duration::days(1),
                updated_at: now - Duration::days(1),
            },
            BeerPost {
                id: PostId::new("1"),
                user_id: other.id.clone(),
                user_name: other.name.clone(),
                user_avatar: other.avatar.clone(),
                beer_name: "Belgian Dubbel".to_string(),
                place: "Beer Garden".to_string(),
                rating: 4,
                notes: Some("Rich malty flavor with hints of dark fruit.".to_string()),
                image_url: "/belgian-dubbel-beer.jpg".to_string(),
                created_at: now - Duration::days(2),
                updated_at: now - Duration::days(2),
            },
        ];

        Self {
            state: RwLock::new(MockState {
                user,
                posts,
                directory: vec![other],
                pending: Vec::new(),
                friendships: Vec::new(),
                next_post_id: 3,
                next_friendship_id: 1,
                fail_next: None,
            }),
        }
    }

    /// Arm a one-shot failure: the next operation of any kind returns this
    /// error instead of touching state.
    pub fn fail_next(&self, error: ApiError) {
        self.state.write().unwrap().fail_next = Some(error);
    }

    fn take_failure(&self) -> Result<(), ApiError> {
        match self.state.write().unwrap().fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn check_token(token: &str) -> Result<(), ApiError> {
        if token == MOCK_TOKEN {
            Ok(())
        } else {
            Err(ApiError::unauthorized("invalid token"))
        }
    }
}

impl RemoteApi for MockApi {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        self.take_failure()?;
        let state = self.state.read().unwrap();
        Ok(AuthResponse {
            user: state.user.clone(),
            token: MOCK_TOKEN.to_string(),
        })
    }

    async fn register(&self, credentials: &RegisterCredentials) -> Result<AuthResponse, ApiError> {
        self.take_failure()?;
        let mut state = self.state.write().unwrap();
        state.user.name = credentials.name.clone();
        state.user.email = credentials.email.clone();
        Ok(AuthResponse {
            user: state.user.clone(),
            token: MOCK_TOKEN.to_string(),
        })
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        Ok(self.state.read().unwrap().user.clone())
    }

    async fn update_profile(
        &self,
        token: &str,
        input: &UpdateProfileInput,
    ) -> Result<User, ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        let mut state = self.state.write().unwrap();
        if let Some(name) = &input.name {
            state.user.name = name.clone();
        }
        if let Some(avatar) = &input.avatar {
            state.user.avatar = Some(avatar.clone());
        }
        Ok(state.user.clone())
    }

    async fn list_posts(&self, token: &str) -> Result<Vec<BeerPost>, ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        Ok(self.state.read().unwrap().posts.clone())
    }

    async fn get_post(&self, token: &str, id: &PostId) -> Result<BeerPost, ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        self.state
            .read()
            .unwrap()
            .posts
            .iter()
            .find(|p| p.id == *id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("post not found"))
    }

    async fn create_post(
        &self,
        token: &str,
        input: &CreateBeerPostInput,
    ) -> Result<BeerPost, ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        let mut state = self.state.write().unwrap();
        let now = Utc::now();
        let post = BeerPost {
            id: PostId::new(state.next_post_id.to_string()),
            user_id: state.user.id.clone(),
            user_name: state.user.name.clone(),
            user_avatar: state.user.avatar.clone(),
            beer_name: input.beer_name.clone(),
            place: input.place.clone(),
            rating: input.rating,
            notes: input.notes.clone(),
            image_url: input.image_uri.clone(),
            created_at: now,
            updated_at: now,
        };
        state.next_post_id += 1;
        state.posts.insert(0, post.clone());
        Ok(post)
    }

    async fn update_post(
        &self,
        token: &str,
        input: &UpdateBeerPostInput,
    ) -> Result<BeerPost, ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        let mut state = self.state.write().unwrap();
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == input.id)
            .ok_or_else(|| ApiError::not_found("post not found"))?;

        if let Some(beer_name) = &input.beer_name {
            post.beer_name = beer_name.clone();
        }
        if let Some(place) = &input.place {
            post.place = place.clone();
        }
        if let Some(rating) = input.rating {
            post.rating = rating;
        }
        if let Some(notes) = &input.notes {
            post.notes = Some(notes.clone());
        }
        if let Some(image_uri) = &input.image_uri {
            post.image_url = image_uri.clone();
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    async fn delete_post(&self, token: &str, id: &PostId) -> Result<(), ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        let mut state = self.state.write().unwrap();
        let before = state.posts.len();
        state.posts.retain(|p| p.id != *id);
        if state.posts.len() == before {
            return Err(ApiError::not_found("post not found"));
        }
        Ok(())
    }

    async fn search_users(
        &self,
        token: &str,
        query: &str,
    ) -> Result<Vec<UserSearchResult>, ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        let state = self.state.read().unwrap();
        let query = query.to_lowercase();

        let results = state
            .directory
            .iter()
            .filter(|u| {
                u.name.to_lowercase().contains(&query) || u.email.to_lowercase().contains(&query)
            })
            .map(|u| {
                let (status, friendship_id) =
                    if let Some(f) = state.friendships.iter().find(|f| f.user.id == u.id) {
                        (FriendshipStatus::Friends, Some(f.id.clone()))
                    } else if let Some(p) = state.pending.iter().find(|p| p.user_id == u.id) {
                        let status = if p.incoming {
                            FriendshipStatus::RequestReceived
                        } else {
                            FriendshipStatus::RequestSent
                        };
                        (status, Some(p.id.clone()))
                    } else {
                        (FriendshipStatus::NotConnected, None)
                    };
                UserSearchResult {
                    id: u.id.clone(),
                    name: u.name.clone(),
                    avatar: u.avatar.clone(),
                    friendship_status: status,
                    friendship_id,
                }
            })
            .collect();

        Ok(results)
    }

    async fn list_friends(&self, token: &str) -> Result<Vec<Friendship>, ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        Ok(self.state.read().unwrap().friendships.clone())
    }

    async fn send_friend_request(&self, token: &str, receiver_id: &str) -> Result<(), ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        let mut state = self.state.write().unwrap();
        if !state.directory.iter().any(|u| u.id == receiver_id) {
            return Err(ApiError::not_found("user not found"));
        }
        let id = state.next_friendship_id.to_string();
        state.next_friendship_id += 1;
        state.pending.push(PendingRequest {
            id,
            user_id: receiver_id.to_string(),
            incoming: false,
        });
        Ok(())
    }

    async fn accept_friend_request(
        &self,
        token: &str,
        friendship_id: &str,
    ) -> Result<(), ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        let mut state = self.state.write().unwrap();
        let position = state
            .pending
            .iter()
            .position(|p| p.id == friendship_id)
            .ok_or_else(|| ApiError::not_found("friend request not found"))?;
        let request = state.pending.remove(position);
        let user = state
            .directory
            .iter()
            .find(|u| u.id == request.user_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("user not found"))?;
        state.friendships.push(Friendship {
            id: request.id,
            user,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn remove_friendship(&self, token: &str, friendship_id: &str) -> Result<(), ApiError> {
        self.take_failure()?;
        Self::check_token(token)?;
        let mut state = self.state.write().unwrap();
        let before = state.friendships.len();
        state.friendships.retain(|f| f.id != friendship_id);
        if state.friendships.len() == before {
            return Err(ApiError::not_found("friendship not found"));
        }
        Ok(())
    }
}
