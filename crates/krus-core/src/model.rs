use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a beer post.
///
/// Confirmed posts carry the id assigned by the remote authority. While a
/// create is in flight, a locally generated `temp-` id stands in until
/// reconciliation replaces the optimistic entry with server data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a temporary id for an optimistic entry.
    pub fn provisional() -> Self {
        Self(format!("temp-{}", Uuid::new_v4()))
    }

    /// Whether this id was generated locally and never confirmed by the
    /// remote authority.
    pub fn is_provisional(&self) -> bool {
        self.0.starts_with("temp-")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A logged beer with its rating, denormalized with the author's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeerPost {
    pub id: PostId,
    pub user_id: String,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    pub beer_name: String,
    pub place: String,
    /// Star rating, 1..=5.
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BeerPost {
    /// Synthesize the provisional entry shown while a create is in flight.
    ///
    /// The id is locally generated, author fields come from the session's
    /// user, and both timestamps are set to `now`. Reconciliation discards
    /// this entry in favor of the authority's response.
    pub fn provisional(author: &User, input: &CreateBeerPostInput, now: DateTime<Utc>) -> Self {
        Self {
            id: PostId::provisional(),
            user_id: author.id.clone(),
            user_name: author.name.clone(),
            user_avatar: author.avatar.clone(),
            beer_name: input.beer_name.clone(),
            place: input.place.clone(),
            rating: input.rating,
            notes: input.notes.clone(),
            image_url: input.image_uri.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for creating a post. The image is a local reference (picker URI);
/// the authority returns the stored `image_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBeerPostInput {
    pub beer_name: String,
    pub place: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub image_uri: String,
}

/// Partial update for an existing post. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBeerPostInput {
    pub id: PostId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterCredentials {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProfileInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Relationship between the viewer and another user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendshipStatus {
    #[serde(rename = "none")]
    NotConnected,
    RequestSent,
    RequestReceived,
    Friends,
}

/// A user as returned by friend search, annotated with the viewer's
/// relationship to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResult {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub friendship_status: FriendshipStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendship_id: Option<String>,
}

/// An accepted friendship, carrying the other user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    pub id: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user() -> User {
        User {
            id: "u1".to_string(),
            email: "tester@example.com".to_string(),
            name: "Tester".to_string(),
            avatar: Some("https://example.com/a.png".to_string()),
            created_at: Utc::now(),
        }
    }

    fn make_input() -> CreateBeerPostInput {
        CreateBeerPostInput {
            beer_name: "Hazy IPA".to_string(),
            place: "Local Bar".to_string(),
            rating: 4,
            notes: None,
            image_uri: "file:///photo.jpg".to_string(),
        }
    }

    #[test]
    fn test_provisional_id_is_detectable() {
        let id = PostId::provisional();
        assert!(id.is_provisional());
        assert!(id.as_str().starts_with("temp-"));

        let confirmed = PostId::new("42");
        assert!(!confirmed.is_provisional());
    }

    #[test]
    fn test_provisional_ids_are_unique() {
        assert_ne!(PostId::provisional(), PostId::provisional());
    }

    #[test]
    fn test_provisional_post_takes_author_and_input_fields() {
        let user = make_user();
        let input = make_input();
        let now = Utc::now();

        let post = BeerPost::provisional(&user, &input, now);

        assert!(post.id.is_provisional());
        assert_eq!(post.user_id, "u1");
        assert_eq!(post.user_name, "Tester");
        assert_eq!(post.user_avatar, user.avatar);
        assert_eq!(post.beer_name, "Hazy IPA");
        assert_eq!(post.place, "Local Bar");
        assert_eq!(post.rating, 4);
        assert_eq!(post.image_url, "file:///photo.jpg");
        assert_eq!(post.created_at, now);
        assert_eq!(post.updated_at, now);
    }

    #[test]
    fn test_beer_post_wire_field_names() {
        let user = make_user();
        let post = BeerPost::provisional(&user, &make_input(), Utc::now());
        let json = serde_json::to_value(&post).unwrap();

        assert!(json.get("beerName").is_some());
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("createdAt").is_some());
        // Absent optional fields are omitted entirely
        assert!(json.get("notes").is_none());
    }

    #[test]
    fn test_friendship_status_wire_values() {
        let json = serde_json::to_value(FriendshipStatus::NotConnected).unwrap();
        assert_eq!(json, "none");
        let json = serde_json::to_value(FriendshipStatus::RequestSent).unwrap();
        assert_eq!(json, "request_sent");
    }

    #[test]
    fn test_update_input_omits_unset_fields() {
        let input = UpdateBeerPostInput {
            id: PostId::new("7"),
            beer_name: None,
            place: Some("New Place".to_string()),
            rating: None,
            notes: None,
            image_uri: None,
        };
        let json = serde_json::to_value(&input).unwrap();

        assert_eq!(json.get("id").unwrap(), "7");
        assert_eq!(json.get("place").unwrap(), "New Place");
        assert!(json.get("beerName").is_none());
        assert!(json.get("rating").is_none());
    }
}
