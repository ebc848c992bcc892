use time::OffsetDateTime;
use validator::Validate;

/// Width of the string columns of the `games` table.
pub const MAX_FIELD_LENGTH: u64 = 255;

/// Persisted game listing shared across layers, independent of the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntity {
    /// Identifier assigned by the store on insert.
    pub id: i32,
    /// Publisher identifier, absent for unpublished listings.
    pub publisher_id: Option<String>,
    pub name: Option<String>,
    /// Platform label, usually `ios` or `android`.
    pub platform: Option<String>,
    /// Identifier of the listing in the platform store.
    pub store_id: Option<String>,
    pub bundle_id: Option<String>,
    pub app_version: Option<String>,
    pub is_published: bool,
    /// Insertion timestamp set by the store.
    pub created_at: OffsetDateTime,
    /// Last write timestamp set by the store.
    pub updated_at: OffsetDateTime,
}

/// The mutable columns of a game, written on create and overwritten on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct GameFields {
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub publisher_id: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub name: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub platform: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub store_id: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub bundle_id: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub app_version: Option<String>,
    pub is_published: bool,
}

/// Filter applied by game searches. Missing criteria do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSearchCriteria {
    /// Substring the game name must contain.
    pub name: Option<String>,
    /// Exact platform the game must have.
    pub platform: Option<String>,
}

impl GameSearchCriteria {
    /// True when neither criterion is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.platform.is_none()
    }
}
