use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{GameEntity, GameFields, GameSearchCriteria, MAX_FIELD_LENGTH},
    dto::format_timestamp,
};

/// Body accepted when creating or replacing a game.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GameInput {
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub publisher_id: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub name: Option<String>,
    /// Platform label, usually `ios` or `android`.
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub platform: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub store_id: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub bundle_id: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub app_version: Option<String>,
    /// Defaults to `false` when omitted or null.
    #[serde(default)]
    pub is_published: Option<bool>,
}

impl From<GameInput> for GameFields {
    fn from(input: GameInput) -> Self {
        Self {
            publisher_id: input.publisher_id,
            name: input.name,
            platform: input.platform,
            store_id: input.store_id,
            bundle_id: input.bundle_id,
            app_version: input.app_version,
            is_published: input.is_published.unwrap_or_default(),
        }
    }
}

/// Body of the search route. Both criteria are optional.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SearchGamesRequest {
    /// Substring the game name must contain.
    #[serde(default)]
    pub name: Option<String>,
    /// Exact platform to match.
    #[serde(default)]
    pub platform: Option<String>,
}

impl From<SearchGamesRequest> for GameSearchCriteria {
    /// Empty strings count as absent criteria.
    fn from(request: SearchGamesRequest) -> Self {
        Self {
            name: request.name.filter(|name| !name.is_empty()),
            platform: request.platform.filter(|platform| !platform.is_empty()),
        }
    }
}

/// Game listing as returned by every game route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: i32,
    pub publisher_id: Option<String>,
    pub name: Option<String>,
    pub platform: Option<String>,
    pub store_id: Option<String>,
    pub bundle_id: Option<String>,
    pub app_version: Option<String>,
    pub is_published: bool,
    /// RFC 3339 insertion timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the last write.
    pub updated_at: String,
}

impl From<GameEntity> for GameResponse {
    fn from(game: GameEntity) -> Self {
        Self {
            id: game.id,
            publisher_id: game.publisher_id,
            name: game.name,
            platform: game.platform,
            store_id: game.store_id,
            bundle_id: game.bundle_id,
            app_version: game.app_version,
            is_published: game.is_published,
            created_at: format_timestamp(game.created_at),
            updated_at: format_timestamp(game.updated_at),
        }
    }
}

/// Acknowledgement returned once a game has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeletedGame {
    pub id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_uses_camel_case_and_defaults_publish_flag() {
        let input: GameInput = serde_json::from_str(
            r#"{"publisherId":null,"name":"Clash","platform":"ios","storeId":"1","appVersion":"1.0"}"#,
        )
        .unwrap();
        let fields = GameFields::from(input);

        assert_eq!(fields.name.as_deref(), Some("Clash"));
        assert_eq!(fields.store_id.as_deref(), Some("1"));
        assert_eq!(fields.bundle_id, None);
        assert!(!fields.is_published);
    }

    #[test]
    fn overlong_fields_fail_validation() {
        let input = GameInput {
            name: Some("x".repeat(256)),
            ..GameInput::default()
        };
        let errors = input.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("name"));
        assert!(
            GameInput {
                name: Some("x".repeat(255)),
                ..GameInput::default()
            }
            .validate()
            .is_ok()
        );
    }

    #[test]
    fn empty_search_strings_are_ignored() {
        let request: SearchGamesRequest =
            serde_json::from_str(r#"{"name":"","platform":"ios"}"#).unwrap();
        let criteria = GameSearchCriteria::from(request);

        assert_eq!(criteria.name, None);
        assert_eq!(criteria.platform.as_deref(), Some("ios"));
        assert!(GameSearchCriteria::from(SearchGamesRequest::default()).is_empty());
    }
}
