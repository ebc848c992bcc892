use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the game catalog.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::list_games,
        crate::routes::game::create_game,
        crate::routes::game::update_game,
        crate::routes::game::delete_game,
        crate::routes::game::search_games,
        crate::routes::game::populate_games,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::GameInput,
            crate::dto::game::GameResponse,
            crate::dto::game::SearchGamesRequest,
            crate::dto::game::DeletedGame,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Game catalog management"),
    )
)]
pub struct ApiDoc;
