use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    routing::{get, post, put},
};

use crate::{
    dto::game::{DeletedGame, GameInput, GameResponse, SearchGamesRequest},
    error::{AppError, ErrorBody},
    services::{game_service, populate_service},
    state::SharedState,
};

/// Routes of the game catalog.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/api/games", get(list_games).post(create_game))
        .route("/api/games/search", post(search_games))
        .route("/api/games/populate", get(populate_games))
        .route("/api/games/{id}", put(update_game).delete(delete_game))
}

/// List every stored game.
#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    responses(
        (status = 200, description = "All games", body = [GameResponse]),
        (status = 503, description = "Database failure", body = ErrorBody)
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    Ok(Json(game_service::list_games(&state).await?))
}

/// Create a game from the seven mutable fields.
#[utoipa::path(
    post,
    path = "/api/games",
    tag = "games",
    request_body = GameInput,
    responses(
        (status = 200, description = "Game created", body = GameResponse),
        (status = 400, description = "Invalid body", body = ErrorBody)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    payload: Result<Json<GameInput>, JsonRejection>,
) -> Result<Json<GameResponse>, AppError> {
    let Json(input) = payload?;
    Ok(Json(game_service::create_game(&state, input).await?))
}

/// Overwrite the mutable fields of an existing game.
#[utoipa::path(
    put,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i32, Path, description = "Identifier of the game to update")),
    request_body = GameInput,
    responses(
        (status = 200, description = "Game updated", body = GameResponse),
        (status = 400, description = "Invalid body or identifier", body = ErrorBody),
        (status = 404, description = "No game with this identifier", body = ErrorBody)
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<GameInput>, JsonRejection>,
) -> Result<Json<GameResponse>, AppError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    Ok(Json(game_service::update_game(&state, id, input).await?))
}

/// Permanently delete a game.
#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = i32, Path, description = "Identifier of the game to delete")),
    responses(
        (status = 200, description = "Game deleted", body = DeletedGame),
        (status = 400, description = "Invalid identifier", body = ErrorBody),
        (status = 404, description = "No game with this identifier", body = ErrorBody)
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<DeletedGame>, AppError> {
    let Path(id) = id?;
    Ok(Json(game_service::delete_game(&state, id).await?))
}

/// Search games by name substring and exact platform.
#[utoipa::path(
    post,
    path = "/api/games/search",
    tag = "games",
    request_body = SearchGamesRequest,
    responses(
        (status = 200, description = "Matching games, or all games without criteria", body = [GameResponse])
    )
)]
pub async fn search_games(
    State(state): State<SharedState>,
    payload: Result<Option<Json<SearchGamesRequest>>, JsonRejection>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    // A request without a JSON body searches without criteria.
    let request = payload?.map(|Json(request)| request).unwrap_or_default();
    Ok(Json(game_service::search_games(&state, request).await?))
}

/// Import the remote top-100 snapshots and return the resulting catalog.
#[utoipa::path(
    get,
    path = "/api/games/populate",
    tag = "games",
    responses(
        (status = 200, description = "Catalog after the import", body = [GameResponse]),
        (status = 503, description = "Database failure while listing", body = ErrorBody)
    )
)]
pub async fn populate_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    Ok(Json(populate_service::populate(&state).await?))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::{
        config::AppConfig,
        routes,
        state::{AppState, SharedState},
    };

    async fn send(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
        serde_json::from_slice(bytes).unwrap()
    }

    async fn state() -> SharedState {
        let config = AppConfig::default().with_populate_sources(Vec::new());
        AppState::in_memory(config).await
    }

    async fn app() -> axum::Router {
        routes::router(state().await)
    }

    fn clash() -> Value {
        json!({
            "publisherId": null,
            "name": "Clash",
            "platform": "ios",
            "storeId": "1",
            "bundleId": null,
            "appVersion": "1.0",
            "isPublished": true
        })
    }

    #[tokio::test]
    async fn created_game_is_listed() {
        let app = app().await;

        let (status, body) = send(&app, Method::POST, "/api/games", Some(clash())).await;
        assert_eq!(status, StatusCode::OK);
        let created: Value = parse(&body);
        assert!(created["id"].is_i64());
        assert_eq!(created["isPublished"], json!(true));
        assert!(created["createdAt"].is_string());

        let (status, body) = send(&app, Method::GET, "/api/games", None).await;
        assert_eq!(status, StatusCode::OK);
        let listing: Vec<Value> = parse(&body);
        assert_eq!(listing, vec![created]);
    }

    #[tokio::test]
    async fn repeated_listing_is_stable() {
        let app = app().await;
        send(&app, Method::POST, "/api/games", Some(clash())).await;

        let (_, first) = send(&app, Method::GET, "/api/games", None).await;
        let (_, second) = send(&app, Method::GET, "/api/games", None).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn deleting_missing_game_is_a_structured_not_found() {
        let app = app().await;

        let (status, body) = send(&app, Method::DELETE, "/api/games/999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: Value = parse(&body);
        assert_eq!(error["error"], json!("not_found"));
        assert!(error["message"].as_str().unwrap().contains("999"));
    }

    #[tokio::test]
    async fn delete_returns_the_identifier() {
        let app = app().await;
        let (_, body) = send(&app, Method::POST, "/api/games", Some(clash())).await;
        let id = parse::<Value>(&body)["id"].as_i64().unwrap();

        let (status, body) = send(&app, Method::DELETE, &format!("/api/games/{id}"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<Value>(&body), json!({ "id": id }));
        let (_, body) = send(&app, Method::GET, "/api/games", None).await;
        assert!(parse::<Vec<Value>>(&body).is_empty());
    }

    #[tokio::test]
    async fn update_rewrites_fields_and_rejects_unknown_ids() {
        let app = app().await;
        let (_, body) = send(&app, Method::POST, "/api/games", Some(clash())).await;
        let id = parse::<Value>(&body)["id"].as_i64().unwrap();

        let mut changed = clash();
        changed["appVersion"] = json!("1.1");
        let (status, body) =
            send(&app, Method::PUT, &format!("/api/games/{id}"), Some(changed.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<Value>(&body)["appVersion"], json!("1.1"));

        let (status, body) = send(&app, Method::PUT, "/api/games/4242", Some(changed)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse::<Value>(&body)["error"], json!("not_found"));
    }

    #[tokio::test]
    async fn malformed_requests_are_validation_errors() {
        let app = app().await;

        let (status, body) = send(&app, Method::DELETE, "/api/games/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse::<Value>(&body)["error"], json!("validation"));

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/games",
            Some(json!({ "name": 12, "platform": "ios" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse::<Value>(&body)["error"], json!("validation"));

        let mut overlong = clash();
        overlong["bundleId"] = json!("b".repeat(256));
        let (status, body) = send(&app, Method::POST, "/api/games", Some(overlong)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse::<Value>(&body)["error"], json!("validation"));
    }

    #[tokio::test]
    async fn search_filters_and_falls_back_to_full_listing() {
        let app = app().await;
        send(&app, Method::POST, "/api/games", Some(clash())).await;
        let mut android = clash();
        android["name"] = json!("Clash Royale");
        android["platform"] = json!("android");
        send(&app, Method::POST, "/api/games", Some(android)).await;

        let (status, body) = send(&app, Method::POST, "/api/games/search", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let (_, listing) = send(&app, Method::GET, "/api/games", None).await;
        assert_eq!(parse::<Vec<Value>>(&body), parse::<Vec<Value>>(&listing));

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/games/search",
            Some(json!({ "name": "Clash", "platform": "ios" })),
        )
        .await;
        let matches: Vec<Value> = parse(&body);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["name"], json!("Clash"));
    }

    #[tokio::test]
    async fn bodyless_search_returns_full_listing() {
        let app = app().await;
        send(&app, Method::POST, "/api/games", Some(clash())).await;

        let (status, body) = send(&app, Method::POST, "/api/games/search", None).await;

        assert_eq!(status, StatusCode::OK);
        let (_, listing) = send(&app, Method::GET, "/api/games", None).await;
        assert_eq!(parse::<Vec<Value>>(&body), parse::<Vec<Value>>(&listing));
        assert_eq!(parse::<Vec<Value>>(&body).len(), 1);
    }

    #[tokio::test]
    async fn unreachable_database_is_a_structured_store_error() {
        let state = state().await;
        let app = routes::router(state.clone());
        state.game_store().close().await.unwrap();

        let (status, body) = send(&app, Method::GET, "/api/games", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(parse::<Value>(&body)["error"], json!("store"));

        let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<Value>(&body)["status"], json!("degraded"));
    }

    #[tokio::test]
    async fn populate_without_sources_returns_current_listing() {
        let app = app().await;
        send(&app, Method::POST, "/api/games", Some(clash())).await;

        let (status, body) = send(&app, Method::GET, "/api/games/populate", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<Vec<Value>>(&body).len(), 1);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok_with_database() {
        let app = app().await;

        let (status, body) = send(&app, Method::GET, "/healthcheck", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<Value>(&body)["status"], json!("ok"));
    }
}
