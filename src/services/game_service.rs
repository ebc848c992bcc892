use tracing::info;
use validator::Validate;

use crate::{
    dao::models::GameSearchCriteria,
    dto::game::{DeletedGame, GameInput, GameResponse, SearchGamesRequest},
    error::ServiceError,
    state::SharedState,
};

/// Every stored game, ordered by identifier.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameResponse>, ServiceError> {
    let games = state.game_store().list_games().await?;
    Ok(games.into_iter().map(GameResponse::from).collect())
}

/// Validate and persist a new game.
pub async fn create_game(
    state: &SharedState,
    input: GameInput,
) -> Result<GameResponse, ServiceError> {
    input.validate()?;

    let game = state.game_store().create_game(input.into()).await?;
    info!(id = game.id, "game created");
    Ok(game.into())
}

/// Replace the mutable fields of an existing game.
pub async fn update_game(
    state: &SharedState,
    id: i32,
    input: GameInput,
) -> Result<GameResponse, ServiceError> {
    input.validate()?;

    ensure_exists(state, id).await?;
    let game = state.game_store().update_game(id, input.into()).await?;
    Ok(game.into())
}

/// Permanently remove a game.
pub async fn delete_game(state: &SharedState, id: i32) -> Result<DeletedGame, ServiceError> {
    ensure_exists(state, id).await?;
    state.game_store().delete_game(id).await?;
    info!(id, "game deleted");
    Ok(DeletedGame { id })
}

/// Games matching the optional name substring and exact platform.
///
/// Without any criterion this is the full listing.
pub async fn search_games(
    state: &SharedState,
    request: SearchGamesRequest,
) -> Result<Vec<GameResponse>, ServiceError> {
    let criteria = GameSearchCriteria::from(request);
    if criteria.is_empty() {
        return list_games(state).await;
    }

    let games = state.game_store().search_games(criteria).await?;
    Ok(games.into_iter().map(GameResponse::from).collect())
}

async fn ensure_exists(state: &SharedState, id: i32) -> Result<(), ServiceError> {
    match state.game_store().find_game(id).await? {
        Some(_) => Ok(()),
        None => Err(ServiceError::NotFound(format!("game `{id}` not found"))),
    }
}
