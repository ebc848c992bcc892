use std::{sync::Arc, time::Duration};

use futures::future::join_all;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{game_store::GameStore, models::GameFields, storage::StorageError},
    dto::{
        game::GameResponse,
        import::{DecodedSnapshot, decode_snapshot},
    },
    error::ServiceError,
    services::game_service,
    state::SharedState,
};

/// Failures importing a single snapshot. They are logged and never reach the client.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The snapshot could not be requested at all.
    #[error("failed to fetch `{url}`")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The snapshot host answered with a non-success status.
    #[error("unexpected status {status} for `{url}`")]
    Status { url: String, status: StatusCode },
    /// The body is not a JSON array.
    #[error("failed to decode snapshot `{url}`")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Writing the imported listings failed.
    #[error("failed to store listings from `{url}`")]
    Insert {
        url: String,
        #[source]
        source: StorageError,
    },
}

/// Rows written and records skipped while importing one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows written to the store.
    pub inserted: u64,
    /// Records that were malformed or failed validation.
    pub skipped: usize,
}

/// Build the client shared by every populate import.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// Import every configured snapshot, then return the resulting listing.
///
/// Sources are fetched concurrently and awaited before the listing is read, so the response
/// contains the imported rows. A failing source is logged and does not stop the others.
pub async fn populate(state: &SharedState) -> Result<Vec<GameResponse>, ServiceError> {
    let import_id = Uuid::new_v4();

    async {
        let store = state.game_store();
        let sources = state.config().populate_sources();
        let imports = sources
            .iter()
            .map(|url| import_source(state.http_client(), Arc::clone(&store), url));
        let outcomes = join_all(imports).await;

        let mut inserted = 0;
        let mut skipped = 0;
        let mut failed = 0;
        for (url, outcome) in sources.iter().zip(outcomes) {
            match outcome {
                Ok(summary) => {
                    info!(
                        %url,
                        inserted = summary.inserted,
                        skipped = summary.skipped,
                        "imported snapshot"
                    );
                    inserted += summary.inserted;
                    skipped += summary.skipped;
                }
                Err(err) => {
                    warn!(%url, error = ?err, "snapshot import failed");
                    failed += 1;
                }
            }
        }
        info!(inserted, skipped, failed, "populate finished");

        game_service::list_games(state).await
    }
    .instrument(info_span!("populate", %import_id))
    .await
}

async fn import_source(
    client: &Client,
    store: Arc<dyn GameStore>,
    url: &str,
) -> Result<ImportSummary, ImportError> {
    let snapshot = fetch_snapshot(client, url).await?;
    for err in &snapshot.rejected {
        warn!(%url, error = %err, "skipping malformed listing");
    }
    let mut skipped = snapshot.rejected.len();

    let mut batch = Vec::with_capacity(snapshot.games.len());
    for fields in snapshot.games.into_iter().map(GameFields::from) {
        match fields.validate() {
            Ok(()) => batch.push(fields),
            Err(err) => {
                warn!(%url, name = ?fields.name, error = %err, "skipping invalid listing");
                skipped += 1;
            }
        }
    }

    let inserted = store
        .create_games(batch)
        .await
        .map_err(|source| ImportError::Insert {
            url: url.to_owned(),
            source,
        })?;
    Ok(ImportSummary { inserted, skipped })
}

/// Download a snapshot and decode its listings one record at a time.
pub async fn fetch_snapshot(client: &Client, url: &str) -> Result<DecodedSnapshot, ImportError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ImportError::Request {
            url: url.to_owned(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ImportError::Status {
            url: url.to_owned(),
            status,
        });
    }

    let entries = response
        .json::<Vec<serde_json::Value>>()
        .await
        .map_err(|source| ImportError::Decode {
            url: url.to_owned(),
            source,
        })?;
    Ok(decode_snapshot(entries))
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::get};
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    /// Serve fixture snapshots on an ephemeral local port and return the base URL.
    async fn serve_snapshots() -> String {
        let app = Router::new()
            .route(
                "/ios.top100.json",
                get(|| async {
                    Json(json!([[{
                        "publisher_id": null,
                        "name": "Foo",
                        "os": "ios",
                        "app_id": "a1",
                        "bundle_id": "b1",
                        "version": "2.0"
                    }]]))
                }),
            )
            .route(
                "/android.top100.json",
                get(|| async {
                    Json(json!([
                        [
                            {"publisher_id": 12, "name": "Bar", "os": "android", "app_id": "com.bar", "bundle_id": "com.bar", "version": "3.1"},
                            {"publisher_id": "p9", "name": "Baz", "os": "android", "app_id": "com.baz", "bundle_id": "com.baz", "version": "1.0"}
                        ]
                    ]))
                }),
            )
            .route(
                "/mixed.json",
                get(|| async {
                    Json(json!([
                        {"publisher_id": null, "name": "Foo", "os": "ios", "app_id": "a1", "version": "2.0"},
                        {"publisher_id": null, "name": "Numeric", "os": "ios", "app_id": 7, "version": 3},
                        {"publisher_id": null, "name": {"en": "Broken"}, "os": "ios"},
                        {"publisher_id": null, "name": "Long", "os": "ios", "bundle_id": "b".repeat(300)}
                    ]))
                }),
            )
            .route("/broken.json", get(|| async { StatusCode::BAD_GATEWAY }))
            .route("/garbage.json", get(|| async { "<html>not json</html>" }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    async fn state_with_sources(paths: &[&str]) -> SharedState {
        let base = serve_snapshots().await;
        let sources = paths.iter().map(|path| format!("{base}{path}")).collect();
        AppState::in_memory(AppConfig::default().with_populate_sources(sources)).await
    }

    #[tokio::test]
    async fn populate_imports_both_sources_before_responding() {
        let state = state_with_sources(&["/ios.top100.json", "/android.top100.json"]).await;

        let games = populate(&state).await.unwrap();

        assert_eq!(games.len(), 3);
        let foo = games
            .iter()
            .find(|g| g.name.as_deref() == Some("Foo"))
            .unwrap();
        assert_eq!(foo.platform.as_deref(), Some("ios"));
        assert_eq!(foo.publisher_id, None);
        assert!(!foo.is_published);
        let bar = games
            .iter()
            .find(|g| g.name.as_deref() == Some("Bar"))
            .unwrap();
        assert_eq!(bar.publisher_id.as_deref(), Some("12"));
        assert!(bar.is_published);
    }

    #[tokio::test]
    async fn repeated_populate_duplicates_rows() {
        let state = state_with_sources(&["/ios.top100.json"]).await;

        populate(&state).await.unwrap();
        let games = populate(&state).await.unwrap();

        assert_eq!(games.len(), 2);
        assert_ne!(games[0].id, games[1].id);
    }

    #[tokio::test]
    async fn failing_source_does_not_block_the_other() {
        let state = state_with_sources(&["/broken.json", "/android.top100.json"]).await;

        let games = populate(&state).await.unwrap();

        assert_eq!(games.len(), 2);
        assert!(
            games
                .iter()
                .all(|g| g.platform.as_deref() == Some("android"))
        );
    }

    #[tokio::test]
    async fn malformed_listings_are_skipped_without_losing_the_snapshot() {
        let state = state_with_sources(&["/mixed.json"]).await;

        let games = populate(&state).await.unwrap();

        let names = games
            .iter()
            .map(|g| g.name.as_deref().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Foo", "Numeric"]);
        assert_eq!(games[1].app_version.as_deref(), Some("3"));
        assert_eq!(games[1].store_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn import_summary_counts_skipped_records() {
        let base = serve_snapshots().await;
        let state = AppState::in_memory(AppConfig::default()).await;
        let client = build_http_client(Duration::from_secs(5)).unwrap();

        let summary = import_source(&client, state.game_store(), &format!("{base}/mixed.json"))
            .await
            .unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                inserted: 2,
                skipped: 2
            }
        );
    }

    #[tokio::test]
    async fn fetch_reports_status_and_decode_failures() {
        let base = serve_snapshots().await;
        let client = build_http_client(Duration::from_secs(5)).unwrap();

        let broken = fetch_snapshot(&client, &format!("{base}/broken.json")).await;
        let garbage = fetch_snapshot(&client, &format!("{base}/garbage.json")).await;
        let unreachable = fetch_snapshot(&client, "http://127.0.0.1:9/none.json").await;

        assert!(matches!(
            broken,
            Err(ImportError::Status { status, .. }) if status == StatusCode::BAD_GATEWAY
        ));
        assert!(matches!(garbage, Err(ImportError::Decode { .. })));
        assert!(matches!(unreachable, Err(ImportError::Request { .. })));
    }
}
