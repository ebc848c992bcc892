use futures::future::BoxFuture;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    Database, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Schema,
    TransactionTrait, sea_query::LikeExpr,
};
use time::OffsetDateTime;
use tracing::debug;

use super::{
    config::SqlConfig,
    error::{SqlDaoError, SqlResult},
    models::{self, TABLE_NAME},
};
use crate::dao::{
    game_store::GameStore,
    models::{GameEntity, GameFields, GameSearchCriteria},
    storage::StorageResult,
};

/// Rows written per INSERT statement during bulk imports, keeping well below SQLite's bound
/// parameter limit.
const INSERT_CHUNK_SIZE: usize = 100;

/// Game store backed by a SeaORM connection pool.
#[derive(Clone)]
pub struct SqlGameStore {
    db: DatabaseConnection,
}

impl SqlGameStore {
    /// Open the connection pool and make sure the `games` table exists.
    pub async fn connect(config: SqlConfig) -> SqlResult<Self> {
        let db = Database::connect(config.connect_options())
            .await
            .map_err(|source| SqlDaoError::Connect {
                url: config.url.clone(),
                source,
            })?;

        let store = Self { db };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> SqlResult<()> {
        let schema = Schema::new(self.db.get_database_backend());
        let mut statement = schema.create_table_from_entity(models::Entity);
        statement.if_not_exists();

        self.db
            .execute(&statement)
            .await
            .map_err(|source| SqlDaoError::EnsureSchema {
                table: TABLE_NAME,
                source,
            })?;
        debug!(table = TABLE_NAME, "table ready");
        Ok(())
    }

    pub async fn list_games(&self) -> SqlResult<Vec<GameEntity>> {
        let rows = models::Entity::find()
            .order_by_asc(models::Column::Id)
            .all(&self.db)
            .await
            .map_err(|source| SqlDaoError::Query {
                operation: "list",
                source,
            })?;
        Ok(rows.into_iter().map(GameEntity::from).collect())
    }

    pub async fn create_game(&self, fields: GameFields) -> SqlResult<GameEntity> {
        let model = new_active_model(fields, OffsetDateTime::now_utc())
            .insert(&self.db)
            .await
            .map_err(|source| SqlDaoError::Query {
                operation: "insert",
                source,
            })?;
        Ok(model.into())
    }

    /// Insert the whole batch in one transaction: either every row is written or none is.
    pub async fn create_games(&self, batch: Vec<GameFields>) -> SqlResult<u64> {
        let bulk_insert_error = |source: DbErr| SqlDaoError::Query {
            operation: "bulk insert",
            source,
        };
        let now = OffsetDateTime::now_utc();
        let mut inserted = 0;

        let txn = self.db.begin().await.map_err(bulk_insert_error)?;
        for chunk in batch.chunks(INSERT_CHUNK_SIZE) {
            let rows = chunk
                .iter()
                .cloned()
                .map(|fields| new_active_model(fields, now))
                .collect::<Vec<_>>();

            models::Entity::insert_many(rows)
                .exec(&txn)
                .await
                .map_err(bulk_insert_error)?;
            inserted += chunk.len() as u64;
        }
        txn.commit().await.map_err(bulk_insert_error)?;

        Ok(inserted)
    }

    pub async fn find_game(&self, id: i32) -> SqlResult<Option<GameEntity>> {
        let row = models::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|source| SqlDaoError::QueryGame {
                operation: "load",
                id,
                source,
            })?;
        Ok(row.map(GameEntity::from))
    }

    pub async fn update_game(&self, id: i32, fields: GameFields) -> SqlResult<GameEntity> {
        let Some(existing) = models::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|source| SqlDaoError::QueryGame {
                operation: "load",
                id,
                source,
            })?
        else {
            return Err(SqlDaoError::GameNotFound { id });
        };

        let mut active: models::ActiveModel = existing.into();
        active.publisher_id = Set(fields.publisher_id);
        active.name = Set(fields.name);
        active.platform = Set(fields.platform);
        active.store_id = Set(fields.store_id);
        active.bundle_id = Set(fields.bundle_id);
        active.app_version = Set(fields.app_version);
        active.is_published = Set(fields.is_published);
        active.updated_at = Set(OffsetDateTime::now_utc());

        match active.update(&self.db).await {
            Ok(model) => Ok(model.into()),
            // Deleted between the lookup and the write.
            Err(DbErr::RecordNotUpdated) => Err(SqlDaoError::GameNotFound { id }),
            Err(source) => Err(SqlDaoError::QueryGame {
                operation: "update",
                id,
                source,
            }),
        }
    }

    pub async fn delete_game(&self, id: i32) -> SqlResult<()> {
        let result = models::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|source| SqlDaoError::QueryGame {
                operation: "delete",
                id,
                source,
            })?;

        if result.rows_affected == 0 {
            return Err(SqlDaoError::GameNotFound { id });
        }
        Ok(())
    }

    pub async fn search_games(&self, criteria: GameSearchCriteria) -> SqlResult<Vec<GameEntity>> {
        let mut query = models::Entity::find();
        if let Some(name) = criteria.name {
            let pattern = format!("%{}%", escape_like(&name));
            query = query
                .filter(models::Column::Name.like(LikeExpr::new(pattern).escape('\\')));
        }
        if let Some(platform) = criteria.platform {
            query = query.filter(models::Column::Platform.eq(platform));
        }

        let rows = query
            .order_by_asc(models::Column::Id)
            .all(&self.db)
            .await
            .map_err(|source| SqlDaoError::Query {
                operation: "search",
                source,
            })?;
        Ok(rows.into_iter().map(GameEntity::from).collect())
    }

    async fn ping(&self) -> SqlResult<()> {
        self.db
            .ping()
            .await
            .map_err(|source| SqlDaoError::HealthPing { source })
    }

    async fn close(&self) -> SqlResult<()> {
        // Clones share the pool, so closing this handle closes it for every holder.
        self.db
            .clone()
            .close()
            .await
            .map_err(|source| SqlDaoError::Close { source })
    }
}

/// Escape `LIKE` metacharacters so the criterion matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn new_active_model(fields: GameFields, now: OffsetDateTime) -> models::ActiveModel {
    models::ActiveModel {
        id: NotSet,
        publisher_id: Set(fields.publisher_id),
        name: Set(fields.name),
        platform: Set(fields.platform),
        store_id: Set(fields.store_id),
        bundle_id: Set(fields.bundle_id),
        app_version: Set(fields.app_version),
        is_published: Set(fields.is_published),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

impl GameStore for SqlGameStore {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn create_game(&self, fields: GameFields) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_game(fields).await.map_err(Into::into) })
    }

    fn create_games(&self, batch: Vec<GameFields>) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.create_games(batch).await.map_err(Into::into) })
    }

    fn find_game(&self, id: i32) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        id: i32,
        fields: GameFields,
    ) -> BoxFuture<'static, StorageResult<GameEntity>> {
        let store = self.clone();
        Box::pin(async move { store.update_game(id, fields).await.map_err(Into::into) })
    }

    fn delete_game(&self, id: i32) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn search_games(
        &self,
        criteria: GameSearchCriteria,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.search_games(criteria).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn close(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { SqlGameStore::close(&store).await.map_err(Into::into) })
    }
}
