use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Alias, ColumnDef, Index, OnConflict, SqliteQueryBuilder, Table};
use sea_orm::{
    ActiveValue, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    QueryOrder, TransactionTrait,
};
use tracing::info;

use crate::db::models;
use crate::db::traits::{PriceRecord, PriceStore, UpsertOutcome};
use crate::error::{Error, Result};

/// Embedded SQLite backend.
pub struct LocalStore {
    connection: DatabaseConnection,
}

impl LocalStore {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: &str) -> Result<Self> {
        let store = Self::connect(ConnectOptions::new(format!("sqlite://{}?mode=rwc", path))).await?;
        info!("✅ Opened local database {}", path);
        Ok(store)
    }

    /// Private database that lives as long as this store.
    pub async fn in_memory() -> Result<Self> {
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1).min_connections(1);
        Self::connect(options).await
    }

    async fn connect(options: ConnectOptions) -> Result<Self> {
        let connection = Database::connect(options)
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(Self { connection })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    fn active_model(
        date: NaiveDate,
        asset_name: &str,
        price: f64,
        currency: &str,
    ) -> models::ActiveModel {
        models::ActiveModel {
            date: ActiveValue::Set(date),
            asset_name: ActiveValue::Set(asset_name.to_string()),
            price: ActiveValue::Set(price),
            currency: ActiveValue::Set(currency.to_string()),
            updated_at: ActiveValue::Set(Utc::now()),
        }
    }
}

#[async_trait]
impl PriceStore for LocalStore {
    async fn initialize(&self) -> Result<()> {
        let stmt = Table::create()
            .table(Alias::new("assetprice"))
            .if_not_exists()
            .col(ColumnDef::new(Alias::new("date")).date().not_null())
            .col(ColumnDef::new(Alias::new("asset_name")).string_len(32).not_null())
            .col(ColumnDef::new(Alias::new("price")).double().not_null())
            .col(ColumnDef::new(Alias::new("currency")).string_len(3).not_null())
            .col(
                ColumnDef::new(Alias::new("updated_at"))
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .primary_key(
                Index::create()
                    .col(Alias::new("date"))
                    .col(Alias::new("asset_name")),
            )
            .to_owned();

        let sql = stmt.to_string(SqliteQueryBuilder);

        self.connection
            .execute_unprepared(&sql)
            .await
            .map_err(|e| Error::Database(format!("Failed to create table: {}", e)))?;

        info!("✅ assetprice table ready");
        Ok(())
    }

    async fn upsert(
        &self,
        date: NaiveDate,
        asset_name: &str,
        price: f64,
        currency: &str,
    ) -> Result<UpsertOutcome> {
        let txn = self.connection.begin().await?;

        let existing = models::Entity::find_by_id((date, asset_name.to_string()))
            .one(&txn)
            .await?;

        // The conflict clause keeps a concurrent insert from another process
        // from turning into a constraint error.
        models::Entity::insert(Self::active_model(date, asset_name, price, currency))
            .on_conflict(
                OnConflict::columns([models::Column::Date, models::Column::AssetName])
                    .update_columns([models::Column::Price, models::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| Error::Database(format!("Failed to upsert {}: {}", asset_name, e)))?;

        txn.commit().await?;

        Ok(match existing {
            Some(_) => UpsertOutcome::Refreshed,
            None => UpsertOutcome::Created,
        })
    }

    async fn fetch_all(&self) -> Result<Vec<PriceRecord>> {
        let rows = models::Entity::find()
            .order_by_desc(models::Column::Date)
            .order_by_asc(models::Column::AssetName)
            .all(&self.connection)
            .await?;

        Ok(rows.into_iter().map(PriceRecord::from).collect())
    }
}
