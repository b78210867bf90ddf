use crate::config::Config;
use crate::error::{AppError, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;
use surrealdb::engine::remote::http::{Client, Http};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{error, info};

/// Thin wrapper around the SurrealDB HTTP client. Everything above this layer
/// speaks in tables, bare id strings and `serde_json` parameter objects.
#[derive(Clone)]
pub struct Database {
    client: Surreal<Client>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: i64,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let address = config
            .database_url
            .trim_start_matches("http://")
            .trim_start_matches("https://");

        let client = Surreal::new::<Http>(address).await.map_err(AppError::from)?;

        client
            .signin(Root {
                username: &config.database_username,
                password: &config.database_password,
            })
            .await
            .map_err(AppError::from)?;

        client
            .use_ns(&config.database_namespace)
            .use_db(&config.database_name)
            .await
            .map_err(AppError::from)?;

        Ok(Self { client })
    }

    /// Runs a trivial statement to confirm the connection is usable.
    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.query("INFO FOR DB").await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    pub async fn query(&self, sql: &str) -> Result<Response> {
        self.client.query(sql).await.map_err(AppError::from)
    }

    pub async fn query_with_params<P>(&self, sql: &str, params: P) -> Result<Response>
    where
        P: Serialize,
    {
        self.client
            .query(sql)
            .bind(params)
            .await
            .map_err(AppError::from)
    }

    pub async fn create<T>(&self, table: &str, data: T) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + Clone + Debug,
    {
        let results: Vec<T> = self
            .client
            .create(table)
            .content(data)
            .await
            .map_err(AppError::from)?;

        results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Failed to create record".to_string()))
    }

    pub async fn get_by_id<T>(&self, table: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync + Debug,
    {
        let mut response = self
            .query_with_params(
                "SELECT * FROM type::thing($tb, $id)",
                serde_json::json!({ "tb": table, "id": pure_id(table, id) }),
            )
            .await?;
        let results: Vec<T> = response.take(0)?;
        Ok(results.into_iter().next())
    }

    /// Merges `updates` into one row. Scoped with a WHERE clause rather than
    /// addressing the record directly: `UPDATE type::thing(..)` would create
    /// the row when it does not exist, and callers rely on `None` for 404s.
    pub async fn update_by_id_with_json<T>(
        &self,
        table: &str,
        id: &str,
        updates: serde_json::Value,
    ) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync + Debug,
    {
        let mut response = self
            .query_with_params(
                "UPDATE type::table($tb) MERGE $updates WHERE id = type::thing($tb, $id)",
                serde_json::json!({ "tb": table, "id": pure_id(table, id), "updates": updates }),
            )
            .await?;
        let results: Vec<T> = response.take(0)?;
        Ok(results.into_iter().next())
    }

    pub async fn delete_by_id<T>(&self, table: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync + Debug,
    {
        self.client
            .delete((table, pure_id(table, id)))
            .await
            .map_err(AppError::from)
    }

    pub async fn find_one<T>(&self, table: &str, field: &str, value: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + Sync + Debug,
    {
        // field names are code-controlled, never user input
        let sql = format!(
            "SELECT * FROM type::table($tb) WHERE {} = $value LIMIT 1",
            field
        );
        let mut response = self
            .query_with_params(&sql, serde_json::json!({ "tb": table, "value": value }))
            .await?;
        let results: Vec<T> = response.take(0)?;
        Ok(results.into_iter().next())
    }

    /// Runs a `SELECT count() ... GROUP ALL` statement and unwraps the single
    /// aggregate row; an empty result set counts as zero.
    pub async fn count<P>(&self, sql: &str, params: P) -> Result<i64>
    where
        P: Serialize,
    {
        let mut response = self.query_with_params(sql, params).await?;
        let rows: Vec<CountRow> = response.take(0)?;
        Ok(rows.into_iter().next().map(|r| r.count).unwrap_or(0))
    }
}

/// Record ids are passed around bare, but callers occasionally hand in the
/// `table:id` form; strip the prefix so both work.
fn pure_id<'a>(table: &str, id: &'a str) -> &'a str {
    id.strip_prefix(table)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(id)
}
