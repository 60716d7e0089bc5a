use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{
    config::{Config, MongoPoolSettings},
    errors::AppResult,
};

const APP_NAME: &str = "bookstore-server";

/// Handle on the notes database. Cloning shares the driver's pool.
#[derive(Clone)]
pub struct Database {
    client: Client,
    db_name: String,
}

/// Applies the configured pool sizing and timeouts to parsed options.
pub fn apply_pool_settings(options: &mut ClientOptions, pool: &MongoPoolSettings) {
    options.app_name = Some(APP_NAME.to_string());
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
    options.max_pool_size = Some(pool.max_size);
    options.min_pool_size = Some(pool.min_size);
    options.connect_timeout = Some(pool.timeout());
    options.server_selection_timeout = Some(pool.timeout());
}

impl Database {
    /// Connects and pings once, so a bad connection string fails at startup
    /// rather than on the first note request.
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
        apply_pool_settings(&mut options, &config.mongo_pool);

        let database = Self {
            client: Client::with_options(options)?,
            db_name: config.mongo_db_name.clone(),
        };
        database.health_check().await?;

        log::info!(
            "Connected to MongoDB database {} (pool {}..{}, timeout {}s)",
            config.mongo_db_name,
            config.mongo_pool.min_size,
            config.mongo_pool.max_size,
            config.mongo_pool.timeout_secs
        );
        Ok(database)
    }

    pub fn get_collection<T>(&self, collection_name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.client.database(&self.db_name).collection(collection_name)
    }

    /// Backs the readiness probe.
    pub async fn health_check(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
