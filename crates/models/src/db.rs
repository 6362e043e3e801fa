use configs::DatabaseConfig;
use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use tracing::info;

/// Build a database handle from configuration. The driver pools
/// connections internally; the handle is cheap to clone and is injected
/// into the store rather than held in process-global state.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Database> {
    let client = Client::with_uri_str(&cfg.url).await?;
    Ok(client.database(&cfg.db_name))
}

/// Declare the indexes the services rely on. The unique index on
/// `users.username` is what turns a duplicate account into a store-level
/// conflict instead of a check-then-insert race.
pub async fn ensure_indexes(db: &Database) -> anyhow::Result<()> {
    let users = db.collection::<Document>(crate::user::COLLECTION);
    let unique_username = IndexModel::builder()
        .keys(doc! { "username": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    users.create_index(unique_username).await?;

    let reviews = db.collection::<Document>(crate::review::COLLECTION);
    let by_movie = IndexModel::builder().keys(doc! { "movieId": 1 }).build();
    reviews.create_index(by_movie).await?;

    info!(event = "indexes_ready", "store indexes ensured");
    Ok(())
}
