// Memo persistence keyed by ISBN-13

use anyhow::Context;
use chrono::Utc;
use entities::memo;
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, EntityTrait, sea_query::OnConflict,
};

#[async_trait::async_trait]
pub trait MemoStore: Send + Sync {
    async fn load(&self, isbn13: &str) -> anyhow::Result<Option<String>>;
    /// A blank memo removes the entry.
    async fn save(&self, isbn13: &str, memo: &str) -> anyhow::Result<()>;
}

fn ensure_key(isbn13: &str) -> anyhow::Result<()> {
    if isbn13.trim().is_empty() {
        anyhow::bail!("memo key (isbn13) must not be empty");
    }
    Ok(())
}

pub struct SqlMemoStore {
    db: DatabaseConnection,
}

impl SqlMemoStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl MemoStore for SqlMemoStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn load(&self, isbn13: &str) -> anyhow::Result<Option<String>> {
        ensure_key(isbn13)?;
        let row = memo::Entity::find_by_id(isbn13.to_string())
            .one(&self.db)
            .await
            .with_context(|| format!("Failed to load memo for {}", isbn13))?;
        Ok(row.map(|m| m.body))
    }

    #[tracing::instrument(level = "debug", skip(self, memo))]
    async fn save(&self, isbn13: &str, memo: &str) -> anyhow::Result<()> {
        ensure_key(isbn13)?;
        if memo.trim().is_empty() {
            memo::Entity::delete_by_id(isbn13.to_string())
                .exec(&self.db)
                .await
                .with_context(|| format!("Failed to clear memo for {}", isbn13))?;
            tracing::debug!(%isbn13, "memo cleared");
            return Ok(());
        }

        let row = memo::ActiveModel {
            isbn13: Set(isbn13.to_string()),
            body: Set(memo.to_string()),
            updated_at: Set(Utc::now()),
        };
        memo::Entity::insert(row)
            .on_conflict(
                OnConflict::column(memo::Column::Isbn13)
                    .update_columns([memo::Column::Body, memo::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .with_context(|| format!("Failed to save memo for {}", isbn13))?;
        tracing::debug!(%isbn13, len = memo.len(), "memo saved");
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct InMemoryMemoStore {
    memos: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
#[async_trait::async_trait]
impl MemoStore for InMemoryMemoStore {
    async fn load(&self, isbn13: &str) -> anyhow::Result<Option<String>> {
        ensure_key(isbn13)?;
        let memos = self
            .memos
            .lock()
            .map_err(|_| anyhow::anyhow!("memo map poisoned"))?;
        Ok(memos.get(isbn13).cloned())
    }

    async fn save(&self, isbn13: &str, memo: &str) -> anyhow::Result<()> {
        ensure_key(isbn13)?;
        let mut memos = self
            .memos
            .lock()
            .map_err(|_| anyhow::anyhow!("memo map poisoned"))?;
        if memo.trim().is_empty() {
            memos.remove(isbn13);
        } else {
            memos.insert(isbn13.to_string(), memo.to_string());
        }
        Ok(())
    }
}

/// Text to show in the memo editor: the stored memo, or the placeholder.
pub async fn memo_or_placeholder(
    store: &dyn MemoStore,
    isbn13: &str,
    placeholder: &str,
) -> anyhow::Result<String> {
    Ok(store
        .load(isbn13)
        .await?
        .unwrap_or_else(|| placeholder.to_string()))
}

#[cfg(test)]
mod tests {
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    use super::*;

    async fn sqlite_store() -> SqlMemoStore {
        // One connection, otherwise every pooled connection gets its own empty database.
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SqlMemoStore::new(db)
    }

    async fn exercise(store: &dyn MemoStore) {
        assert_eq!(store.load("9781617294136").await.unwrap(), None);

        store.save("9781617294136", "chapter 3 is great").await.unwrap();
        assert_eq!(
            store.load("9781617294136").await.unwrap().as_deref(),
            Some("chapter 3 is great")
        );

        store.save("9781617294136", "reread chapter 4").await.unwrap();
        assert_eq!(
            store.load("9781617294136").await.unwrap().as_deref(),
            Some("reread chapter 4")
        );

        store.save("9781617294136", "   ").await.unwrap();
        assert_eq!(store.load("9781617294136").await.unwrap(), None);

        assert!(store.load("").await.is_err());
        assert!(store.save("", "orphan").await.is_err());
    }

    #[tokio::test]
    async fn sqlite_store_round_trips_and_clears() {
        let store = sqlite_store().await;
        exercise(&store).await;
    }

    #[tokio::test]
    async fn in_memory_store_matches_sqlite_behaviour() {
        exercise(&InMemoryMemoStore::default()).await;
    }

    #[tokio::test]
    async fn placeholder_until_a_memo_exists() {
        let store = InMemoryMemoStore::default();
        assert_eq!(
            memo_or_placeholder(&store, "9781617294136", "Enter a memo")
                .await
                .unwrap(),
            "Enter a memo"
        );
        store.save("9781617294136", "borrowed from Jin").await.unwrap();
        assert_eq!(
            memo_or_placeholder(&store, "9781617294136", "Enter a memo")
                .await
                .unwrap(),
            "borrowed from Jin"
        );
    }
}
