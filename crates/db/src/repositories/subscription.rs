//! Subscription repository.

use std::sync::Arc;

use crate::entities::{Subscription, User, subscription, user};
use ladle_common::{AppError, AppResult};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Subscription repository for database operations.
#[derive(Clone)]
pub struct SubscriptionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a subscription by subscriber and author.
    pub async fn find_by_pair(
        &self,
        subscriber_id: &str,
        author_id: &str,
    ) -> AppResult<Option<subscription::Model>> {
        Subscription::find()
            .filter(subscription::Column::SubscriberId.eq(subscriber_id))
            .filter(subscription::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is subscribed to an author.
    pub async fn exists(&self, subscriber_id: &str, author_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(subscriber_id, author_id).await?.is_some())
    }

    /// Create a new subscription.
    pub async fn create(&self, model: subscription::ActiveModel) -> AppResult<subscription::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a subscription by pair.
    pub async fn delete_by_pair(&self, subscriber_id: &str, author_id: &str) -> AppResult<()> {
        let subscription = self.find_by_pair(subscriber_id, author_id).await?;
        if let Some(s) = subscription {
            s.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// IDs of every author a user is subscribed to.
    pub async fn author_ids_for(&self, subscriber_id: &str) -> AppResult<Vec<String>> {
        let subscriptions = Subscription::find()
            .filter(subscription::Column::SubscriberId.eq(subscriber_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(subscriptions
            .into_iter()
            .map(|s| s.author_id)
            .collect())
    }

    /// Authors a user is subscribed to, ordered by username (with
    /// limit/offset).
    pub async fn authors_of(
        &self,
        subscriber_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(
                user::Column::Id.in_subquery(
                    Query::select()
                        .column(subscription::Column::AuthorId)
                        .from(Subscription)
                        .and_where(subscription::Column::SubscriberId.eq(subscriber_id))
                        .to_owned(),
                ),
            )
            .order_by_asc(user::Column::Username)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count the authors a user is subscribed to.
    pub async fn count_authors_of(&self, subscriber_id: &str) -> AppResult<u64> {
        Subscription::find()
            .filter(subscription::Column::SubscriberId.eq(subscriber_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_subscription(
        id: &str,
        subscriber_id: &str,
        author_id: &str,
    ) -> subscription::Model {
        subscription::Model {
            id: id.to_string(),
            subscriber_id: subscriber_id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_exists_true() {
        let subscription = create_test_subscription("s1", "u1", "u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[subscription.clone()]])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        let exists = repo.exists("u1", "u2").await.unwrap();

        assert!(exists);
    }

    #[tokio::test]
    async fn test_exists_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<subscription::Model>::new()])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        let exists = repo.exists("u1", "u3").await.unwrap();

        assert!(!exists);
    }

    #[tokio::test]
    async fn test_create() {
        let subscription = create_test_subscription("s1", "u1", "u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[subscription.clone()]])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        let created = repo
            .create(subscription::ActiveModel {
                id: Set("s1".to_string()),
                subscriber_id: Set("u1".to_string()),
                author_id: Set("u2".to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await
            .unwrap();

        assert_eq!(created.id, "s1");
    }

    #[tokio::test]
    async fn test_delete_by_pair() {
        let subscription = create_test_subscription("s1", "u1", "u2");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[subscription.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        repo.delete_by_pair("u1", "u2").await.unwrap();
    }

    #[tokio::test]
    async fn test_author_ids_for() {
        let s1 = create_test_subscription("s1", "u1", "u2");
        let s2 = create_test_subscription("s2", "u1", "u3");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[s1, s2]])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        let ids = repo.author_ids_for("u1").await.unwrap();

        assert_eq!(ids, vec!["u2".to_string(), "u3".to_string()]);
    }

    #[tokio::test]
    async fn test_count_authors_of() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );

        let repo = SubscriptionRepository::new(db);
        let count = repo.count_authors_of("u1").await.unwrap();

        assert_eq!(count, 2);
    }
}
