//! Subscription (author-following) service.

use ladle_common::{AppError, AppResult, IdGenerator};
use ladle_db::{
    entities::{recipe, subscription, user},
    repositories::{RecipeRepository, SubscriptionRepository, UserRepository},
};
use sea_orm::Set;

/// A followed author together with a slice of their recipes.
#[derive(Debug, Clone)]
pub struct AuthorFeed {
    /// The followed author.
    pub author: user::Model,
    /// The author's recipes, newest slice per `recipes_limit`.
    pub recipes: Vec<recipe::Model>,
    /// Total number of recipes the author has published.
    pub recipes_count: u64,
}

/// Subscription service.
#[derive(Clone)]
pub struct SubscriptionService {
    subscription_repo: SubscriptionRepository,
    user_repo: UserRepository,
    recipe_repo: RecipeRepository,
    id_gen: IdGenerator,
}

impl SubscriptionService {
    /// Create a new subscription service.
    #[must_use]
    pub const fn new(
        subscription_repo: SubscriptionRepository,
        user_repo: UserRepository,
        recipe_repo: RecipeRepository,
    ) -> Self {
        Self {
            subscription_repo,
            user_repo,
            recipe_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Subscribe to an author.
    ///
    /// Returns the author's feed entry for the response body.
    pub async fn subscribe(
        &self,
        subscriber_id: &str,
        author_id: &str,
        recipes_limit: Option<u64>,
    ) -> AppResult<AuthorFeed> {
        let author = self.user_repo.get_by_id(author_id).await?;

        if subscriber_id == author_id {
            return Err(AppError::Validation(
                "You cannot subscribe to yourself.".to_string(),
            ));
        }
        if self.subscription_repo.exists(subscriber_id, author_id).await? {
            return Err(AppError::Validation(
                "You are already subscribed to this author.".to_string(),
            ));
        }

        let model = subscription::ActiveModel {
            id: Set(self.id_gen.generate()),
            subscriber_id: Set(subscriber_id.to_string()),
            author_id: Set(author_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.subscription_repo.create(model).await?;

        self.feed_entry(author, recipes_limit).await
    }

    /// Unsubscribe from an author.
    pub async fn unsubscribe(&self, subscriber_id: &str, author_id: &str) -> AppResult<()> {
        self.user_repo.get_by_id(author_id).await?;

        if !self.subscription_repo.exists(subscriber_id, author_id).await? {
            return Err(AppError::Validation(
                "You are not subscribed to this author.".to_string(),
            ));
        }

        self.subscription_repo
            .delete_by_pair(subscriber_id, author_id)
            .await
    }

    /// List the subscriber's followed authors with their recipes.
    ///
    /// Authors are ordered by username; returns the total count for the
    /// pagination envelope.
    pub async fn feed(
        &self,
        subscriber_id: &str,
        limit: u64,
        offset: u64,
        recipes_limit: Option<u64>,
    ) -> AppResult<(u64, Vec<AuthorFeed>)> {
        let count = self.subscription_repo.count_authors_of(subscriber_id).await?;
        let authors = self
            .subscription_repo
            .authors_of(subscriber_id, limit, offset)
            .await?;

        let mut entries = Vec::with_capacity(authors.len());
        for author in authors {
            entries.push(self.feed_entry(author, recipes_limit).await?);
        }

        Ok((count, entries))
    }

    /// Check whether the subscriber follows the author.
    pub async fn is_subscribed(&self, subscriber_id: &str, author_id: &str) -> AppResult<bool> {
        self.subscription_repo.exists(subscriber_id, author_id).await
    }

    /// All author IDs the subscriber follows.
    pub async fn subscribed_ids(&self, subscriber_id: &str) -> AppResult<Vec<String>> {
        self.subscription_repo.author_ids_for(subscriber_id).await
    }

    async fn feed_entry(
        &self,
        author: user::Model,
        recipes_limit: Option<u64>,
    ) -> AppResult<AuthorFeed> {
        let recipes = self
            .recipe_repo
            .find_by_author(&author.id, recipes_limit)
            .await?;
        let recipes_count = self.recipe_repo.count_by_author(&author.id).await?;

        Ok(AuthorFeed {
            author,
            recipes,
            recipes_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: format!("{username}@example.com"),
            username: username.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "hash".to_string(),
            token: None,
            avatar_url: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_subscription(id: &str, subscriber_id: &str, author_id: &str) -> subscription::Model {
        subscription::Model {
            id: id.to_string(),
            subscriber_id: subscriber_id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(
        sub_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
        recipe_db: Arc<sea_orm::DatabaseConnection>,
    ) -> SubscriptionService {
        SubscriptionService::new(
            SubscriptionRepository::new(sub_db),
            UserRepository::new(user_db),
            RecipeRepository::new(recipe_db),
        )
    }

    #[tokio::test]
    async fn test_subscribe_missing_author() {
        let sub_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(sub_db, user_db, recipe_db);
        let result = service.subscribe("u1", "ghost", None).await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_subscribe_to_self() {
        let sub_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]])
                .into_connection(),
        );
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(sub_db, user_db, recipe_db);
        let result = service.subscribe("u1", "u1", None).await;

        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "You cannot subscribe to yourself.");
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_subscribe_duplicate() {
        let sub_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_subscription("s1", "u1", "u2")]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u2", "bob")]])
                .into_connection(),
        );
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(sub_db, user_db, recipe_db);
        let result = service.subscribe("u1", "u2", None).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_subscribe_builds_feed_entry() {
        let sub_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<subscription::Model>::new()])
                .append_query_results([[create_test_subscription("s1", "u1", "u2")]])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u2", "bob")]])
                .into_connection(),
        );
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .into_connection(),
        );

        let service = create_test_service(sub_db, user_db, recipe_db);
        let entry = service.subscribe("u1", "u2", Some(3)).await.unwrap();

        assert_eq!(entry.author.id, "u2");
        assert!(entry.recipes.is_empty());
        assert_eq!(entry.recipes_count, 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_not_subscribed() {
        let sub_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<subscription::Model>::new()])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u2", "bob")]])
                .into_connection(),
        );
        let recipe_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(sub_db, user_db, recipe_db);
        let result = service.unsubscribe("u1", "u2").await;

        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "You are not subscribed to this author.");
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_feed_lists_followed_authors() {
        // The author page is fetched through the subscription repo's
        // connection (user table via an id subquery).
        let sub_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .append_query_results([[create_test_user("u2", "bob")]])
                .into_connection(),
        );
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let recipe_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<recipe::Model>::new()])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .into_connection(),
        );

        let service = create_test_service(sub_db, user_db, recipe_db);
        let (count, entries) = service.feed("u1", 6, 0, None).await.unwrap();

        assert_eq!(count, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].author.username, "bob");
    }
}
