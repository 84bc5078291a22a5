//! Subscription entity.

use sea_orm::entity::prelude::*;

/// Subscription of one user to another's recipes, unique per
/// (subscriber, author) pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscription")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// User who subscribed.
    pub subscriber_id: String,

    /// Author being subscribed to.
    pub author_id: String,

    /// When the subscription was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SubscriberId",
        to = "super::user::Column::Id"
    )]
    Subscriber,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,
}

// No `Related` impls: the entity references `user` twice, so joins pick
// the relation explicitly via `Relation::Subscriber` / `Relation::Author`.

impl ActiveModelBehavior for ActiveModel {}
