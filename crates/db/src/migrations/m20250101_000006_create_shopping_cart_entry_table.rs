//! Create shopping cart entry table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShoppingCartEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShoppingCartEntry::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShoppingCartEntry::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShoppingCartEntry::RecipeId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShoppingCartEntry::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shopping_cart_entry_user")
                            .from(ShoppingCartEntry::Table, ShoppingCartEntry::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shopping_cart_entry_recipe")
                            .from(ShoppingCartEntry::Table, ShoppingCartEntry::RecipeId)
                            .to(Recipe::Table, Recipe::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, recipe_id) - a recipe sits in a cart once
        manager
            .create_index(
                Index::create()
                    .name("idx_shopping_cart_entry_user_recipe")
                    .table(ShoppingCartEntry::Table)
                    .col(ShoppingCartEntry::UserId)
                    .col(ShoppingCartEntry::RecipeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: recipe_id (for the in-cart filter)
        manager
            .create_index(
                Index::create()
                    .name("idx_shopping_cart_entry_recipe_id")
                    .table(ShoppingCartEntry::Table)
                    .col(ShoppingCartEntry::RecipeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShoppingCartEntry::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ShoppingCartEntry {
    Table,
    Id,
    UserId,
    RecipeId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Recipe {
    Table,
    Id,
}
