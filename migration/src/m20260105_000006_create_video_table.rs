use sea_orm_migration::{prelude::*, schema::*};

use super::m20260105_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Video::Table)
                    .if_not_exists()
                    .col(pk_auto(Video::Id))
                    .col(integer(Video::OwnerId))
                    .col(string(Video::Title))
                    .col(text_null(Video::Description))
                    .col(string(Video::VideoUrl))
                    .col(string_null(Video::ThumbnailUrl))
                    .col(string(Video::Visibility))
                    .col(big_integer(Video::ViewCount).default(0))
                    .col(integer(Video::LikeCount).default(0))
                    .col(integer(Video::CommentCount).default(0))
                    .col(timestamp_with_time_zone(Video::CreatedAt))
                    .col(timestamp_with_time_zone(Video::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_owner_id")
                            .from(Video::Table, Video::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Video::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Video {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    VideoUrl,
    ThumbnailUrl,
    Visibility,
    ViewCount,
    LikeCount,
    CommentCount,
    CreatedAt,
    UpdatedAt,
}
