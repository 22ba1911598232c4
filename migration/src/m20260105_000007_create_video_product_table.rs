use sea_orm_migration::{prelude::*, schema::*};

use super::{
    m20260105_000005_create_product_table::Product,
    m20260105_000006_create_video_table::Video,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VideoProduct::Table)
                    .if_not_exists()
                    .col(pk_auto(VideoProduct::Id))
                    .col(integer(VideoProduct::VideoId))
                    .col(integer(VideoProduct::ProductId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_product_video_id")
                            .from(VideoProduct::Table, VideoProduct::VideoId)
                            .to(Video::Table, Video::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_video_product_product_id")
                            .from(VideoProduct::Table, VideoProduct::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_video_product_video_id_product_id")
                    .table(VideoProduct::Table)
                    .col(VideoProduct::VideoId)
                    .col(VideoProduct::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VideoProduct::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VideoProduct {
    Table,
    Id,
    VideoId,
    ProductId,
}
