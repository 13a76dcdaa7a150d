use sea_orm_migration::prelude::*;

use super::m20261016_000001_create_currencies::Currencies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PriceSamples::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PriceSamples::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PriceSamples::CurrencyId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceSamples::Price)
                            .decimal_len(20, 8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PriceSamples::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_price_samples_currency")
                            .from(PriceSamples::Table, PriceSamples::CurrencyId)
                            .to(Currencies::Table, Currencies::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Nearest-timestamp lookups walk this index in both directions
        manager
            .create_index(
                Index::create()
                    .name("idx_price_samples_currency_time")
                    .table(PriceSamples::Table)
                    .col(PriceSamples::CurrencyId)
                    .col(PriceSamples::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PriceSamples::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PriceSamples {
    Table,
    Id,
    CurrencyId,
    Price,
    Timestamp,
}
