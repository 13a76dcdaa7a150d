//! `SeaORM` Entity for the tracked currency registry

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "currencies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Uppercase ticker, at most 10 characters
    #[sea_orm(unique)]
    pub symbol: String,
    /// Cleared on removal; history stays queryable
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::price_samples::Entity")]
    PriceSamples,
}

impl Related<super::price_samples::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceSamples.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
