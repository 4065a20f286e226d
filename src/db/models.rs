use sea_orm::entity::prelude::*;

use super::traits::PriceRecord;

/// One row per asset per trading day.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assetprice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub date: Date,

    #[sea_orm(primary_key, auto_increment = false)]
    pub asset_name: String,

    pub price: f64,

    pub currency: String,

    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PriceRecord {
    fn from(model: Model) -> Self {
        Self {
            date: model.date,
            asset_name: model.asset_name,
            price: model.price,
            currency: model.currency,
            updated_at: model.updated_at,
        }
    }
}
