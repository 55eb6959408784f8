//! settlement entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use gavel_types::{ListingId, Settlement, SettlementId, SettlementKind, SettlementStatus, UserId};

/// settlement database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "settlements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub listing_id: i64,
    pub buyer_id: i64,
    pub seller_id: i64,
    pub amount: i64,
    pub kind: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::listing::Entity",
        from = "Column::ListingId",
        to = "super::listing::Column::Id"
    )]
    Listing,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Settlement {
    fn from(model: Model) -> Self {
        Settlement {
            id: SettlementId(model.id as u64),
            listing: ListingId(model.listing_id as u64),
            buyer: UserId(model.buyer_id as u64),
            seller: UserId(model.seller_id as u64),
            amount: model.amount as u64,
            // the core only writes auction settlements
            kind: SettlementKind::Auction,
            status: SettlementStatus::from_db(&model.status),
            created_at: model.created_at,
        }
    }
}

impl From<&Settlement> for ActiveModel {
    fn from(settlement: &Settlement) -> Self {
        ActiveModel {
            id: if settlement.id.as_u64() == 0 {
                NotSet
            } else {
                Set(settlement.id.as_u64() as i64)
            },
            listing_id: Set(settlement.listing.as_u64() as i64),
            buyer_id: Set(settlement.buyer.as_u64() as i64),
            seller_id: Set(settlement.seller.as_u64() as i64),
            amount: Set(settlement.amount as i64),
            kind: Set(settlement.kind.as_str().to_string()),
            status: Set(settlement.status.as_str().to_string()),
            created_at: Set(settlement.created_at),
            deleted_at: NotSet,
        }
    }
}
