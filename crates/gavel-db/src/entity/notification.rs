//! notification entity for database storage.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, Set};

use gavel_types::{ListingId, Notification, NotificationId, NotificationKind, UserId};

/// notification database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub listing_id: Option<i64>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Notification {
    fn from(model: Model) -> Self {
        Notification {
            id: NotificationId(model.id as u64),
            user: UserId(model.user_id as u64),
            // unknown kinds from legacy data default to the no-bids kind;
            // the kind column is only written from NotificationKind::as_str
            kind: NotificationKind::from_db(&model.kind)
                .unwrap_or(NotificationKind::AuctionNoBids),
            title: model.title,
            message: model.message,
            listing: model.listing_id.map(|id| ListingId(id as u64)),
            read: model.read,
            created_at: model.created_at,
        }
    }
}

impl From<&Notification> for ActiveModel {
    fn from(notification: &Notification) -> Self {
        ActiveModel {
            id: if notification.id.as_u64() == 0 {
                NotSet
            } else {
                Set(notification.id.as_u64() as i64)
            },
            user_id: Set(notification.user.as_u64() as i64),
            kind: Set(notification.kind.as_str().to_string()),
            title: Set(notification.title.clone()),
            message: Set(notification.message.clone()),
            listing_id: Set(notification.listing.map(|id| id.as_u64() as i64)),
            read: Set(notification.read),
            created_at: Set(notification.created_at),
        }
    }
}
