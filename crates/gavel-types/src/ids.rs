//! identifier newtypes.
//!
//! users are opaque identities here - authentication and profile data live
//! outside the auction core, so a [`UserId`] is all the core ever sees.

use serde::{Deserialize, Serialize};

/// unique identifier for a marketplace listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListingId(pub u64);

/// unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// unique identifier for a settlement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettlementId(pub u64);

/// unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            /// construct from a raw id.
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// the raw numeric id.
            pub const fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_impls!(ListingId);
id_impls!(UserId);
id_impls!(SettlementId);
id_impls!(NotificationId);
