//! Shared domain enums, stored as lowercase slugs

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements slug conversions and the SQLx text mapping for a fieldless enum.
macro_rules! slug_enum {
    ($name:ident { $($variant:ident => $slug:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $slug,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($slug => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {} value: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// ItemCondition
// ---------------------------------------------------------------------------

/// Physical condition of a toy.
///
/// The five grades describe a toy in circulation; `Damaged` and `Lost` only
/// appear as the outcome of a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    New,
    Excellent,
    Good,
    Fair,
    Poor,
    Damaged,
    Lost,
}

slug_enum!(ItemCondition {
    New => "new",
    Excellent => "excellent",
    Good => "good",
    Fair => "fair",
    Poor => "poor",
    Damaged => "damaged",
    Lost => "lost",
});

impl ItemCondition {
    /// Grades with their severity ordinal, best first.
    pub const GRADES: [(ItemCondition, u8); 5] = [
        (ItemCondition::New, 5),
        (ItemCondition::Excellent, 4),
        (ItemCondition::Good, 3),
        (ItemCondition::Fair, 2),
        (ItemCondition::Poor, 1),
    ];

    /// Severity ordinal; `None` for damaged and lost.
    pub fn ordinal(self) -> Option<u8> {
        Self::GRADES
            .iter()
            .find(|(grade, _)| *grade == self)
            .map(|(_, ordinal)| *ordinal)
    }

    pub fn is_grade(self) -> bool {
        self.ordinal().is_some()
    }
}

// ---------------------------------------------------------------------------
// RentalStatus
// ---------------------------------------------------------------------------

/// Rental lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Active,
    Completed,
    Overdue,
    Cancelled,
}

slug_enum!(RentalStatus {
    Pending => "pending",
    Active => "active",
    Completed => "completed",
    Overdue => "overdue",
    Cancelled => "cancelled",
});

impl RentalStatus {
    /// Completed and cancelled rentals accept no further changes
    pub fn is_terminal(self) -> bool {
        matches!(self, RentalStatus::Completed | RentalStatus::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// RentalItemStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalItemStatus {
    Rented,
    Returned,
    Damaged,
    Lost,
}

slug_enum!(RentalItemStatus {
    Rented => "rented",
    Returned => "returned",
    Damaged => "damaged",
    Lost => "lost",
});

// ---------------------------------------------------------------------------
// PaymentStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Pending,
    Paid,
    Expired,
    Failed,
    Refunded,
    PartiallyPaid,
}

slug_enum!(PaymentStatus {
    Unpaid => "unpaid",
    Pending => "pending",
    Paid => "paid",
    Expired => "expired",
    Failed => "failed",
    Refunded => "refunded",
    PartiallyPaid => "partially_paid",
});

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Customer,
}

slug_enum!(UserRole {
    Admin => "admin",
    Customer => "customer",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_ordinals() {
        assert_eq!(ItemCondition::New.ordinal(), Some(5));
        assert_eq!(ItemCondition::Good.ordinal(), Some(3));
        assert_eq!(ItemCondition::Poor.ordinal(), Some(1));
        assert_eq!(ItemCondition::Damaged.ordinal(), None);
        assert_eq!(ItemCondition::Lost.ordinal(), None);
    }

    #[test]
    fn test_condition_parse() {
        assert_eq!("excellent".parse::<ItemCondition>(), Ok(ItemCondition::Excellent));
        assert_eq!("lost".parse::<ItemCondition>(), Ok(ItemCondition::Lost));
        assert!("broken".parse::<ItemCondition>().is_err());
        assert!("New".parse::<ItemCondition>().is_err());
    }

    #[test]
    fn test_payment_status_slug() {
        assert_eq!(PaymentStatus::PartiallyPaid.as_str(), "partially_paid");
        assert_eq!(
            serde_json::to_string(&PaymentStatus::PartiallyPaid).unwrap(),
            "\"partially_paid\""
        );
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RentalStatus::Completed.is_terminal());
        assert!(RentalStatus::Cancelled.is_terminal());
        assert!(!RentalStatus::Overdue.is_terminal());
        assert!(!RentalStatus::Pending.is_terminal());
    }
}
