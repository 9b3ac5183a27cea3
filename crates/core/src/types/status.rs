//! Order lifecycle status enums.
//!
//! Stored as snake_case text; `FromStr`/`Display` are the storage codec.
//! Legal administrative transitions live here so the storefront, the back
//! office, and the payment bridge callbacks all enforce the same lifecycle.

use serde::{Deserialize, Serialize};

/// Error parsing a status from its stored text form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} status: {value}")]
pub struct StatusParseError {
    /// Which status family failed to parse ("order" or "payment").
    pub kind: &'static str,
    /// The offending stored value.
    pub value: String,
}

/// Order fulfillment lifecycle.
///
/// Every order starts `Pending`. Forward movement is administrative; the
/// storefront itself never advances an order past creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Is a transition from `self` to `next` an allowed administrative move?
    ///
    /// `Delivered` and `Cancelled` are terminal. Cancellation is only
    /// possible before the order is being processed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(StatusParseError {
                kind: "order",
                value: other.to_owned(),
            }),
        }
    }
}

/// Payment state of an order, updated by payment-bridge callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Is a transition from `self` to `next` legal?
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid) | (Self::Paid, Self::Refunded)
        )
    }

    /// Stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "refunded" => Ok(Self::Refunded),
            other => Err(StatusParseError {
                kind: "payment",
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_forward_path() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
    }

    #[test]
    fn test_order_status_cancellation_window() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Processing.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
    }

    #[test]
    fn test_order_status_terminal_states() {
        use OrderStatus::*;
        for next in [Pending, Confirmed, Processing, Shipped, Delivered, Cancelled] {
            assert!(!Delivered.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn test_order_status_no_skipping() {
        use OrderStatus::*;
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Confirmed.can_transition_to(Delivered));
        assert!(!Shipped.can_transition_to(Pending));
    }

    #[test]
    fn test_order_status_text_roundtrip() {
        use OrderStatus::*;
        for status in [Pending, Confirmed, Processing, Shipped, Delivered, Cancelled] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("unknown".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_status_transitions() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Refunded));
        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Refunded.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Pending));
    }

    #[test]
    fn test_payment_status_text_roundtrip() {
        use PaymentStatus::*;
        for status in [Pending, Paid, Refunded] {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!("voided".parse::<PaymentStatus>().is_err());
    }
}
