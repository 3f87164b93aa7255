//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Order lifecycle status, as stored by the backend.
///
/// Unknown values deserialize as [`OrderStatus::Pending`] so a new backend
/// status never breaks order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Completed,
    Cancelled,
    #[default]
    #[serde(other)]
    Pending,
}

impl OrderStatus {
    /// Every status, in the order the admin status picker lists them.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Completed, Self::Cancelled];

    /// Wire value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Account role returned by the backend on login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Back-office access.
    Admin,
    /// Regular shopper.
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    /// Whether this role may use the admin panel.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_unknown_is_pending() {
        let status: OrderStatus = serde_json::from_str("\"shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_wire_values() {
        for status in OrderStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(serde_json::from_str::<OrderStatus>(&json).unwrap(), status);
        }
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(OrderStatus::ALL[0], OrderStatus::Pending);
    }

    #[test]
    fn test_order_status_from_str() {
        assert_eq!("Completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        assert!("nope".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_role_deserialize() {
        let admin: Role = serde_json::from_str("\"admin\"").unwrap();
        let other: Role = serde_json::from_str("\"customer\"").unwrap();
        assert!(admin.is_admin());
        assert_eq!(other, Role::User);
    }
}
