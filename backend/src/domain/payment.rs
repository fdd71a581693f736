//! Provider payment model as seen by reconciliation.

use serde::{Deserialize, Serialize};

use super::ids::PaymentId;

/// Lifecycle state reported by the payment provider.
///
/// Only [`PaymentStatus::Approved`] releases an entitlement. Unknown statuses
/// are preserved verbatim in [`PaymentStatus::Other`] so logs show what the
/// provider actually sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Payment captured; entitlements may be granted.
    Approved,
    /// Awaiting payer action (e.g. boleto not yet paid).
    Pending,
    /// Under review by the provider.
    InProcess,
    /// Declined by the provider or issuer.
    Rejected,
    /// Cancelled before capture.
    Cancelled,
    /// Captured and subsequently refunded.
    Refunded,
    /// Disputed by the card holder.
    ChargedBack,
    /// A status this service does not recognise.
    #[serde(untagged)]
    Other(String),
}

impl PaymentStatus {
    /// Map a raw provider status string onto the known variants.
    pub fn from_provider(raw: &str) -> Self {
        match raw {
            "approved" => Self::Approved,
            "pending" => Self::Pending,
            "in_process" => Self::InProcess,
            "rejected" => Self::Rejected,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            "charged_back" => Self::ChargedBack,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Whether this status releases entitlements.
    #[rustfmt::skip]
    pub fn is_approved(&self) -> bool { matches!(self, Self::Approved) }

    /// Canonical string form of the status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::InProcess => "in_process",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::ChargedBack => "charged_back",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment fetched from the provider by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    /// Provider-assigned payment identifier.
    pub id: PaymentId,
    /// Current lifecycle state.
    pub status: PaymentStatus,
    /// Correlation reference attached at checkout, if any.
    pub external_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("approved", PaymentStatus::Approved)]
    #[case("pending", PaymentStatus::Pending)]
    #[case("in_process", PaymentStatus::InProcess)]
    #[case("rejected", PaymentStatus::Rejected)]
    #[case("cancelled", PaymentStatus::Cancelled)]
    #[case("refunded", PaymentStatus::Refunded)]
    #[case("charged_back", PaymentStatus::ChargedBack)]
    fn maps_known_provider_statuses(#[case] raw: &str, #[case] expected: PaymentStatus) {
        assert_eq!(PaymentStatus::from_provider(raw), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn preserves_unknown_statuses() {
        let status = PaymentStatus::from_provider("authorized");
        assert_eq!(status, PaymentStatus::Other("authorized".to_owned()));
        assert!(!status.is_approved());
    }

    #[test]
    fn only_approved_releases_entitlements() {
        assert!(PaymentStatus::Approved.is_approved());
        assert!(!PaymentStatus::Pending.is_approved());
        assert!(!PaymentStatus::Refunded.is_approved());
    }
}
