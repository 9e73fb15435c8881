use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{member::MemberRef, money::Money};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub member_id: Option<Uuid>,
    pub amount: Money,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub invoice_number: Option<String>,
    pub payment_date: DateTime<Utc>,
    /// Embedded `members(full_name)` when the query asked for it.
    #[serde(default, rename = "members", skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberRef>,
}

impl Payment {
    pub fn member_name(&self) -> &str {
        self.member
            .as_ref()
            .map(|m| m.full_name.as_str())
            .unwrap_or("Unknown member")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Successful,
    Pending,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Successful => "successful",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Successful => "Successful",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Failed => "Failed",
        }
    }
}

/// Revenue figures reduced from whatever payments are loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    pub total_revenue: Money,
    pub successful_count: usize,
    /// Pending and failed payments together.
    pub outstanding_count: usize,
}

impl PaymentSummary {
    pub fn from_payments(payments: &[Payment]) -> Self {
        payments.iter().fold(Self::default(), |mut summary, payment| {
            match payment.status {
                PaymentStatus::Successful => {
                    summary.total_revenue = summary.total_revenue + payment.amount;
                    summary.successful_count += 1;
                }
                PaymentStatus::Pending | PaymentStatus::Failed => {
                    summary.outstanding_count += 1;
                }
            }
            summary
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(cents: i64, status: PaymentStatus) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            member_id: None,
            amount: Money::from_cents(cents),
            status,
            payment_method: Some("card".to_string()),
            invoice_number: None,
            payment_date: Utc::now(),
            member: None,
        }
    }

    #[test]
    fn summary_counts_only_successful_revenue() {
        let payments = vec![
            payment(9900, PaymentStatus::Successful),
            payment(4950, PaymentStatus::Successful),
            payment(10000, PaymentStatus::Pending),
            payment(2500, PaymentStatus::Failed),
        ];

        let summary = PaymentSummary::from_payments(&payments);

        assert_eq!(summary.total_revenue, Money::from_cents(14850));
        assert_eq!(summary.successful_count, 2);
        assert_eq!(summary.outstanding_count, 2);
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        assert_eq!(PaymentSummary::from_payments(&[]), PaymentSummary::default());
    }

    #[test]
    fn decodes_embedded_member_name() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "member_id": Uuid::new_v4(),
            "amount": 120,
            "status": "pending",
            "payment_method": "cash",
            "invoice_number": "INV-1001",
            "payment_date": "2026-10-02T09:30:00Z",
            "members": { "full_name": "Ada Lovelace" }
        });

        let payment: Payment = serde_json::from_value(json).unwrap();
        assert_eq!(payment.member_name(), "Ada Lovelace");
        assert_eq!(payment.amount, Money::from_cents(12000));
    }
}
