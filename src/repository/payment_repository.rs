use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    backend::{RecordStore, Select},
    domain::{Money, Payment, PaymentStatus},
    error::Result,
    repository::PaymentRepository,
};

const TABLE: &str = "payments";
const WITH_MEMBER: &str = "*, members(full_name)";

#[derive(Deserialize)]
struct AmountRow {
    amount: Money,
}

pub struct BackendPaymentRepository {
    store: Arc<dyn RecordStore>,
}

impl BackendPaymentRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PaymentRepository for BackendPaymentRepository {
    async fn recent(&self, limit: usize) -> Result<Vec<Payment>> {
        self.store
            .select(
                &Select::from(TABLE)
                    .columns(WITH_MEMBER)
                    .order("payment_date", false)
                    .limit(limit),
            )
            .await?
            .decode()
    }

    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Payment>> {
        self.store
            .select(
                &Select::from(TABLE)
                    .columns(WITH_MEMBER)
                    .eq("member_id", member_id.to_string())
                    .order("payment_date", false),
            )
            .await?
            .decode()
    }

    async fn successful_amounts_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Money>> {
        let rows: Vec<AmountRow> = self
            .store
            .select(
                &Select::from(TABLE)
                    .columns("amount")
                    .eq("status", PaymentStatus::Successful.as_str())
                    .gte("payment_date", from.to_rfc3339_opts(SecondsFormat::Millis, true))
                    .lte("payment_date", to.to_rfc3339_opts(SecondsFormat::Millis, true)),
            )
            .await?
            .decode()?;

        Ok(rows.into_iter().map(|row| row.amount).collect())
    }
}
