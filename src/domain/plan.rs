use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::money::{text_or_number, Money};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub plan_type: PlanType,
    pub billing_cycle: BillingCycle,
    #[serde(default = "default_duration_months", deserialize_with = "duration_or_default")]
    pub duration_months: i32,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_duration_months() -> i32 {
    1
}

fn duration_or_default<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or_else(default_duration_months))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    #[default]
    Unlimited,
    ClassPack,
    PersonalTraining,
}

impl PlanType {
    pub const ALL: [PlanType; 3] = [
        PlanType::Unlimited,
        PlanType::ClassPack,
        PlanType::PersonalTraining,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::Unlimited => "unlimited",
            PlanType::ClassPack => "class_pack",
            PlanType::PersonalTraining => "personal_training",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlanType::Unlimited => "unlimited",
            PlanType::ClassPack => "class pack",
            PlanType::PersonalTraining => "personal training",
        }
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "unlimited" => Ok(PlanType::Unlimited),
            "class_pack" => Ok(PlanType::ClassPack),
            "personal_training" => Ok(PlanType::PersonalTraining),
            _ => Err(format!("Unknown plan type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Quarterly,
    Annual,
    OneTime,
}

impl BillingCycle {
    pub const ALL: [BillingCycle; 4] = [
        BillingCycle::Monthly,
        BillingCycle::Quarterly,
        BillingCycle::Annual,
        BillingCycle::OneTime,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "Monthly",
            BillingCycle::Quarterly => "Quarterly",
            BillingCycle::Annual => "Annual",
            BillingCycle::OneTime => "One-time",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Quarterly => "quarterly",
            BillingCycle::Annual => "annual",
            BillingCycle::OneTime => "one_time",
        }
    }

    /// Suffix shown after a price, as in `$99.00/month`.
    pub fn period(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "month",
            BillingCycle::Quarterly => "quarter",
            BillingCycle::Annual => "annual",
            BillingCycle::OneTime => "once",
        }
    }
}

impl FromStr for BillingCycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "monthly" => Ok(BillingCycle::Monthly),
            "quarterly" => Ok(BillingCycle::Quarterly),
            "annual" => Ok(BillingCycle::Annual),
            "one_time" => Ok(BillingCycle::OneTime),
            _ => Err(format!("Unknown billing cycle: {}", s)),
        }
    }
}

/// Plan form input. Name and price are required; price stays text until it
/// has been parsed so a blank field can be told apart from a zero price.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreatePlanRequest {
    #[validate(length(min = 1, message = "Plan name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub plan_type: PlanType,
    #[serde(default)]
    pub billing_cycle: BillingCycle,
    #[serde(default, deserialize_with = "text_or_number")]
    #[validate(length(min = 1, message = "Price is required"))]
    pub price: String,
    #[serde(default)]
    pub duration_months: Option<i32>,
}

impl CreatePlanRequest {
    pub fn trimmed(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            price: self.price.trim().to_string(),
            ..self
        }
    }
}

/// The row written to the `subscription_plans` collection.
#[derive(Debug, Clone, Serialize)]
pub struct NewPlan {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub plan_type: PlanType,
    pub billing_cycle: BillingCycle,
    pub duration_months: i32,
    pub price: Money,
    pub is_active: bool,
}

impl NewPlan {
    /// Builds the insert row from an already validated request.
    pub fn from_request(request: &CreatePlanRequest) -> Result<Self, String> {
        let price = Money::parse(&request.price)
            .ok_or_else(|| format!("Invalid price: {}", request.price))?;

        let duration_months = request.duration_months.unwrap_or_else(default_duration_months);
        if duration_months < 1 {
            return Err("Duration must be at least one month".to_string());
        }

        Ok(Self {
            name: request.name.clone(),
            description: if request.description.is_empty() {
                None
            } else {
                Some(request.description.clone())
            },
            plan_type: request.plan_type,
            billing_cycle: request.billing_cycle,
            duration_months,
            price,
            is_active: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_price_in_json() {
        let request: CreatePlanRequest =
            serde_json::from_str(r#"{"name": "Gold", "price": 99.5}"#).unwrap();
        assert_eq!(request.price, "99.5");
        assert_eq!(request.plan_type, PlanType::Unlimited);
        assert_eq!(request.billing_cycle, BillingCycle::Monthly);
    }

    #[test]
    fn new_plan_parses_price_and_defaults_duration() {
        let request = CreatePlanRequest {
            name: "Gold".to_string(),
            price: "99.00".to_string(),
            billing_cycle: BillingCycle::Annual,
            ..Default::default()
        };

        let plan = NewPlan::from_request(&request).unwrap();
        assert_eq!(plan.price, Money::from_cents(9900));
        assert_eq!(plan.duration_months, 1);
        assert!(plan.is_active);
        assert!(plan.description.is_none());
    }

    #[test]
    fn new_plan_rejects_unparseable_price() {
        let request = CreatePlanRequest {
            name: "Gold".to_string(),
            price: "ninety".to_string(),
            ..Default::default()
        };
        assert!(NewPlan::from_request(&request).is_err());
    }

    #[test]
    fn null_columns_decode_to_defaults() {
        let plan: SubscriptionPlan = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "name": "Legacy",
            "description": null,
            "price": "45.00",
            "plan_type": "unlimited",
            "billing_cycle": "monthly",
            "duration_months": null,
            "is_active": null,
            "created_at": "2026-01-01T00:00:00Z",
        }))
        .unwrap();

        assert_eq!(plan.duration_months, 1);
        assert!(!plan.is_active);
    }

    #[test]
    fn billing_period_suffixes() {
        assert_eq!(BillingCycle::Monthly.period(), "month");
        assert_eq!(BillingCycle::Quarterly.period(), "quarter");
        assert_eq!(BillingCycle::OneTime.period(), "once");
    }
}
