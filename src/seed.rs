//! Demo data for an empty backend: plans, members with subscriptions,
//! payments and a morning's worth of check-ins.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use fake::{
    faker::{
        address::en::{CityName, StreetName},
        name::en::{FirstName, LastName},
        phone_number::en::PhoneNumber,
    },
    Fake,
};
use rand::{seq::SliceRandom, Rng};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    backend::RecordStore,
    domain::{Gender, MemberStatus, PaymentStatus},
    error::Result,
    service::member_service::member_number_from,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct SeedReport {
    pub plans: usize,
    pub members: usize,
    pub payments: usize,
    pub check_ins: usize,
}

struct PlanSeed {
    name: &'static str,
    description: &'static str,
    cents: i64,
    plan_type: &'static str,
    billing_cycle: &'static str,
    duration_months: i32,
}

const PLANS: &[PlanSeed] = &[
    PlanSeed {
        name: "Basic Monthly",
        description: "Unlimited gym floor access",
        cents: 4999,
        plan_type: "unlimited",
        billing_cycle: "monthly",
        duration_months: 1,
    },
    PlanSeed {
        name: "Premium Quarterly",
        description: "Gym floor, classes and sauna",
        cents: 12900,
        plan_type: "unlimited",
        billing_cycle: "quarterly",
        duration_months: 3,
    },
    PlanSeed {
        name: "10 Class Pack",
        description: "Ten group classes, valid for two months",
        cents: 15000,
        plan_type: "class_pack",
        billing_cycle: "one_time",
        duration_months: 2,
    },
    PlanSeed {
        name: "Personal Training",
        description: "Four one-hour sessions a month",
        cents: 32000,
        plan_type: "personal_training",
        billing_cycle: "monthly",
        duration_months: 1,
    },
];

const PAYMENT_METHODS: &[&str] = &["card", "cash", "bank_transfer"];

fn dollars(cents: i64) -> f64 {
    cents as f64 / 100.0
}

fn pick_status(rng: &mut impl Rng) -> MemberStatus {
    match rng.gen_range(0..20) {
        0..=13 => MemberStatus::Active,
        14..=15 => MemberStatus::Frozen,
        16..=18 => MemberStatus::Expired,
        _ => MemberStatus::Cancelled,
    }
}

fn pick_payment_status(rng: &mut impl Rng) -> PaymentStatus {
    match rng.gen_range(0..10) {
        0..=7 => PaymentStatus::Successful,
        8 => PaymentStatus::Pending,
        _ => PaymentStatus::Failed,
    }
}

fn days_ago(now: DateTime<Utc>, rng: &mut impl Rng, max_days: i64) -> DateTime<Utc> {
    now - Duration::minutes(rng.gen_range(0..max_days.max(1) * 24 * 60))
}

/// Inserts `member_count` fake members plus everything that hangs off them.
pub async fn seed_demo_data(store: &dyn RecordStore, member_count: usize) -> Result<SeedReport> {
    let now = Utc::now();
    let today = now.date_naive();
    let mut report = SeedReport::default();

    let mut plans: Vec<(Uuid, &PlanSeed)> = Vec::new();
    for (i, plan) in PLANS.iter().enumerate() {
        let row = store
            .insert(
                "subscription_plans",
                json!({
                    "name": plan.name,
                    "description": plan.description,
                    "price": dollars(plan.cents),
                    "plan_type": plan.plan_type,
                    "billing_cycle": plan.billing_cycle,
                    "duration_months": plan.duration_months,
                    "is_active": true,
                    "created_at": now - Duration::days(400 - i as i64),
                }),
            )
            .await?;
        plans.push((row_id(&row)?, plan));
        report.plans += 1;
    }

    // Rows are generated up front so the thread-local RNG never lives across
    // an await point.
    let base_millis = now.timestamp_millis() - member_count as i64;
    let members: Vec<(Value, MemberStatus, NaiveDate)> = {
        let mut rng = rand::thread_rng();
        (0..member_count)
            .map(|i| {
                let first: String = FirstName().fake_with_rng(&mut rng);
                let last: String = LastName().fake_with_rng(&mut rng);
                let status = pick_status(&mut rng);
                let joined = days_ago(now, &mut rng, 420);
                let gender = *Gender::ALL.choose(&mut rng).unwrap_or(&Gender::PreferNotToSay);
                let birth_year = rng.gen_range(1965..2006);
                let row = json!({
                    "member_number": member_number_from(base_millis + i as i64, rng.gen_range(0..1000)),
                    "full_name": format!("{} {}", first, last),
                    "email": format!("{}.{}{}@example.com", first.to_lowercase(), last.to_lowercase(), i),
                    "phone": PhoneNumber().fake_with_rng::<String, _>(&mut rng),
                    "date_of_birth": format!("{}-{:02}-{:02}", birth_year, rng.gen_range(1..13), rng.gen_range(1..29)),
                    "gender": gender,
                    "address": format!("{} {}", rng.gen_range(1..999), StreetName().fake_with_rng::<String, _>(&mut rng)),
                    "city": CityName().fake_with_rng::<String, _>(&mut rng),
                    "emergency_contact_name": format!("{} {}", FirstName().fake_with_rng::<String, _>(&mut rng), last),
                    "emergency_contact_phone": PhoneNumber().fake_with_rng::<String, _>(&mut rng),
                    "status": status,
                    "join_date": joined.date_naive(),
                    "created_at": joined,
                });
                (row, status, joined.date_naive())
            })
            .collect()
    };

    let mut member_ids = Vec::with_capacity(members.len());
    for (row, status, join_date) in members {
        let created = store.insert("members", row).await?;
        let member_id = row_id(&created)?;
        member_ids.push(member_id);
        report.members += 1;

        let (subscription, payments) = {
            let mut rng = rand::thread_rng();
            let (plan_id, plan) = plans[rng.gen_range(0..plans.len())];
            let end_date = today + Duration::days(rng.gen_range(-20..120));
            let subscription = json!({
                "member_id": member_id,
                "plan_id": plan_id,
                "start_date": join_date,
                "end_date": end_date,
                "status": if status == MemberStatus::Active { "active" } else { "inactive" },
            });

            let payments: Vec<Value> = (0..rng.gen_range(1..4))
                .map(|_| {
                    json!({
                        "member_id": member_id,
                        "amount": dollars(plan.cents),
                        "status": pick_payment_status(&mut rng),
                        "payment_method": PAYMENT_METHODS.choose(&mut rng).copied().unwrap_or("card"),
                        "invoice_number": format!("INV-{:06}", rng.gen_range(0..1_000_000)),
                        "payment_date": days_ago(now, &mut rng, 75),
                    })
                })
                .collect();
            (subscription, payments)
        };

        store.insert("member_subscriptions", subscription).await?;
        for payment in payments {
            store.insert("payments", payment).await?;
            report.payments += 1;
        }
    }

    let check_ins: Vec<Value> = {
        let mut rng = rand::thread_rng();
        member_ids
            .choose_multiple(&mut rng, member_ids.len().min(15))
            .map(|member_id| {
                json!({
                    "member_id": member_id,
                    "check_in_time": now - Duration::minutes(rng.gen_range(0..36 * 60)),
                })
            })
            .collect()
    };
    for check_in in check_ins {
        store.insert("check_ins", check_in).await?;
        report.check_ins += 1;
    }

    tracing::info!(
        "Seeded {} plans, {} members, {} payments, {} check-ins",
        report.plans,
        report.members,
        report.payments,
        report.check_ins
    );
    Ok(report)
}

fn row_id(row: &Value) -> Result<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|id| Uuid::parse_str(id).ok())
        .ok_or_else(|| crate::error::AppError::Backend("Inserted row has no id".to_string()))
}
