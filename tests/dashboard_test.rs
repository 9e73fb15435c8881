mod common;

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use common::*;
use gym_admin::domain::Money;
use serde_json::json;

async fn seed_month(app: &TestApp) -> anyhow::Result<String> {
    let ada = app
        .insert("members", member_row("Ada Lovelace", "ada@example.com", "EF000001001", "active", "2026-03-01"))
        .await?;
    app.insert("members", member_row("Grace Hopper", "grace@navy.mil", "EF000002002", "active", "2026-03-14")).await?;
    app.insert("members", member_row("Alan Turing", "alan@bletchley.uk", "EF000003003", "frozen", "2026-02-28")).await?;
    app.insert("members", member_row("Edsger Dijkstra", "ewd@utexas.edu", "EF000004004", "expired", "2025-06-01")).await?;
    let ada_id = ada["id"].as_str().unwrap_or_default().to_string();

    for (amount, status, date) in [
        (100.0, "successful", "2026-03-02T10:00:00Z"),
        (50.0, "pending", "2026-03-10T10:00:00Z"),
        (70.0, "successful", "2026-02-27T10:00:00Z"),
        (30.5, "successful", "2026-03-31T23:59:59Z"),
        (12.0, "successful", "2026-04-01T00:00:00Z"),
    ] {
        app.insert(
            "payments",
            json!({
                "member_id": ada_id,
                "amount": amount,
                "status": status,
                "payment_date": date,
            }),
        )
        .await?;
    }

    for (status, end_date) in [
        ("active", "2026-03-20"),
        ("active", "2026-04-14"),
        ("active", "2026-05-30"),
        ("cancelled", "2026-03-20"),
    ] {
        app.insert(
            "member_subscriptions",
            json!({
                "member_id": ada_id,
                "status": status,
                "start_date": "2026-01-01",
                "end_date": end_date,
            }),
        )
        .await?;
    }

    Ok(ada_id)
}

#[tokio::test]
async fn test_summary_counts_for_the_month() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    seed_month(&app).await?;
    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();

    let summary = app.context.dashboard_service.summary_at(now).await;

    assert!(summary.warnings.is_empty());
    assert_eq!(summary.stats.total_members, 4);
    assert_eq!(summary.stats.active_members, 2);
    assert_eq!(summary.stats.monthly_revenue, Money::from_cents(13050));
    assert_eq!(summary.stats.new_members_this_month, 2);
    // Active subscriptions ending within the next 30 days
    assert_eq!(summary.stats.expiring_subscriptions, 2);

    Ok(())
}

#[tokio::test]
async fn test_recent_activity_is_newest_first_and_capped() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let ada_id = seed_month(&app).await?;

    for day in 1..=12 {
        app.insert(
            "check_ins",
            json!({
                "member_id": ada_id,
                "check_in_time": format!("2026-03-{:02}T07:30:00Z", day),
            }),
        )
        .await?;
    }
    // A check-in whose member row is gone
    app.insert(
        "check_ins",
        json!({
            "member_id": uuid::Uuid::new_v4(),
            "check_in_time": "2026-03-13T07:30:00Z",
        }),
    )
    .await?;

    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let summary = app.context.dashboard_service.summary_at(now).await;

    assert_eq!(summary.recent_activity.len(), 10);
    assert_eq!(summary.recent_activity[0].message, "Member checked in");
    assert_eq!(summary.recent_activity[1].message, "Ada Lovelace checked in");
    assert!(summary
        .recent_activity
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));

    Ok(())
}

#[tokio::test]
async fn test_failed_read_only_blanks_its_own_figure() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    seed_month(&app).await?;
    app.backend.fail_table("payments").await;

    let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
    let summary = app.context.dashboard_service.summary_at(now).await;

    assert_eq!(summary.stats.monthly_revenue, Money::ZERO);
    assert_eq!(summary.warnings.len(), 1);
    assert_eq!(summary.stats.total_members, 4);
    assert_eq!(summary.stats.new_members_this_month, 2);
    assert_eq!(summary.stats.expiring_subscriptions, 2);

    Ok(())
}

#[tokio::test]
async fn test_overview_page_renders_with_warnings() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let cookie = app.login_admin().await?;
    app.backend.fail_table("check_ins").await;

    let response = app.get("/dashboard", Some(&cookie)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Monthly Revenue"));
    assert!(html.contains("$0.00"));
    assert!(html.contains("notice-warning"));

    let body = body_json(app.get("/api/dashboard", Some(&cookie)).await?).await?;
    assert_eq!(body["stats"]["total_members"], 0);
    assert_eq!(body["warnings"].as_array().map(Vec::len), Some(1));

    Ok(())
}

#[tokio::test]
async fn test_placeholder_sections() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let cookie = app.login_admin().await?;

    for path in ["/dashboard/schedule", "/dashboard/staff"] {
        let response = app.get(path, Some(&cookie)).await?;
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
    }

    Ok(())
}
