mod common;

use axum::http::StatusCode;
use common::*;
use gym_admin::{
    domain::{CreateMemberRequest, Gender, MemberStatus},
    error::AppError,
};
use serde_json::json;

async fn seed_roster(app: &TestApp) -> anyhow::Result<()> {
    app.insert("members", member_row("Ada Lovelace", "ada@example.com", "EF123456001", "active", "2026-01-05")).await?;
    app.insert("members", member_row("Grace Hopper", "grace@navy.mil", "EF654321002", "frozen", "2026-02-11")).await?;
    app.insert("members", member_row("Alan Turing", "alan@bletchley.uk", "EF111111003", "expired", "2025-11-20")).await?;
    Ok(())
}

#[tokio::test]
async fn test_create_member_through_service() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let service = &app.context.member_service;

    let created = service
        .create(CreateMemberRequest {
            full_name: "  Katherine Johnson ".to_string(),
            email: "kj@nasa.gov".to_string(),
            phone: "555-0100".to_string(),
            date_of_birth: "1918-08-26".to_string(),
            gender: Gender::Female,
            ..Default::default()
        })
        .await?;

    assert_eq!(created.full_name, "Katherine Johnson");
    assert_eq!(created.status, MemberStatus::Active);
    assert_eq!(created.member_number.len(), 11);
    assert!(created.member_number.starts_with("EF"));
    assert_eq!(created.address, None);

    // Read it back with its (empty) payment history
    let detail = service.get(created.id).await?;
    assert_eq!(detail.member.email, "kj@nasa.gov");
    assert!(detail.payments.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_create_member_without_required_fields_writes_nothing() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let service = &app.context.member_service;

    let result = service
        .create(CreateMemberRequest {
            full_name: "   ".to_string(),
            email: "someone@example.com".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(AppError::Validation(ref m)) if m.contains("Full name is required")));

    let result = service
        .create(CreateMemberRequest {
            full_name: "No Email".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let result = service
        .create(CreateMemberRequest {
            full_name: "Bad Birthday".to_string(),
            email: "bd@example.com".to_string(),
            date_of_birth: "26/08/1918".to_string(),
            ..Default::default()
        })
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    assert!(app.backend.rows("members").await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_member_page_form_adds_member() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let cookie = app.login_admin().await?;
    let token = app.csrf_token(&cookie).await?;

    let response = app
        .post_form(
            "/dashboard/members",
            Some(&cookie),
            &[
                ("csrf_token", &token),
                ("full_name", "Mary Jackson"),
                ("email", "mary@nasa.gov"),
                ("gender", "female"),
                ("city", "Hampton"),
            ],
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Mary Jackson added with member number EF"));

    let rows = app.backend.rows("members").await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["city"], "Hampton");
    assert_eq!(rows[0]["status"], "active");

    Ok(())
}

#[tokio::test]
async fn test_member_page_form_keeps_input_on_error() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let cookie = app.login_admin().await?;
    let token = app.csrf_token(&cookie).await?;

    let response = app
        .post_form(
            "/dashboard/members",
            Some(&cookie),
            &[("csrf_token", &token), ("full_name", ""), ("email", "kept@example.com")],
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Full name is required"));
    assert!(html.contains("kept@example.com"));
    assert!(app.backend.rows("members").await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_member_form_rejects_missing_token() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let cookie = app.login_admin().await?;

    let response = app
        .post_form(
            "/dashboard/members",
            Some(&cookie),
            &[("full_name", "Mallory"), ("email", "mallory@example.com")],
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.backend.rows("members").await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_member_page_filters() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    seed_roster(&app).await?;
    let cookie = app.login_admin().await?;

    let html = body_text(app.get("/dashboard/members?q=ADA&status=all", Some(&cookie)).await?).await?;
    assert!(html.contains("Ada Lovelace"));
    assert!(!html.contains("Grace Hopper"));

    let html = body_text(app.get("/dashboard/members?status=frozen", Some(&cookie)).await?).await?;
    assert!(html.contains("Grace Hopper"));
    assert!(!html.contains("Ada Lovelace"));
    assert!(!html.contains("Alan Turing"));

    let html = body_text(app.get("/dashboard/members?q=zzz", Some(&cookie)).await?).await?;
    assert!(html.contains("No members found"));

    // Unknown statuses are reported and the full list is shown
    let html = body_text(app.get("/dashboard/members?status=vip", Some(&cookie)).await?).await?;
    assert!(html.contains("Unknown member status: vip"));
    assert!(html.contains("Alan Turing"));

    Ok(())
}

#[tokio::test]
async fn test_members_api_filters() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    seed_roster(&app).await?;
    let cookie = app.login_admin().await?;

    let body = body_json(app.get("/api/members?q=navy", Some(&cookie)).await?).await?;
    assert_eq!(body["members"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["members"][0]["full_name"], "Grace Hopper");

    let response = app.get("/api/members?status=vip", Some(&cookie)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send_json(
            "POST",
            "/api/members",
            &cookie,
            json!({ "full_name": "Dorothy Vaughan", "email": "dv@nasa.gov" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await?;
    assert_eq!(created["status"], "active");

    Ok(())
}

#[tokio::test]
async fn test_null_gender_does_not_hide_the_directory() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    seed_roster(&app).await?;
    let mut row = member_row("Mary Jackson", "mary@nasa.gov", "EF222222004", "active", "2026-03-02");
    row["gender"] = serde_json::Value::Null;
    app.insert("members", row).await?;

    let members = app.context.member_service.list().await?;
    assert_eq!(members.len(), 4);
    let mary = members
        .iter()
        .find(|m| m.full_name == "Mary Jackson")
        .ok_or_else(|| anyhow::anyhow!("member missing from list"))?;
    assert_eq!(mary.gender, Gender::PreferNotToSay);

    let cookie = app.login_admin().await?;
    let html = body_text(app.get("/dashboard/members", Some(&cookie)).await?).await?;
    assert!(html.contains("Mary Jackson"));
    assert!(html.contains("Ada Lovelace"));
    assert!(!html.contains("Could not load members"));

    Ok(())
}

#[tokio::test]
async fn test_search_keeps_surrounding_spaces() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    seed_roster(&app).await?;
    let cookie = app.login_admin().await?;

    let body = body_json(app.get("/api/members?q=%20%20turing%20%20", Some(&cookie)).await?).await?;
    assert_eq!(body["members"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["total"], 3);

    let body = body_json(app.get("/api/members?q=alan%20tur", Some(&cookie)).await?).await?;
    assert_eq!(body["members"][0]["full_name"], "Alan Turing");

    Ok(())
}

#[tokio::test]
async fn test_member_list_failure_is_shown_as_warning() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    seed_roster(&app).await?;
    let cookie = app.login_admin().await?;

    app.backend.fail_table("members").await;
    let response = app.get("/dashboard/members", Some(&cookie)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Could not load members"));
    assert!(html.contains("No members found"));

    app.backend.clear_failures().await;
    let html = body_text(app.get("/dashboard/members", Some(&cookie)).await?).await?;
    assert!(html.contains("Ada Lovelace"));

    Ok(())
}

#[tokio::test]
async fn test_member_detail_shows_payments() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let cookie = app.login_admin().await?;
    let member = app
        .insert("members", member_row("Ada Lovelace", "ada@example.com", "EF123456001", "active", "2026-01-05"))
        .await?;
    let member_id = member["id"].as_str().unwrap_or_default().to_string();

    app.insert(
        "payments",
        json!({
            "member_id": member_id,
            "amount": 49.5,
            "status": "successful",
            "payment_method": "card",
            "invoice_number": "INV-1001",
            "payment_date": "2026-02-01T10:00:00Z",
        }),
    )
    .await?;

    let response = app.get(&format!("/dashboard/members/{}", member_id), Some(&cookie)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Ada Lovelace"));
    assert!(html.contains("INV-1001"));
    assert!(html.contains("$49.50"));
    assert!(html.contains("Not provided"));

    let missing = uuid::Uuid::new_v4();
    let response = app.get(&format!("/dashboard/members/{}", missing), Some(&cookie)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}
