mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, json_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn contract_codes_are_unique() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;

    let payload = json!({
        "code": "C-001",
        "description": "Contrato marco de mantenimiento",
        "startDate": "2025-01-01",
        "endDate": "2025-12-31",
        "clientName": "Cliente Principal S.A.",
        "amount": 10000.00
    });

    let created = app.post_json("/api/contracts", &payload, Some(&token)).await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created.into_body()).await?;
    assert_eq!(body["code"], "C-001");
    assert_eq!(body["amount"], "10000.00");

    let duplicate = app.post_json("/api/contracts", &payload, Some(&token)).await?;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    let body = json_body(duplicate.into_body()).await?;
    assert!(body["fields"]["code"].is_string());

    // Updating another contract into the same code collides too.
    let second = app
        .post_json(
            "/api/contracts",
            &json!({
                "code": "C-002",
                "description": "Otro contrato",
                "startDate": "2025-02-01",
                "endDate": "2025-11-30",
                "clientName": "Cliente Secundario S.L.",
                "amount": "5000.00"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(second.status(), StatusCode::CREATED);
    let second_body = json_body(second.into_body()).await?;
    let second_id = second_body["id"].as_str().unwrap().to_string();

    let collision = app
        .patch_json(
            &format!("/api/contracts/{second_id}"),
            &json!({ "code": "C-001" }),
            Some(&token),
        )
        .await?;
    assert_eq!(collision.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn missing_fields_are_reported_together() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;

    let incomplete = app
        .post_json(
            "/api/contracts",
            &json!({ "startDate": "01/01/2025" }),
            Some(&token),
        )
        .await?;
    assert_eq!(incomplete.status(), StatusCode::BAD_REQUEST);
    let body = json_body(incomplete.into_body()).await?;
    let fields = body["fields"].as_object().unwrap();
    assert!(fields.contains_key("code"));
    assert!(fields.contains_key("description"));
    assert!(fields.contains_key("startDate"));
    assert!(fields.contains_key("endDate"));
    assert!(fields.contains_key("clientName"));
    assert!(fields.contains_key("amount"));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn deleting_a_coordinator_clears_the_reference() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let coordinator_id = app
        .insert_user("coord@coordina.test", "clave", "COORDINATOR")
        .await?;

    let created = app
        .post_json(
            "/api/contracts",
            &json!({
                "code": "C-010",
                "description": "Contrato coordinado",
                "startDate": "2025-01-01",
                "endDate": "2025-12-31",
                "clientName": "Cliente",
                "amount": "1200.50",
                "coordinatorId": coordinator_id
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created.into_body()).await?;
    let contract_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["coordinatorId"], json!(coordinator_id));

    let deleted = app
        .delete(&format!("/api/users/{coordinator_id}"), Some(&token))
        .await?;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let fetched = app
        .get(&format!("/api/contracts/{contract_id}"), Some(&token))
        .await?;
    assert_eq!(fetched.status(), StatusCode::OK);
    let body = json_body(fetched.into_body()).await?;
    assert!(body["coordinatorId"].is_null());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn unknown_coordinator_fails_reference_resolution() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;

    let created = app
        .post_json(
            "/api/contracts",
            &json!({
                "code": "C-404",
                "description": "Contrato",
                "startDate": "2025-01-01",
                "endDate": "2025-12-31",
                "clientName": "Cliente",
                "amount": "100.00",
                "coordinatorId": uuid::Uuid::new_v4()
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::BAD_REQUEST);
    let body = json_body(created.into_body()).await?;
    assert!(body["fields"]["coordinatorId"].is_string());

    app.cleanup().await?;
    Ok(())
}
