mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, json_body, TestApp};
use serde_json::json;

async fn seed_project(app: &TestApp, token: &str, manager_id: uuid::Uuid) -> Result<String> {
    let contract = app
        .post_json(
            "/api/contracts",
            &json!({
                "code": "C-100",
                "description": "Contrato",
                "startDate": "2025-01-01",
                "endDate": "2025-12-31",
                "clientName": "Cliente",
                "amount": "10000.00"
            }),
            Some(token),
        )
        .await?;
    assert_eq!(contract.status(), StatusCode::CREATED);
    let contract_id = json_body(contract.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let project = app
        .post_json(
            "/api/projects",
            &json!({
                "code": "P-100",
                "contractId": contract_id,
                "managerId": manager_id,
                "fechaSolicitud": "2025-01-05"
            }),
            Some(token),
        )
        .await?;
    assert_eq!(project.status(), StatusCode::CREATED);
    Ok(json_body(project.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string())
}

#[tokio::test]
async fn documents_default_to_draft_and_stamp_status_changes() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let manager_id = app
        .insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let project_id = seed_project(&app, &token, manager_id).await?;

    let created = app
        .post_json(
            "/api/documents",
            &json!({
                "projectId": project_id,
                "name": "Anexo I",
                "url": "data:application/pdf;base64,JVBERi0xLjQ="
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created.into_body()).await?;
    assert_eq!(body["status"], "BORRADOR");
    assert!(body["statusDate"].is_null());
    // The uploader defaults to the caller.
    assert!(body["uploadedById"].is_string());
    let document_id = body["id"].as_str().unwrap().to_string();

    let submitted = app
        .patch_json(
            &format!("/api/documents/{document_id}"),
            &json!({ "status": "PRESENTADO" }),
            Some(&token),
        )
        .await?;
    assert_eq!(submitted.status(), StatusCode::OK);
    let body = json_body(submitted.into_body()).await?;
    assert_eq!(body["status"], "PRESENTADO");
    assert!(body["statusDate"].is_string());

    // Repeating the same status keeps the previous stamp.
    let stamp = body["statusDate"].clone();
    let repeated = app
        .patch_json(
            &format!("/api/documents/{document_id}"),
            &json!({ "status": "PRESENTADO" }),
            Some(&token),
        )
        .await?;
    assert_eq!(repeated.status(), StatusCode::OK);
    let body = json_body(repeated.into_body()).await?;
    assert_eq!(body["statusDate"], stamp);

    // Out-of-set statuses are rejected.
    let invalid = app
        .patch_json(
            &format!("/api/documents/{document_id}"),
            &json!({ "status": "INVENTADO" }),
            Some(&token),
        )
        .await?;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    let body = json_body(invalid.into_body()).await?;
    assert!(body["fields"]["status"].is_string());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn documents_filter_by_project_and_cascade_with_it() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let manager_id = app
        .insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let project_id = seed_project(&app, &token, manager_id).await?;

    for name in ["Anexo I", "Listado de trabajadores"] {
        let created = app
            .post_json(
                "/api/documents",
                &json!({
                    "projectId": project_id,
                    "name": name,
                    "url": "https://storage.example.com/doc.pdf"
                }),
                Some(&token),
            )
            .await?;
        assert_eq!(created.status(), StatusCode::CREATED);
    }

    let listed = app
        .get(&format!("/api/documents?projectId={project_id}"), Some(&token))
        .await?;
    assert_eq!(listed.status(), StatusCode::OK);
    let body = json_body(listed.into_body()).await?;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let removed = app
        .delete(&format!("/api/projects/{project_id}"), Some(&token))
        .await?;
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let listed = app
        .get(&format!("/api/documents?projectId={project_id}"), Some(&token))
        .await?;
    let body = json_body(listed.into_body()).await?;
    assert_eq!(body.as_array().unwrap().len(), 0);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn templates_require_valid_base64_payloads() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;

    let invalid = app
        .post_json(
            "/api/templates",
            &json!({
                "name": "Acta de reunión",
                "category": "Actas",
                "fileData": "esto no es base64 válido!!!",
                "fileName": "acta.docx"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let created = app
        .post_json(
            "/api/templates",
            &json!({
                "name": "Acta de reunión",
                "category": "Actas",
                "fileData": "UEsDBBQABgAIAA==",
                "fileName": "acta.docx"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created.into_body()).await?;
    assert!(body["updatedAt"].is_string());
    let template_id = body["id"].as_str().unwrap().to_string();
    let first_updated = body["updatedAt"].clone();

    let renamed = app
        .patch_json(
            &format!("/api/templates/{template_id}"),
            &json!({ "name": "Acta de reunión v2" }),
            Some(&token),
        )
        .await?;
    assert_eq!(renamed.status(), StatusCode::OK);
    let body = json_body(renamed.into_body()).await?;
    assert_eq!(body["name"], "Acta de reunión v2");
    assert_ne!(body["updatedAt"], first_updated);

    app.cleanup().await?;
    Ok(())
}
