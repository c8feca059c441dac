mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, json_body, TestApp};
use serde_json::json;
use uuid::Uuid;

async fn seed_contract(app: &TestApp, token: &str, code: &str) -> Result<String> {
    let created = app
        .post_json(
            "/api/contracts",
            &json!({
                "code": code,
                "description": "Contrato marco",
                "startDate": "2025-01-01",
                "endDate": "2025-12-31",
                "clientName": "Cliente Principal S.A.",
                "amount": 10000.00
            }),
            Some(token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created.into_body()).await?;
    Ok(body["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn new_projects_default_their_statuses() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let manager_id = app
        .insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let contract_id = seed_contract(&app, &token, "C-001").await?;

    let created = app
        .post_json(
            "/api/projects",
            &json!({
                "code": "P-001",
                "contractId": contract_id,
                "managerId": manager_id,
                "fechaSolicitud": "2025-01-05"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = json_body(created.into_body()).await?;
    assert_eq!(body["companyStatus"], "INACTIVA");
    assert_eq!(body["documentationStatus"], "NO_VERIFICADA");
    assert_eq!(body["contract"]["code"], "C-001");
    assert_eq!(body["manager"]["email"], "gestor@coordina.test");
    assert_eq!(body["companyIds"], json!([]));

    // Project codes are unique too.
    let duplicate = app
        .post_json(
            "/api/projects",
            &json!({
                "code": "P-001",
                "contractId": contract_id,
                "managerId": manager_id,
                "fechaSolicitud": "2025-01-06"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(duplicate.status(), StatusCode::BAD_REQUEST);
    let body = json_body(duplicate.into_body()).await?;
    assert!(body["fields"]["code"].is_string());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn manager_deletion_is_blocked_while_projects_reference_them() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let manager_id = app
        .insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let contract_id = seed_contract(&app, &token, "C-002").await?;

    let created = app
        .post_json(
            "/api/projects",
            &json!({
                "code": "P-010",
                "contractId": contract_id,
                "managerId": manager_id,
                "fechaSolicitud": "2025-01-05"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let project_id = json_body(created.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let blocked = app
        .delete(&format!("/api/users/{manager_id}"), Some(&token))
        .await?;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);

    // Once the project is gone the manager can be removed.
    let removed = app
        .delete(&format!("/api/projects/{project_id}"), Some(&token))
        .await?;
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);
    let unblocked = app
        .delete(&format!("/api/users/{manager_id}"), Some(&token))
        .await?;
    assert_eq!(unblocked.status(), StatusCode::NO_CONTENT);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn contract_deletion_cascades_and_work_center_deletion_clears() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let manager_id = app
        .insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let contract_id = seed_contract(&app, &token, "C-003").await?;

    let center = app
        .post_json(
            "/api/workcenters",
            &json!({
                "name": "Embalse del Guadalhorce",
                "type": "EMBALSE",
                "address": "Camino de la presa s/n",
                "zipCode": "29109",
                "phone": "952000000",
                "province": "MÁLAGA"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(center.status(), StatusCode::CREATED);
    let center_id = json_body(center.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let created = app
        .post_json(
            "/api/projects",
            &json!({
                "code": "P-020",
                "contractId": contract_id,
                "managerId": manager_id,
                "workCenterId": center_id,
                "fechaSolicitud": "2025-01-05"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let project_id = json_body(created.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Work-center removal leaves the project with the field cleared.
    let removed_center = app
        .delete(&format!("/api/workcenters/{center_id}"), Some(&token))
        .await?;
    assert_eq!(removed_center.status(), StatusCode::NO_CONTENT);
    let fetched = app
        .get(&format!("/api/projects/{project_id}"), Some(&token))
        .await?;
    assert_eq!(fetched.status(), StatusCode::OK);
    let body = json_body(fetched.into_body()).await?;
    assert!(body["workCenterId"].is_null());
    assert!(body["workCenter"].is_null());

    // Contract removal takes its projects with it.
    let removed_contract = app
        .delete(&format!("/api/contracts/{contract_id}"), Some(&token))
        .await?;
    assert_eq!(removed_contract.status(), StatusCode::NO_CONTENT);
    let gone = app
        .get(&format!("/api/projects/{project_id}"), Some(&token))
        .await?;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn relationship_sets_round_trip_through_the_write_shape() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let manager_id = app
        .insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let contract_id = seed_contract(&app, &token, "C-004").await?;

    let company = app
        .post_json(
            "/api/companies",
            &json!({ "name": "Construcciones del Sur S.L." }),
            Some(&token),
        )
        .await?;
    assert_eq!(company.status(), StatusCode::CREATED);
    let company_id = json_body(company.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let contact = app
        .post_json(
            "/api/contacts",
            &json!({
                "companyId": company_id,
                "firstName": "Carlos",
                "lastName": "García",
                "email": "carlos@empresa.test"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(contact.status(), StatusCode::CREATED);
    let contact_id = json_body(contact.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let created = app
        .post_json(
            "/api/projects",
            &json!({
                "code": "P-030",
                "contractId": contract_id,
                "managerId": manager_id,
                "fechaSolicitud": "2025-01-05",
                "companyIds": [company_id],
                "contactIds": [contact_id],
                "mainContactId": contact_id
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let read = json_body(created.into_body()).await?;
    let project_id = read["id"].as_str().unwrap().to_string();
    assert_eq!(read["companies"][0]["name"], "Construcciones del Sur S.L.");
    assert_eq!(read["contacts"][0]["firstName"], "Carlos");

    // Feed the read shape's id fields back through a full update.
    let write_back = json!({
        "code": read["code"],
        "description": read["description"],
        "startDate": read["startDate"],
        "endDate": read["endDate"],
        "contractId": read["contractId"],
        "workCenterId": read["workCenterId"],
        "managerId": read["managerId"],
        "companyIds": read["companyIds"],
        "contactIds": read["contactIds"],
        "fechaSolicitud": read["fechaSolicitud"],
        "mainContactId": read["mainContactId"],
        "contractManagerId": read["contractManagerId"],
        "companyStatus": read["companyStatus"],
        "documentationStatus": read["documentationStatus"]
    });
    let updated = app
        .put_json(&format!("/api/projects/{project_id}"), &write_back, Some(&token))
        .await?;
    assert_eq!(updated.status(), StatusCode::OK);
    let reread = json_body(updated.into_body()).await?;
    assert_eq!(reread["companyIds"], read["companyIds"]);
    assert_eq!(reread["contactIds"], read["contactIds"]);
    assert_eq!(reread["mainContactId"], read["mainContactId"]);
    assert_eq!(reread["companyStatus"], read["companyStatus"]);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn partial_updates_are_idempotent() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let manager_id = app
        .insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let contract_id = seed_contract(&app, &token, "C-005").await?;

    let created = app
        .post_json(
            "/api/projects",
            &json!({
                "code": "P-040",
                "contractId": contract_id,
                "managerId": manager_id,
                "fechaSolicitud": "2025-01-05"
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let project_id = json_body(created.into_body()).await?["id"]
        .as_str()
        .unwrap()
        .to_string();

    let patch = json!({ "companyStatus": "ACTIVA", "description": "Fase de ejecución" });
    let first = app
        .patch_json(&format!("/api/projects/{project_id}"), &patch, Some(&token))
        .await?;
    assert_eq!(first.status(), StatusCode::OK);
    let first_body = json_body(first.into_body()).await?;

    let second = app
        .patch_json(&format!("/api/projects/{project_id}"), &patch, Some(&token))
        .await?;
    assert_eq!(second.status(), StatusCode::OK);
    let second_body = json_body(second.into_body()).await?;

    assert_eq!(first_body, second_body);
    assert_eq!(second_body["companyStatus"], "ACTIVA");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn unresolvable_references_name_the_field() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let manager_id = app
        .insert_user("gestor@coordina.test", "clave", "MANAGER")
        .await?;
    let token = app.login_token("gestor@coordina.test", "clave").await?;
    let contract_id = seed_contract(&app, &token, "C-006").await?;

    let created = app
        .post_json(
            "/api/projects",
            &json!({
                "code": "P-050",
                "contractId": contract_id,
                "managerId": manager_id,
                "fechaSolicitud": "2025-01-05",
                "companyIds": [Uuid::new_v4()]
            }),
            Some(&token),
        )
        .await?;
    assert_eq!(created.status(), StatusCode::BAD_REQUEST);
    let body = json_body(created.into_body()).await?;
    assert!(body["fields"]["companyIds"].is_string());

    app.cleanup().await?;
    Ok(())
}
