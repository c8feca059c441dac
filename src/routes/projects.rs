use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use diesel::{dsl::exists, prelude::*, result::DatabaseErrorKind, select, PgConnection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{
        Company, CompanyContact, Contract, NewProject, NewProjectCompany, NewProjectContact,
        Project, User, WorkCenter, COMPANY_STATUSES, DEFAULT_COMPANY_STATUS,
        DEFAULT_DOCUMENTATION_STATUS, DOCUMENTATION_STATUSES,
    },
    schema::{
        companies, company_contacts, contracts, project_companies, project_contacts, projects,
        users, work_centers,
    },
    state::AppState,
    validate::{check_choice, choice_or_default, optional_str, parse_date, require_str},
};

use super::companies::{to_company_response, CompanyResponse};
use super::contacts::ContactResponse;
use super::contracts::ContractResponse;
use super::to_iso;
use super::users::UserResponse;
use super::workcenters::WorkCenterResponse;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub contract: ContractResponse,
    pub contract_id: Uuid,
    pub work_center: Option<WorkCenterResponse>,
    pub work_center_id: Option<Uuid>,
    pub manager: UserResponse,
    pub manager_id: Uuid,
    pub companies: Vec<CompanyResponse>,
    pub company_ids: Vec<Uuid>,
    pub contacts: Vec<ContactResponse>,
    pub contact_ids: Vec<Uuid>,
    pub fecha_solicitud: String,
    pub created_at: String,
    pub main_contact_id: Option<Uuid>,
    pub contract_manager_id: Option<Uuid>,
    pub company_status: String,
    pub documentation_status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub code: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub contract_id: Option<Uuid>,
    pub work_center_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub company_ids: Option<Vec<Uuid>>,
    pub contact_ids: Option<Vec<Uuid>>,
    pub fecha_solicitud: Option<String>,
    pub main_contact_id: Option<Uuid>,
    pub contract_manager_id: Option<Uuid>,
    pub company_status: Option<String>,
    pub documentation_status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchProjectRequest {
    pub code: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<Option<String>>,
    #[serde(default)]
    pub end_date: Option<Option<String>>,
    pub contract_id: Option<Uuid>,
    #[serde(default)]
    pub work_center_id: Option<Option<Uuid>>,
    pub manager_id: Option<Uuid>,
    pub company_ids: Option<Vec<Uuid>>,
    pub contact_ids: Option<Vec<Uuid>>,
    pub fecha_solicitud: Option<String>,
    #[serde(default)]
    pub main_contact_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub contract_manager_id: Option<Option<Uuid>>,
    pub company_status: Option<String>,
    pub documentation_status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub contract_id: Option<Uuid>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = projects)]
struct ProjectChangeset {
    code: Option<String>,
    description: Option<String>,
    start_date: Option<Option<NaiveDate>>,
    end_date: Option<Option<NaiveDate>>,
    contract_id: Option<Uuid>,
    work_center_id: Option<Option<Uuid>>,
    manager_id: Option<Uuid>,
    fecha_solicitud: Option<NaiveDate>,
    main_contact_id: Option<Option<Uuid>>,
    contract_manager_id: Option<Option<Uuid>>,
    company_status: Option<String>,
    documentation_status: Option<String>,
}

impl ProjectChangeset {
    fn has_changes(&self) -> bool {
        self.code.is_some()
            || self.description.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.contract_id.is_some()
            || self.work_center_id.is_some()
            || self.manager_id.is_some()
            || self.fecha_solicitud.is_some()
            || self.main_contact_id.is_some()
            || self.contract_manager_id.is_some()
            || self.company_status.is_some()
            || self.documentation_status.is_some()
    }
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectListQuery>,
) -> AppResult<Json<Vec<ProjectResponse>>> {
    let mut conn = state.db()?;
    let mut statement = projects::table.order(projects::created_at.desc()).into_boxed();
    if let Some(contract_id) = query.contract_id {
        statement = statement.filter(projects::contract_id.eq(contract_id));
    }
    let rows: Vec<Project> = statement.load(&mut conn)?;
    let response = build_responses(&mut conn, rows)?;
    Ok(Json(response))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectResponse>)> {
    let mut errors = FieldErrors::new();
    let code = require_str(&mut errors, "code", payload.code.as_deref());
    let fecha_solicitud =
        parse_date(&mut errors, "fechaSolicitud", payload.fecha_solicitud.as_deref());
    let start_date = parse_optional_date(&mut errors, "startDate", payload.start_date.as_deref());
    let end_date = parse_optional_date(&mut errors, "endDate", payload.end_date.as_deref());
    if payload.contract_id.is_none() {
        errors.insert("contractId".to_string(), "este campo es obligatorio".to_string());
    }
    if payload.manager_id.is_none() {
        errors.insert("managerId".to_string(), "este campo es obligatorio".to_string());
    }
    let company_status = choice_or_default(
        &mut errors,
        "companyStatus",
        payload.company_status.as_deref(),
        COMPANY_STATUSES,
        DEFAULT_COMPANY_STATUS,
    );
    let documentation_status = choice_or_default(
        &mut errors,
        "documentationStatus",
        payload.documentation_status.as_deref(),
        DOCUMENTATION_STATUSES,
        DEFAULT_DOCUMENTATION_STATUS,
    );
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let mut conn = state.db()?;
    let refs = resolve_references(
        &mut conn,
        payload.contract_id.unwrap(),
        payload.work_center_id,
        payload.manager_id.unwrap(),
        payload.main_contact_id,
        payload.contract_manager_id,
        payload.company_ids.clone().unwrap_or_default(),
        payload.contact_ids.clone().unwrap_or_default(),
    )?;
    let code = code.unwrap();
    ensure_unique_code(&mut conn, &code, None)?;

    let new_project = NewProject {
        id: Uuid::new_v4(),
        contract_id: refs.contract_id,
        code,
        description: optional_str(payload.description.as_deref()).unwrap_or_default(),
        start_date,
        end_date,
        work_center_id: refs.work_center_id,
        manager_id: refs.manager_id,
        fecha_solicitud: fecha_solicitud.unwrap(),
        main_contact_id: refs.main_contact_id,
        contract_manager_id: refs.contract_manager_id,
        company_status,
        documentation_status,
    };

    // Scalar row and both relation sets commit together.
    let project_id = conn.transaction::<Uuid, AppError, _>(|conn| {
        match diesel::insert_into(projects::table)
            .values(&new_project)
            .execute(conn)
        {
            Ok(_) => {}
            Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                return Err(AppError::field("code", "ya existe un proyecto con este código"));
            }
            Err(err) => return Err(AppError::from(err)),
        }
        replace_relation_sets(conn, new_project.id, &refs.company_ids, &refs.contact_ids)?;
        Ok(new_project.id)
    })?;

    let project: Project = projects::table.find(project_id).first(&mut conn)?;
    let response = build_responses(&mut conn, vec![project])?.remove(0);
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> AppResult<Json<ProjectResponse>> {
    let mut conn = state.db()?;
    let project: Project = projects::table.find(project_id).first(&mut conn)?;
    let response = build_responses(&mut conn, vec![project])?.remove(0);
    Ok(Json(response))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<CreateProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let mut errors = FieldErrors::new();
    let code = require_str(&mut errors, "code", payload.code.as_deref());
    let fecha_solicitud =
        parse_date(&mut errors, "fechaSolicitud", payload.fecha_solicitud.as_deref());
    let start_date = parse_optional_date(&mut errors, "startDate", payload.start_date.as_deref());
    let end_date = parse_optional_date(&mut errors, "endDate", payload.end_date.as_deref());
    if payload.contract_id.is_none() {
        errors.insert("contractId".to_string(), "este campo es obligatorio".to_string());
    }
    if payload.manager_id.is_none() {
        errors.insert("managerId".to_string(), "este campo es obligatorio".to_string());
    }
    let company_status = choice_or_default(
        &mut errors,
        "companyStatus",
        payload.company_status.as_deref(),
        COMPANY_STATUSES,
        DEFAULT_COMPANY_STATUS,
    );
    let documentation_status = choice_or_default(
        &mut errors,
        "documentationStatus",
        payload.documentation_status.as_deref(),
        DOCUMENTATION_STATUSES,
        DEFAULT_DOCUMENTATION_STATUS,
    );
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let mut conn = state.db()?;
    let _existing: Project = projects::table.find(project_id).first(&mut conn)?;
    let refs = resolve_references(
        &mut conn,
        payload.contract_id.unwrap(),
        payload.work_center_id,
        payload.manager_id.unwrap(),
        payload.main_contact_id,
        payload.contract_manager_id,
        payload.company_ids.clone().unwrap_or_default(),
        payload.contact_ids.clone().unwrap_or_default(),
    )?;
    let code = code.unwrap();
    ensure_unique_code(&mut conn, &code, Some(project_id))?;

    let changeset = ProjectChangeset {
        code: Some(code),
        description: Some(optional_str(payload.description.as_deref()).unwrap_or_default()),
        start_date: Some(start_date),
        end_date: Some(end_date),
        contract_id: Some(refs.contract_id),
        work_center_id: Some(refs.work_center_id),
        manager_id: Some(refs.manager_id),
        fecha_solicitud,
        main_contact_id: Some(refs.main_contact_id),
        contract_manager_id: Some(refs.contract_manager_id),
        company_status: Some(company_status),
        documentation_status: Some(documentation_status),
    };

    conn.transaction::<(), AppError, _>(|conn| {
        diesel::update(projects::table.find(project_id))
            .set(&changeset)
            .execute(conn)?;
        replace_relation_sets(conn, project_id, &refs.company_ids, &refs.contact_ids)?;
        Ok(())
    })?;

    let project: Project = projects::table.find(project_id).first(&mut conn)?;
    let response = build_responses(&mut conn, vec![project])?.remove(0);
    Ok(Json(response))
}

pub async fn partial_update_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
    Json(payload): Json<PatchProjectRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let mut conn = state.db()?;
    let _existing: Project = projects::table.find(project_id).first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let code = match payload.code.as_deref() {
        Some(raw) => require_str(&mut errors, "code", Some(raw)),
        None => None,
    };
    let fecha_solicitud = match payload.fecha_solicitud.as_deref() {
        Some(raw) => parse_date(&mut errors, "fechaSolicitud", Some(raw)),
        None => None,
    };
    let start_date = match payload.start_date {
        Some(Some(ref raw)) => Some(parse_optional_date(&mut errors, "startDate", Some(raw.as_str()))),
        Some(None) => Some(None),
        None => None,
    };
    let end_date = match payload.end_date {
        Some(Some(ref raw)) => Some(parse_optional_date(&mut errors, "endDate", Some(raw.as_str()))),
        Some(None) => Some(None),
        None => None,
    };
    let company_status = match optional_str(payload.company_status.as_deref()) {
        Some(value) => {
            check_choice(&mut errors, "companyStatus", &value, COMPANY_STATUSES);
            Some(value)
        }
        None => None,
    };
    let documentation_status = match optional_str(payload.documentation_status.as_deref()) {
        Some(value) => {
            check_choice(&mut errors, "documentationStatus", &value, DOCUMENTATION_STATUSES);
            Some(value)
        }
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    // Reference resolution, one field at a time.
    if let Some(contract_id) = payload.contract_id {
        require_ref("contractId", contract_exists(&mut conn, contract_id)?)?;
    }
    if let Some(Some(work_center_id)) = payload.work_center_id {
        require_ref("workCenterId",
            work_center_exists(&mut conn, work_center_id)?,
        )?;
    }
    if let Some(manager_id) = payload.manager_id {
        require_ref("managerId", user_exists(&mut conn, manager_id)?)?;
    }
    if let Some(Some(main_contact_id)) = payload.main_contact_id {
        require_ref("mainContactId",
            contact_exists(&mut conn, main_contact_id)?,
        )?;
    }
    if let Some(Some(contract_manager_id)) = payload.contract_manager_id {
        require_ref("contractManagerId",
            user_exists(&mut conn, contract_manager_id)?,
        )?;
    }
    let company_ids = match payload.company_ids {
        Some(ids) => {
            let ids = dedupe(ids);
            for id in &ids {
                require_ref("companyIds", company_exists(&mut conn, *id)?)?;
            }
            Some(ids)
        }
        None => None,
    };
    let contact_ids = match payload.contact_ids {
        Some(ids) => {
            let ids = dedupe(ids);
            for id in &ids {
                require_ref("contactIds", contact_exists(&mut conn, *id)?)?;
            }
            Some(ids)
        }
        None => None,
    };
    if let Some(ref code) = code {
        ensure_unique_code(&mut conn, code, Some(project_id))?;
    }

    let changeset = ProjectChangeset {
        code,
        description: payload
            .description
            .map(|raw| optional_str(Some(raw.as_str())).unwrap_or_default()),
        start_date,
        end_date,
        contract_id: payload.contract_id,
        work_center_id: payload.work_center_id,
        manager_id: payload.manager_id,
        fecha_solicitud,
        main_contact_id: payload.main_contact_id,
        contract_manager_id: payload.contract_manager_id,
        company_status,
        documentation_status,
    };

    conn.transaction::<(), AppError, _>(|conn| {
        if changeset.has_changes() {
            diesel::update(projects::table.find(project_id))
                .set(&changeset)
                .execute(conn)?;
        }
        if let Some(ref ids) = company_ids {
            replace_company_set(conn, project_id, ids)?;
        }
        if let Some(ref ids) = contact_ids {
            replace_contact_set(conn, project_id, ids)?;
        }
        Ok(())
    })?;

    let project: Project = projects::table.find(project_id).first(&mut conn)?;
    let response = build_responses(&mut conn, vec![project])?.remove(0);
    Ok(Json(response))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(projects::table.find(project_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

struct ResolvedReferences {
    contract_id: Uuid,
    work_center_id: Option<Uuid>,
    manager_id: Uuid,
    main_contact_id: Option<Uuid>,
    contract_manager_id: Option<Uuid>,
    company_ids: Vec<Uuid>,
    contact_ids: Vec<Uuid>,
}

#[allow(clippy::too_many_arguments)]
fn resolve_references(
    conn: &mut PgConnection,
    contract_id: Uuid,
    work_center_id: Option<Uuid>,
    manager_id: Uuid,
    main_contact_id: Option<Uuid>,
    contract_manager_id: Option<Uuid>,
    company_ids: Vec<Uuid>,
    contact_ids: Vec<Uuid>,
) -> AppResult<ResolvedReferences> {
    require_ref("contractId", contract_exists(conn, contract_id)?)?;
    if let Some(id) = work_center_id {
        require_ref("workCenterId", work_center_exists(conn, id)?)?;
    }
    require_ref("managerId", user_exists(conn, manager_id)?)?;
    if let Some(id) = main_contact_id {
        require_ref("mainContactId", contact_exists(conn, id)?)?;
    }
    if let Some(id) = contract_manager_id {
        require_ref("contractManagerId", user_exists(conn, id)?)?;
    }
    let company_ids = dedupe(company_ids);
    for id in &company_ids {
        require_ref("companyIds", company_exists(conn, *id)?)?;
    }
    let contact_ids = dedupe(contact_ids);
    for id in &contact_ids {
        require_ref("contactIds", contact_exists(conn, *id)?)?;
    }

    Ok(ResolvedReferences {
        contract_id,
        work_center_id,
        manager_id,
        main_contact_id,
        contract_manager_id,
        company_ids,
        contact_ids,
    })
}

fn replace_relation_sets(
    conn: &mut PgConnection,
    project_id: Uuid,
    company_ids: &[Uuid],
    contact_ids: &[Uuid],
) -> AppResult<()> {
    replace_company_set(conn, project_id, company_ids)?;
    replace_contact_set(conn, project_id, contact_ids)?;
    Ok(())
}

fn replace_company_set(
    conn: &mut PgConnection,
    project_id: Uuid,
    company_ids: &[Uuid],
) -> AppResult<()> {
    diesel::delete(project_companies::table.filter(project_companies::project_id.eq(project_id)))
        .execute(conn)?;
    let rows: Vec<NewProjectCompany> = company_ids
        .iter()
        .map(|company_id| NewProjectCompany {
            project_id,
            company_id: *company_id,
        })
        .collect();
    diesel::insert_into(project_companies::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn replace_contact_set(
    conn: &mut PgConnection,
    project_id: Uuid,
    contact_ids: &[Uuid],
) -> AppResult<()> {
    diesel::delete(project_contacts::table.filter(project_contacts::project_id.eq(project_id)))
        .execute(conn)?;
    let rows: Vec<NewProjectContact> = contact_ids
        .iter()
        .map(|contact_id| NewProjectContact {
            project_id,
            contact_id: *contact_id,
        })
        .collect();
    diesel::insert_into(project_contacts::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

pub(crate) fn build_responses(
    conn: &mut PgConnection,
    rows: Vec<Project>,
) -> AppResult<Vec<ProjectResponse>> {
    let contract_ids: Vec<Uuid> = rows.iter().map(|p| p.contract_id).collect();
    let work_center_ids: Vec<Uuid> = rows.iter().filter_map(|p| p.work_center_id).collect();
    let manager_ids: Vec<Uuid> = rows.iter().map(|p| p.manager_id).collect();
    let project_ids: Vec<Uuid> = rows.iter().map(|p| p.id).collect();

    let contract_map: HashMap<Uuid, Contract> = contracts::table
        .filter(contracts::id.eq_any(&contract_ids))
        .load::<Contract>(conn)?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let center_map: HashMap<Uuid, WorkCenter> = work_centers::table
        .filter(work_centers::id.eq_any(&work_center_ids))
        .load::<WorkCenter>(conn)?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let manager_map: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(&manager_ids))
        .load::<User>(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let company_links: Vec<(Uuid, Uuid)> = project_companies::table
        .filter(project_companies::project_id.eq_any(&project_ids))
        .select((project_companies::project_id, project_companies::company_id))
        .load(conn)?;
    let contact_links: Vec<(Uuid, Uuid)> = project_contacts::table
        .filter(project_contacts::project_id.eq_any(&project_ids))
        .select((project_contacts::project_id, project_contacts::contact_id))
        .load(conn)?;

    let linked_company_ids: Vec<Uuid> = company_links.iter().map(|(_, c)| *c).collect();
    let company_map: HashMap<Uuid, Company> = companies::table
        .filter(companies::id.eq_any(&linked_company_ids))
        .load::<Company>(conn)?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let mut company_contact_map: HashMap<Uuid, Vec<CompanyContact>> = HashMap::new();
    for contact in company_contacts::table
        .filter(company_contacts::company_id.eq_any(&linked_company_ids))
        .load::<CompanyContact>(conn)?
    {
        company_contact_map
            .entry(contact.company_id)
            .or_default()
            .push(contact);
    }

    let linked_contact_ids: Vec<Uuid> = contact_links.iter().map(|(_, c)| *c).collect();
    let contact_map: HashMap<Uuid, CompanyContact> = company_contacts::table
        .filter(company_contacts::id.eq_any(&linked_contact_ids))
        .load::<CompanyContact>(conn)?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut companies_by_project: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (project_id, company_id) in company_links {
        companies_by_project
            .entry(project_id)
            .or_default()
            .push(company_id);
    }
    let mut contacts_by_project: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (project_id, contact_id) in contact_links {
        contacts_by_project
            .entry(project_id)
            .or_default()
            .push(contact_id);
    }

    let mut response = Vec::with_capacity(rows.len());
    for project in rows {
        let contract = contract_map
            .get(&project.contract_id)
            .cloned()
            .ok_or_else(AppError::not_found)?;
        let manager = manager_map
            .get(&project.manager_id)
            .cloned()
            .ok_or_else(AppError::not_found)?;
        let work_center = project
            .work_center_id
            .and_then(|id| center_map.get(&id).cloned());

        let company_ids = companies_by_project.remove(&project.id).unwrap_or_default();
        let companies_nested: Vec<CompanyResponse> = company_ids
            .iter()
            .filter_map(|id| company_map.get(id).cloned())
            .map(|company| {
                let contacts = company_contact_map
                    .get(&company.id)
                    .cloned()
                    .unwrap_or_default();
                to_company_response(company, contacts)
            })
            .collect();

        let contact_ids = contacts_by_project.remove(&project.id).unwrap_or_default();
        let contacts_nested: Vec<ContactResponse> = contact_ids
            .iter()
            .filter_map(|id| contact_map.get(id).cloned())
            .map(ContactResponse::from)
            .collect();

        response.push(ProjectResponse {
            id: project.id,
            code: project.code,
            description: project.description,
            start_date: project.start_date.map(|d| d.to_string()),
            end_date: project.end_date.map(|d| d.to_string()),
            contract: ContractResponse::from(contract),
            contract_id: project.contract_id,
            work_center: work_center.map(WorkCenterResponse::from),
            work_center_id: project.work_center_id,
            manager: UserResponse::from(manager),
            manager_id: project.manager_id,
            companies: companies_nested,
            company_ids,
            contacts: contacts_nested,
            contact_ids,
            fecha_solicitud: project.fecha_solicitud.to_string(),
            created_at: to_iso(project.created_at),
            main_contact_id: project.main_contact_id,
            contract_manager_id: project.contract_manager_id,
            company_status: project.company_status,
            documentation_status: project.documentation_status,
        });
    }

    Ok(response)
}

fn parse_optional_date(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<NaiveDate> {
    match optional_str(raw) {
        Some(value) => parse_date(errors, field, Some(value.as_str())),
        None => None,
    }
}

fn dedupe(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn require_ref(field: &str, found: bool) -> AppResult<()> {
    if found {
        Ok(())
    } else {
        Err(AppError::field(field, "la referencia indicada no existe"))
    }
}

fn contract_exists(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
    Ok(select(exists(contracts::table.find(id))).get_result(conn)?)
}

fn work_center_exists(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
    Ok(select(exists(work_centers::table.find(id))).get_result(conn)?)
}

fn user_exists(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
    Ok(select(exists(users::table.find(id))).get_result(conn)?)
}

fn company_exists(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
    Ok(select(exists(companies::table.find(id))).get_result(conn)?)
}

fn contact_exists(conn: &mut PgConnection, id: Uuid) -> AppResult<bool> {
    Ok(select(exists(company_contacts::table.find(id))).get_result(conn)?)
}

fn ensure_unique_code(conn: &mut PgConnection, code: &str, exclude: Option<Uuid>) -> AppResult<()> {
    let mut query = projects::table.filter(projects::code.eq(code)).into_boxed();
    if let Some(id) = exclude {
        query = query.filter(projects::id.ne(id));
    }
    let duplicate = query.first::<Project>(conn).optional()?;
    if duplicate.is_some() {
        return Err(AppError::field("code", "ya existe un proyecto con este código"));
    }
    Ok(())
}
