use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::{prelude::*, PgConnection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{Company, CompanyContact, NewCompanyContact},
    schema::{companies, company_contacts},
    state::AppState,
    validate::{optional_str, require_email, require_str},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub position: Option<String>,
    pub phone: Option<String>,
}

impl From<CompanyContact> for ContactResponse {
    fn from(contact: CompanyContact) -> Self {
        Self {
            id: contact.id,
            company_id: contact.company_id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            position: contact.position,
            phone: contact.phone,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub company_id: Option<Uuid>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchContactRequest {
    pub company_id: Option<Uuid>,
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<Option<String>>,
    pub email: Option<String>,
    #[serde(default)]
    pub position: Option<Option<String>>,
    #[serde(default)]
    pub phone: Option<Option<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactListQuery {
    pub company_id: Option<Uuid>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = company_contacts)]
struct ContactChangeset {
    company_id: Option<Uuid>,
    first_name: Option<String>,
    last_name: Option<Option<String>>,
    email: Option<String>,
    position: Option<Option<String>>,
    phone: Option<Option<String>>,
}

impl ContactChangeset {
    fn has_changes(&self) -> bool {
        self.company_id.is_some()
            || self.first_name.is_some()
            || self.last_name.is_some()
            || self.email.is_some()
            || self.position.is_some()
            || self.phone.is_some()
    }
}

pub async fn list_contacts(
    State(state): State<AppState>,
    Query(query): Query<ContactListQuery>,
) -> AppResult<Json<Vec<ContactResponse>>> {
    let mut conn = state.db()?;
    let mut statement = company_contacts::table
        .order(company_contacts::first_name.asc())
        .into_boxed();
    if let Some(company_id) = query.company_id {
        statement = statement.filter(company_contacts::company_id.eq(company_id));
    }
    let rows: Vec<CompanyContact> = statement.load(&mut conn)?;
    Ok(Json(rows.into_iter().map(ContactResponse::from).collect()))
}

pub async fn create_contact(
    State(state): State<AppState>,
    Json(payload): Json<CreateContactRequest>,
) -> AppResult<(StatusCode, Json<ContactResponse>)> {
    let mut errors = FieldErrors::new();
    let first_name = require_str(&mut errors, "firstName", payload.first_name.as_deref());
    let email = require_email(&mut errors, "email", payload.email.as_deref());
    if payload.company_id.is_none() {
        errors.insert("companyId".to_string(), "este campo es obligatorio".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    let company_id = payload.company_id.unwrap();

    let mut conn = state.db()?;
    resolve_company(&mut conn, company_id)?;

    let new_contact = NewCompanyContact {
        id: Uuid::new_v4(),
        company_id,
        first_name: first_name.unwrap(),
        last_name: optional_str(payload.last_name.as_deref()),
        email: email.unwrap(),
        position: optional_str(payload.position.as_deref()),
        phone: optional_str(payload.phone.as_deref()),
    };

    diesel::insert_into(company_contacts::table)
        .values(&new_contact)
        .execute(&mut conn)?;

    let contact: CompanyContact = company_contacts::table.find(new_contact.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(ContactResponse::from(contact))))
}

pub async fn get_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<Uuid>,
) -> AppResult<Json<ContactResponse>> {
    let mut conn = state.db()?;
    let contact: CompanyContact = company_contacts::table.find(contact_id).first(&mut conn)?;
    Ok(Json(ContactResponse::from(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<Uuid>,
    Json(payload): Json<CreateContactRequest>,
) -> AppResult<Json<ContactResponse>> {
    let mut errors = FieldErrors::new();
    let first_name = require_str(&mut errors, "firstName", payload.first_name.as_deref());
    let email = require_email(&mut errors, "email", payload.email.as_deref());
    if payload.company_id.is_none() {
        errors.insert("companyId".to_string(), "este campo es obligatorio".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    let company_id = payload.company_id.unwrap();

    let mut conn = state.db()?;
    let _existing: CompanyContact = company_contacts::table.find(contact_id).first(&mut conn)?;
    resolve_company(&mut conn, company_id)?;

    let changeset = ContactChangeset {
        company_id: Some(company_id),
        first_name,
        last_name: Some(optional_str(payload.last_name.as_deref())),
        email,
        position: Some(optional_str(payload.position.as_deref())),
        phone: Some(optional_str(payload.phone.as_deref())),
    };

    diesel::update(company_contacts::table.find(contact_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let contact: CompanyContact = company_contacts::table.find(contact_id).first(&mut conn)?;
    Ok(Json(ContactResponse::from(contact)))
}

pub async fn partial_update_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<Uuid>,
    Json(payload): Json<PatchContactRequest>,
) -> AppResult<Json<ContactResponse>> {
    let mut conn = state.db()?;
    let _existing: CompanyContact = company_contacts::table.find(contact_id).first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let first_name = match payload.first_name.as_deref() {
        Some(raw) => require_str(&mut errors, "firstName", Some(raw)),
        None => None,
    };
    let email = match payload.email.as_deref() {
        Some(raw) => require_email(&mut errors, "email", Some(raw)),
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    if let Some(company_id) = payload.company_id {
        resolve_company(&mut conn, company_id)?;
    }

    let changeset = ContactChangeset {
        company_id: payload.company_id,
        first_name,
        last_name: payload
            .last_name
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        email,
        position: payload
            .position
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        phone: payload
            .phone
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
    };

    if changeset.has_changes() {
        diesel::update(company_contacts::table.find(contact_id))
            .set(&changeset)
            .execute(&mut conn)?;
    }

    let contact: CompanyContact = company_contacts::table.find(contact_id).first(&mut conn)?;
    Ok(Json(ContactResponse::from(contact)))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    Path(contact_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(company_contacts::table.find(contact_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn resolve_company(conn: &mut PgConnection, company_id: Uuid) -> AppResult<()> {
    let found = companies::table
        .find(company_id)
        .first::<Company>(conn)
        .optional()?;
    if found.is_none() {
        return Err(AppError::field("companyId", "la empresa indicada no existe"));
    }
    Ok(())
}
