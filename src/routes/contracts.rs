use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use diesel::{prelude::*, result::DatabaseErrorKind, PgConnection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{Contract, NewContract, User},
    schema::{contracts, users},
    state::AppState,
    validate::{optional_email, optional_str, parse_amount, parse_date, require_str},
};

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ContractResponse {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub client_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub amount: String,
    pub coordinator_id: Option<Uuid>,
}

impl From<Contract> for ContractResponse {
    fn from(contract: Contract) -> Self {
        Self {
            id: contract.id,
            code: contract.code,
            description: contract.description,
            start_date: contract.start_date.to_string(),
            end_date: contract.end_date.to_string(),
            client_name: contract.client_name,
            contact_name: contract.contact_name,
            contact_email: contract.contact_email,
            contact_phone: contract.contact_phone,
            // Decimals travel as strings, preserving the stored scale.
            amount: contract.amount.to_string(),
            coordinator_id: contract.coordinator_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContractRequest {
    pub code: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub client_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub amount: Option<Value>,
    pub coordinator_id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchContractRequest {
    pub code: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub client_name: Option<String>,
    #[serde(default)]
    pub contact_name: Option<Option<String>>,
    #[serde(default)]
    pub contact_email: Option<Option<String>>,
    #[serde(default)]
    pub contact_phone: Option<Option<String>>,
    pub amount: Option<Value>,
    #[serde(default)]
    pub coordinator_id: Option<Option<Uuid>>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = contracts)]
struct ContractChangeset {
    code: Option<String>,
    description: Option<String>,
    start_date: Option<chrono::NaiveDate>,
    end_date: Option<chrono::NaiveDate>,
    client_name: Option<String>,
    contact_name: Option<Option<String>>,
    contact_email: Option<Option<String>>,
    contact_phone: Option<Option<String>>,
    amount: Option<BigDecimal>,
    coordinator_id: Option<Option<Uuid>>,
}

impl ContractChangeset {
    fn has_changes(&self) -> bool {
        self.code.is_some()
            || self.description.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.client_name.is_some()
            || self.contact_name.is_some()
            || self.contact_email.is_some()
            || self.contact_phone.is_some()
            || self.amount.is_some()
            || self.coordinator_id.is_some()
    }
}

pub async fn list_contracts(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ContractResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<Contract> = contracts::table.order(contracts::code.asc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(ContractResponse::from).collect()))
}

pub async fn create_contract(
    State(state): State<AppState>,
    Json(payload): Json<CreateContractRequest>,
) -> AppResult<(StatusCode, Json<ContractResponse>)> {
    let mut errors = FieldErrors::new();
    let code = require_str(&mut errors, "code", payload.code.as_deref());
    let description = require_str(&mut errors, "description", payload.description.as_deref());
    let start_date = parse_date(&mut errors, "startDate", payload.start_date.as_deref());
    let end_date = parse_date(&mut errors, "endDate", payload.end_date.as_deref());
    let client_name = require_str(&mut errors, "clientName", payload.client_name.as_deref());
    let contact_email = optional_email(&mut errors, "contactEmail", payload.contact_email.as_deref());
    let amount = parse_amount(&mut errors, "amount", payload.amount.as_ref());
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let mut conn = state.db()?;
    if let Some(coordinator_id) = payload.coordinator_id {
        resolve_coordinator(&mut conn, coordinator_id)?;
    }
    let code = code.unwrap();
    ensure_unique_code(&mut conn, &code, None)?;

    let new_contract = NewContract {
        id: Uuid::new_v4(),
        code,
        description: description.unwrap(),
        start_date: start_date.unwrap(),
        end_date: end_date.unwrap(),
        client_name: client_name.unwrap(),
        contact_name: optional_str(payload.contact_name.as_deref()),
        contact_email,
        contact_phone: optional_str(payload.contact_phone.as_deref()),
        amount: amount.unwrap(),
        coordinator_id: payload.coordinator_id,
    };

    match diesel::insert_into(contracts::table)
        .values(&new_contract)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(AppError::field("code", "ya existe un contrato con este código"));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    let contract: Contract = contracts::table.find(new_contract.id).first(&mut conn)?;
    Ok((StatusCode::CREATED, Json(ContractResponse::from(contract))))
}

pub async fn get_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> AppResult<Json<ContractResponse>> {
    let mut conn = state.db()?;
    let contract: Contract = contracts::table.find(contract_id).first(&mut conn)?;
    Ok(Json(ContractResponse::from(contract)))
}

pub async fn update_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<CreateContractRequest>,
) -> AppResult<Json<ContractResponse>> {
    let mut errors = FieldErrors::new();
    let code = require_str(&mut errors, "code", payload.code.as_deref());
    let description = require_str(&mut errors, "description", payload.description.as_deref());
    let start_date = parse_date(&mut errors, "startDate", payload.start_date.as_deref());
    let end_date = parse_date(&mut errors, "endDate", payload.end_date.as_deref());
    let client_name = require_str(&mut errors, "clientName", payload.client_name.as_deref());
    let contact_email = optional_email(&mut errors, "contactEmail", payload.contact_email.as_deref());
    let amount = parse_amount(&mut errors, "amount", payload.amount.as_ref());
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    let mut conn = state.db()?;
    let _existing: Contract = contracts::table.find(contract_id).first(&mut conn)?;
    if let Some(coordinator_id) = payload.coordinator_id {
        resolve_coordinator(&mut conn, coordinator_id)?;
    }
    let code = code.unwrap();
    ensure_unique_code(&mut conn, &code, Some(contract_id))?;

    let changeset = ContractChangeset {
        code: Some(code),
        description,
        start_date,
        end_date,
        client_name,
        contact_name: Some(optional_str(payload.contact_name.as_deref())),
        contact_email: Some(contact_email),
        contact_phone: Some(optional_str(payload.contact_phone.as_deref())),
        amount,
        coordinator_id: Some(payload.coordinator_id),
    };

    diesel::update(contracts::table.find(contract_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let contract: Contract = contracts::table.find(contract_id).first(&mut conn)?;
    Ok(Json(ContractResponse::from(contract)))
}

pub async fn partial_update_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
    Json(payload): Json<PatchContractRequest>,
) -> AppResult<Json<ContractResponse>> {
    let mut conn = state.db()?;
    let _existing: Contract = contracts::table.find(contract_id).first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let code = match payload.code.as_deref() {
        Some(raw) => require_str(&mut errors, "code", Some(raw)),
        None => None,
    };
    let description = match payload.description.as_deref() {
        Some(raw) => require_str(&mut errors, "description", Some(raw)),
        None => None,
    };
    let start_date = match payload.start_date.as_deref() {
        Some(raw) => parse_date(&mut errors, "startDate", Some(raw)),
        None => None,
    };
    let end_date = match payload.end_date.as_deref() {
        Some(raw) => parse_date(&mut errors, "endDate", Some(raw)),
        None => None,
    };
    let client_name = match payload.client_name.as_deref() {
        Some(raw) => require_str(&mut errors, "clientName", Some(raw)),
        None => None,
    };
    let contact_email = match payload.contact_email {
        Some(Some(ref raw)) => Some(optional_email(&mut errors, "contactEmail", Some(raw.as_str()))),
        Some(None) => Some(None),
        None => None,
    };
    let amount = match payload.amount.as_ref() {
        Some(raw) => parse_amount(&mut errors, "amount", Some(raw)),
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    match payload.coordinator_id {
        Some(Some(coordinator_id)) => resolve_coordinator(&mut conn, coordinator_id)?,
        _ => {}
    }
    if let Some(ref code) = code {
        ensure_unique_code(&mut conn, code, Some(contract_id))?;
    }

    let changeset = ContractChangeset {
        code,
        description,
        start_date,
        end_date,
        client_name,
        contact_name: payload
            .contact_name
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        contact_email,
        contact_phone: payload
            .contact_phone
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        amount,
        coordinator_id: payload.coordinator_id,
    };

    if changeset.has_changes() {
        diesel::update(contracts::table.find(contract_id))
            .set(&changeset)
            .execute(&mut conn)?;
    }

    let contract: Contract = contracts::table.find(contract_id).first(&mut conn)?;
    Ok(Json(ContractResponse::from(contract)))
}

pub async fn delete_contract(
    State(state): State<AppState>,
    Path(contract_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    // Projects hang off the contract and fall with it (ON DELETE CASCADE).
    let deleted = diesel::delete(contracts::table.find(contract_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

fn resolve_coordinator(conn: &mut PgConnection, coordinator_id: Uuid) -> AppResult<()> {
    let found = users::table
        .find(coordinator_id)
        .first::<User>(conn)
        .optional()?;
    if found.is_none() {
        return Err(AppError::field(
            "coordinatorId",
            "el usuario indicado no existe",
        ));
    }
    Ok(())
}

fn ensure_unique_code(conn: &mut PgConnection, code: &str, exclude: Option<Uuid>) -> AppResult<()> {
    let mut query = contracts::table.filter(contracts::code.eq(code)).into_boxed();
    if let Some(id) = exclude {
        query = query.filter(contracts::id.ne(id));
    }
    let duplicate = query.first::<Contract>(conn).optional()?;
    if duplicate.is_some() {
        return Err(AppError::field("code", "ya existe un contrato con este código"));
    }
    Ok(())
}
