use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::{dsl::count_star, prelude::*, result::DatabaseErrorKind, PgConnection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    error::{AppError, AppResult, FieldErrors},
    models::{NewUser, User, DEFAULT_USER_ROLE, USER_ROLES},
    schema::{projects, users},
    state::AppState,
    validate::{choice_or_default, optional_str, require_email, require_str},
};

/// Administrator-created accounts without an explicit password get this one.
/// The API is staff-only; the account owner is expected to change it.
const DEFAULT_PASSWORD: &str = "admin";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub cif: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            avatar: user.avatar,
            phone: user.phone,
            cif: user.cif,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub cif: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub avatar: Option<Option<String>>,
    #[serde(default)]
    pub phone: Option<Option<String>>,
    #[serde(default)]
    pub cif: Option<Option<String>>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = users)]
struct UserChangeset {
    email: Option<String>,
    name: Option<String>,
    role: Option<String>,
    password_hash: Option<String>,
    avatar: Option<Option<String>>,
    phone: Option<Option<String>>,
    cif: Option<Option<String>>,
}

impl UserChangeset {
    fn has_changes(&self) -> bool {
        self.email.is_some()
            || self.name.is_some()
            || self.role.is_some()
            || self.password_hash.is_some()
            || self.avatar.is_some()
            || self.phone.is_some()
            || self.cif.is_some()
    }
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let mut conn = state.db()?;
    let rows: Vec<User> = users::table.order(users::name.asc()).load(&mut conn)?;
    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let mut errors = FieldErrors::new();
    let email = require_email(&mut errors, "email", payload.email.as_deref());
    let name = require_str(&mut errors, "name", payload.name.as_deref());
    let role = choice_or_default(
        &mut errors,
        "role",
        payload.role.as_deref(),
        USER_ROLES,
        DEFAULT_USER_ROLE,
    );
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    let (email, name) = (email.unwrap(), name.unwrap());

    let mut conn = state.db()?;
    ensure_unique_email(&mut conn, &email, None)?;

    let password = payload
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_PASSWORD);
    let new_user = NewUser {
        id: Uuid::new_v4(),
        email,
        name,
        password_hash: hash_password(password)?,
        role,
        avatar: optional_str(payload.avatar.as_deref()),
        phone: optional_str(payload.phone.as_deref()),
        cif: optional_str(payload.cif.as_deref()),
    };

    match diesel::insert_into(users::table)
        .values(&new_user)
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(AppError::field("email", "ya existe un usuario con este correo"));
        }
        Err(err) => return Err(AppError::from(err)),
    }

    let user: User = users::table.find(new_user.id).first(&mut conn)?;
    info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let mut conn = state.db()?;
    let user: User = users::table.find(user_id).first(&mut conn)?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let mut errors = FieldErrors::new();
    let email = require_email(&mut errors, "email", payload.email.as_deref());
    let name = require_str(&mut errors, "name", payload.name.as_deref());
    let role = choice_or_default(
        &mut errors,
        "role",
        payload.role.as_deref(),
        USER_ROLES,
        DEFAULT_USER_ROLE,
    );
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    let (email, name) = (email.unwrap(), name.unwrap());

    let mut conn = state.db()?;
    let _existing: User = users::table.find(user_id).first(&mut conn)?;
    ensure_unique_email(&mut conn, &email, Some(user_id))?;

    let changeset = UserChangeset {
        email: Some(email),
        name: Some(name),
        role: Some(role),
        password_hash: match payload.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(password)?),
            None => None,
        },
        avatar: Some(optional_str(payload.avatar.as_deref())),
        phone: Some(optional_str(payload.phone.as_deref())),
        cif: Some(optional_str(payload.cif.as_deref())),
    };

    diesel::update(users::table.find(user_id))
        .set(&changeset)
        .execute(&mut conn)?;

    let user: User = users::table.find(user_id).first(&mut conn)?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn partial_update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<PatchUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let mut conn = state.db()?;
    let _existing: User = users::table.find(user_id).first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let email = match payload.email.as_deref() {
        Some(raw) => require_email(&mut errors, "email", Some(raw)),
        None => None,
    };
    let name = match payload.name.as_deref() {
        Some(raw) => require_str(&mut errors, "name", Some(raw)),
        None => None,
    };
    let role = match optional_str(payload.role.as_deref()) {
        Some(value) => {
            crate::validate::check_choice(&mut errors, "role", &value, USER_ROLES);
            Some(value)
        }
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    if let Some(ref email) = email {
        ensure_unique_email(&mut conn, email, Some(user_id))?;
    }

    let changeset = UserChangeset {
        email,
        name,
        role,
        password_hash: match payload.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Some(hash_password(password)?),
            None => None,
        },
        avatar: payload
            .avatar
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        phone: payload
            .phone
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        cif: payload
            .cif
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
    };

    if changeset.has_changes() {
        diesel::update(users::table.find(user_id))
            .set(&changeset)
            .execute(&mut conn)?;
    }

    let user: User = users::table.find(user_id).first(&mut conn)?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;

    let managed: i64 = projects::table
        .filter(projects::manager_id.eq(user_id))
        .select(count_star())
        .first(&mut conn)?;

    if managed > 0 {
        return Err(AppError::conflict(
            "cannot delete a user that still manages projects",
        ));
    }

    let deleted = diesel::delete(users::table.find(user_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut conn = state.db()?;
    let user: User = users::table.find(user_id).first(&mut conn)?;

    let mut uploaded: Option<(Vec<u8>, Option<String>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("invalid multipart payload: {err}")))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|err| AppError::bad_request(format!("failed to read file: {err}")))?;
            uploaded = Some((bytes.to_vec(), content_type));
        }
    }

    let (bytes, content_type) =
        uploaded.ok_or_else(|| AppError::bad_request("missing file field"))?;
    if bytes.is_empty() {
        return Err(AppError::bad_request("file must not be empty"));
    }

    let key = format!("avatars/{}/{}", user_id, Uuid::new_v4());
    state
        .storage
        .put_object(&key, bytes, content_type)
        .await
        .map_err(AppError::internal)?;

    diesel::update(users::table.find(user_id))
        .set(users::avatar.eq(Some(key.clone())))
        .execute(&mut conn)?;

    // Drop the previous upload once the row points at the new one.
    if let Some(old_key) = user.avatar.filter(|value| value.starts_with("avatars/")) {
        if let Err(err) = state.storage.delete_object(&old_key).await {
            tracing::warn!(user_id = %user_id, error = %err, "failed to delete replaced avatar");
        }
    }

    let url = state
        .storage
        .presign_get_object(&key, std::time::Duration::from_secs(300))
        .await
        .map_err(AppError::internal)?;

    Ok(Json(json!({ "avatar": key, "url": url })))
}

fn ensure_unique_email(
    conn: &mut PgConnection,
    email: &str,
    exclude: Option<Uuid>,
) -> AppResult<()> {
    let mut query = users::table
        .filter(users::email.eq(email))
        .into_boxed();
    if let Some(id) = exclude {
        query = query.filter(users::id.ne(id));
    }
    let duplicate = query.first::<User>(conn).optional()?;
    if duplicate.is_some() {
        return Err(AppError::field("email", "ya existe un usuario con este correo"));
    }
    Ok(())
}
