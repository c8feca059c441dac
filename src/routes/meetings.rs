use std::fmt::Write as _;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use diesel::{dsl::exists, prelude::*, select, PgConnection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{
        CompanyContact, Meeting, NewMeeting, NewMeetingAttendee, NewMeetingNotificationContact,
        Project, DEFAULT_MEETING_STATUS, MEETING_STATUSES, MEETING_TYPES,
    },
    schema::{
        company_contacts, meeting_attendees, meeting_notification_contacts, meetings, projects,
        users,
    },
    state::AppState,
    validate::{
        check_choice, choice_or_default, optional_str, parse_date, parse_time, require_str,
        signatures_or_default,
    },
};

const NO_RECIPIENTS_ERROR: &str = "No hay destinatarios configurados.";
const NO_RECIPIENT_EMAIL_ERROR: &str =
    "Ningún destinatario tiene correo electrónico configurado.";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    pub time: String,
    pub reason: String,
    pub location: String,
    #[serde(rename = "type")]
    pub meeting_type: String,
    pub teams_link: Option<String>,
    pub status: String,
    pub attendee_ids: Vec<Uuid>,
    pub notification_contact_ids: Vec<Uuid>,
    pub minutes: Option<String>,
    pub minute_pdf_url: Option<String>,
    pub signatures: Value,
    pub is_notified: bool,
}

fn to_response(meeting: Meeting, attendee_ids: Vec<Uuid>, contact_ids: Vec<Uuid>) -> MeetingResponse {
    MeetingResponse {
        id: meeting.id,
        project_id: meeting.project_id,
        start_date: meeting.start_date.to_string(),
        end_date: meeting.end_date.to_string(),
        time: meeting.time.format("%H:%M:%S").to_string(),
        reason: meeting.reason,
        location: meeting.location,
        meeting_type: meeting.meeting_type,
        teams_link: meeting.teams_link,
        status: meeting.status,
        attendee_ids,
        notification_contact_ids: contact_ids,
        minutes: meeting.minutes,
        minute_pdf_url: meeting.minute_pdf_url,
        signatures: meeting.signatures,
        is_notified: meeting.is_notified,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub project_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: Option<String>,
    pub teams_link: Option<String>,
    pub status: Option<String>,
    pub attendee_ids: Option<Vec<Uuid>>,
    pub notification_contact_ids: Option<Vec<Uuid>>,
    pub minutes: Option<String>,
    pub minute_pdf_url: Option<String>,
    pub signatures: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMeetingRequest {
    pub project_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: Option<String>,
    #[serde(default)]
    pub teams_link: Option<Option<String>>,
    pub status: Option<String>,
    pub attendee_ids: Option<Vec<Uuid>>,
    pub notification_contact_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    pub minutes: Option<Option<String>>,
    #[serde(default)]
    pub minute_pdf_url: Option<Option<String>>,
    pub signatures: Option<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingListQuery {
    pub project_id: Option<Uuid>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = meetings)]
struct MeetingChangeset {
    project_id: Option<Uuid>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    reason: Option<String>,
    location: Option<String>,
    meeting_type: Option<String>,
    teams_link: Option<Option<String>>,
    status: Option<String>,
    minutes: Option<Option<String>>,
    minute_pdf_url: Option<Option<String>>,
    signatures: Option<Value>,
}

impl MeetingChangeset {
    fn has_changes(&self) -> bool {
        self.project_id.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.time.is_some()
            || self.reason.is_some()
            || self.location.is_some()
            || self.meeting_type.is_some()
            || self.teams_link.is_some()
            || self.status.is_some()
            || self.minutes.is_some()
            || self.minute_pdf_url.is_some()
            || self.signatures.is_some()
    }
}

pub async fn list_meetings(
    State(state): State<AppState>,
    Query(query): Query<MeetingListQuery>,
) -> AppResult<Json<Vec<MeetingResponse>>> {
    let mut conn = state.db()?;
    let mut statement = meetings::table
        .order((meetings::start_date.asc(), meetings::time.asc()))
        .into_boxed();
    if let Some(project_id) = query.project_id {
        statement = statement.filter(meetings::project_id.eq(project_id));
    }
    let rows: Vec<Meeting> = statement.load(&mut conn)?;

    let meeting_ids: Vec<Uuid> = rows.iter().map(|m| m.id).collect();
    let attendee_links: Vec<(Uuid, Uuid)> = meeting_attendees::table
        .filter(meeting_attendees::meeting_id.eq_any(&meeting_ids))
        .select((meeting_attendees::meeting_id, meeting_attendees::user_id))
        .load(&mut conn)?;
    let contact_links: Vec<(Uuid, Uuid)> = meeting_notification_contacts::table
        .filter(meeting_notification_contacts::meeting_id.eq_any(&meeting_ids))
        .select((
            meeting_notification_contacts::meeting_id,
            meeting_notification_contacts::contact_id,
        ))
        .load(&mut conn)?;

    let mut attendees_by_meeting: std::collections::HashMap<Uuid, Vec<Uuid>> = Default::default();
    for (meeting_id, user_id) in attendee_links {
        attendees_by_meeting.entry(meeting_id).or_default().push(user_id);
    }
    let mut contacts_by_meeting: std::collections::HashMap<Uuid, Vec<Uuid>> = Default::default();
    for (meeting_id, contact_id) in contact_links {
        contacts_by_meeting.entry(meeting_id).or_default().push(contact_id);
    }

    let response = rows
        .into_iter()
        .map(|meeting| {
            let attendee_ids = attendees_by_meeting.remove(&meeting.id).unwrap_or_default();
            let contact_ids = contacts_by_meeting.remove(&meeting.id).unwrap_or_default();
            to_response(meeting, attendee_ids, contact_ids)
        })
        .collect();
    Ok(Json(response))
}

pub async fn create_meeting(
    State(state): State<AppState>,
    Json(payload): Json<CreateMeetingRequest>,
) -> AppResult<(StatusCode, Json<MeetingResponse>)> {
    let mut errors = FieldErrors::new();
    let start_date = parse_date(&mut errors, "startDate", payload.start_date.as_deref());
    let end_date = parse_date(&mut errors, "endDate", payload.end_date.as_deref());
    let time = parse_time(&mut errors, "time", payload.time.as_deref());
    let reason = require_str(&mut errors, "reason", payload.reason.as_deref());
    let location = require_str(&mut errors, "location", payload.location.as_deref());
    let meeting_type = require_str(&mut errors, "type", payload.meeting_type.as_deref());
    if let Some(ref value) = meeting_type {
        check_choice(&mut errors, "type", value, MEETING_TYPES);
    }
    let status = choice_or_default(
        &mut errors,
        "status",
        payload.status.as_deref(),
        MEETING_STATUSES,
        DEFAULT_MEETING_STATUS,
    );
    if payload.project_id.is_none() {
        errors.insert("projectId".to_string(), "este campo es obligatorio".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    let project_id = payload.project_id.unwrap();

    let mut conn = state.db()?;
    resolve_project(&mut conn, project_id)?;
    let attendee_ids = dedupe(payload.attendee_ids.clone().unwrap_or_default());
    for id in &attendee_ids {
        resolve_attendee(&mut conn, *id)?;
    }
    let contact_ids = dedupe(payload.notification_contact_ids.clone().unwrap_or_default());
    for id in &contact_ids {
        resolve_notification_contact(&mut conn, *id)?;
    }

    let new_meeting = NewMeeting {
        id: Uuid::new_v4(),
        project_id,
        start_date: start_date.unwrap(),
        end_date: end_date.unwrap(),
        time: time.unwrap(),
        reason: reason.unwrap(),
        location: location.unwrap(),
        meeting_type: meeting_type.unwrap(),
        teams_link: optional_str(payload.teams_link.as_deref()),
        status,
        minutes: optional_str(payload.minutes.as_deref()),
        minute_pdf_url: optional_str(payload.minute_pdf_url.as_deref()),
        signatures: signatures_or_default(payload.signatures),
        is_notified: false,
    };

    let meeting_id = conn.transaction::<Uuid, AppError, _>(|conn| {
        diesel::insert_into(meetings::table)
            .values(&new_meeting)
            .execute(conn)?;
        replace_relation_sets(conn, new_meeting.id, &attendee_ids, &contact_ids)?;
        Ok(new_meeting.id)
    })?;

    let (meeting, attendee_ids, contact_ids) = load_meeting(&mut conn, meeting_id)?;
    Ok((
        StatusCode::CREATED,
        Json(to_response(meeting, attendee_ids, contact_ids)),
    ))
}

pub async fn get_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
) -> AppResult<Json<MeetingResponse>> {
    let mut conn = state.db()?;
    let (meeting, attendee_ids, contact_ids) = load_meeting(&mut conn, meeting_id)?;
    Ok(Json(to_response(meeting, attendee_ids, contact_ids)))
}

pub async fn update_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
    Json(payload): Json<CreateMeetingRequest>,
) -> AppResult<Json<MeetingResponse>> {
    let mut errors = FieldErrors::new();
    let start_date = parse_date(&mut errors, "startDate", payload.start_date.as_deref());
    let end_date = parse_date(&mut errors, "endDate", payload.end_date.as_deref());
    let time = parse_time(&mut errors, "time", payload.time.as_deref());
    let reason = require_str(&mut errors, "reason", payload.reason.as_deref());
    let location = require_str(&mut errors, "location", payload.location.as_deref());
    let meeting_type = require_str(&mut errors, "type", payload.meeting_type.as_deref());
    if let Some(ref value) = meeting_type {
        check_choice(&mut errors, "type", value, MEETING_TYPES);
    }
    let status = choice_or_default(
        &mut errors,
        "status",
        payload.status.as_deref(),
        MEETING_STATUSES,
        DEFAULT_MEETING_STATUS,
    );
    if payload.project_id.is_none() {
        errors.insert("projectId".to_string(), "este campo es obligatorio".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }
    let project_id = payload.project_id.unwrap();

    let mut conn = state.db()?;
    let _existing: Meeting = meetings::table.find(meeting_id).first(&mut conn)?;
    resolve_project(&mut conn, project_id)?;
    let attendee_ids = dedupe(payload.attendee_ids.clone().unwrap_or_default());
    for id in &attendee_ids {
        resolve_attendee(&mut conn, *id)?;
    }
    let contact_ids = dedupe(payload.notification_contact_ids.clone().unwrap_or_default());
    for id in &contact_ids {
        resolve_notification_contact(&mut conn, *id)?;
    }

    let changeset = MeetingChangeset {
        project_id: Some(project_id),
        start_date,
        end_date,
        time,
        reason,
        location,
        meeting_type,
        teams_link: Some(optional_str(payload.teams_link.as_deref())),
        status: Some(status),
        minutes: Some(optional_str(payload.minutes.as_deref())),
        minute_pdf_url: Some(optional_str(payload.minute_pdf_url.as_deref())),
        signatures: Some(signatures_or_default(payload.signatures)),
    };

    conn.transaction::<(), AppError, _>(|conn| {
        diesel::update(meetings::table.find(meeting_id))
            .set(&changeset)
            .execute(conn)?;
        replace_relation_sets(conn, meeting_id, &attendee_ids, &contact_ids)?;
        Ok(())
    })?;

    let (meeting, attendee_ids, contact_ids) = load_meeting(&mut conn, meeting_id)?;
    Ok(Json(to_response(meeting, attendee_ids, contact_ids)))
}

pub async fn partial_update_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
    Json(payload): Json<PatchMeetingRequest>,
) -> AppResult<Json<MeetingResponse>> {
    let mut conn = state.db()?;
    let _existing: Meeting = meetings::table.find(meeting_id).first(&mut conn)?;

    let mut errors = FieldErrors::new();
    let start_date = match payload.start_date.as_deref() {
        Some(raw) => parse_date(&mut errors, "startDate", Some(raw)),
        None => None,
    };
    let end_date = match payload.end_date.as_deref() {
        Some(raw) => parse_date(&mut errors, "endDate", Some(raw)),
        None => None,
    };
    let time = match payload.time.as_deref() {
        Some(raw) => parse_time(&mut errors, "time", Some(raw)),
        None => None,
    };
    let reason = match payload.reason.as_deref() {
        Some(raw) => require_str(&mut errors, "reason", Some(raw)),
        None => None,
    };
    let location = match payload.location.as_deref() {
        Some(raw) => require_str(&mut errors, "location", Some(raw)),
        None => None,
    };
    let meeting_type = match optional_str(payload.meeting_type.as_deref()) {
        Some(value) => {
            check_choice(&mut errors, "type", &value, MEETING_TYPES);
            Some(value)
        }
        None => None,
    };
    let status = match optional_str(payload.status.as_deref()) {
        Some(value) => {
            check_choice(&mut errors, "status", &value, MEETING_STATUSES);
            Some(value)
        }
        None => None,
    };
    if !errors.is_empty() {
        return Err(AppError::validation(errors));
    }

    if let Some(project_id) = payload.project_id {
        resolve_project(&mut conn, project_id)?;
    }
    let attendee_ids = match payload.attendee_ids {
        Some(ids) => {
            let ids = dedupe(ids);
            for id in &ids {
                resolve_attendee(&mut conn, *id)?;
            }
            Some(ids)
        }
        None => None,
    };
    let contact_ids = match payload.notification_contact_ids {
        Some(ids) => {
            let ids = dedupe(ids);
            for id in &ids {
                resolve_notification_contact(&mut conn, *id)?;
            }
            Some(ids)
        }
        None => None,
    };

    let changeset = MeetingChangeset {
        project_id: payload.project_id,
        start_date,
        end_date,
        time,
        reason,
        location,
        meeting_type,
        teams_link: payload
            .teams_link
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        status,
        minutes: payload
            .minutes
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        minute_pdf_url: payload
            .minute_pdf_url
            .map(|value| value.and_then(|v| optional_str(Some(v.as_str())))),
        signatures: payload.signatures.map(|s| signatures_or_default(Some(s))),
    };

    conn.transaction::<(), AppError, _>(|conn| {
        if changeset.has_changes() {
            diesel::update(meetings::table.find(meeting_id))
                .set(&changeset)
                .execute(conn)?;
        }
        if let Some(ref ids) = attendee_ids {
            replace_attendee_set(conn, meeting_id, ids)?;
        }
        if let Some(ref ids) = contact_ids {
            replace_contact_set(conn, meeting_id, ids)?;
        }
        Ok(())
    })?;

    let (meeting, attendee_ids, contact_ids) = load_meeting(&mut conn, meeting_id)?;
    Ok(Json(to_response(meeting, attendee_ids, contact_ids)))
}

pub async fn delete_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let mut conn = state.db()?;
    let deleted = diesel::delete(meetings::table.find(meeting_id)).execute(&mut conn)?;
    if deleted == 0 {
        return Err(AppError::not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn notify_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let sent = send_meeting_call(&state, meeting_id).await?;
    Ok(Json(json!({
        "message": format!("Convocatoria enviada a {sent} destinatario(s).")
    })))
}

/// Sends the meeting call to the configured recipients, falling back to the
/// project's main contact when none are configured. Returns the number of
/// addresses the message went to.
async fn send_meeting_call(state: &AppState, meeting_id: Uuid) -> AppResult<usize> {
    let mut conn = state.db()?;
    let meeting: Meeting = meetings::table.find(meeting_id).first(&mut conn)?;
    let project: Project = projects::table.find(meeting.project_id).first(&mut conn)?;

    let mut recipients: Vec<CompanyContact> = meeting_notification_contacts::table
        .filter(meeting_notification_contacts::meeting_id.eq(meeting_id))
        .inner_join(company_contacts::table)
        .select(company_contacts::all_columns)
        .load(&mut conn)?;

    if recipients.is_empty() {
        if let Some(main_contact_id) = project.main_contact_id {
            if let Some(contact) = company_contacts::table
                .find(main_contact_id)
                .first::<CompanyContact>(&mut conn)
                .optional()?
            {
                recipients.push(contact);
            }
        }
    }

    if recipients.is_empty() {
        return Err(AppError::bad_request(NO_RECIPIENTS_ERROR));
    }

    let addresses: Vec<String> = recipients
        .iter()
        .map(|contact| contact.email.trim().to_string())
        .filter(|email| !email.is_empty())
        .collect();

    if addresses.is_empty() {
        return Err(AppError::bad_request(NO_RECIPIENT_EMAIL_ERROR));
    }

    let subject = format!("Nueva Reunión programada - {}", project.code);
    let body = compose_notification_body(&project, &meeting);

    if let Err(err) = state.mailer.send(&addresses, &subject, &body).await {
        error!(meeting_id = %meeting_id, error = %err, "meeting notification failed");
        return Err(AppError::internal(err));
    }

    diesel::update(meetings::table.find(meeting_id))
        .set(meetings::is_notified.eq(true))
        .execute(&mut conn)?;

    info!(meeting_id = %meeting_id, recipients = addresses.len(), "meeting notification sent");
    Ok(addresses.len())
}

fn compose_notification_body(project: &Project, meeting: &Meeting) -> String {
    let mut body = format!(
        "Se ha programado una nueva reunión \"{}\" para el proyecto {} ({}).\n\n",
        meeting.reason, project.code, project.description,
    );
    let _ = writeln!(body, "Fecha: {}", meeting.start_date);
    let _ = writeln!(body, "Hora: {}", meeting.time.format("%H:%M"));
    let _ = writeln!(body, "Tipo: {}", meeting.meeting_type);
    if meeting.meeting_type == "ONLINE" {
        let _ = writeln!(
            body,
            "Enlace: {}",
            meeting.teams_link.as_deref().unwrap_or("(sin enlace)")
        );
    } else {
        let _ = writeln!(body, "Lugar: {}", meeting.location);
    }
    body
}

fn load_meeting(
    conn: &mut PgConnection,
    meeting_id: Uuid,
) -> AppResult<(Meeting, Vec<Uuid>, Vec<Uuid>)> {
    let meeting: Meeting = meetings::table.find(meeting_id).first(conn)?;
    let attendee_ids: Vec<Uuid> = meeting_attendees::table
        .filter(meeting_attendees::meeting_id.eq(meeting_id))
        .select(meeting_attendees::user_id)
        .load(conn)?;
    let contact_ids: Vec<Uuid> = meeting_notification_contacts::table
        .filter(meeting_notification_contacts::meeting_id.eq(meeting_id))
        .select(meeting_notification_contacts::contact_id)
        .load(conn)?;
    Ok((meeting, attendee_ids, contact_ids))
}

fn replace_relation_sets(
    conn: &mut PgConnection,
    meeting_id: Uuid,
    attendee_ids: &[Uuid],
    contact_ids: &[Uuid],
) -> AppResult<()> {
    replace_attendee_set(conn, meeting_id, attendee_ids)?;
    replace_contact_set(conn, meeting_id, contact_ids)?;
    Ok(())
}

fn replace_attendee_set(
    conn: &mut PgConnection,
    meeting_id: Uuid,
    attendee_ids: &[Uuid],
) -> AppResult<()> {
    diesel::delete(meeting_attendees::table.filter(meeting_attendees::meeting_id.eq(meeting_id)))
        .execute(conn)?;
    let rows: Vec<NewMeetingAttendee> = attendee_ids
        .iter()
        .map(|user_id| NewMeetingAttendee {
            meeting_id,
            user_id: *user_id,
        })
        .collect();
    diesel::insert_into(meeting_attendees::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn replace_contact_set(
    conn: &mut PgConnection,
    meeting_id: Uuid,
    contact_ids: &[Uuid],
) -> AppResult<()> {
    diesel::delete(
        meeting_notification_contacts::table
            .filter(meeting_notification_contacts::meeting_id.eq(meeting_id)),
    )
    .execute(conn)?;
    let rows: Vec<NewMeetingNotificationContact> = contact_ids
        .iter()
        .map(|contact_id| NewMeetingNotificationContact {
            meeting_id,
            contact_id: *contact_id,
        })
        .collect();
    diesel::insert_into(meeting_notification_contacts::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

fn dedupe(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

fn resolve_project(conn: &mut PgConnection, project_id: Uuid) -> AppResult<()> {
    let found: bool = select(exists(projects::table.find(project_id))).get_result(conn)?;
    if !found {
        return Err(AppError::field("projectId", "el proyecto indicado no existe"));
    }
    Ok(())
}

fn resolve_attendee(conn: &mut PgConnection, user_id: Uuid) -> AppResult<()> {
    let found: bool = select(exists(users::table.find(user_id))).get_result(conn)?;
    if !found {
        return Err(AppError::field("attendeeIds", "el usuario indicado no existe"));
    }
    Ok(())
}

fn resolve_notification_contact(conn: &mut PgConnection, contact_id: Uuid) -> AppResult<()> {
    let found: bool =
        select(exists(company_contacts::table.find(contact_id))).get_result(conn)?;
    if !found {
        return Err(AppError::field(
            "notificationContactIds",
            "el contacto indicado no existe",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_project() -> Project {
        Project {
            id: Uuid::new_v4(),
            contract_id: Uuid::new_v4(),
            code: "P-001".to_string(),
            description: "Mantenimiento de presas".to_string(),
            start_date: None,
            end_date: None,
            work_center_id: None,
            manager_id: Uuid::new_v4(),
            fecha_solicitud: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
            created_at: NaiveDate::from_ymd_opt(2025, 1, 5)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            main_contact_id: None,
            contract_manager_id: None,
            company_status: "INACTIVA".to_string(),
            documentation_status: "NO_VERIFICADA".to_string(),
        }
    }

    fn sample_meeting(meeting_type: &str, teams_link: Option<&str>) -> Meeting {
        Meeting {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 2, 10).unwrap(),
            time: chrono::NaiveTime::from_hms_opt(10, 30, 0).unwrap(),
            reason: "Revisión de documentación".to_string(),
            location: "Oficina de Sevilla".to_string(),
            meeting_type: meeting_type.to_string(),
            teams_link: teams_link.map(str::to_string),
            status: "PROGRAMADA".to_string(),
            minutes: None,
            minute_pdf_url: None,
            signatures: serde_json::json!([]),
            is_notified: false,
        }
    }

    #[test]
    fn in_person_meetings_embed_the_location() {
        let body = compose_notification_body(&sample_project(), &sample_meeting("PRESENCIAL", None));
        assert!(body.contains("Revisión de documentación"));
        assert!(body.contains("P-001"));
        assert!(body.contains("Fecha: 2025-02-10"));
        assert!(body.contains("Hora: 10:30"));
        assert!(body.contains("Lugar: Oficina de Sevilla"));
        assert!(!body.contains("Enlace:"));
    }

    #[test]
    fn online_meetings_embed_the_video_link() {
        let body = compose_notification_body(
            &sample_project(),
            &sample_meeting("ONLINE", Some("https://meet.example.com/abc")),
        );
        assert!(body.contains("Enlace: https://meet.example.com/abc"));
        assert!(!body.contains("Lugar:"));
    }
}
