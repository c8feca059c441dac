use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

pub const USER_ROLES: &[&str] = &["MANAGER", "COORDINATOR"];
pub const DEFAULT_USER_ROLE: &str = "COORDINATOR";

pub const WORK_CENTER_TYPES: &[&str] = &["EMBALSE", "OFICINA"];
pub const PROVINCES: &[&str] = &[
    "MÁLAGA", "SEVILLA", "JAÉN", "CÓRDOBA", "CEUTA", "MELILLA", "GRANADA",
];

pub const COMPANY_STATUSES: &[&str] = &["INACTIVA", "ACTIVA", "TERMINADO"];
pub const DEFAULT_COMPANY_STATUS: &str = "INACTIVA";
pub const DOCUMENTATION_STATUSES: &[&str] = &["NO_VERIFICADA", "VERIFICADA"];
pub const DEFAULT_DOCUMENTATION_STATUS: &str = "NO_VERIFICADA";

pub const DOCUMENT_STATUSES: &[&str] = &["BORRADOR", "PRESENTADO", "ACEPTADO", "RECHAZADO"];
pub const DEFAULT_DOCUMENT_STATUS: &str = "BORRADOR";

pub const MEETING_STATUSES: &[&str] = &["PROGRAMADA", "EN_CURSO", "REALIZADA", "CANCELADA"];
pub const DEFAULT_MEETING_STATUS: &str = "PROGRAMADA";
pub const MEETING_TYPES: &[&str] = &["PRESENCIAL", "ONLINE"];

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub cif: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub cif: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = companies)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub cif: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub id: Uuid,
    pub name: String,
    pub cif: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = company_contacts)]
#[diesel(belongs_to(Company, foreign_key = company_id))]
pub struct CompanyContact {
    pub id: Uuid,
    pub company_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub position: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = company_contacts)]
pub struct NewCompanyContact {
    pub id: Uuid,
    pub company_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub position: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = contracts)]
pub struct Contract {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub client_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub amount: BigDecimal,
    pub coordinator_id: Option<Uuid>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = contracts)]
pub struct NewContract {
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub client_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub amount: BigDecimal,
    pub coordinator_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = work_centers)]
pub struct WorkCenter {
    pub id: Uuid,
    pub name: String,
    pub center_type: String,
    pub address: String,
    pub zip_code: String,
    pub phone: String,
    pub province: String,
    pub risk_info_url: Option<String>,
    pub risk_info_file_name: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = work_centers)]
pub struct NewWorkCenter {
    pub id: Uuid,
    pub name: String,
    pub center_type: String,
    pub address: String,
    pub zip_code: String,
    pub phone: String,
    pub province: String,
    pub risk_info_url: Option<String>,
    pub risk_info_file_name: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = projects)]
#[diesel(belongs_to(Contract, foreign_key = contract_id))]
pub struct Project {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub code: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub work_center_id: Option<Uuid>,
    pub manager_id: Uuid,
    pub fecha_solicitud: NaiveDate,
    pub created_at: NaiveDateTime,
    pub main_contact_id: Option<Uuid>,
    pub contract_manager_id: Option<Uuid>,
    pub company_status: String,
    pub documentation_status: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProject {
    pub id: Uuid,
    pub contract_id: Uuid,
    pub code: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub work_center_id: Option<Uuid>,
    pub manager_id: Uuid,
    pub fecha_solicitud: NaiveDate,
    pub main_contact_id: Option<Uuid>,
    pub contract_manager_id: Option<Uuid>,
    pub company_status: String,
    pub documentation_status: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Queryable, Associations)]
#[diesel(table_name = project_companies)]
#[diesel(belongs_to(Project))]
#[diesel(belongs_to(Company))]
#[diesel(primary_key(project_id, company_id))]
pub struct ProjectCompany {
    pub project_id: Uuid,
    pub company_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = project_companies)]
pub struct NewProjectCompany {
    pub project_id: Uuid,
    pub company_id: Uuid,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Queryable, Associations)]
#[diesel(table_name = project_contacts)]
#[diesel(belongs_to(Project))]
#[diesel(belongs_to(CompanyContact, foreign_key = contact_id))]
#[diesel(primary_key(project_id, contact_id))]
pub struct ProjectContact {
    pub project_id: Uuid,
    pub contact_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = project_contacts)]
pub struct NewProjectContact {
    pub project_id: Uuid,
    pub contact_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = project_documents)]
#[diesel(belongs_to(Project, foreign_key = project_id))]
pub struct ProjectDocument {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub url: String,
    pub status: String,
    pub category: Option<String>,
    pub uploaded_by_id: Option<Uuid>,
    pub uploaded_at: NaiveDateTime,
    pub status_date: Option<NaiveDateTime>,
    pub signatures: serde_json::Value,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = project_documents)]
pub struct NewProjectDocument {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub url: String,
    pub status: String,
    pub category: Option<String>,
    pub uploaded_by_id: Option<Uuid>,
    pub status_date: Option<NaiveDateTime>,
    pub signatures: serde_json::Value,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = meetings)]
#[diesel(belongs_to(Project, foreign_key = project_id))]
pub struct Meeting {
    pub id: Uuid,
    pub project_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub location: String,
    pub meeting_type: String,
    pub teams_link: Option<String>,
    pub status: String,
    pub minutes: Option<String>,
    pub minute_pdf_url: Option<String>,
    pub signatures: serde_json::Value,
    pub is_notified: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = meetings)]
pub struct NewMeeting {
    pub id: Uuid,
    pub project_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time: NaiveTime,
    pub reason: String,
    pub location: String,
    pub meeting_type: String,
    pub teams_link: Option<String>,
    pub status: String,
    pub minutes: Option<String>,
    pub minute_pdf_url: Option<String>,
    pub signatures: serde_json::Value,
    pub is_notified: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = meeting_attendees)]
pub struct NewMeetingAttendee {
    pub meeting_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = meeting_notification_contacts)]
pub struct NewMeetingNotificationContact {
    pub meeting_id: Uuid,
    pub contact_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = document_templates)]
pub struct DocumentTemplate {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub file_data: String,
    pub file_name: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_templates)]
pub struct NewDocumentTemplate {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub file_data: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = refresh_tokens)]
#[diesel(belongs_to(User))]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub revoked_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}
