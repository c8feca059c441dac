use axum::http::HeaderValue;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{auth::AuthenticatedUser, state::AppState};

pub mod companies;
pub mod contacts;
pub mod contracts;
pub mod documents;
pub mod health;
pub mod meetings;
pub mod projects;
pub mod templates;
pub mod token;
pub mod users;
pub mod workcenters;

pub(crate) fn to_iso(value: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(value, Utc).to_rfc3339()
}

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| {
                    trimmed
                        .parse::<HeaderValue>()
                        .expect("invalid CORS allowed origin")
                })
            })
            .collect();

        let allow_origin = AllowOrigin::list(headers);

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
            .allow_credentials(true)
    };

    let token_routes = Router::new()
        .route("/", post(token::obtain))
        .route("/refresh", post(token::refresh));

    let users_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/:id",
            get(users::get_user)
                .put(users::update_user)
                .patch(users::partial_update_user)
                .delete(users::delete_user),
        )
        .route("/:id/avatar", post(users::upload_avatar));

    let companies_routes = Router::new()
        .route(
            "/",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/:id",
            get(companies::get_company)
                .put(companies::update_company)
                .patch(companies::partial_update_company)
                .delete(companies::delete_company),
        )
        .route("/:id/logo", post(companies::upload_logo));

    let contacts_routes = Router::new()
        .route(
            "/",
            get(contacts::list_contacts).post(contacts::create_contact),
        )
        .route(
            "/:id",
            get(contacts::get_contact)
                .put(contacts::update_contact)
                .patch(contacts::partial_update_contact)
                .delete(contacts::delete_contact),
        );

    let contracts_routes = Router::new()
        .route(
            "/",
            get(contracts::list_contracts).post(contracts::create_contract),
        )
        .route(
            "/:id",
            get(contracts::get_contract)
                .put(contracts::update_contract)
                .patch(contracts::partial_update_contract)
                .delete(contracts::delete_contract),
        );

    let workcenters_routes = Router::new()
        .route(
            "/",
            get(workcenters::list_work_centers).post(workcenters::create_work_center),
        )
        .route(
            "/:id",
            get(workcenters::get_work_center)
                .put(workcenters::update_work_center)
                .patch(workcenters::partial_update_work_center)
                .delete(workcenters::delete_work_center),
        );

    let projects_routes = Router::new()
        .route(
            "/",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .patch(projects::partial_update_project)
                .delete(projects::delete_project),
        );

    let documents_routes = Router::new()
        .route(
            "/",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/:id",
            get(documents::get_document)
                .put(documents::update_document)
                .patch(documents::partial_update_document)
                .delete(documents::delete_document),
        );

    let meetings_routes = Router::new()
        .route(
            "/",
            get(meetings::list_meetings).post(meetings::create_meeting),
        )
        .route(
            "/:id",
            get(meetings::get_meeting)
                .put(meetings::update_meeting)
                .patch(meetings::partial_update_meeting)
                .delete(meetings::delete_meeting),
        )
        .route("/:id/notify", post(meetings::notify_meeting));

    let templates_routes = Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/:id",
            get(templates::get_template)
                .put(templates::update_template)
                .patch(templates::partial_update_template)
                .delete(templates::delete_template),
        );

    let protected_state = state.clone();
    let protected_routes = Router::new()
        .nest("/api/users", users_routes)
        .nest("/api/companies", companies_routes)
        .nest("/api/contacts", contacts_routes)
        .nest("/api/contracts", contracts_routes)
        .nest("/api/workcenters", workcenters_routes)
        .nest("/api/projects", projects_routes)
        .nest("/api/documents", documents_routes)
        .nest("/api/meetings", meetings_routes)
        .nest("/api/templates", templates_routes)
        .layer(middleware::from_extractor_with_state::<AuthenticatedUser, _>(protected_state));

    Router::new()
        .merge(protected_routes)
        .nest("/api/token", token_routes)
        .route("/api/health", get(health::health_check))
        .with_state(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 32))
}
