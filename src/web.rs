use actix_web::http::StatusCode;
use actix_web::{middleware, web, App, HttpResponse, HttpServer, ResponseError};
use chrono::Local;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::Config;
use crate::error::SchedulerError;
use crate::form::{export_table, read_table, AppointmentRequest, TabularFormat};
use crate::parser::Appointment;
use crate::report::{calendar_events, calendar_report};
use crate::session::Session;
use crate::store::CsvStore;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// One interactive session shared by every request; requests take turns.
pub struct AppState {
    pub session: Mutex<Session>,
    pub config: Config,
}

impl AppState {
    pub fn new(session: Session, config: Config) -> Self {
        Self {
            session: Mutex::new(session),
            config,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        // Every session operation is all-or-nothing, so a poisoned lock still
        // guards a consistent table.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Serialize)]
pub struct TableResponse {
    revision: u64,
    appointments: Vec<Appointment>,
}

impl TableResponse {
    fn from_session(session: &Session) -> Self {
        Self {
            revision: session.revision(),
            appointments: session.table().to_vec(),
        }
    }
}

#[derive(Deserialize)]
pub struct AddRequest {
    appointment: AppointmentRequest,
    /// Overrides the configured per-slot limit for this booking
    limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct ImportQuery {
    format: Option<String>,
}

impl ResponseError for SchedulerError {
    fn status_code(&self) -> StatusCode {
        match self {
            SchedulerError::Validation(_) | SchedulerError::Import(_) => StatusCode::BAD_REQUEST,
            SchedulerError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            SchedulerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            SchedulerError::StoreWrite(_) => StatusCode::BAD_GATEWAY,
            SchedulerError::Report(_)
            | SchedulerError::Export(_)
            | SchedulerError::Config(_)
            | SchedulerError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}

fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}

/// Runs store I/O and rendering on the blocking pool. Waiting for the session
/// lock happens there too, so a slow store call never stalls a worker thread.
async fn blocking<T, F>(state: web::Data<AppState>, work: F) -> Result<T, SchedulerError>
where
    F: FnOnce(&AppState) -> Result<T, SchedulerError> + Send + 'static,
    T: Send + 'static,
{
    web::block(move || work(&state))
        .await
        .map_err(|e| SchedulerError::Worker(e.to_string()))?
}

async fn list_appointments(state: web::Data<AppState>) -> Result<HttpResponse, SchedulerError> {
    let body = blocking(state, |state| Ok(TableResponse::from_session(&state.session()))).await?;
    Ok(HttpResponse::Ok().json(body))
}

async fn sync(state: web::Data<AppState>) -> Result<HttpResponse, SchedulerError> {
    let body = blocking(state, |state| {
        let mut session = state.session();
        session.reload()?;
        Ok(TableResponse::from_session(&session))
    })
    .await?;
    Ok(HttpResponse::Ok().json(body))
}

async fn add_appointment(
    req: web::Json<AddRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SchedulerError> {
    let AddRequest { appointment, limit } = req.into_inner();
    let (appointment, revision) = blocking(state, move |state| {
        let limit = limit.unwrap_or(state.config.slot_limit);
        let mut session = state.session();
        let stored = session.append(&appointment, limit, Local::now().date_naive())?;
        Ok((stored, session.revision()))
    })
    .await?;
    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "appointment": appointment,
        "revision": revision,
    })))
}

async fn replace_appointments(
    req: web::Json<Vec<Appointment>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SchedulerError> {
    let records = req.into_inner();
    let body = blocking(state, move |state| {
        let mut session = state.session();
        session.replace(&records)?;
        Ok(TableResponse::from_session(&session))
    })
    .await?;
    Ok(HttpResponse::Ok().json(body))
}

async fn get_events(state: web::Data<AppState>) -> Result<HttpResponse, SchedulerError> {
    let events = blocking(state, |state| Ok(calendar_events(state.session().table()))).await?;
    Ok(HttpResponse::Ok().json(events))
}

async fn get_slots(state: web::Data<AppState>) -> Result<HttpResponse, SchedulerError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "slots": state.config.time_slots()?,
        "limit": state.config.slot_limit,
    })))
}

async fn export_calendar(state: web::Data<AppState>) -> Result<HttpResponse, SchedulerError> {
    let bytes = blocking(state, |state| {
        let table = state.session().table().to_vec();
        calendar_report(&table)
    })
    .await?;
    Ok(attachment("application/pdf", "interview_calendar.pdf", bytes))
}

async fn export_raw(state: web::Data<AppState>) -> Result<HttpResponse, SchedulerError> {
    let bytes = blocking(state, |state| {
        let table = state.session().table().to_vec();
        export_table(&table, TabularFormat::Xlsx)
    })
    .await?;
    Ok(attachment(TabularFormat::Xlsx.content_type(), "raw_data.xlsx", bytes))
}

async fn import_file(
    query: web::Query<ImportQuery>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SchedulerError> {
    let format = match query.format.as_deref() {
        None => TabularFormat::Xlsx,
        Some(name) => TabularFormat::from_name(name)
            .ok_or_else(|| SchedulerError::Import(format!("unsupported format '{}'", name)))?,
    };

    let (appended, revision) = blocking(state, move |state| {
        let imported = read_table(&body, format)?;
        let mut session = state.session();
        let appended = session.import(&imported)?;
        Ok((appended, session.revision()))
    })
    .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "imported": appended,
        "revision": revision,
    })))
}

/// Registers every API route; shared by the server and the tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .service(
            web::resource("/api/appointments")
                .route(web::get().to(list_appointments))
                .route(web::post().to(add_appointment))
                .route(web::put().to(replace_appointments)),
        )
        .route("/api/sync", web::post().to(sync))
        .route("/api/events", web::get().to(get_events))
        .route("/api/slots", web::get().to(get_slots))
        .route("/api/export/calendar.pdf", web::get().to(export_calendar))
        .route("/api/export/raw.xlsx", web::get().to(export_raw))
        .route("/api/import", web::post().to(import_file));
}

pub async fn start_server(port: u16, config: Config) -> std::io::Result<()> {
    let (session, load_error) = Session::open(CsvStore::new(&config.store));
    if let Some(err) = load_error {
        error!("starting with an empty table: {}", err);
    }
    info!("serving appointments from {}", config.store.display());

    let app_state = web::Data::new(AppState::new(session, config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
