use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use interview_scheduler::config::Config;
use interview_scheduler::form::export::export_xlsx;
use interview_scheduler::parser::{RawRow, RawValue};
use interview_scheduler::store::MemoryStore;
use interview_scheduler::web::{configure, AppState};
use interview_scheduler::{Appointment, Session};

fn booked(name: &str, date: &str, time: &str) -> RawRow {
    [("name", name), ("date", date), ("time", time)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), RawValue::from(v)))
        .collect()
}

fn state_with(rows: Vec<RawRow>, slot_limit: u32) -> web::Data<AppState> {
    let (session, err) = Session::open(MemoryStore::with_rows(rows));
    assert!(err.is_none());
    web::Data::new(AppState::new(
        session,
        Config {
            slot_limit,
            ..Config::default()
        },
    ))
}

#[actix_web::test]
async fn lists_the_working_table() {
    let state = state_with(vec![booked("Ann", "2030-06-01", "14:00:00")], 0);
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let resp: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/appointments").to_request(),
    )
    .await;
    assert_eq!(resp["appointments"][0]["time"], "14:00");
    assert_eq!(resp["appointments"][0]["identifier"], "");
}

#[actix_web::test]
async fn full_slot_returns_conflict() {
    let state = state_with(
        vec![
            booked("A", "2030-06-01", "14:00"),
            booked("B", "2030-06-01", "14:00"),
        ],
        2,
    );
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/appointments")
        .set_json(json!({ "appointment": { "name": "C", "date": "2030-06-01", "time": "14:00" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "slot full (2/2)");

    let req = test::TestRequest::post()
        .uri("/api/appointments")
        .set_json(json!({ "appointment": { "name": "C", "date": "2030-06-01", "time": "14:30" } }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    assert_eq!(state.session.lock().unwrap().table().len(), 3);
}

#[actix_web::test]
async fn missing_name_is_a_bad_request() {
    let state = state_with(Vec::new(), 0);
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/appointments")
        .set_json(json!({ "appointment": { "date": "2030-06-01", "time": "14:00" } }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn grid_save_and_events() {
    let state = state_with(vec![booked("Old", "2030-01-01", "11:00")], 0);
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let edited = vec![
        Appointment {
            name: "Ann".to_string(),
            date: "2030-06-01".to_string(),
            time: "09:00".to_string(),
            ..Appointment::default()
        },
        Appointment {
            name: "Draft".to_string(),
            ..Appointment::default()
        },
    ];
    let req = test::TestRequest::put()
        .uri("/api/appointments")
        .set_json(&edited)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let events: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/events").to_request(),
    )
    .await;
    assert_eq!(events.as_array().map(Vec::len), Some(1));
    assert_eq!(events[0]["start"], "2030-06-01T09:00");
}

#[actix_web::test]
async fn import_rejects_files_without_name_column() {
    let state = state_with(Vec::new(), 0);
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/import?format=csv")
        .set_payload("Person,Date\nA,2030-06-01\n")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.session.lock().unwrap().table().is_empty());
}

#[actix_web::test]
async fn xlsx_import_then_exports() {
    let state = state_with(Vec::new(), 0);
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let upload = export_xlsx(&[
        Appointment {
            name: "Ann".to_string(),
            date: "2030-06-01".to_string(),
            time: "09:00".to_string(),
            ..Appointment::default()
        },
        Appointment {
            name: "Ben".to_string(),
            date: "2030-07-01".to_string(),
            time: "10:00".to_string(),
            ..Appointment::default()
        },
    ])
    .unwrap();
    let req = test::TestRequest::post()
        .uri("/api/import")
        .set_payload(upload)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["imported"], 2);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/export/calendar.pdf").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let pdf = test::read_body(resp).await;
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), 2);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/export/raw.xlsx").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(!test::read_body(resp).await.is_empty());
}

#[actix_web::test]
async fn slots_follow_configuration() {
    let state = state_with(Vec::new(), 3);
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/slots").to_request(),
    )
    .await;
    assert_eq!(body["limit"], 3);
    assert_eq!(body["slots"][0], "11:00");
    assert_eq!(body["slots"].as_array().map(Vec::len), Some(21));
}

#[actix_web::test]
async fn waiting_on_a_busy_session_leaves_the_runtime_free() {
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    let state = state_with(vec![booked("Ann", "2030-06-01", "14:00")], 0);
    let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

    // Another caller keeps the session busy with a slow store call
    let busy = state.clone();
    let (locked_tx, locked_rx) = mpsc::channel();
    let holder = std::thread::spawn(move || {
        let _guard = busy.session.lock().unwrap();
        locked_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(300));
    });
    locked_rx.recv().unwrap();

    let (listed_at, ticked_at) = tokio::join!(
        async {
            let req = test::TestRequest::get().uri("/api/appointments").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            Instant::now()
        },
        async {
            actix_web::rt::time::sleep(Duration::from_millis(20)).await;
            Instant::now()
        }
    );
    holder.join().unwrap();
    assert!(ticked_at < listed_at);
}
