use aperture::cli::Context;
use aperture::config::Config;
use aperture::export::{ExportFormat, Snapshot, csv};
use aperture::list::LoadState;
use aperture::mutation::{self, Mutation, MutationOutcome};
use aperture::remote::registry::build_source_registry;
use aperture::screen;
use aperture::session::Session;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn applications(n: usize) -> Value {
    let data: Vec<Value> = (1..=n)
        .map(|i| {
            let department = if i % 2 == 0 { "Physics" } else { "Fine Arts" };
            json!({
                "id": format!("A{i}"),
                "Full Name": format!("Applicant {i}"),
                "Email": format!("a{i}@example.edu"),
                "Department": department,
                "Timestamp": format!("2025-02-{:02}T09:00:00Z", i),
                "status": "pending",
            })
        })
        .collect();
    json!({"status": "success", "data": data})
}

async fn context(server: &MockServer, identity: Option<&str>) -> Context {
    let mut config = Config::default();
    config
        .endpoints
        .insert("membership".into(), format!("{}/exec", server.uri()));
    let session = Session::new(identity, &config.admins);
    let sources = build_source_registry(&config).unwrap();
    Context {
        config,
        session,
        sources,
        offline: false,
    }
}

#[tokio::test]
async fn test_list_filter_paginate_and_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "getApplications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(applications(23)))
        .mount(&server)
        .await;

    let ctx = context(&server, Some("chair@club.example.edu")).await;
    let screen = screen::find("applications").unwrap();
    let (mut view, _source) = ctx.load(screen).await.unwrap();

    assert_eq!(view.state(), &LoadState::Ready);
    assert!(!view.is_demo());
    assert_eq!(view.total_pages(), 3);
    // Newest first.
    assert_eq!(view.visible_items()[0].text("id").as_deref(), Some("A23"));

    assert!(view.set_page(3));
    assert_eq!(view.visible_items().len(), 3);

    view.set_filter_query("physics");
    assert_eq!(view.page(), 1);
    assert_eq!(view.filtered_len(), 11);

    let snapshot = Snapshot::filtered(&view);
    let out = snapshot.render(ExportFormat::Csv, screen.columns).unwrap();
    assert_eq!(out.lines().count(), 12);
    assert!(out.starts_with("id,Full Name,Email,Department,Timestamp,status\n"));

    let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    assert_eq!(
        csv::file_name(screen.dataset(), date, view.is_demo()),
        "applications_2025-03-01.csv"
    );
}

#[tokio::test]
async fn test_admin_screen_requires_identity() {
    let server = MockServer::start().await;
    let ctx = context(&server, None).await;
    let screen = screen::find("applications").unwrap();
    assert!(ctx.load(screen).await.is_err());
}

#[tokio::test]
async fn test_status_change_is_unconfirmed_then_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("action", "getApplications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(applications(2)))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("action=updateStatus"))
        .and(body_string_contains("status=approved"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server, Some("chair@club.example.edu")).await;
    let screen = screen::find("applications").unwrap();
    let (mut view, source) = ctx.load(screen).await.unwrap();

    let m = Mutation::set_status(screen, "A1", "approved");
    let outcome = mutation::submit(source.as_ref(), &mut view, &ctx.session, &m)
        .await
        .unwrap();
    assert_eq!(outcome, MutationOutcome::Unconfirmed);
    // The refetch replaced the optimistic patch with what the sheet says.
    assert_eq!(
        view.record("A1").unwrap().text("status").as_deref(),
        Some("pending")
    );
}

#[tokio::test]
async fn test_outage_falls_back_to_marked_demo_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ctx = context(&server, Some("chair@club.example.edu")).await;
    let screen = screen::find("applications").unwrap();
    let (view, _source) = ctx.load(screen).await.unwrap();

    assert!(matches!(view.state(), LoadState::Error(_)));
    assert!(view.is_demo());
    let json = Snapshot::page(&view)
        .render(ExportFormat::Json, screen.columns)
        .unwrap();
    let parsed: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["is_demo"], json!(true));
    assert!(parsed["error"].as_str().unwrap().contains("500"));
}
