use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use jobwire::board::{
    board_router, BoardPagination, BoardService, EmployerInput, InMemoryBoardRepository, JobForm,
    JobId, JobType, SubjectInput,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn build_board() -> (axum::Router, Arc<BoardService<InMemoryBoardRepository>>) {
    let repository = Arc::new(InMemoryBoardRepository::new());
    let service = Arc::new(BoardService::new(repository, BoardPagination::default()));
    (board_router(service.clone()), service)
}

fn form(title: &str) -> JobForm {
    JobForm {
        title: title.to_string(),
        url: format!("https://example.org/jobs/{}", title.replace(' ', "-")),
        description: "Keep the discovery layer running.".to_string(),
        job_type: JobType::FullTime,
        employer: Some(EmployerInput {
            name: "River City Library".to_string(),
            slug: "river-city-library".to_string(),
            external_id: None,
        }),
        subjects: vec![SubjectInput {
            name: "Metadata".to_string(),
            slug: "metadata".to_string(),
            external_id: None,
        }],
        contact_name: None,
        contact_email: None,
        editor: "curator".to_string(),
    }
}

fn seed_published(service: &BoardService<InMemoryBoardRepository>, count: usize) -> Vec<JobId> {
    let base = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).single().expect("valid timestamp");
    (0..count)
        .map(|i| {
            let posted = base + Duration::minutes(i as i64);
            service
                .restore_job(form(&format!("Job {i:02}")), posted, Some(posted), 0)
                .expect("seeded")
                .id
        })
        .collect()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn listing_defaults_to_page_one_on_garbage_page_numbers() {
    let (router, service) = build_board();
    seed_published(&service, 3);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs?page=banana")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["page"]["number"], json!(1));
    assert_eq!(payload["total_count"], json!(3));
    assert_eq!(payload["pages"], json!([1]));
}

#[tokio::test]
async fn out_of_range_pages_are_not_found() {
    let (router, service) = build_board();
    seed_published(&service, 3);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs?page=99")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn window_spans_the_listing_with_a_gap() {
    let (router, service) = build_board();
    // 45 pages of 20: body of 8 around page 1, then a gap, then the anchor.
    seed_published(&service, 900);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/jobs")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(
        payload["pages"],
        json!([1, 2, 3, 4, 5, 6, 7, 8, 9, null, 45])
    );
    assert_eq!(payload["page_count"], json!(45));
}

#[tokio::test]
async fn deleted_jobs_answer_gone() {
    let (router, service) = build_board();
    let now = Utc::now();
    let draft = service.create_job(form("Short Lived"), now).expect("created");
    service.delete_job(draft.id, now).expect("deleted");

    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/jobs/{}", draft.id))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn create_then_publish_roundtrip() {
    let (router, _service) = build_board();

    let mut draft_form = form("Discovery Engineer");
    draft_form.employer = None;
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/jobs")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&draft_form).expect("serialize form"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_u64().expect("job id");

    // Publishing before an employer is assigned is refused with the reason.
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/jobs/{id}/publish"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "editor": "curator" })).expect("serialize"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let refusal = body_json(response).await;
    assert!(refusal["error"]
        .as_str()
        .expect("error message")
        .contains("employer"));

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/jobs/{id}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&form("Discovery Engineer")).expect("serialize form"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/jobs/{id}/publish"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "editor": "curator" })).expect("serialize"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let published = body_json(response).await;
    assert!(published["published"].is_string());

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/curate")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let queue = body_json(response).await;
    assert_eq!(queue["need_publish"], json!(0));
}

#[tokio::test]
async fn keyword_actions_and_unknown_ids() {
    let (router, service) = build_board();
    let ids = seed_published(&service, 4);
    let keyword = service
        .register_keyword("solr", ids)
        .expect("registered");

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/keywords/{}", keyword.id))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "action": "ignore" })).expect("serialize"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["ignore"], json!(true));

    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/keywords/999999")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "action": "unlink" })).expect("serialize"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn employer_pages_report_live_job_counts() {
    let (router, service) = build_board();
    seed_published(&service, 5);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/employers")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["items"][0]["slug"], json!("river-city-library"));
    assert_eq!(payload["items"][0]["job_count"], json!(5));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/employers/river-city-library")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = body_json(response).await;
    assert_eq!(payload["name"], json!("River City Library"));
    assert_eq!(payload["jobs"].as_array().map(Vec::len), Some(5));
}
