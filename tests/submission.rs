use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use vidscrape::config::ClientConfig;
use vidscrape::model::{PLACEHOLDER, Status};
use vidscrape::submission::{Submission, SubmissionState};
use vidscrape::{Error, ScrapeClient};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn submission_for(server: &MockServer, show_pending: bool) -> Submission {
    let config = ClientConfig {
        server_url: server.uri(),
        timeout_secs: 5,
        ..ClientConfig::default()
    };
    Submission::new(ScrapeClient::new(&config).unwrap(), show_pending, None)
}

fn record(url: &str, title: &str) -> serde_json::Value {
    json!({
        "input_url": url,
        "title": title,
        "duration_seconds": 184,
        "duration_hhmmss": "03:04",
        "views": 10,
        "upload_date": "01-02-2024 10:00",
        "channel_url": "https://vk.com/club1",
        "channel_name": "Club",
        "subscribers": 5,
        "status": "Success",
        "error": null
    })
}

#[tokio::test]
async fn sends_one_request_and_renders_rows_in_response_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "urls": ["https://vk.com/video1", "https://vk.com/video2"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                record("https://vk.com/video1", "First"),
                {
                    "input_url": "https://vk.com/video2",
                    "title": "N/A",
                    "duration_seconds": "N/A",
                    "duration_hhmmss": "N/A",
                    "views": "N/A",
                    "upload_date": "N/A",
                    "channel_url": "N/A",
                    "channel_name": "N/A",
                    "subscribers": "N/A",
                    "status": "Error",
                    "error": "403 Forbidden"
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let submission = submission_for(&server, true);
    let report = submission
        .submit("  https://vk.com/video1\n\n https://vk.com/video2 \n")
        .await
        .unwrap();

    assert_eq!(report.urls_submitted, 2);
    assert_eq!(report.rows_rendered, 2);
    assert_eq!(report.message, "Done. 2 URL(s).");
    assert_eq!(submission.state(), SubmissionState::Done);
    assert!(!submission.is_submitting());

    let table = submission.table().await;
    let rows = table.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].ordinal, 1);
    assert_eq!(rows[0].cells[2].display_text(), "First");
    assert_eq!(rows[1].ordinal, 2);
    assert_eq!(rows[1].status, Status::Error);
    for cell in &rows[1].cells[2..10] {
        assert_eq!(cell.display_text(), PLACEHOLDER);
    }
    assert_eq!(rows[1].cells[10].display_text(), "Error - 403 Forbidden");

    let metrics = submission.metrics().snapshot();
    assert_eq!(metrics.items_success, 1);
    assert_eq!(metrics.items_error, 1);
}

#[tokio::test]
async fn blank_input_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let submission = submission_for(&server, true);
    let err = submission.submit(" \n\t\n").await.unwrap_err();

    assert!(matches!(err, Error::EmptyInput));
    assert_eq!(err.to_string(), "Please paste at least one video URL.");
    assert_eq!(submission.state(), SubmissionState::Idle);
    assert!(submission.table().await.is_empty());
}

#[tokio::test]
async fn empty_results_leave_an_empty_table() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let submission = submission_for(&server, true);
    let report = submission.submit("https://vk.com/video1").await.unwrap();

    assert_eq!(report.rows_rendered, 0);
    assert_eq!(report.message, "Done. 0 URL(s).");
    assert!(submission.table().await.is_empty());
}

#[tokio::test]
async fn server_error_renders_nothing_and_releases_the_guard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [record("https://vk.com/video1", "Later")]
        })))
        .mount(&server)
        .await;

    let submission = submission_for(&server, true);
    let err = submission.submit("https://vk.com/video1").await.unwrap_err();

    assert!(matches!(err, Error::Status(s) if s.as_u16() == 500));
    assert!(err.is_transport());
    assert_eq!(submission.state(), SubmissionState::Failed);
    assert!(submission.table().await.is_empty());
    assert!(!submission.is_submitting());

    let report = submission.submit("https://vk.com/video1").await.unwrap();
    assert_eq!(report.rows_rendered, 1);
    assert_eq!(submission.state(), SubmissionState::Done);
}

#[tokio::test]
async fn undecodable_body_is_a_batch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let submission = submission_for(&server, false);
    let err = submission.submit("https://vk.com/video1").await.unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
    assert!(submission.table().await.is_empty());
    assert!(!submission.is_submitting());
}

#[tokio::test]
async fn pending_rows_are_shown_while_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [record("a", "A"), record("b", "B")] }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let submission = Arc::new(submission_for(&server, true));
    let task = {
        let submission = submission.clone();
        tokio::spawn(async move { submission.submit("a\nb").await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    let pending = submission.table().await;
    assert_eq!(pending.len(), 2);
    assert!(pending.rows().iter().all(|r| r.status == Status::Fetching));
    assert_eq!(pending.rows()[1].cells[2].display_text(), "…");
    assert!(submission.is_submitting());

    task.await.unwrap().unwrap();
    let done = submission.table().await;
    assert!(done.rows().iter().all(|r| r.status == Status::Success));
}

#[tokio::test]
async fn overlapping_submit_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [record("a", "A")] }))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let submission = Arc::new(submission_for(&server, false));
    let first = {
        let submission = submission.clone();
        tokio::spawn(async move { submission.submit("a").await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = submission.submit("b").await.unwrap_err();
    assert!(matches!(err, Error::Busy));

    let report = first.await.unwrap().unwrap();
    assert_eq!(report.rows_rendered, 1);
    assert_eq!(submission.table().await.rows()[0].result.input_url, "a");
    assert_eq!(submission.metrics().snapshot().submissions_rejected, 1);
}

#[tokio::test]
async fn state_changes_are_observable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;

    let submission = submission_for(&server, false);
    let mut rx = submission.watch_state();
    assert_eq!(*rx.borrow(), SubmissionState::Idle);

    submission.submit("a").await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), SubmissionState::Done);
}
