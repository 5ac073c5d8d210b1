//! Tests for the transcription client.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::chain::RequestChain;
use crate::chain::testing::{MockTransport, empty_response, json_response};
use crate::models::{JobStatus, TranscriptionInput, TranscriptionRequest};
use crate::time::InstantSleeper;
use crate::transport::Body;
use crate::webhook::{Webhook, WebhookHeaders};

use super::{Error, Source, StorageService, TranscriptionClient};

fn job_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({"id": id, "status": status})
}

/// Client whose job and storage chains replay the given scripts.
fn client_with(
    jobs: &Arc<MockTransport>,
    storage: &Arc<MockTransport>,
) -> TranscriptionClient<InstantSleeper> {
    TranscriptionClient::from_parts(
        RequestChain::new().add_handler(Arc::clone(jobs)),
        StorageService::from_parts(
            RequestChain::new().add_handler(Arc::clone(storage)),
            Url::parse("https://storage-api.salad.com").unwrap(),
        ),
        Url::parse("https://api.salad.com/api/public").unwrap(),
        Duration::from_secs(5),
        InstantSleeper,
    )
}

fn unused_storage() -> Arc<MockTransport> {
    Arc::new(MockTransport::new(vec![Ok(json_response(
        &serde_json::json!({"url": "unused"}),
    ))]))
}

mod sources {
    use super::*;

    #[test]
    fn http_and_https_urls_are_remote() {
        assert!(matches!(
            Source::detect("https://example.com/a.mp4"),
            Source::Url(_)
        ));
        assert!(matches!(
            Source::detect("http://example.com/a.mp4"),
            Source::Url(_)
        ));
    }

    #[test]
    fn paths_and_other_schemes_are_local_files() {
        assert_eq!(
            Source::detect("recordings/a.mp4"),
            Source::File(PathBuf::from("recordings/a.mp4"))
        );
        assert_eq!(
            Source::detect("/abs/a.mp4"),
            Source::File(PathBuf::from("/abs/a.mp4"))
        );
        // `file:` has no host, `c:` parses as a scheme on some inputs
        assert!(matches!(Source::detect("file:///a.mp4"), Source::File(_)));
    }
}

mod job_creation {
    use super::*;

    #[tokio::test]
    async fn url_source_passes_through_without_upload() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_1", "pending",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let request = TranscriptionRequest::new(TranscriptionInput {
            language_code: Some("en".into()),
            ..TranscriptionInput::default()
        });
        let job = client
            .transcribe("https://example.com/talk.mp4", "acme", &request)
            .await
            .unwrap();

        assert_eq!(job.id, "job_1");
        assert_eq!(storage.calls(), 0);

        let captured = jobs.captured_requests();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].method, http::Method::POST);
        assert_eq!(
            captured[0].url.as_str(),
            "https://api.salad.com/api/public/organizations/acme/inference-endpoints/transcribe/jobs"
        );

        let Body::Json(body) = &captured[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["input"]["url"], "https://example.com/talk.mp4");
        assert_eq!(body["input"]["language_code"], "en");
    }

    #[tokio::test]
    async fn local_file_is_uploaded_and_its_url_lands_in_the_job_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meeting.mp4");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"bytes")
            .unwrap();

        let uploaded_url =
            "https://storage-api.salad.com/organizations/acme/files/meeting.mp4?token=t";
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_2", "pending",
        ))));
        let storage = Arc::new(MockTransport::always(json_response(
            &serde_json::json!({"url": uploaded_url}),
        )));
        let client = client_with(&jobs, &storage);

        client
            .transcribe(path.as_path(), "acme", &TranscriptionRequest::default())
            .await
            .unwrap();

        assert_eq!(storage.calls(), 1);
        let upload = &storage.captured_requests()[0];
        assert_eq!(upload.method, http::Method::PUT);
        assert!(upload.url.path().ends_with("/files/meeting.mp4"));

        let Body::Json(body) = &jobs.captured_requests()[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["input"]["url"], uploaded_url);
    }

    #[tokio::test]
    async fn webhook_fields_are_omitted_when_not_configured() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_1", "pending",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        client
            .transcribe(
                "https://example.com/a.mp4",
                "acme",
                &TranscriptionRequest::default(),
            )
            .await
            .unwrap();

        let Body::Json(body) = &jobs.captured_requests()[0].body else {
            panic!("expected JSON body");
        };
        assert!(body.get("webhook").is_none());
        assert!(body.get("webhook_url").is_none());
    }

    #[tokio::test]
    async fn empty_webhook_is_treated_as_absent() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_1", "pending",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let request = TranscriptionRequest::default().with_webhook("");
        client
            .transcribe("https://example.com/a.mp4", "acme", &request)
            .await
            .unwrap();

        let Body::Json(body) = &jobs.captured_requests()[0].body else {
            panic!("expected JSON body");
        };
        assert!(body.get("webhook").is_none());
    }

    #[tokio::test]
    async fn configured_webhook_is_sent_in_both_fields() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_1", "pending",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let request =
            TranscriptionRequest::default().with_webhook("https://hooks.example.com/done");
        client
            .transcribe("https://example.com/a.mp4", "acme", &request)
            .await
            .unwrap();

        let Body::Json(body) = &jobs.captured_requests()[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["webhook"], "https://hooks.example.com/done");
        assert_eq!(body["webhook_url"], "https://hooks.example.com/done");
    }

    #[tokio::test]
    async fn metadata_is_forwarded() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_1", "pending",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let request = TranscriptionRequest::default()
            .with_metadata(serde_json::json!({"ticket": "T-42"}));
        client
            .transcribe("https://example.com/a.mp4", "acme", &request)
            .await
            .unwrap();

        let Body::Json(body) = &jobs.captured_requests()[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(body["metadata"]["ticket"], "T-42");
    }

    #[tokio::test]
    async fn invalid_organization_name_fails_before_any_network_call() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_1", "pending",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let result = client
            .transcribe(
                "https://example.com/a.mp4",
                "Acme",
                &TranscriptionRequest::default(),
            )
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(jobs.calls(), 0);
        assert_eq!(storage.calls(), 0);
    }
}

mod job_management {
    use super::*;

    #[tokio::test]
    async fn get_job_hits_the_job_url() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_9", "running",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let job = client.get_job("acme", "job_9").await.unwrap();

        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(
            jobs.captured_requests()[0].url.as_str(),
            "https://api.salad.com/api/public/organizations/acme/inference-endpoints/transcribe/jobs/job_9"
        );
    }

    #[tokio::test]
    async fn list_jobs_includes_paging_parameters() {
        let jobs = Arc::new(MockTransport::always(json_response(&serde_json::json!({
            "items": [job_json("job_1", "succeeded"), job_json("job_2", "running")]
        }))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let listed = client.list_jobs("acme", Some(2), Some(50)).await.unwrap();

        assert_eq!(listed.items.len(), 2);
        let url = &jobs.captured_requests()[0].url;
        assert!(url.query_pairs().any(|(k, v)| k == "page" && v == "2"));
        assert!(url.query_pairs().any(|(k, v)| k == "page_size" && v == "50"));
    }

    #[tokio::test]
    async fn list_jobs_omits_unset_paging_parameters() {
        let jobs = Arc::new(MockTransport::always(json_response(
            &serde_json::json!({"items": []}),
        )));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        client.list_jobs("acme", None, None).await.unwrap();

        assert_eq!(jobs.captured_requests()[0].url.query(), None);
    }

    #[tokio::test]
    async fn delete_job_issues_a_delete() {
        let jobs = Arc::new(MockTransport::always(empty_response(
            http::StatusCode::ACCEPTED,
        )));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        client.delete_job("acme", "job_9").await.unwrap();

        let captured = jobs.captured_requests();
        assert_eq!(captured[0].method, http::Method::DELETE);
        assert!(captured[0].url.path().ends_with("/jobs/job_9"));
    }
}

mod polling {
    use super::*;

    #[tokio::test]
    async fn wait_for_completion_polls_until_terminal() {
        let jobs = Arc::new(MockTransport::new(vec![
            Ok(json_response(&job_json("job_1", "pending"))),
            Ok(json_response(&job_json("job_1", "running"))),
            Ok(json_response(&job_json("job_1", "succeeded"))),
        ]));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let job = client.wait_for_completion("acme", "job_1").await.unwrap();

        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(jobs.calls(), 3);
    }

    #[tokio::test]
    async fn failed_and_cancelled_also_stop_polling() {
        for terminal in ["failed", "cancelled"] {
            let jobs = Arc::new(MockTransport::new(vec![
                Ok(json_response(&job_json("job_1", "running"))),
                Ok(json_response(&job_json("job_1", terminal))),
            ]));
            let storage = unused_storage();
            let client = client_with(&jobs, &storage);

            let job = client.wait_for_completion("acme", "job_1").await.unwrap();

            assert!(job.status.is_terminal());
            assert_eq!(jobs.calls(), 2);
        }
    }

    #[tokio::test]
    async fn unknown_states_keep_polling() {
        let jobs = Arc::new(MockTransport::new(vec![
            Ok(json_response(&job_json("job_1", "reticulating"))),
            Ok(json_response(&job_json("job_1", "succeeded"))),
        ]));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let job = client.wait_for_completion("acme", "job_1").await.unwrap();

        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(jobs.calls(), 2);
    }

    #[tokio::test]
    async fn transcribe_and_wait_uploads_creates_and_polls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standup.mp4");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"bytes")
            .unwrap();

        let uploaded_url = "https://storage-api.salad.com/organizations/acme/files/standup.mp4";
        let jobs = Arc::new(MockTransport::new(vec![
            Ok(json_response(&job_json("job_3", "pending"))), // create
            Ok(json_response(&job_json("job_3", "pending"))), // poll 1
            Ok(json_response(&job_json("job_3", "running"))), // poll 2
            Ok(json_response(&job_json("job_3", "succeeded"))), // poll 3
        ]));
        let storage = Arc::new(MockTransport::always(json_response(
            &serde_json::json!({"url": uploaded_url}),
        )));
        let client = client_with(&jobs, &storage);

        let job = client
            .transcribe_and_wait(path.as_path(), "acme", &TranscriptionRequest::default())
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(storage.calls(), 1);
        // one create plus exactly three polls
        assert_eq!(jobs.calls(), 4);

        let Body::Json(create_body) = &jobs.captured_requests()[0].body else {
            panic!("expected JSON body");
        };
        assert_eq!(create_body["input"]["url"], uploaded_url);
    }

    #[tokio::test]
    async fn poll_failure_surfaces_to_the_caller() {
        let jobs = Arc::new(MockTransport::new(vec![
            Ok(json_response(&job_json("job_1", "running"))),
            Err(crate::chain::testing::ScriptedError::Status(
                http::StatusCode::NOT_FOUND,
                "gone",
            )),
        ]));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let result = client.wait_for_completion("acme", "job_1").await;

        match result {
            Err(Error::Request(e)) => {
                assert_eq!(e.status(), Some(http::StatusCode::NOT_FOUND));
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }
}

mod webhooks {
    use super::*;
    use std::time::SystemTime;

    const SECRET: &str = "whsec_MfKQ9r8GKYqrTwjUPD8ILPZIo2LaLaSw";

    #[test]
    fn process_webhook_verifies_and_parses_the_job() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_1", "pending",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let payload = br#"{"id":"job_7","status":"succeeded"}"#;
        let signer = Webhook::new(SECRET).unwrap();
        let now = SystemTime::now();
        let headers = WebhookHeaders::new(
            "msg_1",
            signer.unix_timestamp(now).to_string(),
            signer.sign("msg_1", now, payload),
        );

        let job = client.process_webhook(payload, SECRET, &headers).unwrap();

        assert_eq!(job.id, "job_7");
        assert_eq!(job.status, JobStatus::Succeeded);
    }

    #[test]
    fn process_webhook_rejects_a_wrong_secret() {
        let jobs = Arc::new(MockTransport::always(json_response(&job_json(
            "job_1", "pending",
        ))));
        let storage = unused_storage();
        let client = client_with(&jobs, &storage);

        let payload = br#"{"id":"job_7","status":"succeeded"}"#;
        let signer = Webhook::new(SECRET).unwrap();
        let now = SystemTime::now();
        let headers = WebhookHeaders::new(
            "msg_1",
            signer.unix_timestamp(now).to_string(),
            signer.sign("msg_1", now, payload),
        );

        let result = client.process_webhook(
            payload,
            "whsec_C2FVsBQIhrscChlQIMV+b5sSYspob7oD",
            &headers,
        );

        assert!(matches!(result, Err(Error::Webhook(_))));
    }
}
