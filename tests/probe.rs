use std::{net::TcpListener, time::Duration};

use site_monitor::probe::{FailureKind, ProbeOutcome, Prober};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn server_returning(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn closed_port_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap()
}

#[tokio::test]
async fn test_ok_status_is_success() {
    let server = server_returning(ResponseTemplate::new(200).set_body_string("hello")).await;
    let prober = Prober::new(Duration::from_secs(10)).unwrap();
    let url = Url::parse(&server.uri()).unwrap();

    let result = prober.probe(&url).await;

    assert_eq!(result.url, url);
    assert_eq!(
        result.outcome,
        ProbeOutcome::Success {
            status_code: 200,
            status: "200 OK".to_string()
        }
    );
}

#[tokio::test]
async fn test_service_unavailable_is_success() {
    let server = server_returning(ResponseTemplate::new(503)).await;
    let prober = Prober::new(Duration::from_secs(10)).unwrap();

    let result = prober.probe(&Url::parse(&server.uri()).unwrap()).await;

    assert!(result.is_success());
    assert_eq!(
        result.outcome,
        ProbeOutcome::Success {
            status_code: 503,
            status: "503 Service Unavailable".to_string()
        }
    );
}

#[tokio::test]
async fn test_single_request_per_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let prober = Prober::new(Duration::from_secs(10)).unwrap();

    let result = prober.probe(&Url::parse(&server.uri()).unwrap()).await;

    assert!(result.is_success());
    server.verify().await;
}

#[tokio::test]
async fn test_unreachable_host_is_failure() {
    let prober = Prober::new(Duration::from_secs(5)).unwrap();

    let result = prober.probe(&closed_port_url()).await;

    match result.outcome {
        ProbeOutcome::Failure { error, kind } => {
            assert!(!error.is_empty());
            assert_eq!(kind, FailureKind::Connect);
        }
        ProbeOutcome::Success { .. } => panic!("Expected closed port to fail"),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = server_returning(ResponseTemplate::new(200).set_delay(Duration::from_secs(5))).await;
    let prober = Prober::new(Duration::from_millis(200)).unwrap();

    let result = prober.probe(&Url::parse(&server.uri()).unwrap()).await;

    match result.outcome {
        ProbeOutcome::Failure { error, kind } => {
            assert!(!error.is_empty());
            assert_eq!(kind, FailureKind::Timeout);
        }
        ProbeOutcome::Success { .. } => panic!("Expected slow response to time out"),
    }
    assert!(result.elapsed < Duration::from_secs(5));
}
