//! End-to-end credential handling against a mock backend
//!
//! Validates the request pipeline:
//! credential context → bearer injection → send → 401 recovery → caller error


use dashboard_client::{
    ClientConfig, ClientError, DashboardClient, InvalidationLog, Page, QueryKey, RequestDescriptor,
};
use mock_session::{auth_headers, client_for, MockSession, TokenMode};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn status_body() -> serde_json::Value {
    json!({ "is_running": true, "status": "running", "uptime_seconds": 120 })
}

async fn mount_status(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/v1/bot/status"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn unauthenticated_status_sends_no_credential() {
    let server = MockServer::start().await;
    mount_status(&server, ResponseTemplate::new(200).set_body_json(status_body())).await;

    let session = MockSession::anonymous();
    let client = client_for(&server, TIMEOUT).with_credentials(session.clone());

    let status = assert_ok!(client.bot_status().await);
    assert!(status.is_running);
    assert_eq!(status.status, "running");
    assert_eq!(status.uptime_seconds, Some(120));

    assert_eq!(auth_headers(&server).await, vec![None]);
    assert_eq!(session.tokens_issued(), 0, "anonymous session must not be asked for tokens");
}

#[tokio::test]
async fn unbound_client_sends_no_credential() {
    let server = MockServer::start().await;
    mount_status(&server, ResponseTemplate::new(200).set_body_json(status_body())).await;

    let client = client_for(&server, TIMEOUT);
    assert_ok!(client.bot_status().await);

    assert_eq!(auth_headers(&server).await, vec![None]);
}

#[tokio::test]
async fn authenticated_requests_carry_freshest_token() {
    let server = MockServer::start().await;
    mount_status(&server, ResponseTemplate::new(200).set_body_json(status_body())).await;

    let session = MockSession::new(true, TokenMode::Rotating);
    let client = client_for(&server, TIMEOUT).with_credentials(session.clone());

    for _ in 0..3 {
        assert_ok!(client.bot_status().await);
    }

    assert_eq!(
        auth_headers(&server).await,
        vec![
            Some("Bearer token-1".to_string()),
            Some("Bearer token-2".to_string()),
            Some("Bearer token-3".to_string()),
        ]
    );
}

#[tokio::test]
async fn session_state_is_read_per_request() {
    let server = MockServer::start().await;
    mount_status(&server, ResponseTemplate::new(200).set_body_json(status_body())).await;

    let session = MockSession::fixed("abc");
    let client = client_for(&server, TIMEOUT).with_credentials(session.clone());

    assert_ok!(client.bot_status().await);
    session.set_authenticated(false);
    assert_ok!(client.bot_status().await);

    assert_eq!(
        auth_headers(&server).await,
        vec![Some("Bearer abc".to_string()), None]
    );
}

#[tokio::test]
async fn token_failure_still_sends_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bot/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .expect(1)
        .mount(&server)
        .await;

    let session = MockSession::new(true, TokenMode::Failing);
    let client = client_for(&server, TIMEOUT).with_credentials(session.clone());

    assert_ok!(client.bot_status().await);
    assert_eq!(session.tokens_issued(), 1);
    assert_eq!(auth_headers(&server).await, vec![None]);
}

#[tokio::test]
async fn trade_history_401_triggers_login_and_rejects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trades/history"))
        .and(query_param("limit", "50"))
        .and(query_param("offset", "0"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;

    let session = MockSession::fixed("stale");
    let client = client_for(&server, TIMEOUT).with_credentials(session.clone());

    let err = client.trade_history(Page::default()).await.unwrap_err();
    match &err {
        ClientError::AuthenticationRejected { body } => assert_eq!(body, "token expired"),
        other => panic!("expected AuthenticationRejected, got {:?}", other),
    }

    session.wait_for_login().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.login_count(), 1);
}

#[tokio::test]
async fn each_401_triggers_exactly_one_login() {
    let server = MockServer::start().await;
    mount_status(&server, ResponseTemplate::new(401)).await;

    let session = MockSession::fixed("stale");
    let client = client_for(&server, TIMEOUT).with_credentials(session.clone());

    for expected in 1..=2 {
        let err = client.bot_status().await.unwrap_err();
        assert!(err.is_auth_rejected());
        session.wait_for_login().await;
        assert_eq!(session.login_count(), expected);
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.login_count(), 2);
}

#[tokio::test]
async fn error_is_returned_before_login_completes() {
    let server = MockServer::start().await;
    mount_status(&server, ResponseTemplate::new(401)).await;

    let session = MockSession::with_hanging_login("stale");
    let client = client_for(&server, TIMEOUT).with_credentials(session.clone());

    let result = tokio::time::timeout(Duration::from_secs(2), client.bot_status())
        .await
        .expect("call must not wait for the login flow");
    assert!(result.unwrap_err().is_auth_rejected());

    session.wait_for_login().await;
    assert_eq!(session.login_count(), 1);
}

#[tokio::test]
async fn non_401_failures_never_trigger_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/portfolio/snapshot"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/system/health"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;

    let session = MockSession::fixed("abc");
    let client = client_for(&server, TIMEOUT).with_credentials(session.clone());

    match client.portfolio_snapshot().await.unwrap_err() {
        ClientError::Transport { status, body } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("expected Transport, got {:?}", other),
    }
    match client.system_health().await.unwrap_err() {
        ClientError::Transport { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("expected Transport, got {:?}", other),
    }

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.login_count(), 0);
}

#[tokio::test]
async fn unbound_401_propagates_unchanged() {
    let server = MockServer::start().await;
    mount_status(&server, ResponseTemplate::new(401).set_body_string("no session")).await;

    let client = client_for(&server, TIMEOUT);
    match client.bot_status().await.unwrap_err() {
        ClientError::Transport { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "no session");
        }
        other => panic!("expected Transport, got {:?}", other),
    }
}

#[tokio::test]
async fn replacing_context_does_not_affect_in_flight_request() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(status_body())
            .set_delay(Duration::from_millis(300)),
    )
    .await;

    let first = MockSession::fixed("first");
    let second = MockSession::fixed("second");
    let client: Arc<DashboardClient> =
        Arc::new(client_for(&server, TIMEOUT).with_credentials(first.clone()));

    let in_flight = {
        let client = client.clone();
        tokio::spawn(async move { client.bot_status().await })
    };

    tokio::time::timeout(Duration::from_secs(1), first.token_issued.notified())
        .await
        .expect("first request never reached injection");
    client.set_credential_context(Some(second.clone()));

    assert_ok!(in_flight.await.unwrap());
    assert_ok!(client.bot_status().await);

    assert_eq!(
        auth_headers(&server).await,
        vec![
            Some("Bearer first".to_string()),
            Some("Bearer second".to_string()),
        ]
    );
    assert_eq!(first.tokens_issued(), 1);
    assert_eq!(second.tokens_issued(), 1);
}

#[tokio::test]
async fn in_flight_401_relogs_the_session_that_sent_it() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        ResponseTemplate::new(401).set_delay(Duration::from_millis(300)),
    )
    .await;

    let first = MockSession::fixed("first");
    let second = MockSession::fixed("second");
    let client: Arc<DashboardClient> =
        Arc::new(client_for(&server, TIMEOUT).with_credentials(first.clone()));

    let in_flight = {
        let client = client.clone();
        tokio::spawn(async move { client.bot_status().await })
    };

    tokio::time::timeout(Duration::from_secs(1), first.token_issued.notified())
        .await
        .expect("first request never reached injection");
    client.set_credential_context(Some(second.clone()));

    let err = in_flight.await.unwrap().unwrap_err();
    assert!(err.is_auth_rejected(), "unexpected error: {:?}", err);

    first.wait_for_login().await;
    tokio::task::yield_now().await;
    assert_eq!(first.login_count(), 1);
    assert_eq!(second.login_count(), 0);
    assert_eq!(second.tokens_issued(), 0);
}

#[tokio::test]
async fn clearing_context_mid_flight_still_rejects_and_relogs() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        ResponseTemplate::new(401).set_delay(Duration::from_millis(300)),
    )
    .await;

    let session = MockSession::fixed("stale");
    let client: Arc<DashboardClient> =
        Arc::new(client_for(&server, TIMEOUT).with_credentials(session.clone()));

    let in_flight = {
        let client = client.clone();
        tokio::spawn(async move { client.bot_status().await })
    };

    tokio::time::timeout(Duration::from_secs(1), session.token_issued.notified())
        .await
        .expect("request never reached injection");
    client.set_credential_context(None);

    let err = in_flight.await.unwrap().unwrap_err();
    assert!(err.is_auth_rejected(), "unexpected error: {:?}", err);

    session.wait_for_login().await;
    assert_eq!(session.login_count(), 1);
    assert!(client.credential_context().is_none());
}

#[tokio::test]
async fn emergency_stop_invalidates_all_bot_caches_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/bot/emergency-stop"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "status": "stopped" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let log = Arc::new(InvalidationLog::new());
    let client = client_for(&server, TIMEOUT)
        .with_credentials(MockSession::fixed("abc"))
        .with_invalidator(log.clone());

    let ack = assert_ok!(client.emergency_stop().await);
    assert!(ack.success);

    assert_eq!(log.count(QueryKey::BotStatus), 1);
    assert_eq!(log.count(QueryKey::Portfolio), 1);
    assert_eq!(log.count(QueryKey::Trades), 1);
    assert_eq!(log.total(), 3);
}

#[tokio::test]
async fn start_and_stop_invalidate_only_bot_status() {
    let server = MockServer::start().await;
    for route in ["/api/v1/bot/start", "/api/v1/bot/stop"] {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
    }

    let log = Arc::new(InvalidationLog::new());
    let client = client_for(&server, TIMEOUT).with_invalidator(log.clone());

    assert_ok!(client.start_bot().await);
    assert_ok!(client.stop_bot().await);

    assert_eq!(log.count(QueryKey::BotStatus), 2);
    assert_eq!(log.count(QueryKey::Portfolio), 0);
    assert_eq!(log.count(QueryKey::Trades), 0);
}

#[tokio::test]
async fn failed_command_invalidates_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/bot/emergency-stop"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let log = Arc::new(InvalidationLog::new());
    let client = client_for(&server, TIMEOUT).with_invalidator(log.clone());

    assert!(client.emergency_stop().await.is_err());
    assert_eq!(log.total(), 0);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(status_body())
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let client = client_for(&server, Duration::from_millis(100));
    assert!(matches!(
        client.bot_status().await,
        Err(ClientError::Timeout)
    ));
}

#[tokio::test]
async fn per_call_timeout_overrides_default() {
    let server = MockServer::start().await;
    mount_status(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(status_body())
            .set_delay(Duration::from_millis(300)),
    )
    .await;

    let client = client_for(&server, Duration::from_millis(100));
    let descriptor = RequestDescriptor::get("/bot/status").timeout(Duration::from_secs(3));
    let status: dashboard_client::BotStatus = assert_ok!(client.request(descriptor).await);
    assert!(status.is_running);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_failure() {
    // Reserve a port, then release it so nothing is listening there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::new(&format!("http://127.0.0.1:{}/api/v1", port), TIMEOUT).unwrap();

    let session = MockSession::fixed("abc");
    let client = DashboardClient::new(config).unwrap();
    client.set_credential_context(Some(session.clone()));

    let err = client.bot_status().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(session.login_count(), 0);
}
