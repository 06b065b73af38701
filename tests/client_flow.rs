//! End-to-end flows over a scripted transport: token reuse, the single 401
//! retry, write-guard short-circuits and host selection.

use async_trait::async_trait;
use redditkit::client::session::TOKEN_URL;
use redditkit::{
    AuthMode, Credentials, HttpRequest, HttpResponse, HttpTransport, RedditClient, RedditError,
    SafeModeConfig,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct MockTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<HttpResponse>>,
}

impl MockTransport {
    fn new(responses: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn token_request_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.url == TOKEN_URL)
            .count()
    }

    fn data_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url != TOKEN_URL)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> redditkit::Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RedditError::Upstream {
                status: 0,
                message: "mock transport ran out of scripted responses".to_string(),
            })
    }
}

fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_string(),
    }
}

fn token_response() -> HttpResponse {
    response(
        200,
        r#"{"access_token":"tok-1","token_type":"bearer","expires_in":3600,"scope":"*"}"#,
    )
}

fn user_response() -> HttpResponse {
    response(
        200,
        r#"{"kind":"t2","data":{"id":"abc","name":"spez","comment_karma":10,"link_karma":5,
            "created_utc":1118030400.0,"is_gold":false,"is_mod":true,"verified":true}}"#,
    )
}

fn post_listing_response() -> HttpResponse {
    response(
        200,
        r#"{"kind":"Listing","data":{"after":null,"children":[
            {"kind":"t3","data":{"id":"p1","name":"t3_p1","title":"A post","author":"someone",
             "subreddit":"programming","score":100,"num_comments":3,"created_utc":0.0,
             "over_18":false,"is_self":true,"edited":false}}]}}"#,
    )
}

fn empty_listing_response() -> HttpResponse {
    response(200, r#"{"kind":"Listing","data":{"after":null,"children":[]}}"#)
}

fn submit_ok_response() -> HttpResponse {
    response(
        200,
        r#"{"json":{"errors":[],"data":{"name":"t3_new","url":"https://reddit.com/r/x/new"}}}"#,
    )
}

fn full_credentials() -> Credentials {
    Credentials {
        client_id: Some("client-id".into()),
        client_secret: Some("client-secret".into()),
        user_agent: "redditkit-tests/0.1".into(),
        username: Some("bot".into()),
        password: Some("hunter2".into()),
    }
}

fn client_only_credentials() -> Credentials {
    Credentials {
        username: None,
        password: None,
        ..full_credentials()
    }
}

fn no_safe_mode() -> SafeModeConfig {
    SafeModeConfig {
        enabled: false,
        write_delay_ms: 0,
        duplicate_check: false,
        max_recent_hashes: 10,
    }
}

fn client(
    credentials: Credentials,
    mode: AuthMode,
    safe_mode: SafeModeConfig,
    transport: Arc<MockTransport>,
) -> RedditClient {
    RedditClient::with_transport(credentials, mode, safe_mode, transport).unwrap()
}

#[tokio::test]
async fn token_is_reused_within_expiry_window() {
    let transport = MockTransport::new(vec![
        token_response(),
        post_listing_response(),
        post_listing_response(),
    ]);
    let client = client(
        full_credentials(),
        AuthMode::Auto,
        no_safe_mode(),
        transport.clone(),
    );

    client.get_top_posts("rust", "day", 5).await.unwrap();
    client.get_top_posts("rust", "week", 5).await.unwrap();

    assert_eq!(transport.token_request_count(), 1);
    assert_eq!(transport.data_requests().len(), 2);
}

#[tokio::test]
async fn single_401_triggers_one_refresh_and_retry() {
    let transport = MockTransport::new(vec![
        token_response(),
        response(401, ""),
        token_response(),
        user_response(),
    ]);
    let client = client(
        full_credentials(),
        AuthMode::Auto,
        no_safe_mode(),
        transport.clone(),
    );

    let user = client.get_user("spez").await.unwrap();
    assert_eq!(user.name, "spez");
    assert!(user.is_mod);

    let data = transport.data_requests();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].url, data[1].url);
    assert_eq!(transport.token_request_count(), 2);
}

#[tokio::test]
async fn second_401_is_surfaced_unchanged() {
    let transport = MockTransport::new(vec![
        token_response(),
        response(401, ""),
        token_response(),
        response(401, ""),
    ]);
    let client = client(
        full_credentials(),
        AuthMode::Auto,
        no_safe_mode(),
        transport.clone(),
    );

    let err = client.get_user("spez").await.unwrap_err();
    assert!(matches!(err, RedditError::Upstream { status: 401, .. }));
    // exactly two data calls, no further retries
    assert_eq!(transport.data_requests().len(), 2);
}

#[tokio::test]
async fn failed_token_exchange_is_fatal() {
    let transport = MockTransport::new(vec![response(403, r#"{"error":"invalid_grant"}"#)]);
    let client = client(
        full_credentials(),
        AuthMode::Authenticated,
        no_safe_mode(),
        transport.clone(),
    );

    let err = client.get_user("spez").await.unwrap_err();
    assert!(matches!(err, RedditError::Auth(_)));
    assert!(transport.data_requests().is_empty());
}

#[tokio::test]
async fn anonymous_top_posts_hit_public_host_without_token() {
    let transport = MockTransport::new(vec![post_listing_response()]);
    let client = client(
        client_only_credentials(),
        AuthMode::Anonymous,
        no_safe_mode(),
        transport.clone(),
    );

    let posts = client.get_top_posts("programming", "week", 10).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "A post");

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url,
        "https://www.reddit.com/r/programming/top.json?t=week&limit=10"
    );
    assert_eq!(transport.token_request_count(), 0);
    assert!(!requests[0]
        .headers
        .iter()
        .any(|(name, _)| name == "Authorization"));
}

#[tokio::test]
async fn authenticated_requests_carry_bearer_and_oauth_host() {
    let transport = MockTransport::new(vec![token_response(), user_response()]);
    let client = client(
        full_credentials(),
        AuthMode::Authenticated,
        no_safe_mode(),
        transport.clone(),
    );

    client.get_user("spez").await.unwrap();

    let data = transport.data_requests();
    assert!(data[0].url.starts_with("https://oauth.reddit.com/"));
    assert!(data[0]
        .headers
        .iter()
        .any(|(name, value)| name == "Authorization" && value == "Bearer tok-1"));
}

#[tokio::test]
async fn create_post_without_user_credentials_fails_before_network() {
    let transport = MockTransport::new(vec![]);
    let client = client(
        client_only_credentials(),
        AuthMode::Auto,
        SafeModeConfig::default(),
        transport.clone(),
    );

    let err = client
        .create_post("rust", "title", "body")
        .await
        .unwrap_err();
    assert!(matches!(err, RedditError::Auth(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn anonymous_write_is_rejected_with_mode_specific_error() {
    let transport = MockTransport::new(vec![]);
    let client = client(
        full_credentials(),
        AuthMode::Anonymous,
        SafeModeConfig::default(),
        transport.clone(),
    );

    let err = client.vote("t3_p1", redditkit::VoteDirection::Up).await.unwrap_err();
    match err {
        RedditError::Auth(message) => assert!(message.contains("anonymous mode")),
        other => panic!("expected Auth error, got {:?}", other),
    }
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn duplicate_post_is_rejected_without_a_network_call() {
    let transport = MockTransport::new(vec![token_response(), submit_ok_response()]);
    let client = client(
        full_credentials(),
        AuthMode::Auto,
        SafeModeConfig {
            enabled: true,
            write_delay_ms: 0,
            duplicate_check: true,
            max_recent_hashes: 10,
        },
        transport.clone(),
    );

    let outcome = client
        .create_post("rust", "Interesting Title", "Some Body")
        .await
        .unwrap();
    assert_eq!(outcome.name.as_deref(), Some("t3_new"));
    let calls_after_first = transport.requests().len();

    // same content, differing only in case
    let err = client
        .create_post("rust", "INTERESTING TITLE", "some body")
        .await
        .unwrap_err();
    assert!(matches!(err, RedditError::DuplicateContent(_)));
    assert_eq!(transport.requests().len(), calls_after_first);
}

#[tokio::test]
async fn reply_prechecks_post_targets() {
    // target post does not exist: the info lookup returns an empty listing
    let transport = MockTransport::new(vec![token_response(), empty_listing_response()]);
    let client = client(
        full_credentials(),
        AuthMode::Auto,
        no_safe_mode(),
        transport.clone(),
    );

    let err = client.reply_to_post("deadbeef", "hello").await.unwrap_err();
    assert!(matches!(err, RedditError::NotFound(_)));
    // one GET precheck, no comment POST
    assert_eq!(transport.data_requests().len(), 1);
}

#[tokio::test]
async fn reply_to_comment_skips_the_precheck() {
    let transport = MockTransport::new(vec![token_response(), submit_ok_response()]);
    let client = client(
        full_credentials(),
        AuthMode::Auto,
        no_safe_mode(),
        transport.clone(),
    );

    client.reply_to_post("t1_abc", "hello").await.unwrap();

    let data = transport.data_requests();
    assert_eq!(data.len(), 1);
    assert!(data[0].url.ends_with("/api/comment"));
    let form = data[0].form.as_ref().unwrap();
    assert!(form.contains(&("thing_id".to_string(), "t1_abc".to_string())));
}

#[tokio::test]
async fn upstream_error_envelope_is_collapsed() {
    let transport = MockTransport::new(vec![
        token_response(),
        response(
            200,
            r#"{"json":{"errors":[["RATELIMIT","you are doing that too much"]]}}"#,
        ),
    ]);
    let client = client(
        full_credentials(),
        AuthMode::Auto,
        no_safe_mode(),
        transport.clone(),
    );

    let err = client.reply_to_post("t1_abc", "hello").await.unwrap_err();
    match err {
        RedditError::Upstream { status, message } => {
            assert_eq!(status, 200);
            assert_eq!(message, "RATELIMIT: you are doing that too much");
        }
        other => panic!("expected Upstream error, got {:?}", other),
    }
}
