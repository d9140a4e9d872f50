//! End-to-end runs of `compute load-balancer create` against a mock API

use std::process::Output;

use assert_cmd::Command;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LB_ID: &str = "4de7ac8b-495b-4884-9a69-1050c6793cd6";
const TOKEN: &str = "some-magic-token";

const TABLE_HEADER: &str = "ID                                      IP    Name             Status    Created At              Region    Size        Size Unit    VPC UUID                                Tag    Droplet IDs        SSL     Sticky Sessions                                Health Check                                                                                                            Forwarding Rules    Disable Lets Encrypt DNS Records";
const ROW_NEW: &str = "4de7ac8b-495b-4884-9a69-1050c6793cd6          example-lb-01    new       2017-02-01T22:22:58Z    nyc3      lb-small    <nil>        00000000-0000-4000-8000-000000000000           3164444,3164445    true    type:none,cookie_name:,cookie_ttl_seconds:0    protocol:,port:0,path:,check_interval_seconds:0,response_timeout_seconds:0,healthy_threshold:0,unhealthy_threshold:0                        true";
const ROW_ACTIVE: &str = "4de7ac8b-495b-4884-9a69-1050c6793cd6          example-lb-01    active    2017-02-01T22:22:58Z    nyc3      lb-small    <nil>        00000000-0000-4000-8000-000000000000           3164444,3164445    true    type:none,cookie_name:,cookie_ttl_seconds:0    protocol:,port:0,path:,check_interval_seconds:0,response_timeout_seconds:0,healthy_threshold:0,unhealthy_threshold:0                        true";

const NOTICE_IN_PROGRESS: &str =
    "Notice: Load balancer creation is in progress, waiting for load balancer to become active";
const NOTICE_CREATED: &str = "Notice: Load balancer created";

const BASE_ARGS: &[&str] = &[
    "--droplet-ids",
    "22,66",
    "--name",
    "my-lb-name",
    "--region",
    "venus",
    "--size",
    "lb-small",
    "--redirect-http-to-https",
    "--enable-proxy-protocol",
    "--enable-backend-keepalive",
    "--tag-name",
    "magic-lb",
    "--vpc-uuid",
    "00000000-0000-4000-8000-000000000000",
    "--disable-lets-encrypt-dns-records",
];

fn load_balancer(status: &str) -> Value {
    json!({
        "load_balancer": {
            "id": LB_ID,
            "name": "example-lb-01",
            "ip": "",
            "algorithm": "round_robin",
            "status": status,
            "created_at": "2017-02-01T22:22:58Z",
            "forwarding_rules": [],
            "health_check": {},
            "sticky_sessions": {"type": "none"},
            "region": {
                "name": "New York 3",
                "slug": "nyc3",
                "sizes": ["s-32vcpu-192gb"],
                "features": ["install_agent"],
                "available": true
            },
            "size": "lb-small",
            "vpc_uuid": "00000000-0000-4000-8000-000000000000",
            "tag": "",
            "droplet_ids": [3164444, 3164445],
            "redirect_http_to_https": true,
            "enable_proxy_protocol": true,
            "disable_lets_encrypt_dns_records": true,
            "enable_backend_keepalive": true
        }
    })
}

fn create_request() -> Value {
    json!({
        "name": "my-lb-name",
        "algorithm": "round_robin",
        "region": "venus",
        "size": "lb-small",
        "health_check": {},
        "sticky_sessions": {},
        "droplet_ids": [22, 66],
        "tag": "magic-lb",
        "redirect_http_to_https": true,
        "enable_proxy_protocol": true,
        "enable_backend_keepalive": true,
        "disable_lets_encrypt_dns_records": true,
        "vpc_uuid": "00000000-0000-4000-8000-000000000000"
    })
}

/// Mount the creation endpoint, expecting exactly one request
async fn mount_create(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v2/load_balancers"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_json(create_request()))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_balancer("new")))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount the status endpoint answering with `status`
async fn mount_get(server: &MockServer, status: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/load_balancers/{}", LB_ID)))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_balancer(status)))
        .expect(times)
        .mount(server)
        .await;
}

/// Run the binary off the async runtime so the mock server keeps serving
async fn run(args: Vec<String>, env: Vec<(&'static str, String)>) -> Output {
    tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        let mut cmd = Command::cargo_bin("cloudctl").unwrap();
        for var in [
            "CLOUDCTL_ACCESS_TOKEN",
            "CLOUDCTL_API_URL",
            "CLOUDCTL_CONTEXT",
            "CLOUDCTL_CONFIG_FILE",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }
        for (key, value) in env {
            cmd.env(key, value);
        }
        if !args.iter().any(|arg| arg == "--config-file") {
            cmd.arg("--config-file").arg(dir.path().join("config.toml"));
        }
        cmd.args(args).output().unwrap()
    })
    .await
    .unwrap()
}

fn lb_args(server: &MockServer, command: &str, extra: &[&str]) -> Vec<String> {
    let uri = server.uri();
    let mut args: Vec<String> = ["-t", TOKEN, "-u", uri.as_str(), "compute", "load-balancer"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.push(command.to_string());
    args.extend(extra.iter().map(|s| s.to_string()));
    args.extend(BASE_ARGS.iter().map(|s| s.to_string()));
    args
}

fn lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_prints_table() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    mount_get(&server, "active", 0).await;

    let output = run(lb_args(&server, "create", &[]), vec![]).await;

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(lines(&output.stdout), vec![TABLE_HEADER, ROW_NEW]);
    assert_eq!(lines(&output.stderr), vec![NOTICE_CREATED]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_short_alias() {
    let server = MockServer::start().await;
    mount_create(&server).await;

    let output = run(lb_args(&server, "c", &[]), vec![]).await;

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(lines(&output.stdout), vec![TABLE_HEADER, ROW_NEW]);
    assert_eq!(lines(&output.stderr), vec![NOTICE_CREATED]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_create_and_wait() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    mount_get(&server, "active", 1).await;

    let output = run(lb_args(&server, "create", &["--wait"]), vec![]).await;

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(lines(&output.stdout), vec![TABLE_HEADER, ROW_ACTIVE]);
    assert_eq!(
        lines(&output.stderr),
        vec![NOTICE_IN_PROGRESS, NOTICE_CREATED]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_json_output() {
    let server = MockServer::start().await;
    mount_create(&server).await;

    let output = run(lb_args(&server, "create", &["-o", "json"]), vec![]).await;

    assert!(output.status.success(), "{:?}", output);
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["id"], LB_ID);
    assert_eq!(value[0]["status"], "new");
    assert_eq!(value[0]["size"], "lb-small");
    assert_eq!(value[0]["region"]["slug"], "nyc3");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_selected_columns_without_header() {
    let server = MockServer::start().await;
    mount_create(&server).await;

    let output = run(
        lb_args(&server, "create", &["--format", "ID,Name,Status", "--no-header"]),
        vec![],
    )
    .await;

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        lines(&output.stdout),
        vec![format!("{}    example-lb-01    new", LB_ID)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_create() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/load_balancers"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "id": "unauthorized",
            "message": "Unable to authenticate you"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(lb_args(&server, "create", &["--wait"]), vec![]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Authentication failed"), "{}", stderr);
    assert!(stderr.contains("Unable to authenticate you"), "{}", stderr);
    assert!(!stderr.contains(NOTICE_CREATED), "{}", stderr);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_reports_errored_load_balancer() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    mount_get(&server, "errored", 1).await;

    let output = run(lb_args(&server, "create", &["--wait"]), vec![]).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = lines(&output.stderr);
    assert_eq!(stderr[0], NOTICE_IN_PROGRESS);
    assert!(!stderr.iter().any(|line| line == NOTICE_CREATED));
    assert!(
        stderr.iter().any(|line| line.contains(&format!(
            "Load balancer {} (example-lb-01) in region nyc3 reported status errored",
            LB_ID
        ))),
        "{:?}",
        stderr
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wait_timeout() {
    let server = MockServer::start().await;
    mount_create(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/v2/load_balancers/{}", LB_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_balancer("new")))
        .expect(1..)
        .mount(&server)
        .await;

    let output = run(
        lb_args(
            &server,
            "create",
            &["--wait", "--wait-timeout", "1", "--poll-interval", "1"],
        ),
        vec![],
    )
    .await;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(NOTICE_IN_PROGRESS), "{}", stderr);
    assert!(stderr.contains("Timeout"), "{}", stderr);
    assert!(!stderr.contains(NOTICE_CREATED), "{}", stderr);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_credentials_from_config_context() {
    let server = MockServer::start().await;
    mount_create(&server).await;

    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
default_context = "test"

[contexts.test]
access_token = "${{CLOUDCTL_TEST_TOKEN}}"
api_url = "{}"
"#,
            server.uri()
        ),
    )
    .unwrap();

    let mut args: Vec<String> = vec![
        "--config-file".to_string(),
        config_path.display().to_string(),
        "compute".to_string(),
        "lb".to_string(),
        "create".to_string(),
    ];
    args.extend(BASE_ARGS.iter().map(|s| s.to_string()));

    let output = run(args, vec![("CLOUDCTL_TEST_TOKEN", TOKEN.to_string())]).await;

    assert!(output.status.success(), "{:?}", output);
    assert_eq!(lines(&output.stdout), vec![TABLE_HEADER, ROW_NEW]);
}
