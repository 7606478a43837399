use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode as HttpStatus, redirect::Policy};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::{sync::Mutex as AsyncMutex, time::sleep};

static TEST_LOCK: Lazy<AsyncMutex<()>> = Lazy::new(|| AsyncMutex::new(()));

#[derive(Default)]
struct MockBackend {
    fail_slots: bool,
    dashboard_calls: AtomicUsize,
    last_dashboard: Mutex<Option<Value>>,
    last_slot_query: Mutex<Option<HashMap<String, String>>>,
}

async fn mock_alltime(
    State(mock): State<Arc<MockBackend>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    *mock.last_slot_query.lock().unwrap() = Some(query);
    if mock.fail_slots {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(json!([
        { "start": "08:00", "end": "10:00" },
        { "start": "10:00", "end": "12:00" }
    ])))
}

async fn mock_dashboard(State(mock): State<Arc<MockBackend>>, Json(body): Json<Value>) -> Json<Value> {
    mock.dashboard_calls.fetch_add(1, Ordering::SeqCst);
    *mock.last_dashboard.lock().unwrap() = Some(body);
    Json(json!({
        "part1": { "total": 120, "compare": 100, "percent_change": "20.0" },
        "part2": { "peak_period": "2024/01/10 08:00:00~10:00:00, 70 pax" }
    }))
}

async fn mock_footfall() -> Json<Value> {
    Json(json!({
        "weekly_current": {
            "male": [1, 2, 3, 4, 5, 6, 7],
            "female": [7, 6, 5, 4, 3, 2, 1],
            "children": [0, 0, 0, 0, 0, 0, 0],
            "unknown": [1, 1, 1, 1, 1, 1, 1]
        }
    }))
}

async fn mock_cameras() -> Json<Value> {
    Json(json!(["A2", "A3", "A6"]))
}

async fn spawn_backend(mock: Arc<MockBackend>) -> String {
    let app = Router::new()
        .route("/api/alltime", get(mock_alltime))
        .route("/api/dashboard", post(mock_dashboard))
        .route("/api/footfall-distribution", get(mock_footfall))
        .route("/api/cameras", get(mock_cameras))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(unix)]
mod cleanup {
    use once_cell::sync::Lazy;
    use std::sync::{Mutex, Once};

    static REGISTER: Once = Once::new();
    static PIDS: Lazy<Mutex<Vec<i32>>> = Lazy::new(|| Mutex::new(Vec::new()));

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter() {
                unsafe {
                    libc::kill(*pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/selection")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(backend_url: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_footfall_dashboard"))
        .env("PORT", port.to_string())
        .env("BACKEND_URL", backend_url)
        .env("END_TIME_DEFAULT", "latest")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn start(mock: MockBackend) -> (Arc<MockBackend>, TestServer) {
    let mock = Arc::new(mock);
    let backend_url = spawn_backend(Arc::clone(&mock)).await;
    let server = spawn_server(&backend_url).await;
    (mock, server)
}

fn option_values(options: &Value) -> Vec<String> {
    options
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["value"].as_str().unwrap().to_string())
        .collect()
}

async fn get_json(client: &Client, url: String) -> Value {
    client.get(url).send().await.unwrap().json().await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn http_initial_load_populates_selectors_and_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let (mock, server) = start(MockBackend::default()).await;
    let client = Client::new();

    let snapshot = get_json(&client, format!("{}/api/selection", server.base_url)).await;

    assert_eq!(snapshot["phase"], "dashboard_ready");
    assert_eq!(option_values(&snapshot["selectors"]["start_options"]), vec!["08:00", "10:00"]);
    assert_eq!(option_values(&snapshot["selectors"]["end_options"]), vec!["10:00", "12:00"]);
    assert_eq!(snapshot["selection"]["selected_start_time"], "08:00");
    assert_eq!(snapshot["selection"]["selected_end_time"], "12:00");

    assert_eq!(mock.dashboard_calls.load(Ordering::SeqCst), 1);
    let body = mock.last_dashboard.lock().unwrap().clone().unwrap();
    assert_eq!(body["time_start"], "08:00");
    assert_eq!(body["time_end"], "12:00");
    assert!(body["date_start"].as_str().unwrap().ends_with(" 08:00"));
    assert!(body["ref_date_end"].as_str().unwrap().ends_with(" 12:00"));

    let dashboard = get_json(&client, format!("{}/api/dashboard", server.base_url)).await;
    assert_eq!(dashboard["sections"][0]["status"], "ready");
    assert_eq!(dashboard["sections"][0]["data"]["total"], 120);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_start_time_change_narrows_end_options() {
    let _guard = TEST_LOCK.lock().await;
    let (mock, server) = start(MockBackend::default()).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/selection/start-time", server.base_url))
        .json(&json!({ "value": "10:00" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let snapshot: Value = response.json().await.unwrap();

    assert_eq!(option_values(&snapshot["selectors"]["end_options"]), vec!["12:00"]);
    assert_eq!(snapshot["selection"]["selected_end_time"], "12:00");
    assert_eq!(mock.dashboard_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_backwards_end_date_is_clamped() {
    let _guard = TEST_LOCK.lock().await;
    let (mock, server) = start(MockBackend::default()).await;
    let client = Client::new();

    let snapshot: Value = client
        .post(format!("{}/api/selection/dates", server.base_url))
        .json(&json!({ "date_start": "2024-01-10", "date_end": "2024-01-05" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(snapshot["selection"]["date_range"]["start"], "2024-01-10");
    assert_eq!(snapshot["selection"]["date_range"]["end"], "2024-01-10");

    let query = mock.last_slot_query.lock().unwrap().clone().unwrap();
    assert_eq!(query.get("date_start").map(String::as_str), Some("2024-01-10"));
    assert_eq!(query.get("date_end").map(String::as_str), Some("2024-01-10"));
}

#[tokio::test(flavor = "multi_thread")]
async fn http_slot_failure_blocks_dashboard() {
    let _guard = TEST_LOCK.lock().await;
    let (mock, server) = start(MockBackend {
        fail_slots: true,
        ..MockBackend::default()
    })
    .await;
    let client = Client::new();

    let snapshot = get_json(&client, format!("{}/api/selection", server.base_url)).await;
    assert_eq!(snapshot["phase"], "error");
    for key in ["start_options", "end_options"] {
        let options = snapshot["selectors"][key].as_array().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0]["disabled"], true);
        assert_eq!(options[0]["label"], "Error: Failed to load time periods!");
    }

    let refreshed: Value = client
        .post(format!("{}/api/refresh", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(refreshed["phase"], "error");
    assert_eq!(mock.dashboard_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_unknown_end_time_is_bad_request() {
    let _guard = TEST_LOCK.lock().await;
    let (mock, server) = start(MockBackend::default()).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/selection/end-time", server.base_url))
        .json(&json!({ "value": "07:00" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatus::BAD_REQUEST);
    assert_eq!(mock.dashboard_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn http_footfall_chart_is_registered_by_canvas() {
    let _guard = TEST_LOCK.lock().await;
    let (_mock, server) = start(MockBackend::default()).await;
    let client = Client::new();

    let chart: Value = client
        .post(format!("{}/api/charts/footfall", server.base_url))
        .json(&json!({ "variant": "weekly_current" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(chart["variant"], "weekly_current");
    assert_eq!(chart["labels"].as_array().unwrap().len(), 7);
    assert_eq!(chart["datasets"][0]["label"], "Male");

    let stored = get_json(&client, format!("{}/api/charts/footfall", server.base_url)).await;
    assert_eq!(stored, chart);

    let missing = client
        .get(format!("{}/api/charts/other", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), HttpStatus::NOT_FOUND);

    let cameras = get_json(&client, format!("{}/api/cameras", server.base_url)).await;
    assert_eq!(cameras, json!(["A2", "A3", "A6"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn http_form_routes_redirect_and_apply() {
    let _guard = TEST_LOCK.lock().await;
    let (mock, server) = start(MockBackend::default()).await;
    let client = Client::builder().redirect(Policy::none()).build().unwrap();
    let before = get_json(&client, format!("{}/api/selection", server.base_url)).await;

    let response = client
        .post(format!("{}/selection/dates", server.base_url))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("date_start=2024-01-10&date_end=2024-01-05&ref_date_start=&ref_date_end=")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatus::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");

    let snapshot = get_json(&client, format!("{}/api/selection", server.base_url)).await;
    assert_eq!(snapshot["selection"]["date_range"]["start"], "2024-01-10");
    assert_eq!(snapshot["selection"]["date_range"]["end"], "2024-01-10");
    assert_eq!(
        snapshot["selection"]["comparison_window"],
        before["selection"]["comparison_window"]
    );
    assert_eq!(snapshot["phase"], "dashboard_ready");

    let response = client
        .post(format!("{}/selection/start-time", server.base_url))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("value=10%3A00")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatus::SEE_OTHER);

    let snapshot = get_json(&client, format!("{}/api/selection", server.base_url)).await;
    assert_eq!(option_values(&snapshot["selectors"]["end_options"]), vec!["12:00"]);
    assert_eq!(snapshot["selection"]["selected_start_time"], "10:00");

    let response = client
        .post(format!("{}/selection/end-time", server.base_url))
        .header("content-type", "application/x-www-form-urlencoded")
        .body("value=12%3A00")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), HttpStatus::SEE_OTHER);

    let body = mock.last_dashboard.lock().unwrap().clone().unwrap();
    assert_eq!(body["date_start"], "2024-01-10 10:00");
    assert_eq!(body["date_end"], "2024-01-10 12:00");

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains(r#"name="date_start" value="2024-01-10""#));
    assert!(page.contains(r#"name="date_end" value="2024-01-10""#));
    assert!(page.contains(r#"<option value="10:00" selected>10:00</option>"#));
    assert!(page.contains(r#"<section id="part1">"#));
}
