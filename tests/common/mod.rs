#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use mdtn_client::{
    MdtnClient,
    config::Config,
    fetch::LoginRedirect,
    session::{MemoryStorage, Session},
};
use serde_json::{Value, json};

pub const PASSWORD: &str = "secreto";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub upsert: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshMode {
    /// 只签发新的访问令牌
    #[default]
    Issue,
    /// 同时轮换刷新令牌，并使用 `token` 字段名
    Rotate,
    Reject,
}

#[derive(Default)]
pub struct MockState {
    pub requests: Vec<Recorded>,
    pub valid_token: Option<String>,
    pub always_unauthorized: bool,
    pub refresh_mode: RefreshMode,
    pub refresh_delay: Option<Duration>,
    pub refresh_calls: usize,
    pub issued: usize,
    pub venues: Vec<Value>,
    pub fail_page: Option<u32>,
    pub cities: Vec<Value>,
    pub objects: HashMap<String, Vec<u8>>,
}

type Shared = Arc<Mutex<MockState>>;

/// 本地起一个假的 REST 接口和对象存储
pub struct MockApi {
    pub base_url: String,
    pub state: Shared,
}

impl MockApi {
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/refresh", post(refresh))
            .route("/perfil", get(protected))
            .route("/reservas", post(protected))
            .route("/establecimientos", get(list_venues))
            .route("/ciudades", get(list_cities).post(create_city))
            .route(
                "/ciudades/{id}",
                get(get_city).put(update_city).delete(delete_city),
            )
            .route(
                "/storage/object/{bucket}/{*path}",
                post(put_object).delete(delete_object),
            )
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.with(|s| s.requests.iter().filter(|r| r.path == path).cloned().collect())
    }

    pub fn refresh_calls(&self) -> usize {
        self.with(|s| s.refresh_calls)
    }

    pub fn seed_venues(&self, count: usize, city_id: i64) {
        self.with(|s| {
            for _ in 0..count {
                let id = s.venues.len() + 1;
                s.venues.push(json!({
                    "id": id,
                    "nombre": format!("Lugar {:03}", id),
                    "ciudad_id": city_id,
                    "activo": true,
                }));
            }
        });
    }
}

#[derive(Default)]
pub struct CountingRedirect {
    count: AtomicUsize,
}

impl CountingRedirect {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl LoginRedirect for CountingRedirect {
    fn redirect_to_login(&self, _login_path: &str) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub api: MockApi,
    pub client: MdtnClient,
    pub storage: Arc<MemoryStorage>,
    pub redirect: Arc<CountingRedirect>,
}

impl Harness {
    pub async fn new() -> Self {
        let api = MockApi::spawn().await;
        let mut config = Config::for_api(api.base_url.clone());
        config.storage_base_url = Some(format!("{}/storage", api.base_url));

        let storage = Arc::new(MemoryStorage::new());
        let redirect = Arc::new(CountingRedirect::default());
        let client = MdtnClient::with_parts(config, storage.clone(), redirect.clone()).unwrap();

        Self {
            api,
            client,
            storage,
            redirect,
        }
    }

    /// 本地存一个服务端已经不认的访问令牌
    pub async fn seed_stale_session(&self, refresh_token: Option<&str>) {
        self.client
            .sessions
            .set(&Session {
                access_token: "stale".into(),
                refresh_token: refresh_token.map(str::to_string),
                user: None,
            })
            .await
            .unwrap();
    }

    /// 本地和服务端都认可的会话
    pub async fn seed_live_session(&self) {
        self.api.with(|s| s.valid_token = Some("live".into()));
        self.client
            .sessions
            .set(&Session {
                access_token: "live".into(),
                refresh_token: Some("refresh-0".into()),
                user: None,
            })
            .await
            .unwrap();
    }
}

async fn record(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let recorded = {
        let header_value = |name: header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Recorded {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
            upsert: header_value(header::HeaderName::from_static("x-upsert")),
        }
    };
    state.lock().unwrap().requests.push(recorded);
    next.run(req).await
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    if state.always_unauthorized {
        return false;
    }
    let Some(valid) = &state.valid_token else {
        return false;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", valid).as_str())
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"mensaje": "Token inválido"}))).into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if body["password"] != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"mensaje": "Credenciales inválidas"})),
        )
            .into_response();
    }

    let role = match email.split('@').next().unwrap_or_default() {
        "super" => "superadmin",
        "admin" => "admin",
        "dueno" => "propietario",
        _ => "usuario",
    };

    let mut state = state.lock().unwrap();
    state.issued += 1;
    let token = format!("access-{}", state.issued);
    state.valid_token = Some(token.clone());

    Json(json!({
        "accessToken": token,
        "refreshToken": "refresh-0",
        "user": {"id": 1, "nombre": "Operador", "rol": role},
    }))
    .into_response()
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let delay = {
        let mut state = state.lock().unwrap();
        state.refresh_calls += 1;
        state.refresh_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if body["refreshToken"].as_str().unwrap_or_default().is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let mut state = state.lock().unwrap();
    if state.refresh_mode == RefreshMode::Reject {
        return unauthorized();
    }

    state.issued += 1;
    let token = format!("access-{}", state.issued);
    state.valid_token = Some(token.clone());

    match state.refresh_mode {
        RefreshMode::Rotate => Json(json!({
            "token": token,
            "refreshToken": format!("refresh-{}", state.issued),
        }))
        .into_response(),
        _ => Json(json!({"accessToken": token})).into_response(),
    }
}

async fn protected(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&state.lock().unwrap(), &headers) {
        return unauthorized();
    }
    Json(json!({"ok": true})).into_response()
}

fn page_window(params: &HashMap<String, String>) -> (u32, usize) {
    let page = params.get("pagina").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit = params.get("limite").and_then(|l| l.parse().ok()).unwrap_or(10);
    (page, limit)
}

async fn list_venues(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    // 列表是公开的；带了令牌就必须有效
    if headers.contains_key(header::AUTHORIZATION) && !authorized(&state, &headers) {
        return unauthorized();
    }

    let (page, limit) = page_window(&params);
    if state.fail_page == Some(page) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let city = params.get("ciudad_id").and_then(|c| c.parse::<i64>().ok());
    let matching: Vec<&Value> = state
        .venues
        .iter()
        .filter(|v| city.is_none_or(|city| v["ciudad_id"] == city))
        .collect();
    let records: Vec<&Value> = matching
        .iter()
        .skip((page as usize - 1) * limit)
        .take(limit)
        .copied()
        .collect();

    Json(json!({"establecimientos": records, "total": matching.len()})).into_response()
}

async fn list_cities(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let (page, limit) = page_window(&params);
    let records: Vec<&Value> = state
        .cities
        .iter()
        .skip((page as usize - 1) * limit)
        .take(limit)
        .collect();
    Json(json!({"data": records, "paginacion": {"total": state.cities.len()}})).into_response()
}

async fn get_city(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    match state.cities.iter().find(|c| c["id"] == id) {
        Some(city) => Json(json!({"ciudad": city})).into_response(),
        None => (StatusCode::NOT_FOUND, "Ciudad no encontrada").into_response(),
    }
}

async fn create_city(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    body["id"] = json!(state.cities.len() + 1);
    state.cities.push(body.clone());
    (StatusCode::CREATED, Json(json!({"data": body}))).into_response()
}

async fn update_city(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let Some(city) = state.cities.iter_mut().find(|c| c["id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    body["id"] = json!(id);
    *city = body.clone();
    Json(body).into_response()
}

async fn delete_city(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let before = state.cities.len();
    state.cities.retain(|c| c["id"] != id);
    if state.cities.len() == before {
        return StatusCode::NOT_FOUND.into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn put_object(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path((bucket, path)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let key = format!("{}/{}", bucket, path);
    let upsert = headers.get("x-upsert").and_then(|v| v.to_str().ok()) == Some("true");

    let mut state = state.lock().unwrap();
    if state.objects.contains_key(&key) && !upsert {
        return (StatusCode::CONFLICT, "The resource already exists").into_response();
    }
    state.objects.insert(key.clone(), body.to_vec());
    Json(json!({"Key": key})).into_response()
}

async fn delete_object(
    State(state): State<Shared>,
    Path((bucket, path)): Path<(String, String)>,
) -> Response {
    let key = format!("{}/{}", bucket, path);
    match state.lock().unwrap().objects.remove(&key) {
        Some(_) => Json(json!({"message": "deleted"})).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
