//! Shared test utilities for mealmate integration tests.
//!
//! Provides [`MockBackend`]: an in-process axum server that speaks the remote
//! service's JSON contract. Each test starts its own instance on an
//! ephemeral port, so tests never share state.
//!
//! Besides the happy path, the backend can:
//! - count requests per route ([`MockBackend::request_count`]),
//! - fail the next request on a route with any status and body,
//! - delay every response on a route,
//! - revoke all issued tokens so the next authenticated call gets a 401.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

use mealmate_api::GatewayConfig;

/// Route keys accepted by the counting, fault and delay helpers.
pub mod routes {
    pub const REGISTER: &str = "POST /auth/register";
    pub const LOGIN: &str = "POST /auth/login";
    pub const PROFILE: &str = "GET /auth/profile";
    pub const PLAN: &str = "GET /plan";
    pub const ADD_MEAL: &str = "POST /meals";
    pub const UPDATE_MEAL: &str = "PUT /meals";
    pub const DELETE_MEAL: &str = "DELETE /meals";
    pub const GROCERIES: &str = "GET /groceries";
    pub const ADD_GROCERY: &str = "POST /groceries";
    pub const UPDATE_GROCERY: &str = "PUT /groceries";
    pub const DELETE_GROCERY: &str = "DELETE /groceries";
    pub const CLEAR_PURCHASED: &str = "DELETE /groceries/clear-purchased";
    pub const GENERATE_IDEAS: &str = "POST /generate-ideas";
    pub const HEALTH: &str = "GET /health";
}

/// Default credentials seeded by [`MockBackend::with_user`].
pub const TEST_EMAIL: &str = "cook@example.com";
pub const TEST_PASSWORD: &str = "correct-horse";

const DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct UserRow {
    id: i64,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
struct MealRow {
    id: i64,
    user_id: i64,
    day_of_week: String,
    name: String,
    notes: String,
    ingredients: Vec<(String, String)>,
}

impl MealRow {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "user_id": self.user_id,
            "day_of_week": self.day_of_week,
            "name": self.name,
            "notes": self.notes,
            "ingredients": self
                .ingredients
                .iter()
                .map(|(name, quantity)| json!({ "meal_id": self.id, "name": name, "quantity": quantity }))
                .collect::<Vec<_>>(),
        })
    }
}

#[derive(Debug, Clone)]
struct GroceryRow {
    id: i64,
    user_id: i64,
    name: String,
    quantity: String,
    purchased: bool,
    meal_source: String,
}

impl GroceryRow {
    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "user_id": self.user_id,
            "name": self.name,
            "quantity": self.quantity,
            "purchased": self.purchased,
            "mealSource": self.meal_source,
        })
    }
}

#[derive(Debug, Default)]
struct Data {
    next_id: i64,
    users: Vec<UserRow>,
    tokens: HashMap<String, i64>,
    meals: Vec<MealRow>,
    groceries: Vec<GroceryRow>,
    suggestions: Option<(u16, String)>,
}

impl Data {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn issue_token(&mut self, user_id: i64) -> String {
        let token = format!("mock-token-{}", self.next_id());
        self.tokens.insert(token.clone(), user_id);
        token
    }
}

#[derive(Debug, Clone)]
struct Fault {
    status: u16,
    body: String,
}

impl IntoResponse for Fault {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, "application/json")], self.body).into_response()
    }
}

#[derive(Debug, Default)]
struct Control {
    counts: HashMap<&'static str, usize>,
    faults: HashMap<&'static str, VecDeque<Fault>>,
    delays: HashMap<&'static str, Duration>,
}

#[derive(Debug, Default)]
struct BackendState {
    data: Mutex<Data>,
    control: Mutex<Control>,
}

impl BackendState {
    fn data(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Count the request, apply any configured delay, then any queued fault.
    async fn enter(&self, route: &'static str) -> Result<(), Response> {
        let (delay, fault) = {
            let mut control = self.control();
            *control.counts.entry(route).or_default() += 1;
            let delay = control.delays.get(route).copied();
            let fault = control.faults.get_mut(route).and_then(VecDeque::pop_front);
            (delay, fault)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match fault {
            Some(fault) => Err(fault.into_response()),
            None => Ok(()),
        }
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<i64, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                error_response(StatusCode::UNAUTHORIZED, "Missing Authorization Header")
            })?;
        self.data()
            .tokens
            .get(token)
            .copied()
            .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Token has expired"))
    }

    async fn guard(&self, route: &'static str, headers: &HeaderMap) -> Result<i64, Response> {
        self.enter(route).await?;
        self.authenticate(headers)
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// A running in-process backend. The server stops when this is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Start an empty backend on an ephemeral localhost port.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        let app = build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().expect("mock backend has no address");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::warn!(error = %e, "mock backend stopped");
            }
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Start a backend with [`TEST_EMAIL`] / [`TEST_PASSWORD`] registered.
    pub async fn with_user() -> Self {
        let backend = Self::start().await;
        backend.add_user(TEST_EMAIL, TEST_PASSWORD);
        backend
    }

    /// Base URL including the `/api` prefix.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Gateway config pointing at this backend, with short timeouts.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(self.base_url())
            .with_request_timeout(Duration::from_secs(5))
            .with_suggestion_timeout(Duration::from_secs(5))
    }

    // -- Seeding ----------------------------------------------------------

    /// Register a user directly. Returns the user id.
    pub fn add_user(&self, email: &str, password: &str) -> i64 {
        let mut data = self.state.data();
        let id = data.next_id();
        data.users.push(UserRow {
            id,
            email: email.to_owned(),
            password: password.to_owned(),
        });
        id
    }

    /// Issue a valid token for an existing user, as a previous login would.
    pub fn issue_token(&self, email: &str) -> String {
        let mut data = self.state.data();
        let user_id = data
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.id)
            .unwrap_or_else(|| panic!("no mock user {email}"));
        data.issue_token(user_id)
    }

    /// Invalidate every issued token; the next authenticated call gets 401.
    pub fn revoke_tokens(&self) {
        self.state.data().tokens.clear();
    }

    /// Insert a meal for the first user. Returns its id.
    pub fn seed_meal(&self, day: &str, name: &str, ingredients: &[(&str, &str)]) -> i64 {
        let mut data = self.state.data();
        let user_id = data.users.first().map(|u| u.id).expect("seed a user first");
        let id = data.next_id();
        data.meals.push(MealRow {
            id,
            user_id,
            day_of_week: day.to_owned(),
            name: name.to_owned(),
            notes: String::new(),
            ingredients: ingredients
                .iter()
                .map(|(q, n)| ((*n).to_owned(), (*q).to_owned()))
                .collect(),
        });
        id
    }

    /// Insert a grocery item for the first user. Returns its id.
    pub fn seed_grocery(&self, name: &str, quantity: &str, purchased: bool) -> i64 {
        let mut data = self.state.data();
        let user_id = data.users.first().map(|u| u.id).expect("seed a user first");
        let id = data.next_id();
        data.groceries.push(GroceryRow {
            id,
            user_id,
            name: name.to_owned(),
            quantity: quantity.to_owned(),
            purchased,
            meal_source: "Manually Added".to_owned(),
        });
        id
    }

    /// Make `/generate-ideas` answer with this status and raw body.
    pub fn set_suggestions_response(&self, status: u16, body: &str) {
        self.state.data().suggestions = Some((status, body.to_owned()));
    }

    // -- Control ----------------------------------------------------------

    /// Fail the next request on `route` with `status` and a JSON body.
    pub fn fail_next(&self, route: &'static str, status: u16, body: Value) {
        self.respond_raw_next(route, status, &body.to_string());
    }

    /// Answer the next request on `route` with `status` and a raw body.
    pub fn respond_raw_next(&self, route: &'static str, status: u16, body: &str) {
        self.state
            .control()
            .faults
            .entry(route)
            .or_default()
            .push_back(Fault {
                status,
                body: body.to_owned(),
            });
    }

    /// Delay every response on `route`.
    pub fn set_delay(&self, route: &'static str, delay: Duration) {
        self.state.control().delays.insert(route, delay);
    }

    /// Number of requests received on `route` so far.
    pub fn request_count(&self, route: &'static str) -> usize {
        self.state.control().counts.get(route).copied().unwrap_or(0)
    }

    /// Total requests received on any route.
    pub fn total_requests(&self) -> usize {
        self.state.control().counts.values().sum()
    }

    // -- Inspection -------------------------------------------------------

    /// `(id, day, name)` of every stored meal.
    pub fn meals(&self) -> Vec<(i64, String, String)> {
        self.state
            .data()
            .meals
            .iter()
            .map(|m| (m.id, m.day_of_week.clone(), m.name.clone()))
            .collect()
    }

    /// `(id, name, quantity, purchased)` of every stored grocery item.
    pub fn groceries(&self) -> Vec<(i64, String, String, bool)> {
        self.state
            .data()
            .groceries
            .iter()
            .map(|g| (g.id, g.name.clone(), g.quantity.clone(), g.purchased))
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn build_router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/profile", get(profile))
        .route("/api/plan", get(list_meals))
        .route("/api/meals", post(add_meal))
        .route("/api/meals/{id}", put(update_meal).delete(delete_meal))
        .route("/api/groceries", get(list_groceries).post(add_grocery))
        .route("/api/groceries/clear-purchased", delete(clear_purchased))
        .route(
            "/api/groceries/{id}",
            put(update_grocery).delete(delete_grocery),
        )
        .route("/api/generate-ideas", post(generate_ideas))
        .with_state(state)
}

type Shared = State<Arc<BackendState>>;

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CredentialsBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

async fn health(State(state): Shared) -> Response {
    if let Err(r) = state.enter(routes::HEALTH).await {
        return r;
    }
    Json(json!({ "status": "healthy", "message": "mock backend", "configured": true }))
        .into_response()
}

async fn register(State(state): Shared, Json(body): Json<CredentialsBody>) -> Response {
    if let Err(r) = state.enter(routes::REGISTER).await {
        return r;
    }
    if body.email.is_empty() || body.password.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Email and password are required");
    }
    if body.password.len() < 8 {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Password must be at least 8 characters long",
        );
    }
    let mut data = state.data();
    if data.users.iter().any(|u| u.email == body.email) {
        return error_response(StatusCode::CONFLICT, "User with this email already exists");
    }
    let id = data.next_id();
    data.users.push(UserRow {
        id,
        email: body.email.clone(),
        password: body.password,
    });
    let token = data.issue_token(id);
    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "access_token": token,
            "user": { "id": id, "email": body.email, "created_at": "2024-01-01T00:00:00" },
        })),
    )
        .into_response()
}

async fn login(State(state): Shared, Json(body): Json<CredentialsBody>) -> Response {
    if let Err(r) = state.enter(routes::LOGIN).await {
        return r;
    }
    let mut data = state.data();
    let Some(user) = data
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
        .cloned()
    else {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid email or password");
    };
    let token = data.issue_token(user.id);
    Json(json!({
        "message": "Login successful",
        "access_token": token,
        "user": { "id": user.id, "email": user.email },
    }))
    .into_response()
}

async fn profile(State(state): Shared, headers: HeaderMap) -> Response {
    let user_id = match state.guard(routes::PROFILE, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let data = state.data();
    match data.users.iter().find(|u| u.id == user_id) {
        Some(user) => Json(json!({
            "user": { "id": user.id, "email": user.email, "created_at": "2024-01-01T00:00:00" }
        }))
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "User not found"),
    }
}

async fn list_meals(State(state): Shared, headers: HeaderMap) -> Response {
    let user_id = match state.guard(routes::PLAN, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let data = state.data();
    let meals: Vec<Value> = data
        .meals
        .iter()
        .filter(|m| m.user_id == user_id)
        .map(MealRow::to_json)
        .collect();
    Json(json!({ "meals": meals })).into_response()
}

#[derive(Debug, Deserialize)]
struct IngredientBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    quantity: String,
}

#[derive(Debug, Deserialize)]
struct MealBody {
    #[serde(default)]
    day_of_week: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    ingredients: Option<Vec<IngredientBody>>,
}

fn ingredient_pairs(ingredients: Vec<IngredientBody>) -> Vec<(String, String)> {
    ingredients
        .into_iter()
        .filter(|i| !i.name.is_empty() && !i.quantity.is_empty())
        .map(|i| (i.name, i.quantity))
        .collect()
}

async fn add_meal(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<MealBody>,
) -> Response {
    let user_id = match state.guard(routes::ADD_MEAL, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let (Some(day), Some(name)) = (
        body.day_of_week.filter(|d| !d.is_empty()),
        body.name.filter(|n| !n.is_empty()),
    ) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Day of week and meal name are required",
        );
    };
    if !DAYS.contains(&day.as_str()) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid day of week");
    }

    let mut data = state.data();
    if data
        .meals
        .iter()
        .any(|m| m.user_id == user_id && m.day_of_week == day)
    {
        return error_response(StatusCode::CONFLICT, "Meal already exists for this day");
    }

    let id = data.next_id();
    let meal = MealRow {
        id,
        user_id,
        day_of_week: day,
        name,
        notes: body.notes.unwrap_or_default(),
        ingredients: ingredient_pairs(body.ingredients.unwrap_or_default()),
    };

    // Each ingredient lands on the grocery list, labelled with its meal.
    for (ingredient, quantity) in &meal.ingredients {
        let grocery_id = data.next_id();
        data.groceries.push(GroceryRow {
            id: grocery_id,
            user_id,
            name: ingredient.clone(),
            quantity: quantity.clone(),
            purchased: false,
            meal_source: meal.name.clone(),
        });
    }

    let json = meal.to_json();
    data.meals.push(meal);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Meal added successfully", "meal": json })),
    )
        .into_response()
}

async fn update_meal(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<MealBody>,
) -> Response {
    let user_id = match state.guard(routes::UPDATE_MEAL, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    if let Some(day) = &body.day_of_week {
        if !DAYS.contains(&day.as_str()) {
            return error_response(StatusCode::BAD_REQUEST, "Invalid day of week");
        }
    }

    let mut data = state.data();
    let Some(meal) = data
        .meals
        .iter_mut()
        .find(|m| m.id == id && m.user_id == user_id)
    else {
        return error_response(StatusCode::NOT_FOUND, "Meal not found");
    };
    if let Some(day) = body.day_of_week {
        meal.day_of_week = day;
    }
    if let Some(name) = body.name.filter(|n| !n.is_empty()) {
        meal.name = name;
    }
    if let Some(notes) = body.notes {
        meal.notes = notes;
    }
    if let Some(ingredients) = body.ingredients {
        meal.ingredients = ingredient_pairs(ingredients);
    }
    let json = meal.to_json();
    Json(json!({ "message": "Meal updated successfully", "meal": json })).into_response()
}

async fn delete_meal(State(state): Shared, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let user_id = match state.guard(routes::DELETE_MEAL, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let mut data = state.data();
    let before = data.meals.len();
    data.meals.retain(|m| !(m.id == id && m.user_id == user_id));
    if data.meals.len() == before {
        return error_response(StatusCode::NOT_FOUND, "Meal not found");
    }
    Json(json!({ "message": "Meal deleted successfully" })).into_response()
}

async fn list_groceries(State(state): Shared, headers: HeaderMap) -> Response {
    let user_id = match state.guard(routes::GROCERIES, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let data = state.data();
    // Newest first, like the real service.
    let items: Vec<Value> = data
        .groceries
        .iter()
        .rev()
        .filter(|g| g.user_id == user_id)
        .map(GroceryRow::to_json)
        .collect();
    Json(json!({ "grocery_items": items })).into_response()
}

#[derive(Debug, Deserialize)]
struct GroceryBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(default)]
    purchased: Option<bool>,
}

async fn add_grocery(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<GroceryBody>,
) -> Response {
    let user_id = match state.guard(routes::ADD_GROCERY, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let name = body.name.unwrap_or_default().trim().to_owned();
    let quantity = body.quantity.unwrap_or_default().trim().to_owned();
    if name.is_empty() || quantity.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Item name and quantity are required",
        );
    }
    let mut data = state.data();
    let id = data.next_id();
    let row = GroceryRow {
        id,
        user_id,
        name,
        quantity,
        purchased: false,
        meal_source: "Manually Added".to_owned(),
    };
    let json = row.to_json();
    data.groceries.push(row);
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Grocery item added successfully", "item": json })),
    )
        .into_response()
}

async fn update_grocery(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<GroceryBody>,
) -> Response {
    let user_id = match state.guard(routes::UPDATE_GROCERY, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let mut data = state.data();
    let Some(item) = data
        .groceries
        .iter_mut()
        .find(|g| g.id == id && g.user_id == user_id)
    else {
        return error_response(StatusCode::NOT_FOUND, "Grocery item not found");
    };
    if let Some(purchased) = body.purchased {
        item.purchased = purchased;
    }
    if let Some(name) = body.name.filter(|n| !n.trim().is_empty()) {
        item.name = name.trim().to_owned();
    }
    if let Some(quantity) = body.quantity.filter(|q| !q.trim().is_empty()) {
        item.quantity = quantity.trim().to_owned();
    }
    let json = item.to_json();
    Json(json!({ "message": "Grocery item updated successfully", "item": json })).into_response()
}

async fn delete_grocery(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let user_id = match state.guard(routes::DELETE_GROCERY, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let mut data = state.data();
    let before = data.groceries.len();
    data.groceries
        .retain(|g| !(g.id == id && g.user_id == user_id));
    if data.groceries.len() == before {
        return error_response(StatusCode::NOT_FOUND, "Grocery item not found");
    }
    Json(json!({ "message": "Grocery item deleted successfully" })).into_response()
}

async fn clear_purchased(State(state): Shared, headers: HeaderMap) -> Response {
    let user_id = match state.guard(routes::CLEAR_PURCHASED, &headers).await {
        Ok(id) => id,
        Err(r) => return r,
    };
    let mut data = state.data();
    let before = data.groceries.len();
    data.groceries
        .retain(|g| !(g.user_id == user_id && g.purchased));
    let deleted = before - data.groceries.len();
    Json(json!({
        "message": "Purchased items cleared successfully",
        "deleted_count": deleted,
    }))
    .into_response()
}

#[derive(Debug, Deserialize)]
struct IdeaBody {
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    count: Option<u32>,
}

async fn generate_ideas(
    State(state): Shared,
    headers: HeaderMap,
    Json(body): Json<IdeaBody>,
) -> Response {
    if let Err(r) = state.guard(routes::GENERATE_IDEAS, &headers).await {
        return r;
    }
    if body.prompt.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Prompt is required");
    }
    if let Some((status, raw)) = state.data().suggestions.clone() {
        return Fault { status, body: raw }.into_response();
    }
    let count = body.count.unwrap_or(3).clamp(1, 5);
    let meals: Vec<Value> = (1..=count)
        .map(|n| {
            json!({
                "name": format!("Idea {n}"),
                "notes": format!("Suggested for: {}", body.prompt),
                "ingredients": [
                    { "name": "Rice", "quantity": "200g" },
                    { "name": "Garlic", "quantity": "2 cloves" },
                ],
            })
        })
        .collect();
    Json(json!({ "meals": meals })).into_response()
}
