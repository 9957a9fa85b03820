#![allow(dead_code)]
//! In-process stub of the catalog service, faithful to the contract the
//! harness validates: `_id` keys, string-rendered `price`/`pages`, an
//! embedded `category` object on by-id book reads, a literal `null` body
//! for absent ids, and bearer auth on every mutating route.
//!
//! Each test spawns its own instance on a loopback port; no state is shared
//! between tests.

use std::sync::{Arc, Mutex};

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use shelfcheck::HarnessConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const EMAIL: &str = "john.doe@example.com";
pub const PASSWORD: &str = "password123";
pub const TOKEN: &str = "stub-session-token";

#[derive(Debug, Clone)]
struct StoredCategory {
    id: String,
    title: String,
}

#[derive(Debug, Clone)]
struct StoredBook {
    id: String,
    title: String,
    author: String,
    description: String,
    price: u64,
    pages: u64,
    category_id: String,
}

#[derive(Debug, Default)]
struct Catalog {
    next_id: u64,
    categories: Vec<StoredCategory>,
    books: Vec<StoredBook>,
}

impl Catalog {
    fn assign_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{:04}", self.next_id)
    }

    fn category_json(category: &StoredCategory) -> Value {
        json!({ "_id": category.id, "title": category.title })
    }

    /// Render a book. By-id reads embed the category object; listings carry
    /// the bare id, matching the service's mixed rendering.
    fn book_json(&self, book: &StoredBook, embed_category: bool) -> Value {
        let category = if embed_category {
            self.categories
                .iter()
                .find(|category| category.id == book.category_id)
                .map(Self::category_json)
                .unwrap_or_else(|| json!(book.category_id))
        } else {
            json!(book.category_id)
        };
        json!({
            "_id": book.id,
            "title": book.title,
            "author": book.author,
            "description": book.description,
            "price": book.price.to_string(),
            "pages": book.pages.to_string(),
            "category": category,
        })
    }
}

type Shared = Arc<Mutex<Catalog>>;

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {TOKEN}");
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing or invalid bearer token" })),
    )
        .into_response()
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        Json(json!({ "token": TOKEN })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid credentials" })),
        )
            .into_response()
    }
}

async fn list_categories(State(state): State<Shared>) -> Json<Value> {
    let catalog = state.lock().unwrap();
    Json(Value::Array(
        catalog.categories.iter().map(Catalog::category_json).collect(),
    ))
}

async fn get_category(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let catalog = state.lock().unwrap();
    Json(
        catalog
            .categories
            .iter()
            .find(|category| category.id == id)
            .map(Catalog::category_json)
            .unwrap_or(Value::Null),
    )
}

async fn create_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut catalog = state.lock().unwrap();
    let category = StoredCategory {
        id: catalog.assign_id("cat"),
        title: body["title"].as_str().unwrap_or_default().to_string(),
    };
    let rendered = Catalog::category_json(&category);
    catalog.categories.push(category);
    Json(rendered).into_response()
}

async fn update_category(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut catalog = state.lock().unwrap();
    let Some(category) = catalog.categories.iter_mut().find(|category| category.id == id) else {
        return Json(Value::Null).into_response();
    };
    if let Some(title) = body["title"].as_str() {
        category.title = title.to_string();
    }
    Json(Catalog::category_json(category)).into_response()
}

async fn delete_category(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut catalog = state.lock().unwrap();
    catalog.categories.retain(|category| category.id != id);
    Json(Value::Null).into_response()
}

async fn list_books(State(state): State<Shared>) -> Json<Value> {
    let catalog = state.lock().unwrap();
    Json(Value::Array(
        catalog
            .books
            .iter()
            .map(|book| catalog.book_json(book, false))
            .collect(),
    ))
}

async fn get_book(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let catalog = state.lock().unwrap();
    Json(
        catalog
            .books
            .iter()
            .find(|book| book.id == id)
            .map(|book| catalog.book_json(book, true))
            .unwrap_or(Value::Null),
    )
}

async fn create_book(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut catalog = state.lock().unwrap();
    let book = StoredBook {
        id: catalog.assign_id("book"),
        title: body["title"].as_str().unwrap_or_default().to_string(),
        author: body["author"].as_str().unwrap_or_default().to_string(),
        description: body["description"].as_str().unwrap_or_default().to_string(),
        price: body["price"].as_u64().unwrap_or_default(),
        pages: body["pages"].as_u64().unwrap_or_default(),
        category_id: body["category"].as_str().unwrap_or_default().to_string(),
    };
    let rendered = catalog.book_json(&book, true);
    catalog.books.push(book);
    Json(rendered).into_response()
}

async fn update_book(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut catalog = state.lock().unwrap();
    let Some(index) = catalog.books.iter().position(|book| book.id == id) else {
        return Json(Value::Null).into_response();
    };
    {
        let book = &mut catalog.books[index];
        // Subset update: only the fields present in the payload change.
        if let Some(title) = body["title"].as_str() {
            book.title = title.to_string();
        }
        if let Some(author) = body["author"].as_str() {
            book.author = author.to_string();
        }
        if let Some(description) = body["description"].as_str() {
            book.description = description.to_string();
        }
        if let Some(price) = body["price"].as_u64() {
            book.price = price;
        }
        if let Some(pages) = body["pages"].as_u64() {
            book.pages = pages;
        }
    }
    let book = catalog.books[index].clone();
    Json(catalog.book_json(&book, true)).into_response()
}

async fn delete_book(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut catalog = state.lock().unwrap();
    catalog.books.retain(|book| book.id != id);
    Json(Value::Null).into_response()
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/user/login", post(login))
        .route("/category", get(list_categories).post(create_category))
        .route(
            "/category/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/book", get(list_books).post(create_book))
        .route("/book/:id", get(get_book).put(update_book).delete(delete_book))
        .with_state(state)
}

// ─── Spawning & Seeding ──────────────────────────────────────────────────────

/// Handle for one spawned stub instance.
pub struct StubService {
    pub base_url: String,
    state: Shared,
    join: JoinHandle<()>,
}

impl StubService {
    /// Bind a fresh loopback port and serve an empty catalog.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::default();
        let app = router(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind loopback for stub service");
        let addr = listener.local_addr().expect("failed to read stub address");
        let join = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub service crashed");
        });
        Self {
            base_url: format!("http://{addr}"),
            state,
            join,
        }
    }

    /// Harness configuration pointing at this instance with valid credentials.
    pub fn config(&self) -> HarnessConfig {
        HarnessConfig::new(&self.base_url, EMAIL, PASSWORD)
    }

    pub fn config_with_password(&self, password: &str) -> HarnessConfig {
        HarnessConfig::new(&self.base_url, EMAIL, password)
    }

    pub fn seed_category(&self, title: &str) -> String {
        let mut catalog = self.state.lock().unwrap();
        let category = StoredCategory {
            id: catalog.assign_id("cat"),
            title: title.to_string(),
        };
        let id = category.id.clone();
        catalog.categories.push(category);
        id
    }

    pub fn seed_book(
        &self,
        title: &str,
        author: &str,
        description: &str,
        price: u64,
        pages: u64,
        category_id: &str,
    ) -> String {
        let mut catalog = self.state.lock().unwrap();
        let book = StoredBook {
            id: catalog.assign_id("book"),
            title: title.to_string(),
            author: author.to_string(),
            description: description.to_string(),
            price,
            pages,
            category_id: category_id.to_string(),
        };
        let id = book.id.clone();
        catalog.books.push(book);
        id
    }

    pub fn category_count(&self) -> usize {
        self.state.lock().unwrap().categories.len()
    }

    pub fn book_count(&self) -> usize {
        self.state.lock().unwrap().books.len()
    }

    pub async fn shutdown(self) {
        self.join.abort();
        let _ = self.join.await;
    }
}
