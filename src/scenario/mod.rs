//! # Scenario Runner
//!
//! Orchestrates ordered sequences of resource calls interleaved with oracle
//! checks, validating full lifecycle and cross-resource consistency for
//! `Book` and `Category` entities.
//!
//! Each scenario is a finite linear sequence of steps over a single entity,
//! modeled as a state machine: every successful step advances
//! [`ScenarioState`]; the first failed step terminates the run with the
//! state left where it stalled. Steps run strictly sequentially. Each one
//! blocks on its HTTP round trip before the next request goes out, and a
//! single immediate read is expected to observe a just-written state.
//!
//! Scenarios never share state: each owns a [`TestContext`] created at its
//! start and dropped at its end, failure included.

use std::fmt;

use reqwest::{Client, StatusCode};

use crate::auth::{self, AuthToken};
use crate::client::ResourceClient;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::model::{Book, BookUpdate, Category, CategoryUpdate, NewBook, NewCategory};
use crate::oracle::{CheckList, expect_status};

// ─── Test Context ────────────────────────────────────────────────────────────

/// Per-scenario ephemeral state: the HTTP client, the bearer token once
/// obtained, and the configuration the scenario runs against. Built at
/// scenario start, never shared across scenarios.
pub struct TestContext {
    config: HarnessConfig,
    http: Client,
    token: Option<AuthToken>,
}

impl TestContext {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            http: Client::new(),
            token: None,
        }
    }

    /// Obtain and hold the session token. Must run before any mutating step.
    pub async fn authenticate(&mut self) -> Result<(), HarnessError> {
        let token = auth::authenticate(&self.http, &self.config).await?;
        self.token = Some(token);
        Ok(())
    }

    /// The held token, or an authentication failure if no login happened —
    /// a missing token is asserted against before any mutating step runs.
    pub fn token(&self) -> Result<&AuthToken, HarnessError> {
        self.token.as_ref().ok_or_else(|| {
            HarnessError::AuthenticationFailure("no token held: authenticate first".into())
        })
    }

    pub fn categories(&self) -> ResourceClient {
        ResourceClient::new(self.http.clone(), &self.config.base_url, "category")
    }

    pub fn books(&self) -> ResourceClient {
        ResourceClient::new(self.http.clone(), &self.config.base_url, "book")
    }
}

// ─── State Machine ───────────────────────────────────────────────────────────

/// States a scenario passes through, in order. Lifecycle scenarios terminate
/// at `ConfirmedAbsent`; read-only scenarios terminate at `Verified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScenarioState {
    Unauthenticated,
    Authenticated,
    Created,
    Verified,
    Updated,
    ReVerified,
    Deleted,
    ConfirmedAbsent,
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScenarioState::Unauthenticated => "unauthenticated",
            ScenarioState::Authenticated => "authenticated",
            ScenarioState::Created => "created",
            ScenarioState::Verified => "verified",
            ScenarioState::Updated => "updated",
            ScenarioState::ReVerified => "re-verified",
            ScenarioState::Deleted => "deleted",
            ScenarioState::ConfirmedAbsent => "confirmed absent",
        };
        write!(f, "{label}")
    }
}

// ─── Category Lifecycle ──────────────────────────────────────────────────────

/// Full lifecycle of one category: create, list-and-verify, update,
/// re-verify via a fresh get, delete, confirm absence.
pub struct CategoryLifecycle {
    title: String,
    updated_title: String,
    state: ScenarioState,
    category_id: Option<String>,
}

impl CategoryLifecycle {
    pub fn new(title: impl Into<String>, updated_title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            updated_title: updated_title.into(),
            state: ScenarioState::Unauthenticated,
            category_id: None,
        }
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    /// Id assigned by the service, once the create step has run.
    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    pub async fn run(&mut self, ctx: &mut TestContext) -> Result<(), HarnessError> {
        ctx.authenticate().await?;
        self.state = ScenarioState::Authenticated;

        let categories = ctx.categories();

        // Create, capturing the assigned id for every later step.
        let created = categories
            .create::<_, Category>(
                &NewCategory {
                    title: self.title.clone(),
                },
                ctx.token()?,
            )
            .await?;
        expect_status("create category", StatusCode::OK, created.status)?;
        let mut checks = CheckList::new();
        checks.non_empty("_id", &created.body.id);
        checks.field_eq("title", &created.body.title, &self.title);
        checks.finish("create category")?;
        let category_id = created.body.id;
        self.category_id = Some(category_id.clone());
        self.state = ScenarioState::Created;

        // A fresh list must already contain the new category, matched by
        // both title and id so a stale collection cannot slip through.
        let listed = categories.list::<Category>().await?;
        expect_status("list categories", StatusCode::OK, listed.status)?;
        let mut checks = CheckList::new();
        checks.non_empty_collection("categories", listed.body.len());
        checks.contains("categories", &listed.body, "title", &self.title, |c| c.title.as_str());
        checks.contains("categories", &listed.body, "_id", &category_id, |c| c.id.as_str());
        checks.finish("list categories after create")?;
        self.state = ScenarioState::Verified;

        // Update the one mutable field.
        let updated = categories
            .update::<_, Category>(
                &category_id,
                &CategoryUpdate {
                    title: self.updated_title.clone(),
                },
                ctx.token()?,
            )
            .await?;
        expect_status("update category", StatusCode::OK, updated.status)?;
        self.state = ScenarioState::Updated;

        // A fresh get must reflect the new title: persisted, not just echoed.
        let fetched = categories.get_by_id::<Category>(&category_id).await?;
        expect_status("get category after update", StatusCode::OK, fetched.status)?;
        let mut checks = CheckList::new();
        checks.present("category", fetched.body.is_some());
        if let Some(category) = &fetched.body {
            checks.field_eq("title", &category.title, &self.updated_title);
            checks.field_eq("_id", &category.id, &category_id);
        }
        checks.finish("get category after update")?;
        self.state = ScenarioState::ReVerified;

        let status = categories.delete(&category_id, ctx.token()?).await?;
        expect_status("delete category", StatusCode::OK, status)?;
        self.state = ScenarioState::Deleted;

        // Deletion's defining postcondition: the by-id lookup now returns
        // the literal `null` body, not stale data.
        let absent = categories.get_by_id::<Category>(&category_id).await?;
        let mut checks = CheckList::new();
        checks.absent("category", absent.body.is_some());
        checks.finish("get category after delete")?;
        self.state = ScenarioState::ConfirmedAbsent;

        Ok(())
    }
}

// ─── Book Lifecycle ──────────────────────────────────────────────────────────

/// Full lifecycle of one book, referencing the first available category.
///
/// The create step does not trust the create echo: a follow-up get-by-id
/// must show every supplied field, the string rendering of `price` and
/// `pages`, and a category reference resolving to the supplied category id.
/// The update step sends only `title` and `author` and verifies the other
/// fields did not silently revert.
pub struct BookLifecycle {
    title: String,
    author: String,
    description: String,
    price: u64,
    pages: u64,
    updated_title: String,
    updated_author: String,
    state: ScenarioState,
    book_id: Option<String>,
    category_id: Option<String>,
}

impl BookLifecycle {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
        price: u64,
        pages: u64,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            description: description.into(),
            price,
            pages,
            updated_title: "Updated Book Title".into(),
            updated_author: "Updated Author".into(),
            state: ScenarioState::Unauthenticated,
            book_id: None,
            category_id: None,
        }
    }

    pub fn with_update(
        mut self,
        updated_title: impl Into<String>,
        updated_author: impl Into<String>,
    ) -> Self {
        self.updated_title = updated_title.into();
        self.updated_author = updated_author.into();
        self
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub fn book_id(&self) -> Option<&str> {
        self.book_id.as_deref()
    }

    /// Id of the category the book was created against.
    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    pub async fn run(&mut self, ctx: &mut TestContext) -> Result<(), HarnessError> {
        ctx.authenticate().await?;
        self.state = ScenarioState::Authenticated;

        let books = ctx.books();

        // The category reference must come from a listing of what actually
        // exists; an empty catalog is a test-data problem, not a defect.
        let categories = ctx.categories().list::<Category>().await?;
        expect_status("list categories", StatusCode::OK, categories.status)?;
        let Some(first_category) = categories.body.first() else {
            return Err(HarnessError::PreconditionNotFound(
                "no category available to reference from a new book".into(),
            ));
        };
        let category_id = first_category.id.clone();
        self.category_id = Some(category_id.clone());

        let created = books
            .create::<_, Book>(
                &NewBook {
                    title: self.title.clone(),
                    author: self.author.clone(),
                    description: self.description.clone(),
                    price: self.price,
                    pages: self.pages,
                    category: category_id.clone(),
                },
                ctx.token()?,
            )
            .await?;
        expect_status("create book", StatusCode::OK, created.status)?;
        let mut checks = CheckList::new();
        checks.non_empty("_id", &created.body.id);
        checks.finish("create book")?;
        let book_id = created.body.id;
        self.book_id = Some(book_id.clone());
        self.state = ScenarioState::Created;

        // Validate through a follow-up get, not the create echo.
        let fetched = self.verify_fetched(&books, &book_id, &self.title, &self.author).await?;
        let mut checks = CheckList::new();
        checks.field_eq("description", &fetched.description, &self.description);
        checks.field_eq(
            "category._id",
            fetched.category.category_id(),
            &category_id,
        );
        checks.finish("get book after create")?;

        // And a fresh list must carry it, matched by title and id both.
        let listed = books.list::<Book>().await?;
        expect_status("list books", StatusCode::OK, listed.status)?;
        let mut checks = CheckList::new();
        checks.non_empty_collection("books", listed.body.len());
        checks.contains("books", &listed.body, "title", &self.title, |b| b.title.as_str());
        checks.contains("books", &listed.body, "_id", &book_id, |b| b.id.as_str());
        checks.finish("list books after create")?;
        self.state = ScenarioState::Verified;

        // Subset update: only title and author go out.
        let updated = books
            .update::<_, Book>(
                &book_id,
                &BookUpdate {
                    title: self.updated_title.clone(),
                    author: self.updated_author.clone(),
                },
                ctx.token()?,
            )
            .await?;
        expect_status("update book", StatusCode::OK, updated.status)?;
        let mut checks = CheckList::new();
        checks.field_eq("title", &updated.body.title, &self.updated_title);
        checks.field_eq("author", &updated.body.author, &self.updated_author);
        checks.finish("update book")?;
        self.state = ScenarioState::Updated;

        // Re-verify from a fresh get: the new values persisted, and the
        // fields the update did not mention are untouched.
        let fetched = self
            .verify_fetched(&books, &book_id, &self.updated_title, &self.updated_author)
            .await?;
        let mut checks = CheckList::new();
        checks.field_eq("description", &fetched.description, &self.description);
        checks.field_eq(
            "category._id",
            fetched.category.category_id(),
            &category_id,
        );
        checks.finish("get book after update")?;
        self.state = ScenarioState::ReVerified;

        let status = books.delete(&book_id, ctx.token()?).await?;
        expect_status("delete book", StatusCode::OK, status)?;
        self.state = ScenarioState::Deleted;

        let absent = books.get_by_id::<Book>(&book_id).await?;
        let mut checks = CheckList::new();
        checks.absent("book", absent.body.is_some());
        checks.finish("get book after delete")?;
        self.state = ScenarioState::ConfirmedAbsent;

        Ok(())
    }

    /// Fresh get-by-id expecting the given title/author plus the unchanged
    /// numeric renderings. Returns the fetched book for further checks.
    async fn verify_fetched(
        &self,
        books: &ResourceClient,
        book_id: &str,
        title: &str,
        author: &str,
    ) -> Result<Book, HarnessError> {
        let fetched = books.get_by_id::<Book>(book_id).await?;
        expect_status("get book by id", StatusCode::OK, fetched.status)?;
        let mut checks = CheckList::new();
        checks.present("book", fetched.body.is_some());
        if let Some(book) = &fetched.body {
            checks.field_eq("title", &book.title, title);
            checks.field_eq("author", &book.author, author);
            checks.numeric_text_eq("price", &book.price, self.price);
            checks.numeric_text_eq("pages", &book.pages, self.pages);
        }
        checks.finish("get book by id")?;
        // Presence was just checked; a clean checklist guarantees Some.
        fetched.body.ok_or_else(|| {
            HarnessError::PreconditionNotFound(format!("book `{book_id}` vanished mid-scenario"))
        })
    }
}

// ─── Read-only Scenarios ─────────────────────────────────────────────────────

/// Unauthenticated shape check over the whole book listing: the collection
/// is a non-empty array and every element carries the required fields.
pub struct CatalogShape {
    state: ScenarioState,
}

impl CatalogShape {
    pub fn new() -> Self {
        Self {
            state: ScenarioState::Unauthenticated,
        }
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub async fn run(&mut self, ctx: &TestContext) -> Result<(), HarnessError> {
        let listed = ctx.books().list::<Book>().await?;
        expect_status("list books", StatusCode::OK, listed.status)?;
        let mut checks = CheckList::new();
        checks.non_empty_collection("books", listed.body.len());
        for (index, book) in listed.body.iter().enumerate() {
            checks.non_empty(&format!("books[{index}].title"), &book.title);
            checks.non_empty(&format!("books[{index}].author"), &book.author);
            checks.non_empty(&format!("books[{index}].description"), &book.description);
            checks.non_empty(&format!("books[{index}].price"), &book.price);
            checks.non_empty(&format!("books[{index}].pages"), &book.pages);
            checks.non_empty(
                &format!("books[{index}].category"),
                book.category.category_id(),
            );
        }
        checks.finish("list books")?;
        self.state = ScenarioState::Verified;
        Ok(())
    }
}

impl Default for CatalogShape {
    fn default() -> Self {
        Self::new()
    }
}

/// Read path against a seeded book: find it by title in a fresh listing and
/// verify a known field. A missing seed fails as a precondition, never as a
/// null reference carried into later steps.
pub struct SeededBookRead {
    title: String,
    expected_author: String,
    state: ScenarioState,
}

impl SeededBookRead {
    pub fn new(title: impl Into<String>, expected_author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            expected_author: expected_author.into(),
            state: ScenarioState::Unauthenticated,
        }
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub async fn run(&mut self, ctx: &TestContext) -> Result<(), HarnessError> {
        let listed = ctx.books().list::<Book>().await?;
        expect_status("list books", StatusCode::OK, listed.status)?;
        let book = find_book_by_title(&listed.body, &self.title)?;
        let mut checks = CheckList::new();
        checks.field_eq("author", &book.author, &self.expected_author);
        checks.finish("verify seeded book")?;
        self.state = ScenarioState::Verified;
        Ok(())
    }
}

// ─── Seeded Mutation Scenarios ───────────────────────────────────────────────

/// Update a seeded book found by title: new title and author must be
/// reflected by the update response and persisted for a fresh get.
pub struct SeededBookUpdate {
    title: String,
    updated_title: String,
    updated_author: String,
    state: ScenarioState,
}

impl SeededBookUpdate {
    pub fn new(
        title: impl Into<String>,
        updated_title: impl Into<String>,
        updated_author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            updated_title: updated_title.into(),
            updated_author: updated_author.into(),
            state: ScenarioState::Unauthenticated,
        }
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub async fn run(&mut self, ctx: &mut TestContext) -> Result<(), HarnessError> {
        ctx.authenticate().await?;
        self.state = ScenarioState::Authenticated;

        let books = ctx.books();
        let listed = books.list::<Book>().await?;
        expect_status("list books", StatusCode::OK, listed.status)?;
        let seeded = find_book_by_title(&listed.body, &self.title)?;
        let book_id = seeded.id.clone();
        let description = seeded.description.clone();

        let updated = books
            .update::<_, Book>(
                &book_id,
                &BookUpdate {
                    title: self.updated_title.clone(),
                    author: self.updated_author.clone(),
                },
                ctx.token()?,
            )
            .await?;
        expect_status("update book", StatusCode::OK, updated.status)?;
        let mut checks = CheckList::new();
        checks.field_eq("title", &updated.body.title, &self.updated_title);
        checks.field_eq("author", &updated.body.author, &self.updated_author);
        checks.finish("update book")?;
        self.state = ScenarioState::Updated;

        let fetched = books.get_by_id::<Book>(&book_id).await?;
        expect_status("get book after update", StatusCode::OK, fetched.status)?;
        let mut checks = CheckList::new();
        checks.present("book", fetched.body.is_some());
        if let Some(book) = &fetched.body {
            checks.field_eq("title", &book.title, &self.updated_title);
            checks.field_eq("author", &book.author, &self.updated_author);
            checks.field_eq("description", &book.description, &description);
        }
        checks.finish("get book after update")?;
        self.state = ScenarioState::ReVerified;

        Ok(())
    }
}

/// Delete a seeded book found by title and confirm the absence sentinel.
pub struct SeededBookDelete {
    title: String,
    state: ScenarioState,
}

impl SeededBookDelete {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            state: ScenarioState::Unauthenticated,
        }
    }

    pub fn state(&self) -> ScenarioState {
        self.state
    }

    pub async fn run(&mut self, ctx: &mut TestContext) -> Result<(), HarnessError> {
        ctx.authenticate().await?;
        self.state = ScenarioState::Authenticated;

        let books = ctx.books();
        let listed = books.list::<Book>().await?;
        expect_status("list books", StatusCode::OK, listed.status)?;
        let book_id = find_book_by_title(&listed.body, &self.title)?.id.clone();

        let status = books.delete(&book_id, ctx.token()?).await?;
        expect_status("delete book", StatusCode::OK, status)?;
        self.state = ScenarioState::Deleted;

        let absent = books.get_by_id::<Book>(&book_id).await?;
        let mut checks = CheckList::new();
        checks.absent("book", absent.body.is_some());
        checks.finish("get book after delete")?;
        self.state = ScenarioState::ConfirmedAbsent;

        Ok(())
    }
}

/// Find a seeded book by its distinguishing title, or fail the scenario as
/// a precondition problem before any null reference reaches a later step.
fn find_book_by_title<'a>(books: &'a [Book], title: &str) -> Result<&'a Book, HarnessError> {
    books.iter().find(|book| book.title == title).ok_or_else(|| {
        HarnessError::PreconditionNotFound(format!("no book titled `{title}` in the listing"))
    })
}
