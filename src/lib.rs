//! # shelfcheck
//!
//! Integration-test harness for a remote catalog service exposing `Book` and
//! `Category` resources over HTTP/JSON with bearer-token authentication.
//!
//! The harness validates the service's observable contract only: each
//! scenario issues an ordered sequence of HTTP operations, checks invariants
//! after every round trip, and aborts on the first failed step. The transport
//! is treated as a reliable synchronous channel; any transport failure is a
//! hard test failure, never retried.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod oracle;
pub mod scenario;

pub use auth::AuthToken;
pub use config::HarnessConfig;
pub use error::HarnessError;
pub use oracle::{CheckList, Violation, expect_status};
pub use scenario::{ScenarioState, TestContext};
