//! Integration tests
//!
//! `router_tests` drive the router in-process and need no database.
//! `api_tests` run against a live server and are ignored by default.

mod api_tests;
mod router_tests;
