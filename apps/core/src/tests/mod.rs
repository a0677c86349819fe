//! Test Module
//!
//! Cross-module tests for the HR chatbot.
//!
//! ## Test Categories
//! - `support`: scripted LLM client and in-memory data source
//! - `router_tests`: classify → answer-or-relay routing and transcript growth
//! - `database_tests`: transcript store CRUD on in-memory SQLite
//! - `integration_tests`: full turns through Gemini (wiremock) and the REPL

pub mod support;
