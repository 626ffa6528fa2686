//! Core library for iterplan
//!
//! This crate implements the **Functional Core** of the iterplan application:
//! pure transformation functions with zero I/O. The `iterplan` binary crate is
//! the Imperative Shell that fetches data from the planner backend and feeds
//! it through the functions defined here.
//!
//! All functions in this crate are deterministic, perform no side effects, and
//! can be tested with simple fixture data (no mocking required).
//!
//! # Module Organization
//!
//! - [`planner`]: domain models and transformations for the backend's JSON:API
//!   payloads (spaces, iterations, work item types, work items)
//! - [`queries`]: the filter expression tree, the query builder, and the
//!   name-to-identifier resolution rewrite
//! - [`columns`]: the ordered column transformer registry that reduces an
//!   iteration and its work items into one statistics record

pub mod columns;
pub mod planner;
pub mod queries;
