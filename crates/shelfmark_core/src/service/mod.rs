//! Use-case services over the repository layer.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-facing operations.
//! - Keep presentation layers decoupled from SQL details.

pub mod book_service;
