//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI decoupled from storage details; every service receives its
//!   repository at construction.

pub mod event_service;
pub mod ingest_service;
pub mod planner_service;
pub mod project_service;
pub mod task_service;
