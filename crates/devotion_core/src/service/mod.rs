//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate stores into use-case level APIs (submit, compare, progress).
//! - Keep UI/FFI layers decoupled from storage details.

pub mod assessment_service;
pub mod comparison;
pub mod progress_service;
