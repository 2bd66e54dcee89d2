//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into cross-entity use-cases.
//! - Keep CLI/UI layers decoupled from storage details.

pub mod fleet_service;
pub mod lifecycle_service;
