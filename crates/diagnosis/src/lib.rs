//! AI-assisted diagnosis for service orders.
//!
//! This crate provides the diagnosis collaborator:
//! - [`DiagnosisService`] trait taking a vehicle and complaint
//! - [`GeminiDiagnosisService`] calling the Gemini `generateContent` API
//! - [`InMemoryDiagnosisService`] for tests and offline use
//! - [`Instrumented`] wrapper recording request and failure metrics
//!
//! A failed call never touches order state; callers decide whether to attach
//! the result.

pub mod error;
pub mod gemini;
pub mod memory;
pub mod prompt;
pub mod service;

pub use error::{DiagnosisError, Result};
pub use gemini::{GeminiConfig, GeminiDiagnosisService};
pub use memory::InMemoryDiagnosisService;
pub use service::{DiagnosisService, Instrumented};
