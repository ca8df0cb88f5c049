//! Use-case services layered over repositories.
//!
//! # Responsibility
//! - Apply caller-side rules (visibility) that repositories stay free of.
//! - Keep presentation callers decoupled from storage details.

pub mod project_service;
