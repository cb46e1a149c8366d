//! HTTP handlers
//!
//! Thin delegating layer: every handler forwards to the inference service
//! and maps its errors through `AppError`'s response conversion.

pub mod health;
pub mod info;
pub mod predict;
