//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters shared across features: object storage
//! for photos and the per-view response cache.

pub mod storage;
pub mod view_cache;
