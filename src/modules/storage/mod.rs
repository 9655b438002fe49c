//! Storage module for photo uploads.
//!
//! Provides a MinIO/S3-compatible storage client for uploading and
//! deleting contest photos.

mod minio_client;

pub use minio_client::MinIOClient;
