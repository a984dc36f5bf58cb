//! S3-compatible object storage for transcoded audio.
//!
//! This crate provides:
//! - Byte uploads to a bucket
//! - Presigned GET URL generation
//! - The `Uploader` stage trait with plain and presigned variants
//! - An in-memory object store for tests and local runs

pub mod client;
pub mod error;
pub mod memory;
pub mod store;
pub mod uploader;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult, UploadError};
pub use memory::MemoryStore;
pub use store::ObjectStore;
pub use uploader::{PlainUploader, PresignedUploader, Uploader, DEFAULT_PRESIGN_EXPIRY};
