//! Domain payload and request/response models for the lake cache API
//!
//! This module defines the cached record and the DTOs (Data Transfer Objects)
//! used for serializing/deserializing HTTP request and response bodies.

pub mod payload;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use payload::LakeConditions;
pub use requests::{validate_key, PutRequest, MAX_KEY_LENGTH};
pub use responses::{
    DeleteResponse, GetResponse, HealthResponse, PutResponse, SizeResponse, StatsResponse,
    SweepResponse,
};
