//! `lv-providers`: remote collaborators of the liveness gateway.
//!
//! Defines the [`StorageGateway`] and [`LivenessGateway`] traits the
//! coordinator depends on, and their AWS implementations:
//!
//! | Trait             | Implementation                | Remote API                              |
//! |-------------------|-------------------------------|-----------------------------------------|
//! | `StorageGateway`  | [`S3StorageGateway`]          | S3 `PutObject`                          |
//! | `LivenessGateway` | [`RekognitionLivenessGateway`]| Rekognition Face Liveness (JSON 1.1)    |
//!
//! Both share one [`AwsHttp`] (pooled `reqwest::Client`, requests signed with `aws-sigv4`),
//! built once at startup from the resolved AWS settings.

pub mod client;
pub mod rekognition;
pub mod s3;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use client::AwsHttp;
pub use rekognition::RekognitionLivenessGateway;
pub use s3::S3StorageGateway;
pub use traits::{LivenessGateway, StorageGateway};
