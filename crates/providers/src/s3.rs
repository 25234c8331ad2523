//! S3 implementation of [`StorageGateway`].

use async_trait::async_trait;
use lv_domain::error::{Error, Result};
use lv_domain::liveness::StorageReference;
use lv_domain::trace::LivenessEvent;
use reqwest::{Method, Url};
use uuid::Uuid;

use crate::client::{AwsHttp, AwsRequest};
use crate::traits::StorageGateway;

const SERVICE: &str = "s3";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Stages uploads as single `PutObject` calls under `{prefix}{uuid}`.
#[derive(Debug, Clone)]
pub struct S3StorageGateway {
    http: AwsHttp,
    bucket: String,
    key_prefix: String,
}

impl S3StorageGateway {
    pub fn new(http: AwsHttp, bucket: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        Self {
            http,
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn new_key(&self) -> String {
        format!("{}{}", self.key_prefix, Uuid::new_v4())
    }

    /// Virtual-hosted style against AWS, path style against an endpoint
    /// override (LocalStack and MinIO do not resolve bucket subdomains).
    /// Key segments are percent-encoded by [`Url`].
    fn object_url(&self, key: &str) -> Result<Url> {
        let aws = self.http.settings();
        let (base, bucket_in_path) = match aws.endpoint_url {
            Some(ref base) => (base.clone(), true),
            None => (
                format!("https://{}.s3.{}.amazonaws.com", self.bucket, aws.region),
                false,
            ),
        };
        let mut url =
            Url::parse(&base).map_err(|e| Error::Config(format!("invalid S3 URL {base}: {e}")))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::Config(format!("S3 endpoint {base} cannot carry a path")))?;
            segments.pop_if_empty();
            if bucket_in_path {
                segments.push(&self.bucket);
            }
            segments.extend(key.split('/'));
        }
        Ok(url)
    }
}

#[async_trait]
impl StorageGateway for S3StorageGateway {
    async fn put(&self, bytes: Vec<u8>, content_type: Option<&str>) -> Result<StorageReference> {
        let key = self.new_key();
        let url = self.object_url(&key)?;
        let size = bytes.len();

        self.http
            .send(AwsRequest {
                service: SERVICE,
                operation: "PutObject",
                method: Method::PUT,
                url,
                headers: vec![(
                    "content-type",
                    content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_owned(),
                )],
                body: bytes,
            })
            .await?;

        LivenessEvent::MediaStaged {
            bucket: self.bucket.clone(),
            key: key.clone(),
            bytes: size,
        }
        .emit();

        Ok(StorageReference {
            bucket: self.bucket.clone(),
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv_domain::config::{Credentials, ResolvedAws};
    use std::time::Duration;

    fn gateway(endpoint_url: Option<&str>) -> S3StorageGateway {
        let http = AwsHttp::new(ResolvedAws {
            credentials: Credentials {
                access_key_id: "a".into(),
                secret_access_key: "s".into(),
                session_token: None,
            },
            region: "us-east-1".into(),
            bucket: Some("media".into()),
            endpoint_url: endpoint_url.map(str::to_owned),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        S3StorageGateway::new(http, "media", "liveness/")
    }

    #[test]
    fn keys_use_prefix_and_are_unique() {
        let gw = gateway(None);
        let a = gw.new_key();
        let b = gw.new_key();
        assert!(a.starts_with("liveness/"));
        assert_ne!(a, b);
    }

    #[test]
    fn virtual_hosted_url_against_aws() {
        let gw = gateway(None);
        let url = gw.object_url("liveness/abc").unwrap();
        assert_eq!(
            url.as_str(),
            "https://media.s3.us-east-1.amazonaws.com/liveness/abc"
        );
    }

    #[test]
    fn path_style_url_against_override() {
        let gw = gateway(Some("http://localhost:4566"));
        let url = gw.object_url("liveness/a b").unwrap();
        assert_eq!(url.as_str(), "http://localhost:4566/media/liveness/a%20b");
    }
}
