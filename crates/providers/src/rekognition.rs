//! Rekognition Face Liveness implementation of [`LivenessGateway`].
//!
//! Speaks the AWS JSON 1.1 protocol: every call is a signed `POST /` with
//! the operation named in `X-Amz-Target`.
//!
//! Session creation always carries a `ClientRequestToken` so a retried
//! creation cannot open a second session. Media is attached under `Video`
//! either inline (`Bytes`, base64) or by reference (`S3Object`); a
//! client-initiated session sends no media at all.

use async_trait::async_trait;
use base64::Engine as _;
use lv_domain::error::{Error, Result};
use lv_domain::liveness::{LivenessSource, RemoteResult, SessionStatus, SourceKind};
use lv_domain::trace::LivenessEvent;
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{AwsHttp, AwsRequest};
use crate::traits::LivenessGateway;
use crate::util::from_reqwest;

const SERVICE: &str = "rekognition";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "RekognitionService";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct CreateSessionBody {
    client_request_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<SessionSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video: Option<VideoInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SessionSettings {
    audit_images_limit: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
enum VideoInput {
    Bytes(String),
    S3Object(S3Object),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct S3Object {
    bucket: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CreateSessionResponse {
    session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetResultsBody<'a> {
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetResultsResponse {
    status: WireStatus,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum WireStatus {
    Created,
    InProgress,
    Succeeded,
    Failed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl From<WireStatus> for SessionStatus {
    fn from(s: WireStatus) -> Self {
        match s {
            WireStatus::Succeeded => SessionStatus::Succeeded,
            WireStatus::Failed => SessionStatus::Failed,
            WireStatus::Expired => SessionStatus::Expired,
            WireStatus::Created | WireStatus::InProgress | WireStatus::Unknown => {
                SessionStatus::Pending
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct RekognitionLivenessGateway {
    http: AwsHttp,
    audit_images_limit: Option<u32>,
}

impl RekognitionLivenessGateway {
    pub fn new(http: AwsHttp, audit_images_limit: Option<u32>) -> Self {
        Self {
            http,
            audit_images_limit,
        }
    }

    fn create_body(&self, source: LivenessSource) -> CreateSessionBody {
        let (token, video) = match source {
            LivenessSource::InlineBytes(bytes) => (
                Uuid::new_v4().to_string(),
                Some(VideoInput::Bytes(
                    base64::engine::general_purpose::STANDARD.encode(bytes),
                )),
            ),
            LivenessSource::Stored(r) => (
                Uuid::new_v4().to_string(),
                Some(VideoInput::S3Object(S3Object {
                    bucket: r.bucket,
                    name: r.key,
                })),
            ),
            LivenessSource::ClientToken(token) => (token, None),
        };
        CreateSessionBody {
            client_request_token: token,
            settings: self
                .audit_images_limit
                .map(|audit_images_limit| SessionSettings { audit_images_limit }),
            video,
        }
    }

    async fn call(&self, operation: &str, body: Vec<u8>) -> Result<String> {
        let url = Url::parse(&format!("{}/", self.http.endpoint(SERVICE)))
            .map_err(|e| Error::Config(format!("invalid Rekognition endpoint: {e}")))?;
        let resp = self
            .http
            .send(AwsRequest {
                service: SERVICE,
                operation,
                method: Method::POST,
                url,
                headers: vec![
                    ("content-type", CONTENT_TYPE.to_owned()),
                    ("x-amz-target", format!("{TARGET_PREFIX}.{operation}")),
                ],
                body,
            })
            .await?;
        resp.text().await.map_err(from_reqwest)
    }
}

#[async_trait]
impl LivenessGateway for RekognitionLivenessGateway {
    async fn create_session(&self, source: LivenessSource) -> Result<String> {
        let kind: SourceKind = source.kind();
        let body = serde_json::to_vec(&self.create_body(source))?;
        let text = self.call("CreateFaceLivenessSession", body).await?;
        let parsed: CreateSessionResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Other(format!("failed to parse CreateFaceLivenessSession response: {e}"))
        })?;

        LivenessEvent::SessionCreated {
            session_id: parsed.session_id.clone(),
            source: kind,
        }
        .emit();

        Ok(parsed.session_id)
    }

    async fn get_result(&self, session_id: &str) -> Result<RemoteResult> {
        let body = serde_json::to_vec(&GetResultsBody { session_id })?;
        let text = self.call("GetFaceLivenessSessionResults", body).await?;
        let parsed: GetResultsResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Other(format!(
                "failed to parse GetFaceLivenessSessionResults response: {e}"
            ))
        })?;

        if parsed.status == WireStatus::Unknown {
            tracing::warn!(session_id, "unrecognized session status, treating as pending");
        }

        Ok(RemoteResult {
            status: parsed.status.into(),
            confidence: parsed.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lv_domain::config::{Credentials, ResolvedAws};
    use lv_domain::liveness::StorageReference;
    use std::time::Duration;

    fn gateway(limit: Option<u32>) -> RekognitionLivenessGateway {
        let http = AwsHttp::new(ResolvedAws {
            credentials: Credentials {
                access_key_id: "a".into(),
                secret_access_key: "s".into(),
                session_token: None,
            },
            region: "us-east-1".into(),
            bucket: None,
            endpoint_url: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        RekognitionLivenessGateway::new(http, limit)
    }

    #[test]
    fn inline_source_is_base64_encoded() {
        let body = gateway(None).create_body(LivenessSource::InlineBytes(b"abc".to_vec()));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["Video"]["Bytes"], "YWJj");
        assert!(json.get("Settings").is_none());
        assert_eq!(json["ClientRequestToken"].as_str().unwrap().len(), 36);
    }

    #[test]
    fn stored_source_references_object() {
        let body = gateway(Some(2)).create_body(LivenessSource::Stored(StorageReference {
            bucket: "media".into(),
            key: "liveness/abc".into(),
        }));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["Video"]["S3Object"]["Bucket"], "media");
        assert_eq!(json["Video"]["S3Object"]["Name"], "liveness/abc");
        assert_eq!(json["Settings"]["AuditImagesLimit"], 2);
    }

    #[test]
    fn client_token_source_sends_no_media() {
        let body = gateway(None).create_body(LivenessSource::ClientToken("tok-1".into()));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["ClientRequestToken"], "tok-1");
        assert!(json.get("Video").is_none());
    }

    #[test]
    fn result_status_mapping() {
        let cases = [
            ("CREATED", SessionStatus::Pending),
            ("IN_PROGRESS", SessionStatus::Pending),
            ("SUCCEEDED", SessionStatus::Succeeded),
            ("FAILED", SessionStatus::Failed),
            ("EXPIRED", SessionStatus::Expired),
            ("SOMETHING_NEW", SessionStatus::Pending),
        ];
        for (wire, expected) in cases {
            let body = format!(r#"{{"SessionId":"s","Status":"{wire}"}}"#);
            let parsed: GetResultsResponse = serde_json::from_str(&body).unwrap();
            assert_eq!(SessionStatus::from(parsed.status), expected, "{wire}");
        }
    }

    #[test]
    fn confidence_optional_in_results() {
        let parsed: GetResultsResponse =
            serde_json::from_str(r#"{"SessionId":"s","Status":"SUCCEEDED","Confidence":97.5}"#)
                .unwrap();
        assert_eq!(parsed.confidence, Some(97.5));

        let parsed: GetResultsResponse =
            serde_json::from_str(r#"{"SessionId":"s","Status":"SUCCEEDED","Confidence":null}"#)
                .unwrap();
        assert_eq!(parsed.confidence, None);
    }
}
