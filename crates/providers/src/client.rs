//! Signed HTTP transport shared by the AWS adapters.
//!
//! `AwsHttp` wraps a `reqwest::Client` and the resolved AWS settings. It
//! signs each request with SigV4 (`aws-sigv4`), sends it once, emits a
//! `LivenessEvent::AwsCall` trace and turns non-success statuses into
//! domain errors. There is no retry here.

use std::sync::Arc;
use std::time::{Instant, SystemTime};

use aws_credential_types::Credentials as AwsCredentials;
use aws_sigv4::http_request::{
    sign, PayloadChecksumKind, PercentEncodingMode, SignableBody, SignableRequest,
    SigningSettings, UriPathNormalizationMode,
};
use aws_sigv4::sign::v4;
use lv_domain::config::ResolvedAws;
use lv_domain::error::{Error, Result};
use lv_domain::trace::LivenessEvent;
use reqwest::{Client, Method, Response, Url};

use crate::util::{from_reqwest, upstream_error};

/// Provider name recorded on the signing identity.
const CREDENTIALS_PROVIDER: &str = "liveness-gateway-env";

/// A single outbound AWS call, before signing.
#[derive(Debug)]
pub struct AwsRequest<'a> {
    /// Signing name of the service (`s3`, `rekognition`).
    pub service: &'a str,
    /// Operation label for traces (`PutObject`, ...).
    pub operation: &'a str,
    pub method: Method,
    pub url: Url,
    /// Extra headers, all of which are signed.
    pub headers: Vec<(&'a str, String)>,
    pub body: Vec<u8>,
}

/// Pooled, signing HTTP client. Created once per process and shared.
#[derive(Debug, Clone)]
pub struct AwsHttp {
    http: Client,
    aws: Arc<ResolvedAws>,
}

impl AwsHttp {
    pub fn new(aws: ResolvedAws) -> Result<Self> {
        let http = Client::builder()
            .timeout(aws.timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            http,
            aws: Arc::new(aws),
        })
    }

    pub fn settings(&self) -> &ResolvedAws {
        &self.aws
    }

    /// Base URL for a service: the configured override, or the regional
    /// public endpoint `https://{service}.{region}.amazonaws.com`.
    pub fn endpoint(&self, service: &str) -> String {
        match self.aws.endpoint_url {
            Some(ref url) => url.clone(),
            None => format!("https://{service}.{}.amazonaws.com", self.aws.region),
        }
    }

    /// Sign and send one request. Non-2xx responses become errors.
    pub async fn send(&self, req: AwsRequest<'_>) -> Result<Response> {
        let auth_headers = self.sign_headers(&req, SystemTime::now())?;

        let mut rb = self.http.request(req.method.clone(), req.url.clone());
        for (k, v) in &req.headers {
            rb = rb.header(*k, v);
        }
        for (k, v) in auth_headers {
            rb = rb.header(k, v);
        }

        let start = Instant::now();
        let result = rb.body(req.body).send().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let status = match &result {
            Ok(resp) => resp.status().as_u16(),
            Err(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
        };
        LivenessEvent::AwsCall {
            service: req.service.to_owned(),
            operation: req.operation.to_owned(),
            status,
            duration_ms,
        }
        .emit();

        let resp = result.map_err(from_reqwest)?;
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(
                service = req.service,
                operation = req.operation,
                status,
                "AWS call failed"
            );
            return Err(upstream_error(req.service, status, &body));
        }
        Ok(resp)
    }

    /// SigV4 headers (`authorization`, `x-amz-date`, plus the security
    /// token and payload hash where they apply) for `req` at `time`.
    fn sign_headers(&self, req: &AwsRequest<'_>, time: SystemTime) -> Result<Vec<(String, String)>> {
        let creds = &self.aws.credentials;
        let identity = AwsCredentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            creds.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER,
        )
        .into();

        let params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.aws.region)
            .name(req.service)
            .time(time)
            .settings(signing_settings(req.service))
            .build()
            .map_err(|e| Error::Other(format!("invalid SigV4 parameters: {e}")))?
            .into();

        let signable = SignableRequest::new(
            req.method.as_str(),
            req.url.as_str(),
            req.headers.iter().map(|(k, v)| (*k, v.as_str())),
            SignableBody::Bytes(&req.body),
        )
        .map_err(|e| Error::Other(format!("request cannot be signed: {e}")))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| Error::Other(format!("SigV4 signing failed: {e}")))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect())
    }
}

/// S3 signs the path as sent and requires `x-amz-content-sha256`; the JSON
/// services use the standard double-encoded, normalized path.
fn signing_settings(service: &str) -> SigningSettings {
    let mut settings = SigningSettings::default();
    if service == "s3" {
        settings.percent_encoding_mode = PercentEncodingMode::Single;
        settings.uri_path_normalization_mode = UriPathNormalizationMode::Disabled;
        settings.payload_checksum_kind = PayloadChecksumKind::XAmzSha256;
    }
    settings
}
