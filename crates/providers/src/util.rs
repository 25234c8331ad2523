//! Shared helpers for the AWS adapters.

use lv_domain::error::Error;

/// Longest upstream error body kept in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Convert a [`reqwest::Error`] into the domain [`Error`] type.
///
/// Timeout errors map to [`Error::Timeout`]; everything else maps to
/// [`Error::Http`].
pub(crate) fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

/// Map a non-success response to the domain error.
///
/// 401/403 become [`Error::Auth`] (bad or expired credentials are a
/// deployment problem, not a request problem); everything else is
/// [`Error::Upstream`] carrying the most useful message the body offers.
pub(crate) fn upstream_error(service: &str, status: u16, body: &str) -> Error {
    let message = error_message(body);
    if status == 401 || status == 403 {
        return Error::Auth(format!("{service} rejected credentials ({status}): {message}"));
    }
    Error::Upstream {
        service: service.to_owned(),
        status,
        message,
    }
}

/// Extract a readable message from an AWS error body.
///
/// JSON protocol services answer `{"__type": "...#Code", "message": "..."}`
/// (the casing of `message` varies by service); S3 answers XML. Anything
/// unrecognized is returned truncated.
pub(crate) fn error_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        let code = v
            .get("__type")
            .and_then(|t| t.as_str())
            .map(|t| t.rsplit('#').next().unwrap_or(t));
        let msg = v
            .get("message")
            .or_else(|| v.get("Message"))
            .and_then(|m| m.as_str());
        match (code, msg) {
            (Some(c), Some(m)) => return format!("{c}: {m}"),
            (Some(c), None) => return c.to_owned(),
            (None, Some(m)) => return m.to_owned(),
            (None, None) => {}
        }
    }

    if let Some(code) = xml_tag(body, "Code") {
        return match xml_tag(body, "Message") {
            Some(m) => format!("{code}: {m}"),
            None => code.to_owned(),
        };
    }

    truncate(body.trim(), MAX_ERROR_BODY)
}

/// Text of the first `<tag>...</tag>` in `body`.
///
/// Only meant for the flat S3 error document (`<Error><Code>..</Code>
/// <Message>..</Message></Error>`): no attributes, namespaces, CDATA or
/// entity decoding. Anything else falls through to the truncated body.
fn xml_tag<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(&body[start..end])
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_owned();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
