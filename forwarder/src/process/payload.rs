//! Resend inbound webhook payload extraction.
//!
//! Resend wraps the email under a `data` object; bodies without one are read
//! from the top level. Subject and body fall back to placeholders.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ForwardSettings;
use crate::forward::ForwardRequest;

/// Subject used when the payload carries none.
pub const PLACEHOLDER_SUBJECT: &str = "(no subject)";

/// Body used when the payload carries neither HTML nor text.
pub const PLACEHOLDER_HTML: &str = "<p>(no content)</p>";

/// The webhook body cannot be read as an email event.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("body is not a JSON object")]
    NotAnObject,

    #[error("`data` is not a JSON object")]
    DataNotAnObject,
}

/// Email fields pulled out of a verified webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEmail {
    /// Original sender, when present
    pub from: Option<String>,
    /// Original recipients
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Parse the raw webhook body into an [`InboundEmail`].
pub fn extract_email(body: &[u8]) -> Result<InboundEmail, PayloadError> {
    let root: Value = serde_json::from_slice(body)?;
    let root = root.as_object().ok_or(PayloadError::NotAnObject)?;

    let fields = match root.get("data") {
        None | Some(Value::Null) => {
            info!("payload_data_missing_using_top_level");
            root
        }
        Some(Value::Object(data)) => data,
        Some(_) => {
            warn!("payload_data_not_object");
            return Err(PayloadError::DataNotAnObject);
        }
    };

    let from = string_field(fields, "from").map(str::to_string);
    let to = recipients(fields.get("to"));

    let subject = string_field(fields, "subject")
        .unwrap_or(PLACEHOLDER_SUBJECT)
        .to_string();

    let (html, html_source) = match (string_field(fields, "html"), string_field(fields, "text")) {
        (Some(html), _) => (html.to_string(), "html"),
        (None, Some(text)) => (format!("<pre>{}</pre>", escape_html(text)), "text"),
        (None, None) => (PLACEHOLDER_HTML.to_string(), "placeholder"),
    };

    info!(
        from = ?from,
        recipient_count = to.len(),
        html_source = html_source,
        html_length = html.len(),
        "payload_extracted"
    );

    Ok(InboundEmail {
        from,
        to,
        subject,
        html,
    })
}

/// Address the extracted email to the configured forwarding target.
pub fn build_forward_request(email: &InboundEmail, settings: &ForwardSettings<'_>) -> ForwardRequest {
    ForwardRequest::new(
        settings.api_key,
        settings.forward_from,
        settings.forward_to,
        email.subject.as_str(),
        email.html.as_str(),
    )
}

/// A non-empty string field.
fn string_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// `to` may be a single address or a list; non-string entries are skipped.
fn recipients(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(addr)) => vec![addr.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_nested_data() {
        let body = br#"{"type":"email.received","data":{"from":"a@x.com","to":["b@y.com"],"subject":"Hi","text":"hello"}}"#;

        let email = extract_email(body).unwrap();

        assert_eq!(email.from.as_deref(), Some("a@x.com"));
        assert_eq!(email.to, vec!["b@y.com".to_string()]);
        assert_eq!(email.subject, "Hi");
        assert_eq!(email.html, "<pre>hello</pre>");
    }

    #[test]
    fn test_extract_top_level_fallback() {
        let body = br#"{"from":"a@x.com","to":"b@y.com","subject":"Top","html":"<b>hi</b>"}"#;

        let email = extract_email(body).unwrap();

        assert_eq!(email.to, vec!["b@y.com".to_string()]);
        assert_eq!(email.subject, "Top");
        assert_eq!(email.html, "<b>hi</b>");
    }

    #[test]
    fn test_extract_null_data_uses_top_level() {
        let email = extract_email(br#"{"data":null,"subject":"Top"}"#).unwrap();
        assert_eq!(email.subject, "Top");
    }

    #[test]
    fn test_extract_prefers_html_over_text() {
        let body = br#"{"data":{"html":"<p>rich</p>","text":"plain"}}"#;
        assert_eq!(extract_email(body).unwrap().html, "<p>rich</p>");
    }

    #[test]
    fn test_extract_placeholders() {
        let email = extract_email(br#"{"data":{"subject":"","html":""}}"#).unwrap();

        assert_eq!(email.from, None);
        assert!(email.to.is_empty());
        assert_eq!(email.subject, PLACEHOLDER_SUBJECT);
        assert_eq!(email.html, PLACEHOLDER_HTML);
    }

    #[test]
    fn test_extract_escapes_text() {
        let email = extract_email(br#"{"text":"<script>alert('x')</script> & \"q\""}"#).unwrap();

        assert_eq!(
            email.html,
            "<pre>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; &quot;q&quot;</pre>"
        );
    }

    #[test]
    fn test_extract_skips_non_string_recipients() {
        let email = extract_email(br#"{"to":["b@y.com",42,null,"c@z.com"]}"#).unwrap();
        assert_eq!(email.to, vec!["b@y.com".to_string(), "c@z.com".to_string()]);
    }

    #[test]
    fn test_extract_invalid_json() {
        assert!(matches!(extract_email(b"not json"), Err(PayloadError::InvalidJson(_))));
    }

    #[test]
    fn test_extract_not_an_object() {
        assert!(matches!(extract_email(b"[1,2,3]"), Err(PayloadError::NotAnObject)));
    }

    #[test]
    fn test_extract_data_not_an_object() {
        assert!(matches!(
            extract_email(br#"{"data":"oops"}"#),
            Err(PayloadError::DataNotAnObject)
        ));
    }

    #[test]
    fn test_build_forward_request() {
        let email = InboundEmail {
            from: Some("a@x.com".to_string()),
            to: vec!["b@y.com".to_string()],
            subject: "Hi".to_string(),
            html: "<pre>hello</pre>".to_string(),
        };
        let settings = ForwardSettings {
            api_key: "re_test",
            webhook_secret: "whsec_c2VjcmV0a2V5",
            forward_from: "catch@example.com",
            forward_to: "me@example.com",
        };

        let request = build_forward_request(&email, &settings);

        assert_eq!(request.api_key, "re_test");
        assert_eq!(request.from, "catch@example.com");
        assert_eq!(request.to, "me@example.com");
        assert_eq!(request.subject, "Hi");
        assert_eq!(request.html, "<pre>hello</pre>");
    }
}
