// src/mail/parser.rs
use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use scraper::Html;

use crate::classifier::{classify, ApplicationStatus};
use crate::mail::gmail::{Message, MessagePart, MessagePayload};

/// Characters of decoded, stripped body retained for display and audit.
/// Classification always scans the full text, not this preview.
const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct ParsedEmail {
    pub subject: String,
    pub preview: String,
    pub status: ApplicationStatus,
}

/// Decode a raw Gmail message into subject, body preview and classified
/// status. Any decode failure is an error for this one message; the caller
/// skips it and continues the batch.
pub fn parse_message(msg: &Message) -> Result<ParsedEmail> {
    let subject = subject_of(&msg.payload);

    let body = match extract_body_data(&msg.payload) {
        Some(data) => decode_body(data)?,
        None => String::new(),
    };
    let text = strip_html(&body);

    let status = classify(&subject, &text);
    let preview: String = text.chars().take(PREVIEW_CHARS).collect();

    Ok(ParsedEmail {
        subject,
        preview,
        status,
    })
}

fn subject_of(payload: &MessagePayload) -> String {
    payload
        .headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case("Subject"))
        .map(|h| h.value.clone())
        .unwrap_or_default()
}

/// Pick the transport-encoded body out of a possibly multipart payload:
/// the top-level body when present, otherwise text/html, then text/plain,
/// then the first nested part carrying data.
fn extract_body_data(payload: &MessagePayload) -> Option<&str> {
    if let Some(data) = payload.body.data.as_deref() {
        return Some(data);
    }

    let parts = payload.parts.as_deref()?;
    find_part_data(parts, "text/html")
        .or_else(|| find_part_data(parts, "text/plain"))
        .or_else(|| find_any_part_data(parts))
}

fn find_part_data<'a>(parts: &'a [MessagePart], mime_type: &str) -> Option<&'a str> {
    for part in parts {
        if part.mime_type == mime_type {
            if let Some(data) = part.body.data.as_deref() {
                return Some(data);
            }
        }
        if let Some(nested) = part.parts.as_deref() {
            if let Some(data) = find_part_data(nested, mime_type) {
                return Some(data);
            }
        }
    }
    None
}

fn find_any_part_data(parts: &[MessagePart]) -> Option<&str> {
    for part in parts {
        if let Some(data) = part.body.data.as_deref() {
            return Some(data);
        }
        if let Some(nested) = part.parts.as_deref() {
            if let Some(data) = find_any_part_data(nested) {
                return Some(data);
            }
        }
    }
    None
}

/// Decode the url-safe base64 transport encoding Gmail uses for body data.
/// Gmail omits padding, so restore it before decoding.
fn decode_body(data: &str) -> Result<String> {
    let mut padded = data.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }

    let bytes = URL_SAFE
        .decode(padded.as_bytes())
        .context("Body is not valid url-safe base64")?;

    String::from_utf8(bytes).context("Decoded body is not valid UTF-8")
}

/// Reduce an HTML body to plain text. Plain-text bodies pass through as
/// their own text nodes.
fn strip_html(body: &str) -> String {
    let document = Html::parse_document(body);
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::gmail::{Header, MessageBody};

    fn encode(body: &str) -> String {
        let encoded = URL_SAFE.encode(body.as_bytes());
        // Gmail strips padding; exercise the restore path.
        encoded.trim_end_matches('=').to_string()
    }

    fn message(subject: &str, body: &str) -> Message {
        Message {
            id: "m1".to_string(),
            payload: MessagePayload {
                mime_type: "text/html".to_string(),
                headers: vec![Header {
                    name: "Subject".to_string(),
                    value: subject.to_string(),
                }],
                body: MessageBody {
                    data: Some(encode(body)),
                },
                parts: None,
            },
        }
    }

    #[test]
    fn test_parse_single_part_html() {
        let msg = message(
            "Netflix",
            "<html><body><p>We would like to <b>interview</b> you.</p></body></html>",
        );
        let parsed = parse_message(&msg).unwrap();
        assert_eq!(parsed.subject, "Netflix");
        assert_eq!(parsed.status, ApplicationStatus::InterviewScheduled);
        assert!(parsed.preview.contains("interview"));
        assert!(!parsed.preview.contains("<b>"));
    }

    #[test]
    fn test_parse_multipart_prefers_html() {
        let msg = Message {
            id: "m2".to_string(),
            payload: MessagePayload {
                mime_type: "multipart/alternative".to_string(),
                headers: vec![Header {
                    name: "Subject".to_string(),
                    value: "Acme".to_string(),
                }],
                body: MessageBody { data: None },
                parts: Some(vec![
                    MessagePart {
                        mime_type: "text/plain".to_string(),
                        body: MessageBody {
                            data: Some(encode("plain fallback")),
                        },
                        parts: None,
                    },
                    MessagePart {
                        mime_type: "text/html".to_string(),
                        body: MessageBody {
                            data: Some(encode("<p>You have been shortlisted</p>")),
                        },
                        parts: None,
                    },
                ]),
            },
        };

        let parsed = parse_message(&msg).unwrap();
        assert_eq!(parsed.status, ApplicationStatus::InReview);
        assert!(parsed.preview.contains("shortlisted"));
    }

    #[test]
    fn test_parse_missing_subject_and_body() {
        let msg = Message {
            id: "m3".to_string(),
            payload: MessagePayload {
                mime_type: "text/plain".to_string(),
                headers: vec![],
                body: MessageBody { data: None },
                parts: None,
            },
        };

        let parsed = parse_message(&msg).unwrap();
        assert_eq!(parsed.subject, "");
        assert_eq!(parsed.status, ApplicationStatus::Applied);
    }

    #[test]
    fn test_parse_invalid_base64_is_an_error() {
        let mut msg = message("Acme", "ignored");
        msg.payload.body.data = Some("!!! not base64 !!!".to_string());
        assert!(parse_message(&msg).is_err());
    }

    #[test]
    fn test_classification_scans_past_preview_cutoff() {
        let body = format!("{} offer", "x".repeat(600));
        let msg = message("Acme", &body);

        let parsed = parse_message(&msg).unwrap();
        // Keyword sits beyond the retained preview but still classifies.
        assert_eq!(parsed.status, ApplicationStatus::Offer);
        assert_eq!(parsed.preview.chars().count(), 500);
        assert!(!parsed.preview.contains("offer"));
    }
}
