//! Provider-agnostic email envelope and its MIME serialization.

use crate::error::{BoxError, MessengerError, MessengerResult};
use crate::models::{Attachment, ContentType, Headers, Message};
use lettre::message::header::{self, Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart, SinglePart};

const DEFAULT_ATTACHMENT_TYPE: &str = "application/octet-stream";

/// Attachment headers the MIME part renders itself
const ATTACHMENT_MANAGED: [&str; 2] = ["Content-Type", "Content-ID"];

/// Email ready to be serialized.
///
/// Exactly one of `text` and `html` is set. Attachments own copies of the
/// caller's buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub sender: String,
    pub headers: Headers,
    pub attachments: Vec<Attachment>,
    pub text: Option<Vec<u8>>,
    pub html: Option<Vec<u8>>,
}

impl Envelope {
    /// Build the envelope for a single-recipient send of `msg`
    pub fn from_message(msg: &Message) -> Self {
        let attachments = msg
            .attachments
            .iter()
            .map(|a| Attachment {
                name: a.name.clone(),
                header: a.header.clone(),
                content: a.content.to_vec(),
            })
            .collect();

        let (text, html) = match msg.content_type {
            ContentType::Plain => (Some(msg.body.clone()), None),
            ContentType::Html => (None, Some(msg.body.clone())),
        };

        Self {
            from: msg.from_address().to_string(),
            to: vec![msg.subscriber.email.clone()],
            subject: msg.subject.clone(),
            sender: msg.from.clone(),
            headers: msg.headers.clone(),
            attachments,
            text,
            html,
        }
    }

    /// Render the envelope as RFC 5322 bytes
    pub fn to_bytes(&self) -> MessengerResult<Vec<u8>> {
        let mut builder = lettre::Message::builder()
            .from(self.from.parse::<Mailbox>()?)
            .subject(self.subject.as_str());

        for to in &self.to {
            builder = builder.to(to.parse::<Mailbox>()?);
        }

        if !self.sender.is_empty() {
            builder = builder.sender(self.sender.parse::<Mailbox>()?);
        }

        for value in header_values(self.headers.iter())? {
            builder = builder.raw_header(value);
        }

        let body = self.body_part();

        let message = if self.attachments.is_empty() {
            builder.singlepart(body)?
        } else {
            let mut mixed = MultiPart::mixed().singlepart(body);
            for attachment in &self.attachments {
                mixed = mixed.singlepart(attachment_part(attachment)?);
            }
            builder.multipart(mixed)?
        };

        Ok(message.formatted())
    }

    fn body_part(&self) -> SinglePart {
        match (&self.text, &self.html) {
            (Some(text), _) => SinglePart::plain(text.clone()),
            (None, Some(html)) => SinglePart::html(html.clone()),
            (None, None) => SinglePart::html(Vec::<u8>::new()),
        }
    }
}

/// Collapse `headers` into one lettre value per distinct name.
///
/// lettre keeps a single entry per name, so repeated names are folded into
/// one pre-encoded value that renders as consecutive header lines, each
/// value encoded on its own, in their original order.
fn header_values<'a, I>(headers: I) -> MessengerResult<Vec<HeaderValue>>
where
    I: IntoIterator<Item = &'a (String, String)>,
{
    let mut grouped: Vec<(HeaderName, Vec<&str>)> = Vec::new();

    for (name, value) in headers {
        let name = header_name(name)?;
        match grouped.iter().position(|(existing, _)| *existing == name) {
            Some(index) => grouped[index].1.push(value.as_str()),
            None => grouped.push((name, vec![value.as_str()])),
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(name, values)| fold_values(name, &values))
        .collect())
}

fn header_name(name: &str) -> MessengerResult<HeaderName> {
    HeaderName::new_from_ascii(name.to_string())
        .map_err(|e| MessengerError::Serialization(format!("invalid header name {name:?}: {e}")))
}

fn fold_values(name: HeaderName, values: &[&str]) -> HeaderValue {
    if let [value] = values {
        return HeaderValue::new(name, value.to_string());
    }

    let mut lines = String::new();
    for value in values {
        let mut single = header::Headers::new();
        single.insert_raw(HeaderValue::new(name.clone(), value.to_string()));
        lines.push_str(&single.to_string());
    }

    // The outer header block writes the first "Name: " and the final CRLF.
    let prefix = format!("{name}: ");
    let encoded = lines.strip_prefix(prefix.as_str()).unwrap_or(&lines);
    let encoded = encoded.strip_suffix("\r\n").unwrap_or(encoded);

    HeaderValue::dangerous_new_pre_encoded(name, values.join(", "), encoded.to_string())
}

/// Header whose name is only known at runtime.
///
/// `SinglePartBuilder::header` stores whatever `display` returns, so this
/// carries attachment headers lettre has no typed counterpart for.
#[derive(Clone)]
struct RawHeader(HeaderValue);

impl Header for RawHeader {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Messenger-Raw")
    }

    fn parse(s: &str) -> Result<Self, BoxError> {
        Err(format!("raw header {s:?} cannot be parsed").into())
    }

    fn display(&self) -> HeaderValue {
        self.0.clone()
    }
}

fn attachment_part(attachment: &Attachment) -> MessengerResult<SinglePart> {
    let content_type = attachment
        .header_value("Content-Type")
        .unwrap_or(DEFAULT_ATTACHMENT_TYPE);
    let content_type = header::ContentType::parse(content_type).map_err(|e| {
        MessengerError::Serialization(format!(
            "invalid content type for attachment {:?}: {e}",
            attachment.name
        ))
    })?;

    let mut part = match attachment.header_value("Content-ID") {
        Some(cid) => {
            let cid = cid.trim().trim_start_matches('<').trim_end_matches('>');
            SinglePart::builder()
                .header(header::ContentDisposition::inline())
                .header(header::ContentId::from(format!("<{cid}>")))
        }
        None => SinglePart::builder()
            .header(header::ContentDisposition::attachment(&attachment.name)),
    };
    part = part.header(content_type);

    let extra = attachment.header.iter().filter(|(name, _)| {
        !ATTACHMENT_MANAGED
            .iter()
            .any(|managed| managed.eq_ignore_ascii_case(name))
    });
    for value in header_values(extra)? {
        part = part.header(RawHeader(value));
    }

    Ok(part.body(attachment.content.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Campaign, Subscriber};

    fn message() -> Message {
        Message::new(Subscriber::new("a@b.com"), "<p>hi</p>")
            .with_from("x@y.com")
            .with_subject("Hello")
    }

    fn rendered(envelope: &Envelope) -> String {
        String::from_utf8(envelope.to_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_html_message_populates_html_only() {
        let envelope = Envelope::from_message(&message());

        assert_eq!(envelope.from, "x@y.com");
        assert_eq!(envelope.sender, "x@y.com");
        assert_eq!(envelope.to, vec!["a@b.com".to_string()]);
        assert_eq!(envelope.html.as_deref(), Some(b"<p>hi</p>".as_slice()));
        assert!(envelope.text.is_none());
    }

    #[test]
    fn test_plain_message_populates_text_only() {
        let msg = message().with_content_type(ContentType::Plain);
        let envelope = Envelope::from_message(&msg);

        assert_eq!(envelope.text.as_deref(), Some(b"<p>hi</p>".as_slice()));
        assert!(envelope.html.is_none());
    }

    #[test]
    fn test_campaign_from_overrides_but_sender_stays() {
        let msg = message().with_campaign(Campaign::new("news@y.com"));
        let envelope = Envelope::from_message(&msg);

        assert_eq!(envelope.from, "news@y.com");
        assert_eq!(envelope.sender, "x@y.com");
    }

    #[test]
    fn test_attachments_are_copied() {
        let mut msg = message().with_attachment(
            Attachment::new("report.csv", b"a,b\n1,2\n".to_vec()).with_header("Content-Type", "text/csv"),
        );
        let envelope = Envelope::from_message(&msg);

        msg.attachments[0].content.iter_mut().for_each(|b| *b = b'x');

        assert_eq!(envelope.attachments[0].content, b"a,b\n1,2\n".to_vec());
        assert_eq!(envelope.attachments[0].name, "report.csv");
        assert_eq!(envelope.attachments[0].header_value("content-type"), Some("text/csv"));
    }

    #[test]
    fn test_to_bytes_renders_addresses_and_body() {
        let msg = message().with_header("List-Unsubscribe", "<https://example.com/u>");
        let raw = rendered(&Envelope::from_message(&msg));

        assert!(raw.contains("From: x@y.com"));
        assert!(raw.contains("To: a@b.com"));
        assert!(raw.contains("Subject: Hello"));
        assert!(raw.contains("List-Unsubscribe: <https://example.com/u>"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("<p>hi</p>"));
    }

    #[test]
    fn test_repeated_headers_are_all_rendered() {
        let msg = message()
            .with_header("X-Tag", "one")
            .with_header("List-Unsubscribe", "<https://example.com/u>")
            .with_header("X-Tag", "two");
        let raw = rendered(&Envelope::from_message(&msg));

        let one = raw.find("X-Tag: one\r\n").expect("first X-Tag missing");
        let two = raw.find("X-Tag: two\r\n").expect("second X-Tag missing");
        assert!(one < two);
        assert!(raw.contains("List-Unsubscribe: <https://example.com/u>\r\n"));
        assert_eq!(raw.matches("X-Tag:").count(), 2);
    }

    #[test]
    fn test_repeated_header_names_match_case_insensitively() {
        let msg = message().with_header("X-Tag", "one").with_header("x-tag", "two");
        let raw = rendered(&Envelope::from_message(&msg));

        assert!(raw.contains("X-Tag: one\r\n"));
        assert!(raw.contains("X-Tag: two\r\n"));
    }

    #[test]
    fn test_invalid_header_name_fails() {
        let msg = message().with_header("Bad Name", "x");

        let err = Envelope::from_message(&msg).to_bytes().unwrap_err();
        assert!(matches!(err, MessengerError::Serialization(_)));
    }

    #[test]
    fn test_attachment_keeps_custom_headers() {
        let msg = message().with_attachment(
            Attachment::new("data.json", b"{}".to_vec())
                .with_header("Content-Type", "application/json")
                .with_header("X-Custom", "keep")
                .with_header("X-Trace", "a")
                .with_header("X-Trace", "b"),
        );
        let raw = rendered(&Envelope::from_message(&msg));

        assert!(raw.contains("Content-Type: application/json"));
        assert!(raw.contains("X-Custom: keep\r\n"));
        assert!(raw.contains("X-Trace: a\r\n"));
        assert!(raw.contains("X-Trace: b\r\n"));
        assert!(raw.contains("attachment; filename=\"data.json\""));
    }

    #[test]
    fn test_inline_attachment_renders_content_id() {
        let msg = message().with_attachment(
            Attachment::new("logo.png", b"png".to_vec())
                .with_header("Content-Type", "image/png")
                .with_header("Content-ID", "<logo>"),
        );
        let raw = rendered(&Envelope::from_message(&msg));

        assert!(raw.contains("Content-ID: <logo>"));
        assert!(raw.contains("Content-Disposition: inline"));
        assert_eq!(raw.matches("Content-ID:").count(), 1);
    }

    #[test]
    fn test_to_bytes_with_attachment_is_multipart() {
        let msg = message()
            .with_content_type(ContentType::Plain)
            .with_attachment(Attachment::new("notes.txt", b"remember".to_vec()));
        let raw = rendered(&Envelope::from_message(&msg));

        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("application/octet-stream"));
        assert!(raw.contains("notes.txt"));
    }

    #[test]
    fn test_invalid_attachment_content_type_fails() {
        let msg = message().with_attachment(
            Attachment::new("bad.bin", b"x".to_vec()).with_header("Content-Type", "not a mime type"),
        );

        let err = Envelope::from_message(&msg).to_bytes().unwrap_err();
        assert!(matches!(err, MessengerError::Serialization(_)));
    }

    #[test]
    fn test_invalid_recipient_fails() {
        let mut msg = message();
        msg.subscriber.email = "not-an-address".to_string();

        let err = Envelope::from_message(&msg).to_bytes().unwrap_err();
        assert!(matches!(err, MessengerError::Serialization(_)));
    }
}
