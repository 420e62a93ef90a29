//! EML (RFC 822 email) text extraction

use crate::error::{AppError, Result};
use mailparse::{DispositionType, ParsedMail};

/// Extract the readable body of an email.
///
/// `text/plain` parts are preferred; when there are none, any other
/// `text/*` part is used with markup stripped. Parts are joined with a
/// blank line.
pub fn extract(bytes: &[u8]) -> Result<String> {
    let mail = mailparse::parse_mail(bytes)
        .map_err(|e| AppError::Extraction(format!("unreadable email: {}", e)))?;

    let mut parts = Vec::new();
    collect_text_parts(&mail, &mut parts)?;

    let plain: Vec<String> = parts
        .iter()
        .filter(|(mime, _)| mime == "text/plain")
        .map(|(_, body)| body.trim().to_string())
        .filter(|body| !body.is_empty())
        .collect();

    let bodies = if plain.is_empty() {
        parts
            .iter()
            .map(|(mime, body)| {
                if mime == "text/html" {
                    strip_markup(body)
                } else {
                    body.trim().to_string()
                }
            })
            .filter(|body| !body.is_empty())
            .collect()
    } else {
        plain
    };

    Ok(bodies.join("\n\n"))
}

/// Collect (mimetype, body) for every inline textual leaf part
fn collect_text_parts(mail: &ParsedMail<'_>, out: &mut Vec<(String, String)>) -> Result<()> {
    if !mail.subparts.is_empty() {
        for part in &mail.subparts {
            collect_text_parts(part, out)?;
        }
        return Ok(());
    }

    let mime = mail.ctype.mimetype.to_ascii_lowercase();
    let is_attachment = matches!(
        mail.get_content_disposition().disposition,
        DispositionType::Attachment
    );

    if mime.starts_with("text/") && !is_attachment {
        let body = mail
            .get_body()
            .map_err(|e| AppError::Extraction(format!("undecodable email part: {}", e)))?;
        out.push((mime, body));
    }

    Ok(())
}

/// Crude tag removal for HTML-only messages
fn strip_markup(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;

    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
