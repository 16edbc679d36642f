use crate::error::{FolioError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A message submitted through the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    email_pattern().is_some_and(|pattern| pattern.is_match(email))
}

impl ContactForm {
    pub fn validate(&self) -> Result<()> {
        if [&self.name, &self.email, &self.message]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(FolioError::Validation("All fields are required".into()));
        }
        if !is_valid_email(&self.email) {
            return Err(FolioError::Validation("Invalid email format".into()));
        }
        Ok(())
    }

    pub fn subject(&self) -> String {
        format!("Portfolio Contact: {}", self.name)
    }

    pub fn text_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nMessage: {}",
            self.name, self.email, self.message
        )
    }

    pub fn html_body(&self) -> String {
        let message = escape_html(&self.message).replace('\n', "<br>");
        format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>New Portfolio Contact</h2>\
             <p><strong>From:</strong> {}</p>\
             <p><strong>Email:</strong> {}</p>\
             <div style=\"margin-top: 20px; padding: 15px; border-left: 4px solid #0284c7;\">\
             <p><strong>Message:</strong></p><p>{}</p></div>\
             <p style=\"margin-top: 20px; font-size: 12px;\">Sent from the contact form on your portfolio website.</p>\
             </div>",
            escape_html(&self.name),
            escape_html(&self.email),
            message
        )
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn test_validate() {
        assert!(form("A", "a@b.co", "hi").validate().is_ok());

        let err = form("A", "not-an-email", "hi").validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Invalid email format");

        let err = form("A", "a@b.co", "   ").validate().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: All fields are required");
    }

    #[test]
    fn test_html_body_escapes_input() {
        let body = form("<b>A</b>", "a@b.co", "line one\nline <two>").html_body();
        assert!(body.contains("&lt;b&gt;A&lt;/b&gt;"));
        assert!(body.contains("line one<br>line &lt;two&gt;"));
    }

    #[test]
    fn test_text_body() {
        let f = form("A", "a@b.co", "hi");
        assert_eq!(f.subject(), "Portfolio Contact: A");
        assert_eq!(f.text_body(), "Name: A\nEmail: a@b.co\nMessage: hi");
    }
}
