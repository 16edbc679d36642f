// Contact form relay

use async_trait::async_trait;
use folio::config::MailConfig;
use folio::{ContactForm, FolioError, Result};

/// Delivers contact form messages to the site owner.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, form: &ContactForm) -> Result<()>;
}

/// Build the relay for the configured mail settings.
pub fn from_config(config: &MailConfig) -> Box<dyn Mailer> {
    match &config.api_key {
        Some(api_key) => Box::new(SendGridMailer::new(api_key.clone(), config)),
        None => Box::new(DisabledMailer),
    }
}

/// Sends through the SendGrid v3 `mail/send` API.
pub struct SendGridMailer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    to: String,
    from: String,
}

impl SendGridMailer {
    pub fn new(api_key: String, config: &MailConfig) -> Self {
        SendGridMailer {
            client: reqwest::Client::new(),
            api_key,
            endpoint: config.endpoint.clone(),
            to: config.to.clone(),
            from: config.from.clone(),
        }
    }

    fn payload(&self, form: &ContactForm) -> serde_json::Value {
        serde_json::json!({
            "personalizations": [{ "to": [{ "email": self.to }] }],
            "from": { "email": self.from },
            "reply_to": { "email": form.email, "name": form.name },
            "subject": form.subject(),
            "content": [
                { "type": "text/plain", "value": form.text_body() },
                { "type": "text/html", "value": form.html_body() },
            ],
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, form: &ContactForm) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(form))
            .send()
            .await
            .map_err(|e| FolioError::ExternalService(format!("SendGrid request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            log::info!("Contact message from {} relayed", form.email);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(FolioError::ExternalService(format!(
                "SendGrid returned {status}: {body}"
            )))
        }
    }
}

/// Used when no API key is configured; every send fails.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _form: &ContactForm) -> Result<()> {
        Err(FolioError::ExternalService(
            "SENDGRID_API_KEY is not set".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            message: "Hello".into(),
        }
    }

    #[test]
    fn test_payload_shape() {
        let config = MailConfig {
            to: "owner@site.dev".into(),
            from: "bot@site.dev".into(),
            ..MailConfig::default()
        };
        let mailer = SendGridMailer::new("SG.test".into(), &config);
        let payload = mailer.payload(&form());

        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "owner@site.dev");
        assert_eq!(payload["from"]["email"], "bot@site.dev");
        assert_eq!(payload["reply_to"]["email"], "ana@example.com");
        assert_eq!(payload["subject"], "Portfolio Contact: Ana");
        assert_eq!(payload["content"][0]["value"], form().text_body());
    }

    #[actix_web::test]
    async fn test_disabled_mailer_fails() {
        let err = DisabledMailer.send(&form()).await.unwrap_err();
        assert_eq!(err.kind(), folio::ErrorKind::ExternalService);
    }

    #[actix_web::test]
    async fn test_unreachable_endpoint_is_external_error() {
        let config = MailConfig {
            endpoint: "http://127.0.0.1:9/v3/mail/send".into(),
            ..MailConfig::default()
        };
        let mailer = SendGridMailer::new("SG.test".into(), &config);
        let err = mailer.send(&form()).await.unwrap_err();
        assert_eq!(err.kind(), folio::ErrorKind::ExternalService);
    }
}
