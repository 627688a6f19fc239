use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;

/// A fully-assembled outbound notification email.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

/// Mailer backed by the Resend HTTP API.
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ResendMailer {
    pub fn new(api_key: &str) -> anyhow::Result<Self> {
        Self::with_base_url(api_key, "https://api.resend.com")
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("build email http client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        let url = format!("{}/emails", self.base_url);
        let body = SendEmailRequest {
            from: &email.from,
            to: [&email.to],
            subject: &email.subject,
            html: &email.html,
            text: &email.text,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("send notification email")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("email provider returned {status}: {detail}");
        }
        Ok(())
    }
}

/// Stand-in used when no email provider is configured.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, email: &OutgoingEmail) -> anyhow::Result<()> {
        tracing::debug!(to = %email.to, subject = %email.subject, "email sending disabled; dropping notification");
        Ok(())
    }
}
