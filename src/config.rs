use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ContactConfig {
    pub notify_to: String,
    pub notify_from: String,
    pub app_url: String,
    pub resend_api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub contact: ContactConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let contact = ContactConfig {
            notify_to: std::env::var("CONTACT_NOTIFICATION_EMAIL")
                .unwrap_or_else(|_| "admin@yourdomain.com".into()),
            notify_from: std::env::var("CONTACT_NOTIFICATION_FROM")
                .unwrap_or_else(|_| "notifications@yourdomain.com".into()),
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".into()),
            resend_api_key: std::env::var("RESEND_API_KEY").ok(),
        };
        Ok(Self {
            database_url,
            contact,
        })
    }
}
