use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::error;

use crate::config::ContactConfig;
use crate::contact::dto::ContactRequest;
use crate::contact::repo::Submission;
use crate::error::ApiError;
use crate::mailer::OutgoingEmail;
use crate::state::AppState;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_MESSAGE_LEN: usize = 5000;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
/// Hard cap on page size; the admin UI never asks for more.
pub const MAX_LIMIT: i64 = 100;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate(req: &ContactRequest) -> Result<(&str, &str, &str), ApiError> {
    let name = req.name.as_deref().unwrap_or("");
    let email = req.email.as_deref().unwrap_or("");
    let message = req.message.as_deref().unwrap_or("");

    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(ApiError::Validation("All fields are required".into()));
    }
    if !is_valid_email(email) {
        return Err(ApiError::Validation(
            "Please provide a valid email address".into(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::Validation(
            "Name must be less than 255 characters".into(),
        ));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ApiError::Validation(
            "Email must be less than 255 characters".into(),
        ));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(ApiError::Validation(
            "Message must be less than 5000 characters".into(),
        ));
    }

    Ok((name, email, message))
}

/// Whether the best-effort notification went out. Advisory only; never
/// affects the create result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Failed,
}

#[derive(Debug)]
pub struct CreateOutcome {
    pub id: i64,
    pub created_at: OffsetDateTime,
    pub notified: NotifyOutcome,
}

pub async fn create_submission(
    state: &AppState,
    req: ContactRequest,
) -> Result<CreateOutcome, ApiError> {
    let (name, email, message) = validate(&req)?;

    let (id, created_at) = state.store.insert(name, email, message).await?;

    let mail = notification_email(&state.config.contact, name, email, message, id, created_at);
    let notified = match state.mailer.send(&mail).await {
        Ok(()) => NotifyOutcome::Sent,
        Err(e) => {
            error!(error = %e, id, "failed to send notification email");
            NotifyOutcome::Failed
        }
    };

    Ok(CreateOutcome {
        id,
        created_at,
        notified,
    })
}

pub struct SubmissionPage {
    pub submissions: Vec<Submission>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

pub async fn list_submissions(
    state: &AppState,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<SubmissionPage, ApiError> {
    let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
    let limit = limit
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT);
    // page is caller-controlled; saturate instead of overflowing
    let offset = (page - 1).saturating_mul(limit);

    let total = state.store.count().await?;
    let submissions = state.store.page(limit, offset).await?;
    let total_pages = (total + limit - 1) / limit;

    Ok(SubmissionPage {
        submissions,
        page,
        limit,
        total,
        total_pages,
    })
}

pub async fn delete_submission(state: &AppState, id: Option<&str>) -> Result<(), ApiError> {
    let raw = id
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation("Submission ID is required".into()))?;

    // An id that does not parse cannot match any row.
    let id: i64 = raw
        .parse()
        .map_err(|_| ApiError::NotFound("Submission not found"))?;

    let deleted = state.store.delete_by_id(id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Submission not found"));
    }
    Ok(())
}

fn admin_url(cfg: &ContactConfig) -> String {
    format!("{}/admin", cfg.app_url.trim_end_matches('/'))
}

fn notification_email(
    cfg: &ContactConfig,
    name: &str,
    email: &str,
    message: &str,
    id: i64,
    created_at: OffsetDateTime,
) -> OutgoingEmail {
    let admin = admin_url(cfg);
    let subject = format!("New Contact Form Submission from {name}");

    let html = format!(
        "<h2>New Contact Form Submission</h2>\
         <p><strong>Name:</strong> {name}</p>\
         <p><strong>Email:</strong> <a href=\"mailto:{email}\">{email}</a></p>\
         <p><strong>Submission ID:</strong> #{id}</p>\
         <p><strong>Date:</strong> {created_at}</p>\
         <h3>Message</h3>\
         <p>{message}</p>\
         <p>You can reply directly to {email} or manage submissions in your \
         <a href=\"{admin}\">admin dashboard</a>.</p>"
    );

    let text = format!(
        "New Contact Form Submission\n\
         \n\
         From: {name} ({email})\n\
         Submission ID: #{id}\n\
         Date: {created_at}\n\
         \n\
         Message:\n\
         {message}\n\
         \n\
         ---\n\
         Reply to: {email}\n\
         Manage submissions: {admin}"
    );

    OutgoingEmail {
        to: cfg.notify_to.clone(),
        from: cfg.notify_from.clone(),
        subject,
        html,
        text,
    }
}


#[cfg(test)]
mod service_tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::mailer::Mailer;

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: &OutgoingEmail) -> anyhow::Result<()> {
            anyhow::bail!("provider unreachable")
        }
    }

    fn request(name: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: Some(name.to_string()),
            email: Some("visitor@example.com".to_string()),
            message: Some(message.to_string()),
        }
    }

    #[tokio::test]
    async fn create_then_list_returns_the_submission_first() {
        let state = AppState::fake();

        let outcome = create_submission(&state, request("Ada", "First message"))
            .await
            .expect("create should succeed");
        assert_eq!(outcome.notified, NotifyOutcome::Sent);

        let page = list_submissions(&state, None, None)
            .await
            .expect("list should succeed");
        assert_eq!(page.total, 1);
        assert_eq!(page.submissions.len(), 1);

        let first = &page.submissions[0];
        assert_eq!(first.id, outcome.id);
        assert_eq!(first.name, "Ada");
        assert_eq!(first.email, "visitor@example.com");
        assert_eq!(first.message, "First message");
        assert_eq!(first.created_at, outcome.created_at);
    }

    #[tokio::test]
    async fn ids_are_assigned_monotonically() {
        let state = AppState::fake();
        let mut last_id = 0;
        for i in 0..5 {
            let outcome = create_submission(&state, request("Ada", &format!("message {i}")))
                .await
                .expect("create should succeed");
            assert!(outcome.id > last_id, "id {} not > {}", outcome.id, last_id);
            last_id = outcome.id;
        }
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let state = AppState::fake();
        for i in 0..4 {
            create_submission(&state, request("Ada", &format!("message {i}")))
                .await
                .expect("create should succeed");
        }

        let page = list_submissions(&state, None, None)
            .await
            .expect("list should succeed");
        let ids: Vec<i64> = page.submissions.iter().map(|s| s.id).collect();
        assert!(
            ids.windows(2).all(|w| w[0] > w[1]),
            "ids not descending: {ids:?}"
        );
        assert_eq!(page.submissions[0].message, "message 3");
    }

    #[tokio::test]
    async fn second_page_of_fifteen_has_five_rows() {
        let state = AppState::fake();
        for i in 0..15 {
            create_submission(&state, request("Ada", &format!("message {i}")))
                .await
                .expect("create should succeed");
        }

        let page = list_submissions(&state, Some(2), Some(10))
            .await
            .expect("list should succeed");
        assert_eq!(page.submissions.len(), 5);
        assert_eq!(page.total, 15);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.limit, 10);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let state = AppState::fake();
        let page = list_submissions(&state, None, None)
            .await
            .expect("list should succeed");
        assert!(page.submissions.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[tokio::test]
    async fn page_and_limit_fall_back_to_defaults_and_clamp() {
        let state = AppState::fake();

        let page = list_submissions(&state, Some(0), Some(-3))
            .await
            .expect("list should succeed");
        assert_eq!(page.page, DEFAULT_PAGE);
        assert_eq!(page.limit, DEFAULT_LIMIT);

        let page = list_submissions(&state, Some(i64::MAX), Some(100_000))
            .await
            .expect("list should succeed");
        assert_eq!(page.limit, MAX_LIMIT);
        assert!(page.submissions.is_empty());
    }

    #[tokio::test]
    async fn invalid_email_persists_nothing() {
        let state = AppState::fake();
        let req = ContactRequest {
            name: Some("Ada".into()),
            email: Some("not-an-email".into()),
            message: Some("Hi".into()),
        };
        let err = create_submission(&state, req).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let page = list_submissions(&state, None, None)
            .await
            .expect("list should succeed");
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn mailer_failure_does_not_fail_create() {
        let state = AppState::fake_with_mailer(Arc::new(FailingMailer));

        let outcome = create_submission(&state, request("Ada", "Hello"))
            .await
            .expect("create should succeed despite the mailer");
        assert_eq!(outcome.notified, NotifyOutcome::Failed);
        assert!(outcome.id > 0);

        let page = list_submissions(&state, None, None)
            .await
            .expect("list should succeed");
        assert_eq!(page.total, 1);
        assert_eq!(page.submissions[0].id, outcome.id);
    }

    #[tokio::test]
    async fn delete_removes_the_row_once() {
        let state = AppState::fake();
        let outcome = create_submission(&state, request("Ada", "Hello"))
            .await
            .expect("create should succeed");

        let id = outcome.id.to_string();
        delete_submission(&state, Some(&id))
            .await
            .expect("delete should succeed");

        let err = delete_submission(&state, Some(&id)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Submission not found")));

        let page = list_submissions(&state, None, None)
            .await
            .expect("list should succeed");
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn delete_requires_an_id() {
        let state = AppState::fake();

        let err = delete_submission(&state, None).await.unwrap_err();
        match err {
            ApiError::Validation(msg) => assert_eq!(msg, "Submission ID is required"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let err = delete_submission(&state, Some("  ")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_on_empty_store_is_not_found() {
        let state = AppState::fake();

        let err = delete_submission(&state, Some("42")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Submission not found")));

        // Unparseable ids cannot match a row either.
        let err = delete_submission(&state, Some("abc")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Submission not found")));
    }
}
