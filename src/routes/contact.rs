use crate::domain::Submission;
use crate::email_client::ContactMailer;
use crate::recaptcha::RecaptchaVerifier;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use std::convert::TryFrom;
use std::fmt::Formatter;

const CONTACT_SUBJECT: &str = "Nouveau message via le Portfolio";

#[derive(serde::Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    nom: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "recaptchaToken")]
    recaptcha_token: Option<String>,
}

impl TryFrom<ContactForm> for Submission {
    type Error = String;

    fn try_from(form: ContactForm) -> Result<Self, Self::Error> {
        Submission::parse(form.nom, form.email, form.message, form.recaptcha_token)
    }
}

#[derive(thiserror::Error)]
pub enum ContactError {
    #[error("{0}")]
    ValidationError(String),
    #[error("reCAPTCHA verification rejected the submission")]
    VerificationRejected,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ContactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ContactError {
    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ContactError::VerificationRejected => StatusCode::FORBIDDEN,
            ContactError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Fixed French messages; internal details stay in the logs.
    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ContactError::ValidationError(_) => "Tous les champs sont requis.",
            ContactError::VerificationRejected => "Échec vérification reCAPTCHA.",
            ContactError::UnexpectedError(_) => "Erreur serveur.",
        };
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "message": message }))
    }
}

#[tracing::instrument(
    name = "Handling a contact submission",
    skip(body, verifier, mailer)
)]
pub async fn contact(
    body: web::Bytes,
    verifier: web::Data<RecaptchaVerifier>,
    mailer: web::Data<dyn ContactMailer>,
) -> Result<HttpResponse, ContactError> {
    // A body that is not valid JSON is a server-side 500, not a 400; only a
    // well-formed record with missing fields counts as a client error.
    let form: ContactForm = serde_json::from_slice(&body)
        .context("Failed to parse the request body as JSON")?;
    let submission =
        Submission::try_from(form).map_err(ContactError::ValidationError)?;

    let outcome = verifier
        .verify(&submission.recaptcha_token)
        .await
        .context("Failed to reach the reCAPTCHA verification service")?;
    if !outcome.is_human() {
        tracing::warn!(outcome = ?outcome, "Submission rejected by reCAPTCHA");
        return Err(ContactError::VerificationRejected);
    }

    mailer
        .send_contact_email(
            &submission.email,
            CONTACT_SUBJECT,
            &html_body(&submission),
            &text_body(&submission),
        )
        .await
        .context("Failed to relay the contact message")?;

    Ok(HttpResponse::Ok()
        .json(serde_json::json!({ "message": "Message envoyé avec succès !" })))
}

fn text_body(submission: &Submission) -> String {
    format!(
        "Vous avez reçu un nouveau message via votre portfolio\n\
         Nom: {}\n\
         Email: {}\n\n\
         Message:\n{}",
        submission.name, submission.email, submission.message
    )
}

fn html_body(submission: &Submission) -> String {
    let name = htmlescape::encode_minimal(&submission.name);
    let email = htmlescape::encode_minimal(&submission.email);
    let message =
        htmlescape::encode_minimal(&submission.message).replace('\n', "<br>");
    format!(
        "<h2>Vous avez reçu un nouveau message via votre portfolio</h2>\n\
         <p><strong>Nom:</strong> {name}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         <p><strong>Message:</strong><br>{message}</p>\n\
         <hr>\n\
         <p>Ceci est un message automatique envoyé depuis le formulaire de contact du site.</p>",
    )
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
