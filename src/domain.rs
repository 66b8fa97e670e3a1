/// A contact-form entry. Lives for the duration of one request; never stored.
#[derive(Debug)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
    pub recaptcha_token: String,
}

impl Submission {
    /// All four fields must be present and non-empty, otherwise the request
    /// is rejected before any outbound call is made.
    pub fn parse(
        name: Option<String>,
        email: Option<String>,
        message: Option<String>,
        recaptcha_token: Option<String>,
    ) -> Result<Submission, String> {
        Ok(Submission {
            name: require_field(name, "nom")?,
            email: require_field(email, "email")?,
            message: require_field(message, "message")?,
            recaptcha_token: require_field(recaptcha_token, "recaptchaToken")?,
        })
    }
}

fn require_field(value: Option<String>, field: &str) -> Result<String, String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("Missing or empty field `{}`", field)),
    }
}
