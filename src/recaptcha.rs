use reqwest::Client;
use secrecy::{ExposeSecret, Secret};

/// Submissions scoring below this are treated as bots. The boundary is
/// inclusive: a score of exactly 0.5 passes.
const SCORE_THRESHOLD: f64 = 0.5;

/// Client for the reCAPTCHA siteverify endpoint.
pub struct RecaptchaVerifier {
    http_client: Client,
    verify_url: String,
    secret_key: Secret<String>,
}

impl RecaptchaVerifier {
    pub fn new(
        verify_url: String,
        secret_key: Secret<String>,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap();
        Self {
            http_client,
            verify_url,
            secret_key,
        }
    }

    /// Ask the verification service to score a client-supplied token.
    ///
    /// A non-2xx response from the service is an error, not a rejection;
    /// the caller surfaces it as a server failure.
    #[tracing::instrument(name = "Verifying reCAPTCHA token", skip(self, token))]
    pub async fn verify(&self, token: &str) -> Result<VerificationOutcome, reqwest::Error> {
        let params = [
            ("secret", self.secret_key.expose_secret().as_str()),
            ("response", token),
        ];
        let outcome = self
            .http_client
            .post(&self.verify_url)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json::<VerificationOutcome>()
            .await?;
        Ok(outcome)
    }
}

#[derive(serde::Deserialize, Debug)]
pub struct VerificationOutcome {
    pub success: bool,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

impl VerificationOutcome {
    /// The service must report success AND a numeric score at or above the
    /// threshold. A response without a score is rejected.
    pub fn is_human(&self) -> bool {
        self.success && self.score.map_or(false, |score| score >= SCORE_THRESHOLD)
    }
}
