use contact_relay::email_client::ContactMailer;
use contact_relay::recaptcha::RecaptchaVerifier;
use contact_relay::startup::{run, CorsPolicy};
use contact_relay::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use secrecy::Secret;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_CORS_ORIGIN: &str = "http://localhost:5173";

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout,
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink,
        );
        init_subscriber(subscriber);
    }
});

#[derive(Clone, Debug)]
pub struct SentEmail {
    pub reply_to: String,
    pub subject: String,
    pub html_content: String,
    pub text_content: String,
}

/// Test double standing in for the SMTP relay: records what it is asked to
/// send, or fails on demand.
#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<SentEmail>>,
    pub fail_sending: AtomicBool,
}

#[async_trait::async_trait]
impl ContactMailer for FakeMailer {
    async fn send_contact_email(
        &self,
        reply_to: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error> {
        if self.fail_sending.load(Ordering::SeqCst) {
            anyhow::bail!("The SMTP relay refused the message");
        }
        self.sent.lock().unwrap().push(SentEmail {
            reply_to: reply_to.to_string(),
            subject: subject.to_string(),
            html_content: html_content.to_string(),
            text_content: text_content.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub recaptcha_server: MockServer,
    pub mailer: Arc<FakeMailer>,
}

impl TestApp {
    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/contact", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to submit the contact form")
    }

    pub async fn post_contact_raw(&self, body: String) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/contact", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to submit the contact form")
    }

    /// Stub the siteverify endpoint with a fixed JSON outcome.
    pub async fn mock_siteverify(&self, outcome: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/recaptcha/api/siteverify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(outcome))
            .mount(&self.recaptcha_server)
            .await;
    }

    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.mailer.sent.lock().unwrap().clone()
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let recaptcha_server = MockServer::start().await;
    let verifier = RecaptchaVerifier::new(
        format!("{}/recaptcha/api/siteverify", recaptcha_server.uri()),
        Secret::new("test-secret".to_string()),
        std::time::Duration::from_millis(500),
    );
    let mailer = Arc::new(FakeMailer::default());
    let cors = CorsPolicy {
        allowed_origin: TEST_CORS_ORIGIN.to_string(),
    };

    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr()
        .unwrap()
        .port();

    let server = run(
        listener,
        verifier,
        mailer.clone() as Arc<dyn ContactMailer>,
        cors,
    )
        .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        recaptcha_server,
        mailer,
    }
}

pub fn valid_contact_body() -> serde_json::Value {
    serde_json::json!({
        "nom": "Jeanne Martin",
        "email": "jeanne.martin@example.com",
        "message": "Bonjour,\nje souhaite discuter d'un projet.",
        "recaptchaToken": "test-token"
    })
}
