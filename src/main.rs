use contact_relay::configuration::get_configuration;
use contact_relay::email_client::{ContactMailer, SmtpMailer};
use contact_relay::recaptcha::RecaptchaVerifier;
use contact_relay::startup::{run, CorsPolicy};
use contact_relay::telemetry::{get_subscriber, init_subscriber};
use std::net::TcpListener;
use std::sync::Arc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(
        "contact-relay".into(),
        "info".into(),
        std::io::stdout,
    );
    init_subscriber(subscriber);

    let config = get_configuration()
        .expect("Failed to read config file");

    let verifier = RecaptchaVerifier::new(
        config.recaptcha.verify_url.clone(),
        config.recaptcha.secret_key.clone(),
        config.recaptcha.timeout(),
    );
    let mailer: Arc<dyn ContactMailer> = Arc::new(
        SmtpMailer::new(&config.email)
            .expect("Failed to build the SMTP mailer"),
    );
    let cors = CorsPolicy {
        allowed_origin: config.application.cors_origin.clone(),
    };

    let address = format!(
        "{address}:{port}",
        address = config.application.host,
        port = config.application.port
    );
    let listener = TcpListener::bind(address)?;

    run(listener, verifier, mailer, cors)?.await
}
