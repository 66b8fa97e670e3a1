use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::middleware::DefaultHeaders;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};

use crate::email_client::ContactMailer;
use crate::recaptcha::RecaptchaVerifier;
use crate::routes;
use tracing_actix_web::TracingLogger;

// The policy whitelists Google's origins so the reCAPTCHA widget can load
// its scripts and frames.
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' https://www.google.com https://www.gstatic.com; \
    frame-src 'self' https://www.google.com https://www.gstatic.com;";

#[derive(Clone)]
pub struct CorsPolicy {
    pub allowed_origin: String,
}

pub fn run(
    listener: TcpListener,
    verifier: RecaptchaVerifier,
    mailer: Arc<dyn ContactMailer>,
    cors: CorsPolicy,
) -> Result<Server, std::io::Error> {
    let verifier = Data::new(verifier);
    let mailer: Data<dyn ContactMailer> = Data::from(mailer);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            // Every response carries the CORS and CSP headers, error
            // responses included.
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", cors.allowed_origin.as_str()))
                    .add(("Content-Security-Policy", CONTENT_SECURITY_POLICY))
                    .add(("Access-Control-Allow-Methods", "POST, OPTIONS"))
                    .add(("Access-Control-Allow-Headers", "Content-Type")),
            )
            .service(
                web::resource("/contact")
                    .route(web::post().to(routes::contact::contact))
                    // Non-POST on /contact is a 404, not a 405.
                    .default_service(web::route().to(routes::fallback)),
            )
            .default_service(web::route().to(routes::fallback))
            .app_data(verifier.clone())
            .app_data(mailer.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
