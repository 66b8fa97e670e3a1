pub use contact::error_chain_fmt;

pub mod contact;

use actix_web::http::Method;
use actix_web::{HttpRequest, HttpResponse};

/// Catch-all for everything outside POST /contact: CORS preflights get an
/// empty 204, anything else a plain-text 404.
pub async fn fallback(request: HttpRequest) -> HttpResponse {
    if request.method() == Method::OPTIONS {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound()
            .content_type("text/plain")
            .body("Not Found")
    }
}
