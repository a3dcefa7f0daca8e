use actix_web::{
    HttpRequest, HttpResponse, Responder,
    error::JsonPayloadError,
    http::header::ContentType,
    web,
};
use log::{debug, warn};

use crate::{
    ApiError, ServiceContext,
    schema::{PredictRequest, PredictResponse},
};

pub const HOME_MESSAGE: &str = "Iris Classifier API";

/// Registers the API routes and the JSON extractor configuration.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(reject_payload))
        .route("/", web::get().to(home))
        .route("/predict", web::post().to(predict));
}

async fn home() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(HOME_MESSAGE)
}

async fn predict(
    context: web::Data<ServiceContext>,
    body: web::Json<PredictRequest>,
) -> Result<HttpResponse, ApiError> {
    let features = body.validate().inspect_err(|_| {
        warn!("rejected request with missing features");
    })?;

    let label = context.predict(&features).inspect_err(|e| {
        warn!("{e}");
    })?;

    debug!(label = label; "served prediction");
    Ok(HttpResponse::Ok().json(PredictResponse {
        prediction: label.to_string(),
    }))
}

fn reject_payload(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    warn!("rejected request body: {err}");
    ApiError::InvalidBody(err.to_string()).into()
}
