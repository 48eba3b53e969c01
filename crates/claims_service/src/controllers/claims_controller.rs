use actix_web::{get, post, web, HttpMessage, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::conversation::Transcript;
use crate::error::{AppError, Operation, RelayError};
use crate::middleware::RequestId;
use crate::server::AppState;
use crate::shaper;

pub const API_BANNER: &str = "Insurance claims API";

#[derive(Debug, Serialize, Deserialize)]
pub struct BannerResponse {
    pub message: String,
}

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(BannerResponse {
        message: API_BANNER.to_string(),
    })
}

#[post("/parse_conversation")]
pub async fn parse_conversation(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: String,
) -> Result<HttpResponse, AppError> {
    let transcript = Transcript::new(body)?;

    let text = relay_conversation(&app_state, Operation::Parse, &transcript)
        .await
        .map_err(|e| fail(&req, Operation::Parse, e))?;

    Ok(shaper::parsed_conversation_response(text))
}

#[post("/process")]
pub async fn process_conversation(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    body: String,
) -> Result<HttpResponse, AppError> {
    let transcript = Transcript::new(body)?;

    let value = process_pipeline(&app_state, &transcript)
        .await
        .map_err(|e| fail(&req, Operation::Process, e))?;

    Ok(shaper::processed_conversation_response(&value))
}

/// Load the operation's prompt and run it against the transcript.
async fn relay_conversation(
    app_state: &AppState,
    operation: Operation,
    transcript: &Transcript,
) -> Result<String, RelayError> {
    let instruction = app_state.prompts.load(operation.prompt_name()).await?;
    app_state.relay.complete(instruction, transcript).await
}

async fn process_pipeline(
    app_state: &AppState,
    transcript: &Transcript,
) -> Result<serde_json::Value, RelayError> {
    let text = relay_conversation(app_state, Operation::Process, transcript).await?;
    shaper::shape_processed(&text, &app_state.process_schema)
}

/// Id set by the tracing middleware, `-` when it is not installed.
fn request_id_of(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn fail(req: &HttpRequest, operation: Operation, source: RelayError) -> AppError {
    tracing::error!(
        request_id = %request_id_of(req),
        kind = source.kind(),
        "Error {} conversation: {}",
        operation,
        source
    );
    AppError::conversation(operation, source)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(parse_conversation)
        .service(process_conversation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;

    #[actix_web::test]
    async fn request_id_comes_from_extensions() {
        let req = test::TestRequest::default().to_http_request();
        assert_eq!(request_id_of(&req), "-");

        req.extensions_mut().insert(RequestId("req-42".to_string()));
        assert_eq!(request_id_of(&req), "req-42");
    }
}
