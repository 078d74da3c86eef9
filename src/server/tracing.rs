//! Tracing/logging for HTTP servers

use std::time::Instant;

use actix_web::{
    dev::{ServiceRequest, ServiceResponse},
    HttpMessage,
};
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};

/// The length of time in milliseconds after which a request is considered slow.
/// Deletes wait on the object store, so this is generous.
const SLOW_REQUEST_MS: u128 = 5 * 1000;

/// `DefaultRootSpanBuilder` plus request timings and the acting user.
pub struct AgoraRootSpanBuilder;

/// For measuring the duration of a request
struct RequestStart(Instant);

impl RootSpanBuilder for AgoraRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> tracing::Span {
        // Scoped so the mutable borrow of the extensions ends before `root_span!` reads `request`.
        {
            let mut request_extensions = request.extensions_mut();
            request_extensions.insert(RequestStart(Instant::now()));
        }
        let user_id = request
            .headers()
            .get(crate::server::api::identity::USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-")
            .to_owned();

        tracing_actix_web::root_span!(
            request,
            user_id = %user_id,
            duration_ms = tracing::field::Empty,
            duration_ns = tracing::field::Empty,
        )
    }

    fn on_request_end<B: actix_web::body::MessageBody>(
        span: tracing::Span,
        outcome: &Result<ServiceResponse<B>, actix_web::Error>,
    ) {
        let () = outcome.as_ref().map_or((), |response| {
            if let Some(req_start) = response.request().extensions().get::<RequestStart>() {
                let elapsed = req_start.0.elapsed();
                let millis = elapsed.as_millis();
                span.record("duration_ms", millis);
                span.record("duration_ns", elapsed.as_nanos());
                if millis > SLOW_REQUEST_MS {
                    tracing::warn!(duration_ms = millis, "Slow HTTP request");
                } else {
                    tracing::trace!("HTTP Request");
                }
            }
        });
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}
