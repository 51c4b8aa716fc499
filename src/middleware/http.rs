//! HTTP-level middleware (cross-cutting concerns).
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id)
//! - Access logging: client address, request line, status, response size
//! - Global timeout
//!
//! Notes:
//! - The access log is observational only; it never changes a response.
//! - The timeout comes from `Config::request_timeout`, which already outlasts the probe.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, HttpBody};
use axum::error_handling::HandleErrorLayer;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, StatusCode, header, header::HeaderName};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Apply HTTP-level middleware to the given Router.
///
/// Defaults:
/// - Request-Id header: `x-request-id`
/// - Timeout: `timeout` (408 on elapse)
pub fn apply(router: Router, timeout: Duration) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        // Generate a request id if missing, then propagate it to the response.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(TimeoutLayer::new(timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(access_span)
                .on_response(access_log),
        );

    router.layer(layers)
}

fn access_span(request: &Request<Body>) -> Span {
    // Absent when the router is driven without a socket (tests).
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());

    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        client = %client,
        request_id = %request_id,
        request_line = %format!("{} {} {:?}", request.method(), request.uri(), request.version()),
    )
}

fn response_size(response: &Response<Body>) -> String {
    // Streaming bodies have no exact size until sent; fall back to the header.
    if let Some(n) = response.body().size_hint().exact() {
        return n.to_string();
    }

    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

fn access_log(response: &Response<Body>, latency: Duration, _span: &Span) {
    let size = response_size(response);

    tracing::info!(
        status = response.status().as_u16(),
        size = %size,
        latency_ms = latency.as_millis() as u64,
        "request completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    type Fields = Arc<Mutex<Vec<(String, String)>>>;

    /// Records every span and event field as `name -> rendered value`.
    #[derive(Clone, Default)]
    struct Recorder(Fields);

    impl Recorder {
        fn get(&self, name: &str) -> Option<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    impl Visit for Recorder {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0
                .lock()
                .unwrap()
                .push((field.name().to_string(), format!("{value:?}")));
        }
    }

    impl<S: Subscriber> Layer<S> for Recorder {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            attrs.record(&mut self.clone());
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            event.record(&mut self.clone());
        }
    }

    fn with_recorder(f: impl FnOnce()) -> Recorder {
        let recorder = Recorder::default();
        let subscriber = tracing_subscriber::registry().with(recorder.clone());
        tracing::subscriber::with_default(subscriber, f);
        recorder
    }

    #[test]
    fn access_span_carries_client_address_and_request_line() {
        let mut request = Request::get("/health")
            .header(REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap();
        let client: SocketAddr = "10.0.0.7:51234".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(client));

        let recorder = with_recorder(|| {
            let _span = access_span(&request);
        });

        assert_eq!(recorder.get("client").as_deref(), Some("10.0.0.7:51234"));
        assert_eq!(recorder.get("request_id").as_deref(), Some("req-42"));
        assert_eq!(
            recorder.get("request_line").as_deref(),
            Some("GET /health HTTP/1.1")
        );
    }

    #[test]
    fn access_span_without_socket_uses_placeholder() {
        let request = Request::get("/").body(Body::empty()).unwrap();

        let recorder = with_recorder(|| {
            let _span = access_span(&request);
        });

        assert_eq!(recorder.get("client").as_deref(), Some("-"));
        assert_eq!(recorder.get("request_id").as_deref(), Some("-"));
    }

    #[test]
    fn access_log_emits_status_and_body_size() {
        let response = Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from(r#"{"status":"error"}"#))
            .unwrap();

        let recorder = with_recorder(|| {
            access_log(&response, Duration::from_millis(3), &Span::none());
        });

        assert_eq!(recorder.get("status").as_deref(), Some("500"));
        assert_eq!(recorder.get("size").as_deref(), Some("18"));
    }

    #[test]
    fn empty_body_size_is_zero() {
        let response = Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::empty())
            .unwrap();

        assert_eq!(response_size(&response), "0");
    }
}
