use crate::tracing::RequestId;
use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

/// Header name for the request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reuses an inbound `x-request-id` when it is a valid header value,
/// otherwise mints a fresh one. The id is stamped on the request headers,
/// the request extensions, the task-local scope and the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let inbound = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(RequestId::new);

    let (request_id, header_value) = match inbound
        .and_then(|id| HeaderValue::from_str(id.as_str()).ok().map(|hv| (id, hv)))
    {
        Some(pair) => pair,
        None => {
            let id = RequestId::default();
            // uuid text is always a valid header value
            let hv = HeaderValue::from_str(id.as_str()).unwrap_or(HeaderValue::from_static(""));
            (id, hv)
        }
    };

    request.headers_mut().insert(
        HeaderName::from_static(REQUEST_ID_HEADER),
        header_value.clone(),
    );
    request.extensions_mut().insert(request_id.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id.as_str(),
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = crate::tracing::scope_request_id(request_id, next.run(request))
        .instrument(span)
        .await;

    response
        .headers_mut()
        .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);

    response
}
