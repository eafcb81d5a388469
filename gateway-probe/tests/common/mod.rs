//! In-process fake gateway serving HTTP/1.1 and h2c on one listener.

#![allow(dead_code)]

use std::convert::Infallible;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use bytes::{BufMut, Bytes, BytesMut};
use gateway_probe::{Executor, ProbeConfig};
use gateway_probe_client::{Authority, H2cClient, Http1Client};
use gateway_probe_core::{encode_frame, frame_flags};
use http_body::Frame;
use http_body_util::StreamBody;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the fake gateway misbehaves.
#[derive(Clone, Copy, Debug, Default)]
pub struct Faults {
    /// Let unauthenticated calls to the session service through.
    pub skip_auth: bool,
}

pub struct FakeGateway {
    pub authority: Authority,
    handle: JoinHandle<()>,
}

impl FakeGateway {
    pub async fn start() -> Self {
        Self::start_with(Faults::default()).await
    }

    pub async fn start_with(faults: Faults) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let authority = listener.local_addr().unwrap().to_string().parse().unwrap();
        let app = router(faults);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { authority, handle }
    }

    pub fn config(&self) -> ProbeConfig {
        ProbeConfig::new(&format!("http://{}", self.authority)).unwrap()
    }

    pub fn executor(&self) -> Executor {
        Executor::with_clients(
            self.authority.clone(),
            Http1Client::builder().timeout(Duration::from_secs(5)).build(),
            H2cClient::builder().timeout(Duration::from_secs(5)).build(),
        )
    }
}

impl Drop for FakeGateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(faults: Faults) -> Router {
    Router::new()
        // Services
        .route("/", get(|| redirect(StatusCode::FOUND, "/ui/v2/login")))
        .route(
            "/ui/v2/login",
            get(|| redirect(StatusCode::MOVED_PERMANENTLY, "/ui/v2/login/")),
        )
        .route("/ui/v2/login/", get(|| html("login")))
        .route("/ui/v2/login/healthy", get(|| async { "ok" }))
        .route("/ui/console/", get(|| html("console")))
        .route(
            "/.well-known/openid-configuration",
            get(|| async {
                axum::Json(json!({
                    "issuer": "http://localhost:8888",
                    "authorization_endpoint": "http://localhost:8888/oauth/v2/authorize",
                    "token_endpoint": "http://localhost:8888/oauth/v2/token",
                    "jwks_uri": "http://localhost:8888/oauth/v2/keys",
                }))
            }),
        )
        .route(
            "/oauth/v2/keys",
            get(|| async { axum::Json(json!({ "keys": [] })) }),
        )
        .route(
            "/saml/v2/metadata",
            get(|| async {
                r#"<?xml version="1.0"?><md:EntityDescriptor entityID="http://localhost:8888/saml/v2/metadata"/>"#
            }),
        )
        .route("/management/v1/healthz", get(healthz))
        .route("/admin/v1/healthz", get(healthz))
        .route("/auth/v1/healthz", get(healthz))
        .route("/api/admin/v1/healthz", get(healthz))
        // v1
        .route("/zitadel.admin.v1.AdminService/Healthz", post(admin_healthz))
        // v2
        .route(
            "/v2/sessions",
            post(move || async move {
                if faults.skip_auth {
                    axum::Json(json!({ "sessions": [] })).into_response()
                } else {
                    (
                        StatusCode::UNAUTHORIZED,
                        axum::Json(json!({ "code": 16, "message": "auth header missing" })),
                    )
                        .into_response()
                }
            }),
        )
        .route(
            "/zitadel.session.v2.SessionService/ListSessions",
            post(move |headers: HeaderMap| async move { list_sessions(faults, &headers) }),
        )
}

async fn redirect(status: StatusCode, location: &'static str) -> Response {
    (status, [(header::LOCATION, location)]).into_response()
}

async fn html(title: &'static str) -> Response {
    axum::response::Html(format!("<!doctype html><html><title>{title}</title></html>"))
        .into_response()
}

async fn healthz() -> Response {
    axum::Json(json!({})).into_response()
}

fn content_type(headers: &HeaderMap) -> &str {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn admin_healthz(headers: HeaderMap) -> Response {
    match content_type(&headers) {
        "application/grpc-web+proto" => grpc_web("application/grpc-web+proto", "0"),
        // No JSON codec: no trailer frame at all.
        "application/grpc-web+json" => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/grpc-web+json")]).into_response()
        }
        "application/grpc+proto" => grpc(encode_frame(b""), "0"),
        "application/grpc+json" => grpc(Bytes::new(), "13"),
        _ => StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response(),
    }
}

fn list_sessions(faults: Faults, headers: &HeaderMap) -> Response {
    let status = if faults.skip_auth { "0" } else { "16" };
    match content_type(headers) {
        "application/proto" | "application/json" if faults.skip_auth => {
            axum::Json(json!({ "sessions": [] })).into_response()
        }
        "application/proto" | "application/json" => (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({ "code": "unauthenticated", "message": "auth header missing" })),
        )
            .into_response(),
        "application/grpc+proto" => grpc(Bytes::new(), status),
        "application/grpc+json" => trailers_only(status),
        _ => StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response(),
    }
}

/// Native gRPC: optional data then an HTTP trailer block.
fn grpc(data: Bytes, status: &'static str) -> Response {
    let mut trailers = HeaderMap::new();
    trailers.insert("grpc-status", HeaderValue::from_static(status));

    let mut frames = Vec::new();
    if !data.is_empty() {
        frames.push(Ok::<_, Infallible>(Frame::data(data)));
    }
    frames.push(Ok(Frame::trailers(trailers)));

    let mut response = Response::new(Body::new(StreamBody::new(futures::stream::iter(frames))));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/grpc"),
    );
    response
}

/// gRPC "Trailers-Only": status in the header block, no body.
fn trailers_only(status: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/grpc"),
            (header::HeaderName::from_static("grpc-status"), status),
        ],
    )
        .into_response()
}

/// gRPC-Web: an empty data frame followed by the inline trailer frame.
fn grpc_web(content_type: &'static str, status: &str) -> Response {
    let trailer = format!("grpc-status: {status}\r\ngrpc-message: \r\n");
    let mut body = BytesMut::from(encode_frame(b"").as_ref());
    body.put_u8(frame_flags::TRAILERS);
    body.put_u32(trailer.len() as u32);
    body.put_slice(trailer.as_bytes());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        body.freeze(),
    )
        .into_response()
}
