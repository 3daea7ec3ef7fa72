// HTTP transport for the dashboard IPC service.
//
// Every endpoint is `POST /ipc/{endpoint}` with a JSON body and the shared
// secret in the Authorization header.

use crate::core::afk::AfkStore;
use crate::core::ipc::{GuildDirectory, IpcError, IpcPayload, IpcService};
use crate::core::settings::SettingsStore;
use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::net::SocketAddr;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

const SECRET_CONTEXT: &[u8] = b"fumeguard-ipc";

/// The configured secret, kept as a MAC tag so a provided secret can be
/// checked in constant time.
#[derive(Clone)]
struct SecretTag(Arc<[u8]>);

impl SecretTag {
    fn mac(secret: &[u8]) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(secret).ok()?;
        mac.update(SECRET_CONTEXT);
        Some(mac)
    }

    fn new(secret: &str) -> Self {
        // An empty tag never verifies.
        let tag = Self::mac(secret.as_bytes())
            .map(|mac| mac.finalize().into_bytes().to_vec())
            .unwrap_or_default();
        Self(Arc::from(tag))
    }

    fn matches(&self, provided: &[u8]) -> bool {
        Self::mac(provided).is_some_and(|mac| mac.verify_slice(&self.0).is_ok())
    }
}

impl IntoResponse for IpcError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

async fn require_secret(
    State(secret): State<SecretTag>,
    req: Request,
    next: Next,
) -> Result<Response, IpcError> {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .is_some_and(|v| secret.matches(v.as_bytes()));

    if !authorized {
        tracing::warn!("Rejected IPC request with a bad or missing secret");
        return Err(IpcError::unauthorized());
    }
    Ok(next.run(req).await)
}

async fn handle_endpoint<D, S, A>(
    State(service): State<Arc<IpcService<D, S, A>>>,
    Path(endpoint): Path<String>,
    body: Bytes,
) -> Result<Response, IpcError>
where
    D: GuildDirectory + 'static,
    S: SettingsStore + 'static,
    A: AfkStore + 'static,
{
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        IpcPayload::default()
    } else {
        serde_json::from_slice::<IpcPayload>(&body)
            .map_err(|e| IpcError::bad_request(format!("Invalid payload: {}", e)))?
    };

    let value = service.handle(&endpoint, payload).await?;
    Ok(Json(value).into_response())
}

pub fn router<D, S, A>(service: Arc<IpcService<D, S, A>>, secret: &str) -> Router
where
    D: GuildDirectory + 'static,
    S: SettingsStore + 'static,
    A: AfkStore + 'static,
{
    let secret = SecretTag::new(secret);
    Router::new()
        .route("/ipc/{endpoint}", post(handle_endpoint::<D, S, A>))
        .layer(middleware::from_fn_with_state(secret, require_secret))
        .with_state(service)
}

pub async fn serve(router: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("IPC server listening on {}", addr);
    axum::serve(listener, router).await
}
