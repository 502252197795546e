//! Live order notifications for managers.
//!
//! Browsers cannot set headers on a websocket upgrade, so the access token travels in the `token` query parameter and
//! is checked here rather than by the authentication middleware. Every connection becomes a client of the
//! notification hub. Only manager connections receive broadcasts.
//!
//! Each connection runs two tasks. The writer forwards the client's buffered messages to the socket and pings every
//! [`PING_INTERVAL`]. The reader answers pings, and unregisters the client when the socket closes, errors, or stays
//! silent for longer than [`PONG_WAIT`].
use std::time::Duration;

use actix_web::{get, web, HttpRequest, HttpResponse};
use actix_ws::{Message, MessageStream, Session};
use futures::StreamExt;
use log::*;
use serde::Deserialize;
use tokio::{sync::mpsc, time};
use wappi_engine::notifications::{ClientId, HubClient, HubHandle};

use crate::{
    auth::TokenVerifier,
    config::ServerOptions,
    errors::{AuthError, ServerError},
    helpers::get_remote_ip,
};

pub const PING_INTERVAL: Duration = Duration::from_secs(54);
pub const PONG_WAIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WsParams {
    #[serde(default)]
    pub token: Option<String>,
}

#[get("/ws")]
pub async fn websocket(
    req: HttpRequest,
    body: web::Payload,
    params: web::Query<WsParams>,
    hub: web::Data<HubHandle>,
    verifier: web::Data<TokenVerifier>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let token = params.into_inner().token.filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;
    let claims = verifier.verify(token)?;
    let (response, session, stream) =
        actix_ws::handle(&req, body).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    let remote = get_remote_ip(&req, options.use_x_forwarded_for);
    let (client, outbound) = HubClient::new(Some(claims.user_id.clone()), claims.is_manager(), options.client_buffer_size);
    let id = client.id();
    info!("💻️ Websocket client #{id} connected for {} from {remote:?}", claims.user_id);
    hub.register(client).await;
    actix_web::rt::spawn(write_pump(id, session.clone(), outbound));
    actix_web::rt::spawn(read_pump(id, hub.get_ref().clone(), session, stream));
    Ok(response)
}

async fn write_pump(id: ClientId, mut session: Session, mut outbound: mpsc::Receiver<String>) {
    let mut ticker = time::interval(PING_INTERVAL);
    // The first tick completes immediately
    ticker.tick().await;
    loop {
        tokio::select! {
            msg = outbound.recv() => match msg {
                Some(text) => {
                    if session.text(text).await.is_err() {
                        debug!("💻️ Websocket client #{id} went away mid-write");
                        return;
                    }
                },
                // The hub closed our buffer: we were unregistered or evicted
                None => break,
            },
            _ = ticker.tick() => {
                if session.ping(b"").await.is_err() {
                    debug!("💻️ Websocket client #{id} went away before a ping");
                    return;
                }
            },
        }
    }
    trace!("💻️ Closing websocket for client #{id}");
    let _ = session.close(None).await;
}

async fn read_pump(id: ClientId, hub: HubHandle, mut session: Session, mut stream: MessageStream) {
    loop {
        let msg = match time::timeout(PONG_WAIT, stream.next()).await {
            Ok(Some(Ok(msg))) => msg,
            Ok(Some(Err(e))) => {
                debug!("💻️ Websocket client #{id} sent a bad frame. {e}");
                break;
            },
            Ok(None) => break,
            Err(_) => {
                info!("💻️ Websocket client #{id} timed out");
                break;
            },
        };
        match msg {
            Message::Ping(bytes) => {
                if session.pong(&bytes).await.is_err() {
                    break;
                }
            },
            Message::Close(reason) => {
                trace!("💻️ Websocket client #{id} closed the connection. {reason:?}");
                break;
            },
            // Clients only listen. Anything else just counts as a sign of life.
            _ => {},
        }
    }
    hub.unregister(id).await;
    info!("💻️ Websocket client #{id} disconnected");
}
