use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::models::notice::Notice;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Also deliver this player's private notices. Identity is trusted as
    /// given; authenticate upstream.
    pub player_id: Option<String>,
}

pub async fn handler(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<FeedQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, channel, query.player_id))
}

fn wanted(notice: &Notice, channel: &str, player_id: Option<&str>) -> bool {
    notice.is_for_channel(channel) || player_id.map_or(false, |p| notice.is_for_player(p))
}

/// Streams notices for one channel (and optionally one player) as JSON text
/// frames until either side hangs up.
pub async fn handle_socket(
    ws: WebSocket,
    state: AppState,
    channel: String,
    player_id: Option<String>,
) {
    info!("notice feed connected for channel: {}", channel);
    let (mut sender, mut receiver) = ws.split();
    let mut rx = state.feed.subscribe();

    let mut send_task = tokio::spawn(async move {
        loop {
            let notice = match rx.recv().await {
                Ok(notice) => notice,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(channel = %channel, skipped, "notice feed lagging");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if !wanted(&notice, &channel, player_id.as_deref()) {
                continue;
            }
            let text = match serde_json::to_string(&notice) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "notice could not be encoded");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut receive_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => receive_task.abort(),
        _ = &mut receive_task => send_task.abort(),
    }
}
