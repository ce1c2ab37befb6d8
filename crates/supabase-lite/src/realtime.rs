//! Realtime Change-Feed Client
//!
//! Phoenix-channel protocol over a browser WebSocket: one `phx_join` scoped
//! to a table + event kind, periodic heartbeats, decoded `postgres_changes`
//! records delivered to a callback. `unsubscribe` sends `phx_leave`, stops
//! the heartbeat, and closes the socket.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{MessageEvent, WebSocket};

use crate::error::{ClientError, ClientResult};
use crate::SupabaseConfig;

const HEARTBEAT_INTERVAL_MS: u32 = 25_000;

/// Row-change kinds the feed can be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    Insert,
    Update,
    Delete,
}

impl ChangeEvent {
    fn as_str(self) -> &'static str {
        match self {
            ChangeEvent::Insert => "INSERT",
            ChangeEvent::Update => "UPDATE",
            ChangeEvent::Delete => "DELETE",
        }
    }
}

/// One Phoenix frame, both directions
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PhoenixMessage {
    topic: String,
    event: String,
    payload: serde_json::Value,
    #[serde(rename = "ref", default)]
    message_ref: Option<String>,
}

/// WebSocket endpoint for a project URL (`http(s)` becomes `ws(s)`)
fn websocket_url(base: &str, anon_key: &str) -> String {
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/realtime/v1/websocket?apikey={}&vsn=1.0.0", ws_base, anon_key)
}

fn join_message(topic: &str, table: &str, event: ChangeEvent) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_string(),
        event: "phx_join".to_string(),
        payload: serde_json::json!({
            "config": {
                "postgres_changes": [
                    { "event": event.as_str(), "schema": "public", "table": table }
                ]
            }
        }),
        message_ref: Some("1".to_string()),
    }
}

fn leave_message(topic: &str) -> PhoenixMessage {
    PhoenixMessage {
        topic: topic.to_string(),
        event: "phx_leave".to_string(),
        payload: serde_json::json!({}),
        message_ref: Some("2".to_string()),
    }
}

fn heartbeat_message(message_ref: u64) -> PhoenixMessage {
    PhoenixMessage {
        topic: "phoenix".to_string(),
        event: "heartbeat".to_string(),
        payload: serde_json::json!({}),
        message_ref: Some(message_ref.to_string()),
    }
}

/// Extract the changed record from a `postgres_changes` frame
///
/// Returns `None` for replies, heartbeat acks, and mismatched event kinds.
fn decode_record<T: DeserializeOwned>(msg: &PhoenixMessage, event: ChangeEvent) -> Option<T> {
    if msg.event != "postgres_changes" {
        return None;
    }
    let data = msg.payload.get("data")?;
    if data.get("type")?.as_str()? != event.as_str() {
        return None;
    }
    match serde_json::from_value(data.get("record")?.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            log::warn!("realtime: dropping undecodable record: {}", e);
            None
        }
    }
}

pub struct RealtimeClient {
    config: SupabaseConfig,
}

impl RealtimeClient {
    pub(crate) fn new(config: SupabaseConfig) -> Self {
        Self { config }
    }

    /// Open a socket and deliver every matching changed row to `on_record`
    ///
    /// One subscription per call; the handle must be kept alive for the
    /// feed's lifetime and released with [`RealtimeSubscription::unsubscribe`].
    pub fn subscribe<T, F>(
        &self,
        channel: &str,
        table: &str,
        event: ChangeEvent,
        on_record: F,
    ) -> ClientResult<RealtimeSubscription>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + 'static,
    {
        let url = websocket_url(&self.config.url, &self.config.anon_key);
        let socket =
            WebSocket::new(&url).map_err(|e| ClientError::Socket(format!("{:?}", e)))?;
        let topic = format!("realtime:{}", channel);
        let alive = Rc::new(Cell::new(true));

        let join = serde_json::to_string(&join_message(&topic, table, event))
            .map_err(|e| ClientError::Encode(e.to_string()))?;
        let open_socket = socket.clone();
        let heartbeat_alive = alive.clone();
        let onopen = Closure::<dyn FnMut()>::new(move || {
            if let Err(e) = open_socket.send_with_str(&join) {
                log::error!("realtime: join failed: {:?}", e);
                return;
            }
            let socket = open_socket.clone();
            let alive = heartbeat_alive.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let mut message_ref = 2u64;
                while alive.get() {
                    TimeoutFuture::new(HEARTBEAT_INTERVAL_MS).await;
                    if !alive.get() {
                        break;
                    }
                    message_ref += 1;
                    if let Ok(raw) = serde_json::to_string(&heartbeat_message(message_ref)) {
                        let _ = socket.send_with_str(&raw);
                    }
                }
            });
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let message_topic = topic.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
            let Some(text) = ev.data().as_string() else { return };
            match serde_json::from_str::<PhoenixMessage>(&text) {
                Ok(msg) => {
                    if msg.topic != message_topic {
                        return;
                    }
                    if let Some(record) = decode_record::<T>(&msg, event) {
                        on_record(record);
                    }
                }
                Err(e) => log::warn!("realtime: undecodable frame: {}", e),
            }
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let onerror = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
            log::error!("realtime: socket error");
        });
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        Ok(RealtimeSubscription {
            socket,
            topic,
            alive,
            _onopen: onopen,
            _onmessage: onmessage,
            _onerror: onerror,
        })
    }
}

/// Live feed handle; closures stay registered for exactly its lifetime
pub struct RealtimeSubscription {
    socket: WebSocket,
    topic: String,
    alive: Rc<Cell<bool>>,
    _onopen: Closure<dyn FnMut()>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(web_sys::Event)>,
}

impl RealtimeSubscription {
    /// Leave the channel, stop the heartbeat, close the socket
    pub fn unsubscribe(self) {
        self.alive.set(false);
        if let Ok(raw) = serde_json::to_string(&leave_message(&self.topic)) {
            let _ = self.socket.send_with_str(&raw);
        }
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onerror(None);
        let _ = self.socket.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Row {
        id: i64,
        title: String,
    }

    #[test]
    fn websocket_url_upgrades_scheme() {
        assert_eq!(
            websocket_url("https://proj.supabase.co", "k"),
            "wss://proj.supabase.co/realtime/v1/websocket?apikey=k&vsn=1.0.0"
        );
        assert!(websocket_url("http://localhost:54321", "k").starts_with("ws://localhost:54321/"));
    }

    #[test]
    fn join_message_scopes_table_and_event() {
        let msg = join_message("realtime:tasks-channel", "tasks", ChangeEvent::Insert);
        assert_eq!(msg.event, "phx_join");
        let changes = &msg.payload["config"]["postgres_changes"][0];
        assert_eq!(changes["event"], "INSERT");
        assert_eq!(changes["schema"], "public");
        assert_eq!(changes["table"], "tasks");
    }

    #[test]
    fn heartbeat_targets_phoenix_topic() {
        let msg = heartbeat_message(3);
        assert_eq!(msg.topic, "phoenix");
        assert_eq!(msg.event, "heartbeat");
        assert_eq!(msg.message_ref.as_deref(), Some("3"));
    }

    #[test]
    fn decode_record_extracts_inserted_row() {
        let raw = r#"{
            "topic": "realtime:tasks-channel",
            "event": "postgres_changes",
            "payload": {
                "ids": [1],
                "data": {
                    "type": "INSERT",
                    "table": "tasks",
                    "record": { "id": 1, "title": "Buy milk" }
                }
            },
            "ref": null
        }"#;
        let msg: PhoenixMessage = serde_json::from_str(raw).unwrap();
        let row: Option<Row> = decode_record(&msg, ChangeEvent::Insert);
        assert_eq!(row, Some(Row { id: 1, title: "Buy milk".into() }));
    }

    #[test]
    fn decode_record_ignores_replies() {
        let msg = PhoenixMessage {
            topic: "realtime:tasks-channel".into(),
            event: "phx_reply".into(),
            payload: serde_json::json!({ "status": "ok" }),
            message_ref: Some("1".into()),
        };
        assert!(decode_record::<Row>(&msg, ChangeEvent::Insert).is_none());
    }

    #[test]
    fn decode_record_ignores_other_event_kinds() {
        let msg = PhoenixMessage {
            topic: "realtime:tasks-channel".into(),
            event: "postgres_changes".into(),
            payload: serde_json::json!({
                "data": { "type": "UPDATE", "record": { "id": 1, "title": "x" } }
            }),
            message_ref: None,
        };
        assert!(decode_record::<Row>(&msg, ChangeEvent::Insert).is_none());
    }

    #[test]
    fn phoenix_frame_roundtrips() {
        let msg = leave_message("realtime:tasks-channel");
        let raw = serde_json::to_string(&msg).unwrap();
        let back: PhoenixMessage = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.event, "phx_leave");
        assert_eq!(back.message_ref.as_deref(), Some("2"));
    }
}
