use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use uuid::Uuid;

use crate::models::{AppState, ChessWebSocketMessage, ClientMessage, ServerMessage};
use crate::websocket::events::{self, Connection, Outbound, Recipient};

/// WebSocket actor, one per connected client
pub struct ChessWebSocket {
    pub conn: Connection,
    pub app_state: web::Data<AppState>,
}

impl ChessWebSocket {
    pub fn new(app_state: web::Data<AppState>) -> Self {
        ChessWebSocket {
            conn: Connection::new(Uuid::new_v4().to_string()),
            app_state,
        }
    }

    fn deliver(&self, outbound: Vec<Outbound>, ctx: &mut ws::WebsocketContext<Self>) {
        for Outbound { to, message } in outbound {
            let Some(text) = encode(&message) else {
                continue;
            };
            match to {
                Recipient::Sender => ctx.text(text),
                Recipient::Connections(ids) => self.send_to(&ids, text),
            }
        }
    }

    fn send_to(&self, ids: &[String], text: String) {
        let sessions = self.app_state.sessions();
        for id in ids {
            match sessions.get(id) {
                Some(addr) => addr.do_send(ChessWebSocketMessage(text.clone())),
                None => info!("Connection {} not found in sessions", id),
            }
        }
    }
}

fn encode(message: &ServerMessage) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Failed to serialize {} message: {}", message.message_type, e);
            None
        }
    }
}

impl Actor for ChessWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let total_sessions = {
            let mut sessions = self.app_state.sessions();
            sessions.insert(self.conn.id.clone(), ctx.address());
            sessions.len()
        };
        info!("WebSocket connection started: {}", self.conn.id);
        info!("Total active sessions: {}", total_sessions);
    }

    fn stopping(&mut self, ctx: &mut Self::Context) -> Running {
        let outbound = events::handle_disconnect(&self.app_state, &self.conn.id);
        self.deliver(outbound, ctx);

        let total_sessions = {
            let mut sessions = self.app_state.sessions();
            sessions.remove(&self.conn.id);
            sessions.len()
        };
        info!("WebSocket connection closed: {}", self.conn.id);
        info!("Total active sessions: {}", total_sessions);

        Running::Stop
    }
}

impl Handler<ChessWebSocketMessage> for ChessWebSocket {
    type Result = ();

    fn handle(&mut self, msg: ChessWebSocketMessage, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChessWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {}
            Ok(ws::Message::Text(text)) => {
                match serde_json::from_str::<ClientMessage>(text.as_ref()) {
                    Ok(client_msg) => {
                        info!("{} sent {}", self.conn.id, client_msg.message_type);
                        let outbound =
                            events::handle_event(&self.app_state, &mut self.conn, client_msg);
                        self.deliver(outbound, ctx);
                    }
                    Err(e) => {
                        warn!("Error parsing client message: {}", e);
                        let reply = ServerMessage::error(
                            self.conn.room_id.clone(),
                            format!("Invalid message format: {}", e),
                        );
                        self.deliver(vec![Outbound::reply(reply)], ctx);
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported");
                let reply = ServerMessage::error(None, "Binary messages are not supported");
                self.deliver(vec![Outbound::reply(reply)], ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            _ => {
                ctx.stop();
            }
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let ws = ChessWebSocket::new(app_state);
    info!("New WebSocket connection: {}", ws.conn.id);
    ws::start(ws, &req, stream)
}
