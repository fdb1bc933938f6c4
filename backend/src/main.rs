use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use sketch_core::delete::{delete_entity, delete_selection, DeleteStatus};
use sketch_core::entity::EntityId;
use sketch_core::graph::SketchGraph;
use sketch_core::session::{HostBridge, Session, Severity};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Host bridge for one command dispatch: outbound frames are queued while
/// the session lock is held and flushed to the socket afterwards.
#[derive(Default)]
struct WsBridge {
    frames: Vec<String>,
    needs_graph_update: bool,
}

impl WsBridge {
    fn push_status(&mut self, command: &str, status: DeleteStatus) {
        let status = match status {
            DeleteStatus::Finished => "finished",
            DeleteStatus::Cancelled => "cancelled",
        };
        self.frames.push(format!(
            "STATUS_UPDATE:{}",
            json!({ "command": command, "status": status })
        ));
    }
}

impl HostBridge for WsBridge {
    fn popup(&mut self, message: &str, severity: Severity) {
        self.frames.push(format!(
            "NOTICE_UPDATE:{}",
            json!({ "message": message, "severity": severity })
        ));
    }

    fn refresh(&mut self) {
        // One refresh per top-level command; the graph snapshot is taken
        // after the lock scope so the frame reflects settled state.
        self.needs_graph_update = true;
    }

    fn release_sketch_resources(&mut self, sketch: EntityId) {
        info!("Released external resources for sketch {}", sketch);
    }
}

// Application State
struct AppState {
    session: Arc<RwLock<Session>>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let shared_state = Arc::new(AppState {
        session: Arc::new(RwLock::new(Session::new())),
    });

    // build our application with a route
    let app = Router::new()
        .route("/", get(root))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn root() -> &'static str {
    "Hello from Sketch Backend!"
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

fn graph_snapshot(session: &Session) -> String {
    serde_json::to_string(&session.graph).unwrap_or("{}".to_string())
}

fn selection_snapshot(session: &Session) -> String {
    serde_json::to_string(&session.graph.entities.selected()).unwrap_or("[]".to_string())
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("Client connected");

    // Send initial graph state
    {
        let json = {
            let session = state.session.read().unwrap();
            graph_snapshot(&session)
        };
        if socket
            .send(Message::Text(format!("GRAPH_UPDATE:{}", json)))
            .await
            .is_err()
        {
            return;
        }
    }

    while let Some(msg) = socket.recv().await {
        let msg = if let Ok(msg) = msg {
            msg
        } else {
            return;
        };

        if let Message::Text(text) = msg {
            info!("Received message: {}", text);
            let mut bridge = WsBridge::default();

            if let Some(id_str) = text.strip_prefix("DELETE_ENTITY:") {
                if let Ok(raw) = id_str.parse::<u32>() {
                    let status = {
                        let mut session = state.session.write().unwrap();
                        delete_entity(&mut session, &mut bridge, EntityId(raw))
                    };
                    info!("DELETE_ENTITY {} -> {:?}", raw, status);
                    bridge.push_status("DELETE_ENTITY", status);
                } else {
                    warn!("Invalid id for DELETE_ENTITY: {}", id_str);
                }
            } else if text == "DELETE_SELECTION" {
                let status = {
                    let mut session = state.session.write().unwrap();
                    delete_selection(&mut session, &mut bridge)
                };
                info!("DELETE_SELECTION -> {:?}", status);
                bridge.push_status("DELETE_SELECTION", status);
            } else if let Some(json_str) = text.strip_prefix("SELECT:") {
                // Expected format: SELECT:{"index": 3, "modifier": "replace"|"add"|"remove"}
                #[derive(Deserialize)]
                struct SelectCmd {
                    index: u32,
                    modifier: Option<String>,
                }

                if let Ok(cmd) = serde_json::from_str::<SelectCmd>(json_str) {
                    let id = EntityId(cmd.index);
                    let modifier = cmd.modifier.as_deref().unwrap_or("replace");
                    let update = {
                        let mut session = state.session.write().unwrap();
                        let changed = match modifier {
                            "add" => session.graph.entities.set_selected(id, true),
                            "remove" => session.graph.entities.set_selected(id, false),
                            _ => {
                                session.graph.entities.clear_selection();
                                session.graph.entities.set_selected(id, true)
                            }
                        };
                        if !changed {
                            warn!("SELECT target {} not found", id);
                        }
                        selection_snapshot(&session)
                    };
                    bridge
                        .frames
                        .push(format!("SELECTION_UPDATE:{}", update));
                } else {
                    warn!("Failed to parse SELECT command: {}", json_str);
                }
            } else if text == "CLEAR_SELECTION" {
                {
                    let mut session = state.session.write().unwrap();
                    session.graph.entities.clear_selection();
                }
                info!("Cleared selection");
                bridge.frames.push("SELECTION_UPDATE:[]".to_string());
            } else if let Some(arg) = text.strip_prefix("ACTIVATE_SKETCH:") {
                let target = if arg == "NONE" {
                    Some(None)
                } else {
                    arg.parse::<u32>().ok().map(|raw| Some(EntityId(raw)))
                };
                match target {
                    Some(sketch) => {
                        let ok = {
                            let mut session = state.session.write().unwrap();
                            session.activate_sketch(sketch)
                        };
                        if ok {
                            info!("Active sketch set to {:?}", sketch);
                        } else {
                            warn!("ACTIVATE_SKETCH target {:?} is not a live sketch", sketch);
                        }
                    }
                    None => warn!("Invalid argument for ACTIVATE_SKETCH: {}", arg),
                }
            } else if let Some(json_str) = text.strip_prefix("LOAD_GRAPH:") {
                match serde_json::from_str::<SketchGraph>(json_str) {
                    Ok(graph) => {
                        {
                            let mut session = state.session.write().unwrap();
                            session.graph = graph;
                            // A replaced graph invalidates the pointer.
                            session.activate_sketch(None);
                        }
                        info!("Graph loaded");
                        bridge.needs_graph_update = true;
                    }
                    Err(e) => warn!("Failed to parse LOAD_GRAPH payload: {}", e),
                }
            } else {
                warn!("Unknown command: {}", text);
            }

            // Flush: settled graph state first, then queued notices.
            if bridge.needs_graph_update {
                let json = {
                    let session = state.session.read().unwrap();
                    graph_snapshot(&session)
                };
                if socket
                    .send(Message::Text(format!("GRAPH_UPDATE:{}", json)))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            for frame in bridge.frames.drain(..) {
                if socket.send(Message::Text(frame)).await.is_err() {
                    return;
                }
            }
        }
    }
}
