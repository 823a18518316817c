//! Board rooms over WebSocket.
//!
//! Clients connect to `/api/ws`, join the rooms of the boards they have open,
//! and receive the events the HTTP API broadcasts after each mutation.

pub mod events;
pub mod handler;
pub mod heartbeat;
pub mod manager;

pub use events::{BoardEvent, ClientFrame, ControlEvent, EventKind};
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::RoomManager;
