//! Web interface for the planner
//!
//! This module provides a local web server exposing the JSON API the planner
//! page uses, plus a websocket that tells open pages to reload whenever the
//! data changes.

#[cfg(feature = "gui")]
mod server;
#[cfg(feature = "gui")]
mod watcher;
#[cfg(feature = "gui")]
mod websocket;

#[cfg(feature = "gui")]
pub use server::{AppState, DEFAULT_PORT, router, start_server};

/// Message broadcast to websocket clients when data changed.
pub fn reload_message() -> String {
    serde_json::json!({
        "type": "reload",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_reload_message_shape() {
        let value: serde_json::Value = serde_json::from_str(&super::reload_message()).unwrap();
        assert_eq!(value["type"], "reload");
        assert!(value["timestamp"].is_string());
    }
}
