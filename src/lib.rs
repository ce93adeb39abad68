// Configuration and shared state
pub mod config;
pub mod state;

// HTTP Server modules
pub mod handlers;
pub mod models;
pub mod routes;
pub mod sse;

// Conversation storage
pub mod conversation;

// Upstream client and streaming relay
pub mod llm;
pub mod relay;
