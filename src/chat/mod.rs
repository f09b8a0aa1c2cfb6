//! # Chat Module
//!
//! Drives the topic-to-slide-deck exchange: the append-only conversation
//! log, the reqwest client for the generation backend, and the submit
//! orchestration that maps the three possible call outcomes onto messages.

pub mod client;
pub mod conversation;
pub mod orchestrator;
