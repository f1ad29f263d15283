// file: src/chat/mod.rs
// description: RAG chat module exports

pub mod engine;

pub use engine::ChatEngine;
