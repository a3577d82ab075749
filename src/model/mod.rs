//! Core data model: the document, its history and selections

pub mod document;
pub mod event;
pub mod history;
pub mod selection;
