// Editor library - exposes the buffer controller and its collaborators

pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod persistence;
pub mod primitives;
pub mod services;
pub mod state;

#[cfg(feature = "runtime")]
pub mod app;
#[cfg(feature = "runtime")]
pub mod input;
