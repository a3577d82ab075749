//! Keyboard input: mapping key events to editor actions

pub mod keybindings;
