//! Interactive chat loop for `shopchat chat`.
//!
//! Reads lines with rustyline-async, runs each through the chat exchange,
//! and prints the finalized bot message. A spinner follows the bot typing
//! flag while an exchange is in flight.

pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
