//! Business logic and service trait definitions for the storefront chat widget.
//!
//! This crate defines the "ports" (service traits) that the infrastructure
//! layer implements, plus the chat exchange state machine that drives them.
//! It depends only on `shopchat-types` -- never on `shopchat-infra` or any
//! HTTP crate.

pub mod chat;
pub mod event;
pub mod service;
