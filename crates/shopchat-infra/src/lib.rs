//! Infrastructure layer for the storefront chat widget.
//!
//! Contains implementations of the service traits defined in `shopchat-core`:
//! the aiban.vn chat completion and history client, the storefront backend
//! client that persists bot replies, and configuration loading.

pub mod aiban;
pub mod backend;
pub mod config;
