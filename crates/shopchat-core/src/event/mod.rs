//! Event distribution for chat observers.

pub mod bus;
