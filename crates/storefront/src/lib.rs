//! Orchard Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused. The binary in `main.rs` wires the
//! router, session layer, and observability stack around it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod currency;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod routes;
pub mod services;
pub mod state;
