#![forbid(unsafe_code)]
#![warn(
    unused,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
//! Browser dashboard for the proxy validation scheduler.
//!
//! The yew components, the gloo-net gateway and the `localStorage` settings
//! backend only build for wasm32. Toast bookkeeping and the yewdux store are
//! plain Rust and tested natively.

pub mod models;
pub mod store;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
mod services;

#[cfg(target_arch = "wasm32")]
pub use app::run_app;
