//! # Freshet
//!
//! A conditional-fetch change detector for documents that are polled on an
//! interval.
//!
//! ## Architecture
//!
//! ```text
//! InputRef → resolve → ChangeAwareFetcher → FetchOutcome → caller
//!                          │        │
//!                      Transport  RequestHooks
//! ```
//!
//! For every poll the fetcher decides whether the document changed:
//!
//! 1. a HEAD probe revalidated with `ETag` / `Last-Modified`, skipped on the
//!    first poll and for servers that reject HEAD;
//! 2. a GET whose body is compared with the previous one when the server
//!    offers no validators.
//!
//! Local files and inline data are reported once per session.
//!
//! ## Quick Start
//!
//! ```bash
//! # Poll once, keeping state between runs
//! freshet check https://example.com/openapi.json --state state.json
//!
//! # Watch several sources and save every changed body
//! freshet watch https://example.com/openapi.json ./local.yaml -i 30s -o out/
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: TOML configuration
//! - [`domain`]: Inputs, watch state, responses, outcomes
//! - [`fetcher`]: The change-aware fetcher
//! - [`hooks`]: Request lifecycle hooks
//! - [`store`]: Watch-state persistence
//! - [`transport`]: HTTP transport abstraction
//! - [`watch`]: Interval polling of many sources

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the transport,
/// hooks, and fetcher from a loaded configuration.
pub mod app;

/// Command-line interface using clap.
///
/// - `check <input>...` - Poll once
/// - `watch <input>...` - Poll on an interval
pub mod cli;

/// Configuration loaded from `~/.config/freshet/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`InputRef`](domain::InputRef) / [`ResolvedInput`](domain::ResolvedInput)
/// - [`WatchState`](domain::WatchState): per-source state between polls
/// - [`FetchOutcome`](domain::FetchOutcome): `Content`, `NotModified`, or `NotOk`
pub mod domain;

/// Change detection.
///
/// - [`ChangeAwareFetcher`](fetcher::ChangeAwareFetcher): HEAD probe, validators, content fallback
/// - [`RequestOptions`](fetcher::RequestOptions): caller headers
pub mod fetcher;

/// Hooks invoked around every network call.
pub mod hooks;

/// Watch-state persistence.
///
/// - [`StateStore`](store::StateStore): Trait defining storage operations
/// - [`JsonStateStore`](store::JsonStateStore): single JSON file
pub mod store;

/// HTTP transport.
///
/// - [`Transport`](transport::Transport): Async trait for sending one request
/// - [`ReqwestTransport`](transport::ReqwestTransport): reqwest-based implementation
pub mod transport;

/// Watch mode: polls many sources on a fixed interval.
pub mod watch;
