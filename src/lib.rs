//! # Review Gateway
//!
//! A thin HTTP gateway that relays code snippets to the Google Gemini
//! `generateContent` API and returns an AI-generated code review.
//!
//! The service exposes two endpoints: a liveness check and a review
//! endpoint that validates the caller's code, wraps it in a fixed review
//! rubric, makes a single outbound call to Gemini, and relays the model's
//! text plus any cited web sources back to the caller. Each request is
//! stateless and independent; nothing is persisted.
//!
//! ```text
//! ┌──────────┐  POST /review  ┌───────────────┐  generateContent  ┌────────┐
//! │  Caller  │───────────────▶│    Gateway    │──────────────────▶│ Gemini │
//! │          │◀───────────────│ validate /    │◀──────────────────│  API   │
//! └──────────┘ review+sources │ build / parse │    candidates     └────────┘
//!                             └───────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and credential resolution |
//! | [`gemini`] | Typed Gemini wire structures and the outbound client |
//! | [`review`] | Validation, prompt construction, response extraction |
//! | [`server`] | Axum HTTP surface |

pub mod config;
pub mod gemini;
pub mod review;
pub mod server;
