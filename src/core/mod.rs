//! View-state engine: scroll tracking, reveals, navigation, timers, the
//! contact form and the theme preference.
//!
//! Nothing in this module depends on any TUI or rendering crate, and
//! nothing reads the wall clock: time arrives as [`clock::Millis`].

pub mod carousel;
pub mod clock;
pub mod counters;
pub mod effects;
pub mod filter;
pub mod form;
pub mod nav;
pub mod notice;
pub mod observe;
pub mod page;
pub mod reveal;
pub mod scroll;
pub mod smooth;
pub mod theme;
pub mod tracking;
