//! Desktop integration helpers.
//!
//! The TUI owns the terminal; anything that has to leave it (opening the
//! resume in a browser) is delegated to the platform's opener process.

pub mod launcher;
