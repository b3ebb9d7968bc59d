//! Terminal event abstraction.
//!
//! A blocking reader thread turns crossterm events into [`AppEvent`]s and
//! forwards them over a channel so the main loop stays non-blocking.  Frame
//! timing is not this module's job: the main loop runs its own interval.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

/// High-level events consumed by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// Map a raw terminal event; key releases and repeats are dropped.
pub fn translate(ev: CtEvent) -> Option<AppEvent> {
    match ev {
        CtEvent::Key(k) if k.kind == KeyEventKind::Press => Some(AppEvent::Key(k)),
        CtEvent::Mouse(m) => Some(AppEvent::Mouse(m)),
        CtEvent::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        _ => None,
    }
}

/// Spawn the reader.  `poll` bounds how long it blocks before checking
/// whether the receiver is gone.
pub fn spawn_event_reader(poll: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::task::spawn_blocking(move || loop {
        if tx.is_closed() {
            break;
        }
        match event::poll(poll) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                tracing::error!(%err, "terminal poll failed");
                break;
            }
        }
        let Ok(raw) = event::read() else {
            continue;
        };
        if let Some(ev) = translate(raw) {
            if tx.send(ev).is_err() {
                break; // receiver dropped
            }
        }
    });

    rx
}
