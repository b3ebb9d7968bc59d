//! Transient on-screen notices.

use super::clock::Millis;

pub const NOTICE_LIFETIME: Millis = 5000;

pub const RESUME_UNAVAILABLE: &str =
    "Resume download will be available soon. Please contact me directly for the latest version.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub text: String,
    pub expires_at: Millis,
}

#[derive(Debug, Default)]
pub struct Notices {
    next_id: u64,
    live: Vec<Notice>,
}

impl Notices {
    /// Post a notice; returns its id, to be passed to [`dismiss`](Self::dismiss)
    /// when its expiry timer fires.
    pub fn push(&mut self, kind: NoticeKind, text: impl Into<String>, now: Millis) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.live.push(Notice {
            id,
            kind,
            text: text.into(),
            expires_at: now + NOTICE_LIFETIME,
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.live.len();
        self.live.retain(|n| n.id != id);
        self.live.len() != before
    }

    /// Newest first.
    pub fn latest(&self) -> Option<&Notice> {
        self.live.last()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
