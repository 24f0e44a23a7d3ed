// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Notice queue: inline messages with TTL + dedupe, and blocking
//! acknowledgements that stay until dismissed. Any notice may be deferred.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How a notice is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Inline text next to the affected view; expires on its own.
    Inline,
    /// Acknowledgement the user must dismiss explicitly.
    Blocking,
}

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTone {
    /// Informational note.
    Info,
    /// Expected business outcome the user should notice.
    Warn,
    /// Failure requiring user awareness.
    Error,
}

/// Identifier for a notice entry.
pub type NoticeId = u64;

/// Notice data stored in the service.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Stable identifier.
    pub id: NoticeId,
    /// Presentation.
    pub kind: NoticeKind,
    /// Severity.
    pub tone: NoticeTone,
    /// Short title line.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
    /// Time-to-live for inline notices; `None` for blocking ones.
    pub ttl: Option<Duration>,
    /// Earliest instant the notice may be shown.
    pub reveal_at: Instant,
}

/// Rendering-friendly view of a notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeRender {
    /// Stable identifier.
    pub id: NoticeId,
    /// Presentation.
    pub kind: NoticeKind,
    /// Severity.
    pub tone: NoticeTone,
    /// Short title line.
    pub title: String,
    /// Optional body text.
    pub body: Option<String>,
}

/// In-memory notice queue.
pub struct NoticeService {
    queue: VecDeque<Notice>,
    max: usize,
    dedupe_window: Duration,
    next_id: NoticeId,
}

impl NoticeService {
    /// Create a new queue with a maximum length.
    pub fn new(max: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            max,
            dedupe_window: Duration::from_millis(500),
            next_id: 1,
        }
    }

    /// Push an inline notice, deduping identical recent entries (same tone/title/body within `dedupe_window`).
    pub fn push_inline<S, B>(
        &mut self,
        tone: NoticeTone,
        title: S,
        body: B,
        ttl: Duration,
        now: Instant,
    ) -> NoticeId
    where
        S: Into<String>,
        B: Into<Option<String>>,
    {
        let title = title.into();
        let body = body.into();

        if let Some(existing) = self.queue.iter_mut().find(|n| {
            n.kind == NoticeKind::Inline
                && n.tone == tone
                && n.title == title
                && n.body == body
                && now.saturating_duration_since(n.reveal_at) <= self.dedupe_window
        }) {
            existing.reveal_at = now;
            existing.ttl = Some(ttl);
            return existing.id;
        }

        self.enqueue(NoticeKind::Inline, tone, title, body, Some(ttl), now)
    }

    /// Push a blocking acknowledgement that becomes visible at `reveal_at`.
    pub fn push_blocking<S, B>(
        &mut self,
        tone: NoticeTone,
        title: S,
        body: B,
        reveal_at: Instant,
    ) -> NoticeId
    where
        S: Into<String>,
        B: Into<Option<String>>,
    {
        self.enqueue(
            NoticeKind::Blocking,
            tone,
            title.into(),
            body.into(),
            None,
            reveal_at,
        )
    }

    fn enqueue(
        &mut self,
        kind: NoticeKind,
        tone: NoticeTone,
        title: String,
        body: Option<String>,
        ttl: Option<Duration>,
        reveal_at: Instant,
    ) -> NoticeId {
        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() == self.max {
            // Evict the oldest inline notice first; blocking ones wait for dismissal.
            let victim = self
                .queue
                .iter()
                .position(|n| n.kind == NoticeKind::Inline)
                .unwrap_or(0);
            self.queue.remove(victim);
        }
        self.queue.push_back(Notice {
            id,
            kind,
            tone,
            title,
            body,
            ttl,
            reveal_at,
        });
        id
    }

    /// Drop expired inline notices (call once per tick).
    pub fn retain_visible(&mut self, now: Instant) {
        self.queue.retain(|n| !Self::expired(n, now));
    }

    /// Return notices that are revealed and not expired, oldest first.
    pub fn visible(&self, now: Instant) -> Vec<NoticeRender> {
        self.queue
            .iter()
            .filter(|n| n.reveal_at <= now && !Self::expired(n, now))
            .map(|n| NoticeRender {
                id: n.id,
                kind: n.kind,
                tone: n.tone,
                title: n.title.clone(),
                body: n.body.clone(),
            })
            .collect()
    }

    /// Time until the next deferred notice is revealed, if any is still pending.
    pub fn next_reveal(&self, now: Instant) -> Option<Duration> {
        self.queue
            .iter()
            .filter(|n| n.reveal_at > now)
            .map(|n| n.reveal_at - now)
            .min()
    }

    /// Dismiss a notice. Returns `false` when the id is unknown.
    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.id != id);
        self.queue.len() != before
    }

    /// Number of notices still held (revealed or pending).
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn expired(n: &Notice, now: Instant) -> bool {
        n.ttl
            .is_some_and(|ttl| now.saturating_duration_since(n.reveal_at) >= ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_notices_dedupe_and_expire() {
        let mut svc = NoticeService::new(4);
        let now = Instant::now();
        let a = svc.push_inline(NoticeTone::Error, "offline", None, Duration::from_secs(2), now);
        let b = svc.push_inline(
            NoticeTone::Error,
            "offline",
            None,
            Duration::from_secs(2),
            now + Duration::from_millis(100),
        );
        assert_eq!(a, b);
        assert_eq!(svc.len(), 1);
        svc.retain_visible(now + Duration::from_secs(5));
        assert!(svc.is_empty());
    }

    #[test]
    fn blocking_notices_stay_until_dismissed() {
        let mut svc = NoticeService::new(4);
        let now = Instant::now();
        let id = svc.push_blocking(NoticeTone::Warn, "already applied", None, now);
        svc.retain_visible(now + Duration::from_secs(3600));
        assert_eq!(svc.visible(now + Duration::from_secs(3600)).len(), 1);
        assert!(svc.dismiss(id));
        assert!(!svc.dismiss(id));
        assert!(svc.is_empty());
    }

    #[test]
    fn deferred_notice_is_hidden_until_reveal() {
        let mut svc = NoticeService::new(4);
        let now = Instant::now();
        svc.push_blocking(
            NoticeTone::Info,
            "complete",
            None,
            now + Duration::from_secs(2),
        );
        assert!(svc.visible(now).is_empty());
        assert_eq!(svc.next_reveal(now), Some(Duration::from_secs(2)));
        let later = now + Duration::from_secs(2);
        assert_eq!(svc.visible(later).len(), 1);
        assert_eq!(svc.next_reveal(later), None);
    }

    #[test]
    fn full_queue_evicts_inline_before_blocking() {
        let mut svc = NoticeService::new(2);
        let now = Instant::now();
        let keep = svc.push_blocking(NoticeTone::Warn, "ack me", None, now);
        svc.push_inline(NoticeTone::Info, "a", None, Duration::from_secs(9), now);
        svc.push_inline(NoticeTone::Info, "b", None, Duration::from_secs(9), now);
        let ids: Vec<_> = svc.visible(now).into_iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&keep));
    }
}
