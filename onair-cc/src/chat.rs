//! Chat view state
//!
//! The author's own client both appends a message optimistically on submit
//! and receives the same message via the broadcast. Both paths funnel
//! through [`ChatLog::apply`], which deduplicates by message id: an incoming
//! copy whose id is already present is discarded, never appended twice.

use onair_common::api::ChatMessage;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

/// How long a reaction overlay stays on screen
pub const REACTION_LIFETIME: Duration = Duration::from_secs(4);

/// Bounded, id-deduplicated message list
pub struct ChatLog {
    capacity: usize,
    messages: VecDeque<ChatMessage>,
    ids: HashSet<String>,
}

impl ChatLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
            ids: HashSet::new(),
        }
    }

    /// Merge a message in, whether from an optimistic local insert, the
    /// broadcast stream, or a poll. Returns false when the id was already
    /// present (the message is discarded).
    pub fn apply(&mut self, message: ChatMessage) -> bool {
        if message.is_reaction {
            return false;
        }
        if !self.ids.insert(message.id.clone()) {
            return false;
        }

        self.messages.push_back(message);
        while self.messages.len() > self.capacity {
            if let Some(evicted) = self.messages.pop_front() {
                self.ids.remove(&evicted.id);
            }
        }
        true
    }

    /// Messages oldest-to-newest
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Transient reaction overlays with a fixed short lifetime
pub struct ReactionOverlays {
    overlays: Vec<(ChatMessage, Instant)>,
}

impl ReactionOverlays {
    pub fn new() -> Self {
        Self { overlays: Vec::new() }
    }

    /// Show a reaction, timestamped at `now`
    pub fn push(&mut self, reaction: ChatMessage, now: Instant) {
        self.overlays.push((reaction, now));
    }

    /// Drop overlays older than [`REACTION_LIFETIME`]
    pub fn prune(&mut self, now: Instant) {
        self.overlays
            .retain(|(_, shown_at)| now.duration_since(*shown_at) < REACTION_LIFETIME);
    }

    /// Currently visible overlays
    pub fn active(&self) -> impl Iterator<Item = &ChatMessage> {
        self.overlays.iter().map(|(m, _)| m)
    }
}

impl Default for ReactionOverlays {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `body` mentions `nickname` as an `@`-prefixed token.
///
/// Pure display concern: computed from the message body and the viewer's own
/// nickname, never stored. Token boundaries are non-alphanumeric characters;
/// the comparison ignores ASCII case.
pub fn is_mentioned(body: &str, nickname: &str) -> bool {
    if nickname.is_empty() {
        return false;
    }

    for (i, c) in body.char_indices() {
        if c != '@' {
            continue;
        }
        // '@' must itself sit at a token boundary
        if i > 0 {
            if let Some(prev) = body[..i].chars().next_back() {
                if prev.is_alphanumeric() || prev == '_' {
                    continue;
                }
            }
        }

        let rest = &body[i + c.len_utf8()..];
        let token: String = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if token.eq_ignore_ascii_case(nickname) {
            return true;
        }
    }
    false
}
