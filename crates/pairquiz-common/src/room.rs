use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::room_code::RoomCode;

/// Rooms hold exactly two participants once a round is running.
pub const ROOM_CAPACITY: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room is full")]
    RoomFull,
}

/// Derived view of where a room sits in its lifecycle. Transitions are
/// driven solely by join/submit/advance/disconnect; there are no
/// timeout-driven transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Fewer than two participants; the round has not started.
    Waiting,
    /// Two participants, answers still being collected.
    Active,
    /// Both answers in; results are out and the room awaits an explicit
    /// advance to the next round.
    ResultsPending,
}

/// One participant's revealed answer, in slot (join) order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEntry {
    pub id: Uuid,
    pub answer: String,
}

/// Two answers match iff they are equal after trimming surrounding
/// whitespace and lowercasing. No fuzzy matching.
pub fn answers_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// A paired question/answer session. All mutation goes through the methods
/// below; the coordinator serializes access behind the registry lock.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    /// Join order; slot 0 is the first joiner. Order only affects how
    /// results are labeled, not game logic.
    pub participants: Vec<Uuid>,
    pub question_index: usize,
    pub round: u32,
    pub pending_answers: HashMap<Uuid, String>,
}

impl Room {
    pub fn new(code: RoomCode) -> Self {
        Self {
            code,
            participants: Vec::new(),
            question_index: 0,
            round: 1,
            pending_answers: HashMap::new(),
        }
    }

    /// Append a participant in join order. Identity is a transient
    /// connection handle, so the same id joining twice occupies two slots;
    /// callers are expected not to re-issue a join for a live connection.
    pub fn add_participant(&mut self, id: Uuid) -> Result<(), RoomError> {
        if self.participants.len() >= ROOM_CAPACITY {
            return Err(RoomError::RoomFull);
        }
        self.participants.push(id);
        Ok(())
    }

    /// Remove a participant along with any answer it had pending this
    /// round. Returns whether the id was present.
    pub fn remove_participant(&mut self, id: &Uuid) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p != id);
        self.pending_answers.remove(id);
        self.participants.len() != before
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= ROOM_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Record an answer for the current round, overwriting any earlier
    /// submission from the same participant. Answers from connections that
    /// are not members of this room are dropped; returns whether the
    /// answer was stored.
    pub fn record_answer(&mut self, id: Uuid, answer: String) -> bool {
        if !self.participants.contains(&id) {
            return false;
        }
        self.pending_answers.insert(id, answer);
        true
    }

    pub fn answers_complete(&self) -> bool {
        self.participants.len() == ROOM_CAPACITY
            && self
                .participants
                .iter()
                .all(|id| self.pending_answers.contains_key(id))
    }

    /// Slot-ordered answers plus the match flag, once both are in.
    pub fn round_results(&self) -> Option<(Vec<AnswerEntry>, bool)> {
        if !self.answers_complete() {
            return None;
        }
        let answers: Vec<AnswerEntry> = self
            .participants
            .iter()
            .map(|id| AnswerEntry {
                id: *id,
                answer: self.pending_answers[id].clone(),
            })
            .collect();
        let matched = answers_match(&answers[0].answer, &answers[1].answer);
        Some((answers, matched))
    }

    /// Start the next round: clear collected answers, step the question
    /// index (wrapping at the end of the deck), bump the round counter.
    pub fn advance(&mut self, deck_len: usize) {
        self.pending_answers.clear();
        self.question_index = (self.question_index + 1) % deck_len;
        self.round += 1;
    }

    pub fn phase(&self) -> RoomPhase {
        if self.participants.len() < ROOM_CAPACITY {
            RoomPhase::Waiting
        } else if self.answers_complete() {
            RoomPhase::ResultsPending
        } else {
            RoomPhase::Active
        }
    }
}
