mod participant;
mod room;
mod vote;

use crate::types::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory record store for rooms, participants and votes.
///
/// Tables are related by id fields only. Operations that touch more than one
/// table take the locks in the order rooms, participants, votes.
#[derive(Clone)]
pub struct Store {
    pub rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
    pub participants: Arc<RwLock<HashMap<ParticipantId, Participant>>>,
    pub votes: Arc<RwLock<HashMap<VoteId, Vote>>>,
    next_vote_id: Arc<AtomicU64>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            participants: Arc::new(RwLock::new(HashMap::new())),
            votes: Arc::new(RwLock::new(HashMap::new())),
            next_vote_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn allocate_vote_id(&self) -> VoteId {
        self.next_vote_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable ordering for participant listings
fn sort_participants(participants: &mut [Participant]) {
    participants.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.id.cmp(&b.id)));
}
