use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque ID types for type safety
pub type RoomId = String;
pub type ParticipantId = String;
pub type VoteId = u64;
pub type RoundNo = u32;

/// Round used when a request does not name one
pub const DEFAULT_ROUND: RoundNo = 1;

pub const PASS_CARD: &str = "pass";
pub const INFINITY_CARD: &str = "infinity";

/// Cards a participant can play. An empty value means "no vote".
pub const CARD_DECK: &[&str] = &[
    "0",
    "0.5",
    "1",
    "2",
    "3",
    "5",
    "8",
    "13",
    PASS_CARD,
    INFINITY_CARD,
];

/// Check whether a value is a playable card
pub fn is_card(value: &str) -> bool {
    CARD_DECK.contains(&value)
}

fn default_round() -> RoundNo {
    DEFAULT_ROUND
}

fn default_true() -> bool {
    true
}

/// Distinguishes an absent field from an explicit `null`
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub moderator_id: String,
    pub current_story: Option<String>,
    pub current_story_title: Option<String>,
    pub is_revealed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub room_id: RoomId,
    pub name: String,
    pub is_moderator: bool,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// Active, non-moderator participants are the ones whose votes count
    pub fn is_voter(&self) -> bool {
        self.is_active && !self.is_moderator
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: VoteId,
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
    /// Card label, or empty when the participant has not voted / withdrew
    pub value: String,
    pub round: RoundNo,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn is_cast(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Room record as handed to the store
#[derive(Debug, Clone)]
pub struct NewRoom {
    pub id: RoomId,
    pub moderator_id: String,
    pub current_story: Option<String>,
    pub current_story_title: Option<String>,
    pub is_revealed: bool,
}

#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub room_id: RoomId,
    pub name: String,
    pub is_moderator: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewVote {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
    pub value: String,
    pub round: RoundNo,
}

/// Fields of a room that may be changed after creation.
///
/// `Some(None)` clears an optional story field, `None` leaves it untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomUpdate {
    #[serde(default, deserialize_with = "double_option")]
    pub current_story: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub current_story_title: Option<Option<String>>,
    #[serde(default)]
    pub is_revealed: Option<bool>,
}

impl RoomUpdate {
    pub fn touches_story(&self) -> bool {
        self.current_story.is_some() || self.current_story_title.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_story() && self.is_revealed.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ParticipantUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Room together with its active participants and the votes of every round
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomWithParticipants {
    #[serde(flatten)]
    pub room: Room,
    pub participants: Vec<Participant>,
    pub votes: Vec<Vote>,
}

// ========== Request payloads ==========

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub id: Option<RoomId>,
    pub moderator_id: String,
    #[serde(default)]
    pub current_story: Option<String>,
    #[serde(default)]
    pub current_story_title: Option<String>,
    #[serde(default)]
    pub is_revealed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub name: String,
    #[serde(default)]
    pub is_moderator: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    pub participant_id: ParticipantId,
    pub value: String,
    #[serde(default = "default_round")]
    pub round: RoundNo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoundRequest {
    #[serde(default)]
    pub round: Option<RoundNo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEstimateRequest {
    #[serde(default)]
    pub story_id: Option<String>,
    pub average_points: f64,
    #[serde(default)]
    pub field_id: Option<String>,
}

// ========== Results ==========

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Consensus {
    High,
    Medium,
    Low,
}

impl Consensus {
    /// Agreement level from the number of distinct numeric estimates
    pub fn from_distinct_values(count: usize) -> Self {
        match count {
            0 | 1 => Consensus::High,
            2 | 3 => Consensus::Medium,
            _ => Consensus::Low,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteResult {
    pub participant_id: ParticipantId,
    pub participant_name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomResults {
    pub average: f64,
    /// Number of counted votes, not room membership
    pub participants: usize,
    pub consensus: Consensus,
    pub votes: Vec<VoteResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoterStatus {
    pub participant_id: ParticipantId,
    pub name: String,
    pub has_voted: bool,
}

/// "Who has voted" indicators for a round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VotingStatus {
    pub round: RoundNo,
    pub is_revealed: bool,
    pub voter_count: usize,
    pub voted_count: usize,
    pub voters: Vec<VoterStatus>,
}
