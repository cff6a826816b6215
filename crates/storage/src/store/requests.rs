#![forbid(unsafe_code)]

use rk_core::model::Visibility;

#[derive(Clone, Debug)]
pub struct CreateUserRequest {
    pub id: String,
    pub username: String,
    /// None for local accounts, the remote host for federated ones.
    pub host: Option<String>,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct CreateNoteRequest {
    pub id: String,
    pub user_id: String,
    pub created_at_ms: i64,
    pub text: Option<String>,
    pub reply_target_id: Option<String>,
    pub renote_target_id: Option<String>,
    pub visibility: Visibility,
    pub visible_user_ids: Vec<String>,
    pub mentions: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct AttachFileRequest {
    pub id: String,
    pub note_id: String,
    pub file_url: String,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct CreatePollRequest {
    pub note_id: String,
    pub multiple: bool,
    /// Per-option tallies, index = option index.
    pub votes: Vec<i64>,
    /// None means the voter count is not yet tracked for this poll.
    pub voter_count: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct AddPollVoteRequest {
    pub id: String,
    pub note_id: String,
    pub user_id: String,
    pub choice: usize,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct AddReactionRequest {
    pub id: String,
    pub note_id: String,
    pub user_id: String,
    pub reaction: String,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct AddNotificationRequest {
    pub id: String,
    pub notifiee_id: String,
    pub notifier_id: Option<String>,
    pub kind: String,
    pub note_id: Option<String>,
    pub created_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct NoteThreadRequest {
    pub start_id: String,
    /// Depth of `start_id` is 0; direct children are depth 1.
    pub max_depth: usize,
    /// Per-parent cap on retained children, not a global cap.
    pub max_breadth: usize,
}
