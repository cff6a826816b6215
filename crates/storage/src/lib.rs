#![forbid(unsafe_code)]

mod store;

pub use store::catalog;
pub use store::engine;
pub use store::{
    AddNotificationRequest, AddPollVoteRequest, AddReactionRequest, AttachFileRequest,
    CreateNoteRequest, CreatePollRequest, CreateUserRequest, DB_FILE_NAME, NoteRow,
    NoteThreadRequest, PollReconcileOutcome, PollRow, SqliteStore, StoreError,
};
