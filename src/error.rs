use crate::identity::{ItemId, SessionId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("An error occurred while encoding or decoding the history state: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("history entry belongs to session {0}, the stack cannot be matched against it")]
    ForeignSession(SessionId),
    #[error("no history state is available")]
    MissingState,
    #[error("no page with id {0} is on the stack")]
    UnknownItem(ItemId),
}
