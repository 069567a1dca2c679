use crate::error::Error;
use crate::history::HistoryStateRecord;
use crate::identity::SessionId;
use serde::Deserialize;
use serde_json::Value;

pub fn encode(record: &HistoryStateRecord) -> Result<Value, Error> {
    Ok(serde_json::to_value(record)?)
}

pub fn decode(state: Option<&Value>) -> Result<HistoryStateRecord, Error> {
    let state = state.ok_or(Error::MissingState)?;
    if state.is_null() {
        return Err(Error::MissingState);
    }
    Ok(HistoryStateRecord::deserialize(state)?)
}

/// Decodes `state` and rejects records written by another page load.
pub fn decode_for_session(
    state: Option<&Value>,
    session: SessionId,
) -> Result<HistoryStateRecord, Error> {
    let record = decode(state)?;
    if record.session != session {
        return Err(Error::ForeignSession(record.session));
    }
    Ok(record)
}
