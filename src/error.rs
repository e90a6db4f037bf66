use std::io;

use crate::engine::Cell;

/// Errors surfaced by the board engine, the policies and the report writers.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("cannot insert into cell ({}, {}): occupied or out of bounds", .0.row, .0.col)]
    InvalidCell(Cell),
    #[error("invalid tile value {0}: expected a power of two in 2..=32768")]
    InvalidTileValue(u32),
    #[error("no legal move available")]
    NoLegalMove,
    #[error("policy produced no decision although legal moves remain")]
    NoDecision,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
