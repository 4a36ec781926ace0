use crate::types::NodeId;
use thiserror::Error;

/// Rejections raised by the IC pad/via pattern generator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("pin count must be at least 1")]
    NoPins,

    #[error("two-sided placement needs an even pin count, got {0}")]
    OddPinCount(usize),

    #[error("four-sided placement needs a pin count divisible by 4, got {0}")]
    NotDivisibleByFour(usize),

    #[error("placement rectangle has zero width or height")]
    DegenerateRectangle,

    #[error("{orientation} two-sided placement cannot start with pin 1 at the {corner} corner")]
    Pin1Corner {
        orientation: &'static str,
        corner: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum AnnotateError {
    #[error("invalid placement: {0}")]
    Placement(#[from] PlacementError),

    #[error("node {node_id} is already claimed by a {claimed_by} symbol")]
    NodeConflict {
        node_id: NodeId,
        claimed_by: &'static str,
    },

    #[error("bus {bus_id} is still used by {symbols} symbol(s)")]
    BusInUse { bus_id: String, symbols: usize },

    #[error("no {kind} with id {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{designator} has no pin {pin} (pin count {pin_count})")]
    PinOutOfRange {
        designator: String,
        pin: usize,
        pin_count: usize,
    },

    #[error("no node ids left after {0}")]
    NodeIdsExhausted(NodeId),

    #[error("designator {0} is already in use")]
    DuplicateDesignator(String),

    #[error("a trace needs at least two points, got {0}")]
    InvalidTrace(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
