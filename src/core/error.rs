use thiserror::Error;

/// Message shown whenever the analysis service cannot be reached or answers
/// with something that is not a recognizable reply.
pub const TRANSPORT_ERROR_MESSAGE: &str =
    "Failed to connect to the analysis service. Make sure the server is running and reachable.";

/// Input problems caught locally, before anything is sent over the network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Ticker must not be empty")]
    EmptyTicker,

    #[error("Quantity '{0}' is not a number")]
    InvalidQuantity(String),

    #[error("Risk-free rate must be a finite number")]
    NonFiniteRate,

    #[error("Please add at least one stock holding")]
    EmptyPortfolio,
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", TRANSPORT_ERROR_MESSAGE)]
    Transport(#[source] anyhow::Error),

    #[error("{0}")]
    Service(String),

    /// A newer analysis started before this one finished.
    #[error("Analysis superseded by a newer request")]
    Superseded,
}
