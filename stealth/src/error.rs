use definitions::Label;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("the flow network is infeasible (required flow {required})")]
    Infeasible { required: usize },
    #[error("cannot pick {k} distinct neighbors out of {n} items")]
    DegenerateNeighborhood { n: usize, k: usize },
    #[error("label {label} has no class size")]
    MissingClassSize { label: Label },
    #[error("the dataset is empty")]
    EmptyDataSet,
    #[error("capacity overflow while building the network")]
    CapacityOverflow,
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<TransportError> for std::io::Error {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Io(e) => e,
            TransportError::Parse { .. } => {
                std::io::Error::new(std::io::ErrorKind::InvalidData, error.to_string())
            }
            _ => std::io::Error::new(std::io::ErrorKind::Other, error.to_string()),
        }
    }
}
