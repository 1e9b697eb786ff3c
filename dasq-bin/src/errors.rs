#[derive(Debug, PartialEq)]
pub enum DasqCLIError {
    InvalidNamespace(String),
    FailedToReadDataAvailabilityHeader(String),
}

impl std::fmt::Display for DasqCLIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DasqCLIError::InvalidNamespace(err) => write!(f, "invalid namespace: {}", err),
            DasqCLIError::FailedToReadDataAvailabilityHeader(err) => write!(f, "{}", err),
        }
    }
}
