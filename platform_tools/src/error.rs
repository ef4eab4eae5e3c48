use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("The fixture table '{0}' is empty")]
    EmptyFixtureTable(&'static str),
    #[error("Could not serialize the synthesized payload: {0}")]
    Serialization(String),
    #[error("Synthesis failed: {0}")]
    Failed(String),
}

impl From<serde_json::Error> for SynthesisError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
