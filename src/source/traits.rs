use crate::model::SourceError;

/// Ordered pool of image filenames for one reconciliation run.
pub trait CandidateSource {
    /// Takes a snapshot of filenames (with extensions) in enumeration order.
    fn snapshot(&self) -> Result<Vec<String>, SourceError>;
}

/// A fixed list of filenames, handy for fixtures.
#[derive(Debug, Clone, Default)]
pub struct FixedSource(pub Vec<String>);

impl FixedSource {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

impl CandidateSource for FixedSource {
    fn snapshot(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.0.clone())
    }
}
