// Image candidate sources: where filenames for a matching run come from.

pub mod directory;
pub mod traits;

pub use directory::DirectorySource;
pub use traits::{CandidateSource, FixedSource};
