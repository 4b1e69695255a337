use std::{fmt, io};

#[derive(Debug)]
pub enum VfError {
    /// Malformed preamble, checksum or design size mismatch against the
    /// metric file, or an unknown opcode inside a character program
    IllegalFontFile,

    /// The requested character has no packet or no metric
    IllegalCodePoint,

    /// An allocation could not be satisfied
    NoMemory,

    /// A collaborator (physical font, packet cache) could not supply what
    /// was asked of it
    Unavailable,

    IoError(io::Error),
}

impl From<io::Error> for VfError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl fmt::Display for VfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#?}", self)
    }
}

impl std::error::Error for VfError {}

pub type VfResult<T> = Result<T, VfError>;
