//! Process exit codes.

/// Exit codes for the grokbench process.
///
/// - 0: Success (all rows processed)
/// - 1: General error (unreadable table, missing cache entry, write failure)
/// - 130: Interrupted by user (Ctrl+C, Unix 128 + SIGINT)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success: every input row was processed and written.
    Success = 0,
    /// General error: a fatal failure aborted the batch.
    GeneralError = 1,
    /// Interrupted: the run was cancelled by the operator.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "GB000",
            Self::GeneralError => "GB001",
            Self::Interrupted => "GB130",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn test_code_prefixes() {
        assert_eq!(ExitCode::Success.code_prefix(), "GB000");
        assert_eq!(ExitCode::GeneralError.code_prefix(), "GB001");
        assert_eq!(ExitCode::Interrupted.code_prefix(), "GB130");
    }
}
