//! Exit codes for the Rekono CLI.
//!
//! Scripts driving the CLI distinguish three outcomes.

/// Process exit codes.
///
/// - 0: the command ran, whatever status code the API answered with
/// - 1: local input was rejected or the request could not be completed
/// - 2: the command line itself could not be understood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RekonoExitCode {
    /// Success (0) - Command completed
    Success = 0,

    /// Failure (1) - Invalid input, authentication failure, network failure
    Failure = 1,

    /// Usage error (2) - Unknown command or missing required argument
    UsageError = 2,
}

impl RekonoExitCode {
    /// Convert to numeric exit code
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl From<RekonoExitCode> for i32 {
    fn from(code: RekonoExitCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(RekonoExitCode::Success.code(), 0);
        assert_eq!(RekonoExitCode::Failure.code(), 1);
        assert_eq!(i32::from(RekonoExitCode::UsageError), 2);
    }
}
