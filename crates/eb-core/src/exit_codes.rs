//! Exit codes for the edgeburst CLI.
//!
//! Stable contract for scripts:
//! - 0: success
//! - 2-4: caller errors (bad arguments, unusable data, unreadable input)
//! - 10: internal errors

use eb_common::ErrorCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command completed.
    Clean = 0,

    /// Invalid arguments or parameter values (clap also exits 2 on usage errors).
    ArgsError = 2,

    /// Input has no keys or too few timestamps.
    DataError = 3,

    /// Input or config file could not be read or parsed.
    IoError = 4,

    /// Bug; please report.
    InternalError = 10,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    pub fn code_name(self) -> &'static str {
        match self {
            ExitCode::Clean => "OK_CLEAN",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::DataError => "ERR_DATA",
            ExitCode::IoError => "ERR_IO",
            ExitCode::InternalError => "ERR_INTERNAL",
        }
    }
}

impl From<ErrorCategory> for ExitCode {
    fn from(category: ErrorCategory) -> Self {
        match category {
            ErrorCategory::Parameter => ExitCode::ArgsError,
            ErrorCategory::Data => ExitCode::DataError,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}
