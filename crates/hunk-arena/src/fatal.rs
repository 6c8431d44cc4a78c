//! Opt-in escalation of hunk errors to process termination.
//!
//! The allocator itself always returns errors. Engines that treat
//! allocator failure as unrecoverable can call
//! [`or_fatal`](OrFatal::or_fatal) at the point where they own the hunk.

use hunk_core::HunkError;

/// Abort the process on error, after logging it.
pub trait OrFatal<T> {
    /// Return the success value, or log the error and abort.
    fn or_fatal(self) -> T;
}

impl<T> OrFatal<T> for Result<T, HunkError> {
    fn or_fatal(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::error!(error = %err, kind = ?err.kind(), "fatal hunk error");
                eprintln!("fatal: {err}");
                std::process::abort()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    const CHILD_ENV: &str = "HUNK_OR_FATAL_CHILD";

    #[test]
    fn ok_passes_through() {
        let result: Result<usize, HunkError> = Ok(64);
        assert_eq!(result.or_fatal(), 64);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn error_aborts_the_process() {
        if std::env::var_os(CHILD_ENV).is_some() {
            let result: Result<usize, HunkError> = Err(HunkError::Overflow {
                requested: 128,
                committed: 0,
                reserved: 64,
            });
            result.or_fatal();
            return;
        }

        // Re-run only this test in a child process, which must abort.
        let exe = std::env::current_exe().unwrap();
        let output = Command::new(exe)
            .args(["--exact", "fatal::tests::error_aborts_the_process", "--nocapture"])
            .env(CHILD_ENV, "1")
            .output()
            .unwrap();
        assert!(!output.status.success(), "{output:?}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(
            stderr.contains("fatal: hunk overflow: requested 128 bytes"),
            "{stderr}"
        );
    }
}
