//! Build cycle sequencing.
//!
//! One rebuild means: run the external tool, rewrite the output with the
//! reload client, then notify connected browsers. Injection strictly
//! precedes notification and the injector flushes the file to disk, so a
//! reloading browser always fetches the rewritten output.

use std::sync::Arc;

use specdev_build::{BuildError, BuildRunner, inject_live_reload};

use crate::state::AppState;

/// Outcome of one build cycle, for operator reporting.
#[derive(Debug)]
pub enum RebuildOutcome {
    /// Build succeeded and browsers were told to reload.
    Completed {
        /// Browsers the notification went out to.
        notified: usize,
        /// Whether the reload fragment made it into the output file.
        injected: bool,
    },
    /// The tool ran but exited non-zero. The previous output stays as it
    /// was and nobody is notified.
    Failed {
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Captured stderr for the operator.
        stderr: String,
    },
    /// The tool could not be started at all.
    NotStarted(BuildError),
}

/// Couples the build runner with the served state for repeated rebuilds.
pub struct DevSession {
    state: Arc<AppState>,
    runner: BuildRunner,
}

impl DevSession {
    /// Create a session rebuilding into `state`'s output file.
    #[must_use]
    pub fn new(state: Arc<AppState>, runner: BuildRunner) -> Self {
        Self { state, runner }
    }

    /// Command the session runs, for operator messages.
    #[must_use]
    pub fn command(&self) -> &str {
        self.runner.command()
    }

    /// Run one full build cycle.
    ///
    /// A failed injection is reported but does not suppress the
    /// notification; reloading a stale page is still more useful during
    /// development than silence.
    pub async fn rebuild(&self) -> RebuildOutcome {
        let outcome = match self.runner.run().await {
            Ok(outcome) => outcome,
            Err(err) => return RebuildOutcome::NotStarted(err),
        };

        if !outcome.success() {
            return RebuildOutcome::Failed {
                code: outcome.code(),
                stderr: outcome.stderr,
            };
        }

        let injected = match inject_live_reload(&self.state.output_file, self.state.reload_port) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(%error, "could not inject live reload script");
                false
            }
        };

        let notified = self.state.hub.notify_reload();
        tracing::debug!(notified, injected, "build cycle finished");
        RebuildOutcome::Completed { notified, injected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live_reload::{RELOAD_MESSAGE, ReloadHub};
    use std::path::Path;

    fn state_for(root: &Path) -> Arc<AppState> {
        Arc::new(AppState {
            root: root.to_path_buf(),
            output_file: root.join("index.html"),
            reload_port: 3005,
            hub: ReloadHub::new(),
        })
    }

    fn sh_session(state: &Arc<AppState>, script: &str) -> DevSession {
        let runner = BuildRunner::new(
            "sh".to_owned(),
            vec!["-c".to_owned(), script.to_owned()],
            state.root.clone(),
        );
        DevSession::new(Arc::clone(state), runner)
    }

    #[tokio::test]
    async fn test_successful_cycle_injects_then_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());
        let mut rx = state.hub.subscribe();

        let session = sh_session(
            &state,
            "printf '<html><body>docs</body></html>' > index.html",
        );
        let outcome = session.rebuild().await;

        assert!(matches!(
            outcome,
            RebuildOutcome::Completed {
                notified: 1,
                injected: true
            }
        ));
        // Notification arrived and the file already carries the fragment
        assert_eq!(rx.try_recv(), Ok(RELOAD_MESSAGE));
        let html = std::fs::read_to_string(state.output_file.as_path()).unwrap();
        assert_eq!(html.matches("live-reload-script").count(), 1);
    }

    #[tokio::test]
    async fn test_failed_build_leaves_output_alone_and_stays_silent() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());
        std::fs::write(&state.output_file, "<html>previous</html>").unwrap();
        let mut rx = state.hub.subscribe();

        let session = sh_session(&state, "echo 'syntax error' >&2; exit 2");
        let outcome = session.rebuild().await;

        match outcome {
            RebuildOutcome::Failed { code, stderr } => {
                assert_eq!(code, Some(2));
                assert!(stderr.contains("syntax error"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert!(rx.try_recv().is_err(), "nobody should be notified");
        let html = std::fs::read_to_string(state.output_file.as_path()).unwrap();
        assert_eq!(html, "<html>previous</html>");
    }

    #[tokio::test]
    async fn test_missing_tool_reports_not_started() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());
        let runner = BuildRunner::new(
            "specdev-no-such-tool".to_owned(),
            Vec::new(),
            state.root.clone(),
        );
        let session = DevSession::new(Arc::clone(&state), runner);

        let outcome = session.rebuild().await;
        assert!(matches!(outcome, RebuildOutcome::NotStarted(_)));
    }

    #[tokio::test]
    async fn test_injection_failure_still_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());
        let mut rx = state.hub.subscribe();

        // Build "succeeds" but produces no output file to inject into
        let session = sh_session(&state, "true");
        let outcome = session.rebuild().await;

        assert!(matches!(
            outcome,
            RebuildOutcome::Completed {
                notified: 1,
                injected: false
            }
        ));
        assert_eq!(rx.try_recv(), Ok(RELOAD_MESSAGE));
    }
}
