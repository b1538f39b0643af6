//! `specdev serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use specdev_build::BuildRunner;
use specdev_config::{CliSettings, Config, WatchMode};
use specdev_server::{AppState, DevSession, RebuildOutcome, ReloadHub, run_server};
use specdev_watch::{ChangeNotifier, MtimePoller, NativeWatcher, RebuildDebouncer};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::CliError;
use crate::output::Output;

/// How often pending debounced changes are checked for readiness.
const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover specdev.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port for the documentation server (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Port for the live reload WebSocket (overrides config).
    #[arg(long)]
    reload_port: Option<u16>,

    /// OpenAPI spec file to watch and build from (overrides config).
    #[arg(short, long)]
    spec_file: Option<String>,

    /// HTML file produced by the build (overrides config).
    #[arg(long)]
    output_file: Option<String>,

    /// Enable verbose output (show request and watcher logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the spec file is missing,
    /// the watcher cannot start or the server fails.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        // Build CLI settings from args
        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            reload_port: self.reload_port,
            spec_file: self.spec_file,
            output_file: self.output_file,
        };

        // Load config
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        // The watched file must exist before any listener comes up
        let spec_file = config.docs_resolved.spec_file.clone();
        if !spec_file.exists() {
            return Err(CliError::SpecFileMissing(spec_file));
        }

        let state = Arc::new(AppState {
            root: config.docs_resolved.root.clone(),
            output_file: config.docs_resolved.output_file.clone(),
            reload_port: config.server.reload_port,
            hub: ReloadHub::new(),
        });

        let runner = BuildRunner::new(
            config.build_resolved.command.clone(),
            config.build_resolved.args.clone(),
            config.docs_resolved.root.clone(),
        );
        let session = DevSession::new(Arc::clone(&state), runner);

        print_banner(&output, &config);

        let server_config = specdev_server::ServerConfig {
            host: config.server.host.clone(),
            port: config.server.port,
            reload_port: config.server.reload_port,
        };

        // The server side completes once the watch side signals shutdown
        let (shutdown_tx, shutdown_rx) = watch::channel(());

        let server = async {
            run_server(server_config, Arc::clone(&state), shutdown_rx)
                .await
                .map_err(CliError::from)
        };
        let cycle = watch_and_rebuild(&output, &config, &session, shutdown_tx);

        tokio::try_join!(server, cycle)?;
        output.success("Dev server stopped");
        Ok(())
    }
}

/// Print startup information.
fn print_banner(output: &Output, config: &Config) {
    output.highlight("Starting OpenAPI dev server");
    output.info(&format!(
        "Server running at http://{}:{}",
        config.server.host, config.server.port
    ));
    output.info(&format!(
        "Live reload socket on ws://{}:{}",
        config.server.host, config.server.reload_port
    ));
    output.info(&format!(
        "Watching {} for changes",
        config.docs_resolved.spec_file.display()
    ));
    output.info("Press Ctrl+C to stop");
}

/// Run the initial build, then rebuild on debounced spec changes until a
/// shutdown signal arrives.
async fn watch_and_rebuild(
    output: &Output,
    config: &Config,
    session: &DevSession,
    shutdown: watch::Sender<()>,
) -> Result<(), CliError> {
    let notifier = notifier_for(config);
    let (mut changes, handle) = notifier.watch()?;

    // Initial build so the page exists before the first request
    output.info(&format!(
        "Building documentation with `{}`",
        session.command()
    ));
    report_outcome(output, session.rebuild().await);

    let debouncer = RebuildDebouncer::new(config.watch.debounce_window());
    let mut drain = tokio::time::interval(DRAIN_INTERVAL);
    drain.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let signals = shutdown_signal();
    tokio::pin!(signals);

    let mut watching = true;
    loop {
        tokio::select! {
            event = changes.recv(), if watching => match event {
                Some(event) => {
                    tracing::debug!(path = %event.path.display(), "change detected");
                    debouncer.record();
                }
                None => {
                    watching = false;
                    output.warning("File watching stopped; rebuild on change is disabled");
                }
            },
            _ = drain.tick() => {
                if debouncer.take_ready() {
                    output.info("Change detected, rebuilding...");
                    report_outcome(output, session.rebuild().await);
                }
            }
            () = &mut signals => {
                output.info("Shutting down dev server...");
                break;
            }
        }
    }

    handle.stop();
    let _ = shutdown.send(());
    Ok(())
}

/// Select the change detection mechanism from config.
fn notifier_for(config: &Config) -> Box<dyn ChangeNotifier> {
    let spec_file = config.docs_resolved.spec_file.clone();
    match config.watch.mode {
        WatchMode::Poll => Box::new(MtimePoller::new(spec_file, config.watch.poll_interval())),
        WatchMode::Native => Box::new(NativeWatcher::new(spec_file)),
    }
}

/// Report a build cycle result to the operator.
fn report_outcome(output: &Output, outcome: RebuildOutcome) {
    match outcome {
        RebuildOutcome::Completed { notified, injected } => {
            output.success("Documentation built successfully");
            if !injected {
                output.warning("Live reload script could not be added to the output file");
            }
            if notified > 0 {
                output.info(&format!("Reload sent to {notified} browser(s)"));
            }
        }
        RebuildOutcome::Failed { code, stderr } => {
            match code {
                Some(code) => output.error(&format!("Build failed with exit code {code}")),
                None => output.error("Build terminated by a signal"),
            }
            let stderr = stderr.trim_end();
            if !stderr.is_empty() {
                output.error(stderr);
            }
        }
        RebuildOutcome::NotStarted(err) => {
            output.error(&format!("Build failed to start: {err}"));
        }
    }
}

/// Wait for Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
