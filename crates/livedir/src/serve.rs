//! Serve command implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use livedir_config::{CliSettings, Config};
use livedir_server::{ServeOptions, Server};
use livedir_watch::{WatchRegistry, register_watches, scan_static_files};

use crate::error::CliError;
use crate::output::Output;

/// Delay between server start and opening the browser.
const OPEN_DELAY: Duration = Duration::from_secs(1);

/// Arguments for serving the current directory.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Port to bind to [default: 8000].
    #[arg(long)]
    port: Option<u16>,

    /// Host to bind to [default: 127.0.0.1].
    #[arg(long)]
    host: Option<String>,

    /// Automatically open the browser (default).
    #[arg(long, overrides_with = "no_open")]
    open: bool,

    /// Don't open the browser automatically.
    #[arg(long, overrides_with = "open")]
    no_open: bool,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output (log watcher and reload activity).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = self.load_config()?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration file");
        }
        let root = std::env::current_dir()?;

        let mut server =
            Server::new().with_debounce(Duration::from_millis(config.live_reload.debounce_ms));
        register_site(&root, &mut server);

        let server_config = config.server;
        output.highlight(&format!(
            "Serving on http://{}:{} (livereload enabled)",
            server_config.host, server_config.port
        ));

        server
            .serve(ServeOptions {
                root,
                host: server_config.host,
                port: server_config.port,
                open_delay: server_config.open_browser.then_some(OPEN_DELAY),
            })
            .await?;

        Ok(())
    }

    /// Load configuration with command-line overrides applied.
    fn load_config(&self) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), Some(&self.cli_settings()))?)
    }

    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            host: self.host.clone(),
            port: self.port,
            open_browser: self.resolve_open_browser(),
        }
    }

    /// Resolve `open_browser` from --open/--no-open flags; the last one given wins.
    fn resolve_open_browser(&self) -> Option<bool> {
        if self.no_open {
            Some(false)
        } else if self.open {
            Some(true)
        } else {
            None
        }
    }
}

/// Watch the default globs plus every static file currently under `root`.
///
/// Returns how many files were found.
fn register_site<R>(root: &Path, registry: &mut R) -> usize
where
    R: WatchRegistry + ?Sized,
{
    let files = scan_static_files(root);
    register_watches(registry, &files);
    files.len()
}
