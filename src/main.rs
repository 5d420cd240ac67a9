//! `imap-folder-sync` command line tool.

mod cli;

use clap::Parser;
use imap_folder_sync::{ImapProvider, SyncEngine, TracingReporter};
use std::process::ExitCode;
use tracing::error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::Args::parse();
    cli::init_tracing(args.verbose);

    let password = match cli::password(&args.username, &args.server) {
        Ok(password) => password,
        Err(err) => {
            error!(error = %err, "Failed to read password");
            return ExitCode::FAILURE;
        }
    };

    let proxy_password = match cli::proxy_password(&args) {
        Ok(proxy_password) => proxy_password,
        Err(err) => {
            error!(error = %err, "Failed to read proxy password");
            return ExitCode::FAILURE;
        }
    };

    let config = match args.into_config(password, proxy_password) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, category = %err.category(), "Invalid arguments");
            return ExitCode::FAILURE;
        }
    };

    let engine = SyncEngine::new(ImapProvider).with_reporter(TracingReporter);

    match engine.sync(&config).await {
        Ok(result) => {
            println!(
                "{} new, {} already downloaded, in {}",
                result.new_emails.len(),
                result.existing_emails.len(),
                config.messages_dir().display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let mut causes = Vec::new();
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                causes.push(cause.to_string());
                source = cause.source();
            }
            error!(
                error = %err,
                category = %err.category(),
                causes = ?causes,
                "Sync failed"
            );
            ExitCode::FAILURE
        }
    }
}
