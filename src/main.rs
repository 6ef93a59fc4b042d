use std::sync::Arc;

use color_eyre::Result;
use freebox_watcher::adapters::{FileTokenStore, ReqwestHttpClient};
use freebox_watcher::auth::AppIdentity;
use freebox_watcher::cli::{parse_args, run_cli_command, RunOptions, VERSION};
use freebox_watcher::notifications::{call_dispatcher, voicemail_dispatcher, NotifyConfig};
use freebox_watcher::startup::{wait_for_ready, WatcherConfig};
use freebox_watcher::traits::{HttpClient, Notifier};
use freebox_watcher::watcher::{CallPoller, VoicemailPoller, Watcher};
use freebox_watcher::{FreeBox, FreeboxError};

const APP_ID: &str = "fr.freebox-watcher.notifier";
const APP_NAME: &str = "Freebox watcher";

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("freebox_watcher=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("freebox_watcher=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Handle --version and --help before any initialization
    let options = match run_cli_command(parse_args(std::env::args())) {
        Some(options) => options,
        None => return Ok(()),
    };

    color_eyre::install()?;
    init_tracing(options.verbose);

    let config = match WatcherConfig::from_env() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, options))
}

/// Print a startup error with a recovery hint and exit.
fn exit_with(error: &FreeboxError) -> ! {
    let category = error.category();
    tracing::error!(category = %category, code = error.error_code(), "{}", error);
    eprintln!("{}\n{}", error, category.recovery_hint());
    std::process::exit(1);
}

async fn run(config: WatcherConfig, options: RunOptions) -> Result<()> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());

    // Notification channels must exist before anything talks to the Freebox
    let notify_config = match NotifyConfig::load(&config.notify_config) {
        Ok(notify_config) => notify_config,
        Err(e) => exit_with(&e),
    };
    let notifier: Arc<dyn Notifier> = match notify_config.build_notifier(Arc::clone(&http)) {
        Ok(notifier) => Arc::new(notifier),
        Err(FreeboxError::Config(msg)) => {
            eprintln!(
                "No notification service loaded ({}), edit {}",
                msg,
                config.notify_config.display()
            );
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    let lookup = notify_config.build_lookup();

    let identity = AppIdentity::new(APP_ID, APP_NAME, VERSION);
    let freebox = FreeBox::builder(identity)
        .base_url(config.base_url.clone())
        .http(Arc::clone(&http))
        .store(Arc::new(FileTokenStore::with_dir(config.token_dir.clone())))
        .pairing(config.pairing_policy())
        .build()
        .await?;

    if let Err(e) = wait_for_ready(&freebox, config.ready_timeout, config.ready_poll_interval).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    match freebox.easy_login().await {
        Ok(Some(_)) => {}
        Ok(None) => {
            eprintln!("Could not log in to the Freebox: authorization was not granted");
            freebox.close().await;
            std::process::exit(1);
        }
        Err(e) => {
            freebox.close().await;
            exit_with(&e);
        }
    }

    let freebox = Arc::new(freebox);

    let calls = Watcher::new(CallPoller::new(Arc::clone(&freebox)), config.call_interval)?;
    let on_call = call_dispatcher(Arc::clone(&notifier), lookup)?;
    calls.subscribe(Arc::clone(&on_call));

    let voicemails = if options.voicemail {
        let watcher = Watcher::new(
            VoicemailPoller::new(Arc::clone(&freebox), config.voicemail_dir.clone()),
            config.voicemail_interval,
        )?;
        let on_voicemail = voicemail_dispatcher(Arc::clone(&notifier))?;
        watcher.subscribe(Arc::clone(&on_voicemail));
        Some((watcher, on_voicemail))
    } else {
        None
    };

    tracing::info!("Starting monitoring calls{}", if options.voicemail { " and voicemails" } else { "" });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    calls.unsubscribe(&on_call);
    if let Some((watcher, on_voicemail)) = &voicemails {
        watcher.unsubscribe(on_voicemail);
    }
    freebox.close().await;

    Ok(())
}
