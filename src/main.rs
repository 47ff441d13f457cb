// Cbm - Point d'entree
// Gestionnaire d'historique de presse-papiers avec declencheur par socket
//
// Le meme binaire joue deux roles :
// - `cbm --daemon` : surveille le presse-papiers, garde l'historique et
//   ecoute sur le socket local
// - `cbm`          : client ephemere qui demande au daemon d'ouvrir le
//   selecteur (a lier a un raccourci clavier)
//
// # Configuration
// Aucun fichier n'est lu par defaut. `--config <fichier>` charge un
// fichier cle-valeur ; les options de la ligne de commande ont priorite.
// `--print-config` affiche un fichier complet avec les valeurs par defaut.
//
// # Code de sortie
// 1 si le client ne peut pas joindre le daemon (ou sur erreur fatale),
// 0 sinon.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};

use cbm::app::Daemon;
use cbm::clipboard::backend::{ArboardBackend, ClipboardBackend, CommandBackend};
use cbm::clipboard::worker::{BackendFactory, ClipboardWorker};
use cbm::config::settings::{self, BackendKind, LogLevel, Settings};
use cbm::error::CbmError;
use cbm::ipc::client::send_request;
use cbm::ipc::dispatch::Request;
use cbm::ipc::listener::IpcListener;
use cbm::system::signals::ShutdownSignals;
use cbm::ui::headless::HeadlessPicker;
use cbm::ui::menu::MenuPicker;
use cbm::ui::Picker;

#[derive(Parser, Debug)]
#[command(name = "cbm")]
#[command(about = "Clipboard history daemon and its trigger client")]
#[command(version)]
struct Args {
    /// Run as the clipboard history daemon
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Log level (DEBUG, INFO, WARNING, ERROR, CRITICAL)
    #[arg(short = 'l', long = "log_level", alias = "log-level", value_parser = parse_log_level)]
    log_level: Option<LogLevel>,

    /// Socket path (default ./cbm_sock)
    #[arg(short = 's', long = "socket_file", alias = "socket-file")]
    socket_file: Option<PathBuf>,

    /// Configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Print a configuration file with default values and exit
    #[arg(long)]
    print_config: bool,
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::from_str(s)
        .ok_or_else(|| format!("unknown log level {:?} (DEBUG, INFO, WARNING, ERROR, CRITICAL)", s))
}

/// Point d'entree principal de Cbm.
///
/// En cas d'erreur fatale, logue l'erreur et termine le processus avec
/// le code de sortie 1.
fn main() -> ExitCode {
    let args = Args::parse();

    if args.print_config {
        print!("{}", settings::default_config_text());
        return ExitCode::SUCCESS;
    }

    let settings = match load_settings(&args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("cbm: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(settings.log_level);

    let result = if args.daemon {
        run_daemon(&settings)
    } else {
        run_client(&settings)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if settings.log_level == LogLevel::Debug {
                error!("{:?}", e);
            } else if e.downcast_ref::<CbmError>().is_some_and(CbmError::is_connectivity) {
                // Daemon injoignable : le message suffit, sans l'erreur systeme
                error!("{}", e);
            } else {
                error!("{:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

/// Defauts < fichier de configuration < ligne de commande.
fn load_settings(args: &Args) -> anyhow::Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    if let Some(path) = &args.socket_file {
        settings.socket_file = path.clone();
    }
    Ok(settings)
}

fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(level.as_tracing())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    debug!("Debugging Enabled.");
}

fn run_client(settings: &Settings) -> anyhow::Result<()> {
    send_request(&settings.socket_file, Request::Paste)?;
    Ok(())
}

fn run_daemon(settings: &Settings) -> anyhow::Result<()> {
    let backend = build_backend(settings)?;
    let clipboard = ClipboardWorker::spawn(backend, settings.max_entry_size)?;
    let picker = build_picker(settings)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot build async runtime")?;

    runtime.block_on(async {
        let signals = ShutdownSignals::install()?;
        let listener = IpcListener::bind(&settings.socket_file)?;
        Daemon::new(listener, clipboard, picker, settings.poll_interval())
            .run(signals)
            .await;
        Ok::<(), anyhow::Error>(())
    })
}

/// Les commandes sont validees ici ; le backend est construit sur le
/// thread du presse-papiers.
fn build_backend(settings: &Settings) -> anyhow::Result<BackendFactory> {
    let factory: BackendFactory = match settings.backend {
        BackendKind::Arboard => Box::new(|| Box::new(ArboardBackend::new()) as Box<dyn ClipboardBackend>),
        BackendKind::Command => {
            let backend = CommandBackend::new(&settings.paste_command, &settings.copy_command)?;
            Box::new(move || Box::new(backend) as Box<dyn ClipboardBackend>)
        }
    };
    Ok(factory)
}

fn build_picker(settings: &Settings) -> anyhow::Result<Box<dyn Picker>> {
    if settings.is_headless() {
        return Ok(Box::new(HeadlessPicker::new(settings.preview_length)));
    }
    Ok(Box::new(MenuPicker::new(
        &settings.picker_command,
        settings.delete_exit_code,
        settings.preview_length,
    )?))
}
