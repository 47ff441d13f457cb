// Cbm - Signaux de terminaison
// Pont entre les signaux Unix et la boucle d'evenements
//
// SIGINT, SIGTERM et SIGHUP sont recus comme des evenements ordinaires de
// la boucle (aucune logique ne tourne dans un vrai gestionnaire de signal).
// Une fois installe, le gestionnaire tokio reste en place jusqu'a la fin du
// processus : des signaux repetes pendant l'arret sont absorbes.

use tokio::signal::unix::{signal, Signal, SignalKind};

use crate::error::CbmResult;

/// Flux des signaux qui arretent le daemon.
pub struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
    hangup: Signal,
}

impl ShutdownSignals {
    /// Installe les gestionnaires. Doit etre appele depuis un runtime tokio.
    pub fn install() -> CbmResult<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Attend le prochain signal d'arret et retourne son nom.
    pub async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
            _ = self.hangup.recv() => "SIGHUP",
        }
    }
}
