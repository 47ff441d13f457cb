// Cbm - Orchestrateur du daemon
// Connecte tous les composants : socket IPC, historique, presse-papiers,
// selecteur
//
// Ce fichier est le coeur de Cbm. Il detient l'historique et pilote la
// boucle d'evenements unique qui le protege.
//
// # Architecture
// Le daemon est mono-thread pour l'etat : un runtime tokio current-thread
// et une seule boucle `select!`. Tous les handlers sont appeles
// sequentiellement depuis cette boucle et ne bloquent jamais ; l'historique
// n'a donc besoin ni de verrou ni de RefCell. Les appels bloquants au
// presse-papiers tournent sur le thread `clipboard::worker`, le selecteur
// dans une tache a part ; tous deux renvoient leurs resultats par un canal.
//
// # Sources d'evenements (par priorite)
// 1. Arret (signal ou futur fourni par l'appelant)
// 2. Actions du selecteur : activer / supprimer une entree
// 3. Nouvelle connexion sur le socket d'ecoute (en pause apres une erreur)
// 4. Message complet d'une session en cours
// 5. Resultat d'une lecture du presse-papiers
// 6. Tick de scrutation : demande une lecture si aucune n'est en cours
//
// # Cycle de vie
// 1. `Daemon::new()` : signaux installes et socket lie par l'appelant
// 2. `Daemon::run()` / `run_until()` : boucle jusqu'a l'arret
// 3. Fermeture du socket et suppression du fichier du point d'acces

use std::future::Future;
use std::os::unix::io::RawFd;
use std::pin::Pin;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, MissedTickBehavior, Sleep};
use tracing::{debug, info, warn};

use crate::clipboard::worker::{ClipboardEvent, ClipboardWorker};
use crate::constants::ACCEPT_RETRY_DELAY;
use crate::history::store::HistoryStore;
use crate::ipc::dispatch;
use crate::ipc::listener::IpcListener;
use crate::ipc::session::read_message;
use crate::system::signals::ShutdownSignals;
use crate::ui::{Picker, PickerAction, PickerHandle};

/// Daemon d'historique du presse-papiers.
///
/// Proprietaire unique de l'historique, du socket d'ecoute et de l'acces
/// au presse-papiers.
pub struct Daemon {
    /// Socket d'ecoute des clients
    listener: IpcListener,
    /// Historique des entrees
    store: HistoryStore,
    /// Thread d'acces au presse-papiers
    clipboard: ClipboardWorker,
    /// Selecteur ouvert sur `PASTE`
    picker: Box<dyn Picker>,
    /// Periode de scrutation du presse-papiers
    poll_interval: Duration,
    actions_tx: UnboundedSender<PickerAction>,
    actions_rx: UnboundedReceiver<PickerAction>,
}

impl Daemon {
    pub fn new(
        listener: IpcListener,
        clipboard: ClipboardWorker,
        picker: Box<dyn Picker>,
        poll_interval: Duration,
    ) -> Self {
        let (actions_tx, actions_rx) = mpsc::unbounded_channel();
        Self {
            listener,
            store: HistoryStore::new(),
            clipboard,
            picker,
            poll_interval,
            actions_tx,
            actions_rx,
        }
    }

    /// Lance la boucle jusqu'a SIGINT, SIGTERM ou SIGHUP.
    ///
    /// Les gestionnaires sont installes par l'appelant avant la liaison du
    /// socket : un signal recu des que le socket existe arrete proprement.
    pub async fn run(self, mut signals: ShutdownSignals) {
        self.run_until(async move {
            let name = signals.recv().await;
            info!("Received {}, shutting down", name);
        })
        .await;
    }

    /// Lance la boucle jusqu'a la completion de `shutdown`.
    ///
    /// Les sessions en cours sont abandonnees, le socket est ferme et son
    /// fichier supprime. Une lecture du presse-papiers en cours n'est pas
    /// attendue. Retourne l'historique final.
    pub async fn run_until<F: Future<Output = ()>>(mut self, shutdown: F) -> HistoryStore {
        tokio::pin!(shutdown);

        let handle = PickerHandle::new(self.actions_tx.clone());
        let mut sessions = FuturesUnordered::new();
        let mut gate = AcceptGate::new();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            path = %self.listener.path().display(),
            poll_ms = self.poll_interval.as_millis() as u64,
            "daemon started"
        );

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                Some(action) = self.actions_rx.recv() => self.on_picker_action(action),

                accepted = self.listener.accept(), if gate.is_open() => match accepted {
                    Ok(stream) => {
                        debug!("client connected");
                        sessions.push(read_message(stream));
                    }
                    Err(e) => {
                        // EMFILE laisse le socket lisible : sans pause, la boucle tourne a vide
                        warn!("Failed to accept connection: {}", e);
                        gate.pause();
                    }
                },

                _ = gate.reopened(), if !gate.is_open() => debug!("accepting connections again"),

                Some((fd, message)) = sessions.next(), if !sessions.is_empty() => {
                    self.on_message(fd, &message, &handle);
                }

                Some(event) = self.clipboard.recv() => self.on_clipboard_event(event),

                _ = ticker.tick() => self.on_clipboard_tick(),
            }
        }

        if !sessions.is_empty() {
            debug!(pending = sessions.len(), "dropping unfinished client sessions");
        }
        drop(sessions);
        self.listener.close();
        info!(entries = self.store.len(), "daemon stopped");
        self.store
    }

    /// Traite un message complet recu d'un client.
    fn on_message(&mut self, fd: RawFd, message: &[u8], handle: &PickerHandle) {
        if let Some(request) = dispatch::dispatch(message, &self.store, self.picker.as_mut(), handle) {
            debug!(fd, ?request, "request handled");
        }
    }

    /// Applique un choix de l'utilisateur renvoye par le selecteur.
    fn on_picker_action(&mut self, action: PickerAction) {
        match action {
            PickerAction::Activate(payload) => {
                if let Err(e) = self.store.activate(&payload, &self.clipboard) {
                    warn!("Failed to set clipboard: {}", e);
                }
            }
            PickerAction::Remove(payloads) => {
                for payload in &payloads {
                    self.store.remove(payload);
                }
            }
        }
    }

    /// Demande une lecture du presse-papiers si la precedente est terminee.
    fn on_clipboard_tick(&mut self) {
        if self.clipboard.poll_pending() {
            debug!("clipboard read still running, tick skipped");
            return;
        }
        self.clipboard.request_poll();
    }

    /// Enregistre un nouveau contenu du presse-papiers.
    fn on_clipboard_event(&mut self, event: ClipboardEvent) {
        match event {
            ClipboardEvent::Polled(Some(payload)) => {
                let bytes = payload.len();
                if self.store.record(payload) {
                    debug!(bytes, entries = self.store.len(), "clipboard entry recorded");
                }
            }
            ClipboardEvent::Polled(None) => {}
        }
    }
}

/// Pause de l'accept apres une erreur.
struct AcceptGate {
    paused: bool,
    resume: Pin<Box<Sleep>>,
}

impl AcceptGate {
    fn new() -> Self {
        Self {
            paused: false,
            resume: Box::pin(tokio::time::sleep(Duration::ZERO)),
        }
    }

    fn is_open(&self) -> bool {
        !self.paused
    }

    /// Suspend l'accept pendant `ACCEPT_RETRY_DELAY`.
    fn pause(&mut self) {
        self.paused = true;
        self.resume.as_mut().reset(Instant::now() + ACCEPT_RETRY_DELAY);
    }

    /// Se termine a la fin de la pause.
    async fn reopened(&mut self) {
        (&mut self.resume).await;
        self.paused = false;
    }
}
