// Cbm - Thread d'acces au presse-papiers
// Execute les lectures et ecritures du backend hors de la boucle d'evenements
//
// Les backends sont bloquants : `wl-paste` peut attendre indefiniment un
// proprietaire du presse-papiers qui ne repond pas, et `get_text` d'arboard
// attend le serveur X11. Le backend vit donc sur un thread dedie qui
// possede le `ClipboardWatcher` ; la boucle lui envoie des commandes et
// recoit les changements par un canal tokio.
//
// # Protocole
// - `request_poll` : demande une lecture ; au plus une lecture en cours
// - `write`        : ecriture d'une entree activee, traitee dans l'ordre
// - `recv`         : resultat d'une lecture (`ClipboardEvent::Polled`)
//
// # Arret
// Fermer le `ClipboardWorker` ferme le canal de commandes : le thread se
// termine apres l'operation en cours, sans que la boucle ne l'attende.

use std::sync::mpsc as std_mpsc;
use std::thread;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::clipboard::backend::ClipboardBackend;
use crate::clipboard::monitor::ClipboardWatcher;
use crate::error::{CbmError, CbmResult};
use crate::history::entry::ClipPayload;

/// Construit le backend sur le thread du presse-papiers.
pub type BackendFactory = Box<dyn FnOnce() -> Box<dyn ClipboardBackend> + Send>;

/// Resultat renvoye a la boucle d'evenements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardEvent {
    /// Lecture terminee ; `Some` si le contenu a change
    Polled(Option<ClipPayload>),
}

enum WorkerCommand {
    Poll,
    Write(ClipPayload),
}

/// Poignee de la boucle sur le thread du presse-papiers.
pub struct ClipboardWorker {
    commands: std_mpsc::Sender<WorkerCommand>,
    events: UnboundedReceiver<ClipboardEvent>,
    poll_pending: bool,
}

impl ClipboardWorker {
    /// Demarre le thread et y construit le backend.
    ///
    /// # Errors
    /// Retourne `CbmError::Io` si le thread ne peut pas etre cree.
    pub fn spawn(factory: BackendFactory, max_entry_size: usize) -> CbmResult<Self> {
        let (commands, commands_rx) = std_mpsc::channel();
        let (events_tx, events) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("cbm-clipboard".into())
            .spawn(move || run_worker(factory, max_entry_size, commands_rx, events_tx))?;

        Ok(Self {
            commands,
            events,
            poll_pending: false,
        })
    }

    /// Demande une lecture, sauf si la precedente n'est pas terminee.
    /// Retourne true si une lecture a ete demandee.
    pub fn request_poll(&mut self) -> bool {
        if self.poll_pending {
            return false;
        }
        if self.commands.send(WorkerCommand::Poll).is_err() {
            debug!("clipboard thread is gone, poll skipped");
            return false;
        }
        self.poll_pending = true;
        true
    }

    /// Met en file l'ecriture de `payload` dans le presse-papiers.
    ///
    /// # Errors
    /// Retourne `CbmError::Clipboard` si le thread du presse-papiers est arrete.
    pub fn write(&self, payload: ClipPayload) -> CbmResult<()> {
        self.commands
            .send(WorkerCommand::Write(payload))
            .map_err(|_| CbmError::Clipboard("clipboard thread stopped".into()))
    }

    /// Attend le prochain resultat ; None si le thread est arrete.
    pub async fn recv(&mut self) -> Option<ClipboardEvent> {
        let event = self.events.recv().await?;
        match event {
            ClipboardEvent::Polled(_) => self.poll_pending = false,
        }
        Some(event)
    }

    /// Retourne true si une lecture est en cours.
    pub fn poll_pending(&self) -> bool {
        self.poll_pending
    }
}

fn run_worker(
    factory: BackendFactory,
    max_entry_size: usize,
    commands: std_mpsc::Receiver<WorkerCommand>,
    events: UnboundedSender<ClipboardEvent>,
) {
    let mut watcher = ClipboardWatcher::new(factory(), max_entry_size);
    debug!(backend = watcher.backend_name(), "clipboard thread started");

    while let Ok(command) = commands.recv() {
        match command {
            WorkerCommand::Poll => {
                let change = watcher.poll_change();
                if events.send(ClipboardEvent::Polled(change)).is_err() {
                    break;
                }
            }
            WorkerCommand::Write(payload) => {
                // Un refus est deja logue par l'injecteur
                if watcher.write(&payload).is_ok() {
                    debug!("{} bytes copied", payload.len());
                }
            }
        }
    }
    debug!(backend = watcher.backend_name(), "clipboard thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Backend qui lit un contenu fixe et garde les ecritures.
    struct Fixed {
        content: &'static str,
        written: Arc<Mutex<Vec<ClipPayload>>>,
    }

    impl ClipboardBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn read(&mut self) -> CbmResult<Option<ClipPayload>> {
            Ok(Some(self.content.into()))
        }
        fn write(&mut self, payload: &ClipPayload) -> CbmResult<()> {
            self.written.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn fixed(content: &'static str) -> (BackendFactory, Arc<Mutex<Vec<ClipPayload>>>) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let w = written.clone();
        (Box::new(move || Box::new(Fixed { content, written: w }) as Box<dyn ClipboardBackend>), written)
    }

    #[tokio::test]
    async fn test_single_poll_in_flight() {
        let (factory, _) = fixed("hello");
        let mut worker = ClipboardWorker::spawn(factory, 1024).unwrap();

        assert!(worker.request_poll());
        assert!(!worker.request_poll());
        assert!(worker.poll_pending());

        let event = tokio::time::timeout(Duration::from_secs(5), worker.recv()).await.unwrap();
        assert_eq!(event, Some(ClipboardEvent::Polled(Some("hello".into()))));
        assert!(!worker.poll_pending());

        // Contenu inchange : lecture terminee sans changement
        assert!(worker.request_poll());
        let event = tokio::time::timeout(Duration::from_secs(5), worker.recv()).await.unwrap();
        assert_eq!(event, Some(ClipboardEvent::Polled(None)));
    }

    #[tokio::test]
    async fn test_written_content_not_reported() {
        let (factory, written) = fixed("mine");
        let mut worker = ClipboardWorker::spawn(factory, 1024).unwrap();

        worker.write("mine".into()).unwrap();
        assert!(worker.request_poll());
        let event = tokio::time::timeout(Duration::from_secs(5), worker.recv()).await.unwrap();

        assert_eq!(event, Some(ClipboardEvent::Polled(None)));
        assert_eq!(*written.lock().unwrap(), vec![ClipPayload::from("mine")]);
    }

    #[test]
    fn test_drop_does_not_wait_for_stalled_read() {
        struct Stalled;
        impl ClipboardBackend for Stalled {
            fn name(&self) -> &'static str {
                "stalled"
            }
            fn read(&mut self) -> CbmResult<Option<ClipPayload>> {
                thread::sleep(Duration::from_secs(3));
                Ok(None)
            }
            fn write(&mut self, _payload: &ClipPayload) -> CbmResult<()> {
                Ok(())
            }
        }

        let start = Instant::now();
        let mut worker = ClipboardWorker::spawn(Box::new(|| Box::new(Stalled) as Box<dyn ClipboardBackend>), 1024)
            .unwrap();
        assert!(worker.request_poll());
        worker.write("queued".into()).unwrap();
        drop(worker);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
