// Cbm - Surveillance du presse-papiers
// Detection des changements par scrutation periodique du backend.
//
// Le thread du presse-papiers (`worker`) appelle `poll_change` a chaque
// demande de la boucle. Un changement est signale uniquement si le
// contenu differe du dernier contenu observe.
//
// # Filtrage
// - Contenu absent ou vide : ignore
// - Contenu plus grand que `max_entry_size` : ignore
// - Contenu que nous venons d'ecrire nous-memes (activation) : ignore
//
// # Erreurs
// Une erreur de lecture n'arrete jamais la boucle. La premiere erreur d'une
// serie est loguee en warning, les suivantes en debug jusqu'au retablissement.

use tracing::{debug, info, warn};

use crate::clipboard::backend::ClipboardBackend;
use crate::clipboard::injector;
use crate::error::CbmResult;
use crate::history::entry::ClipPayload;

/// Adaptateur entre le backend presse-papiers et l'historique.
pub struct ClipboardWatcher {
    backend: Box<dyn ClipboardBackend>,
    last_seen: Option<ClipPayload>,
    max_entry_size: usize,
    failing: bool,
}

impl ClipboardWatcher {
    pub fn new(backend: Box<dyn ClipboardBackend>, max_entry_size: usize) -> Self {
        Self {
            backend,
            last_seen: None,
            max_entry_size,
            failing: false,
        }
    }

    /// Nom du backend sous-jacent.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Lit le presse-papiers et retourne le nouveau contenu s'il a change.
    pub fn poll_change(&mut self) -> Option<ClipPayload> {
        let payload = match self.backend.read() {
            Ok(p) => {
                if self.failing {
                    info!(backend = self.backend.name(), "clipboard reachable again");
                    self.failing = false;
                }
                p?
            }
            Err(e) => {
                if self.failing {
                    debug!(backend = self.backend.name(), "clipboard read failed: {}", e);
                } else {
                    warn!(backend = self.backend.name(), "clipboard read failed: {}", e);
                    self.failing = true;
                }
                return None;
            }
        };

        if payload.is_empty() || self.last_seen.as_ref() == Some(&payload) {
            return None;
        }
        self.last_seen = Some(payload.clone());

        if payload.len() > self.max_entry_size {
            debug!(bytes = payload.len(), "clipboard content above size limit, skipped");
            return None;
        }
        Some(payload)
    }

    /// Ecrit `payload` dans le presse-papiers. Le contenu ecrit ne sera
    /// pas signale comme une nouvelle copie au prochain tick.
    pub fn write(&mut self, payload: &ClipPayload) -> CbmResult<()> {
        injector::set_clipboard(self.backend.as_mut(), payload)?;
        self.last_seen = Some(payload.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CbmError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Backend scripte : chaque lecture consomme la prochaine reponse,
    /// puis `Ok(None)` une fois le script epuise.
    struct ScriptedBackend {
        reads: VecDeque<CbmResult<Option<ClipPayload>>>,
        written: Arc<Mutex<Vec<ClipPayload>>>,
    }

    impl ScriptedBackend {
        fn new(reads: Vec<CbmResult<Option<ClipPayload>>>) -> Self {
            Self {
                reads: reads.into(),
                written: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl ClipboardBackend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }
        fn read(&mut self) -> CbmResult<Option<ClipPayload>> {
            self.reads.pop_front().unwrap_or(Ok(None))
        }
        fn write(&mut self, payload: &ClipPayload) -> CbmResult<()> {
            self.written.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn text(s: &str) -> CbmResult<Option<ClipPayload>> {
        Ok(Some(s.into()))
    }

    #[test]
    fn test_reports_only_changes() {
        let backend = ScriptedBackend::new(vec![text("a"), text("a"), text("b"), text("a")]);
        let mut w = ClipboardWatcher::new(Box::new(backend), 1024);
        assert_eq!(w.poll_change(), Some(ClipPayload::from("a")));
        assert_eq!(w.poll_change(), None);
        assert_eq!(w.poll_change(), Some(ClipPayload::from("b")));
        assert_eq!(w.poll_change(), Some(ClipPayload::from("a")));
    }

    #[test]
    fn test_skips_empty_and_missing() {
        let backend = ScriptedBackend::new(vec![Ok(None), text(""), text("x")]);
        let mut w = ClipboardWatcher::new(Box::new(backend), 1024);
        assert_eq!(w.poll_change(), None);
        assert_eq!(w.poll_change(), None);
        assert_eq!(w.poll_change(), Some(ClipPayload::from("x")));
    }

    #[test]
    fn test_skips_oversize() {
        let big = "z".repeat(20);
        let backend = ScriptedBackend::new(vec![text(&big), text("ok")]);
        let mut w = ClipboardWatcher::new(Box::new(backend), 10);
        assert_eq!(w.poll_change(), None);
        assert_eq!(w.poll_change(), Some(ClipPayload::from("ok")));
    }

    #[test]
    fn test_read_errors_are_contained() {
        let backend = ScriptedBackend::new(vec![
            Err(CbmError::Clipboard("no display".into())),
            Err(CbmError::Clipboard("no display".into())),
            text("back"),
        ]);
        let mut w = ClipboardWatcher::new(Box::new(backend), 1024);
        assert_eq!(w.poll_change(), None);
        assert_eq!(w.poll_change(), None);
        assert_eq!(w.poll_change(), Some(ClipPayload::from("back")));
    }

    #[test]
    fn test_own_write_not_reported() {
        let backend = ScriptedBackend::new(vec![text("a"), text("b"), text("b")]);
        let written = backend.written.clone();
        let mut w = ClipboardWatcher::new(Box::new(backend), 1024);
        assert_eq!(w.poll_change(), Some(ClipPayload::from("a")));
        w.write(&"b".into()).unwrap();
        assert_eq!(w.poll_change(), None);
        assert_eq!(*written.lock().unwrap(), vec![ClipPayload::from("b")]);
    }
}
