// Cbm - Module UI
// Frontiere avec le selecteur d'historique
//
// Le rendu est delegue a un programme externe ; ce module ne definit que
// le contrat entre la boucle d'evenements et le selecteur.
//
// # Sous-modules
// - `menu`     : selecteur externe de type dmenu (rofi, dmenu, wofi, fzf)
// - `headless` : selecteur sans interface qui se contente de loguer
//
// # Architecture
// La boucle appelle `Picker::open` avec un snapshot de l'historique. Le
// selecteur renvoie les choix de l'utilisateur par un `PickerHandle` : les
// actions passent par un canal consomme par la boucle, qui les applique
// a l'historique depuis son propre thread.

use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::error::CbmResult;
use crate::history::entry::{ClipPayload, HistoryEntry};

/// Selecteur sans interface.
pub mod headless;
/// Selecteur externe de type dmenu.
pub mod menu;

/// Choix de l'utilisateur renvoye a la boucle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerAction {
    /// Remettre cette entree dans le presse-papiers
    Activate(ClipPayload),
    /// Supprimer ces entrees de l'historique
    Remove(Vec<ClipPayload>),
}

/// Canal de retour du selecteur vers la boucle d'evenements.
#[derive(Debug, Clone)]
pub struct PickerHandle {
    tx: UnboundedSender<PickerAction>,
}

impl PickerHandle {
    pub fn new(tx: UnboundedSender<PickerAction>) -> Self {
        Self { tx }
    }

    pub fn activate(&self, payload: ClipPayload) {
        self.send(PickerAction::Activate(payload));
    }

    pub fn remove(&self, payloads: Vec<ClipPayload>) {
        self.send(PickerAction::Remove(payloads));
    }

    fn send(&self, action: PickerAction) {
        // Boucle arretee : l'action n'a plus d'effet possible
        if self.tx.send(action).is_err() {
            debug!("picker action dropped, event loop is gone");
        }
    }
}

/// Surface d'affichage de l'historique.
pub trait Picker {
    /// Affiche `entries` (plus ancienne en premier). Ne doit pas bloquer :
    /// les choix de l'utilisateur sont renvoyes plus tard via `handle`.
    fn open(&mut self, entries: Vec<HistoryEntry>, handle: PickerHandle) -> CbmResult<()>;
}
