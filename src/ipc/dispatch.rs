// Cbm - Interpretation des requetes IPC
//
// Le protocole ne definit qu'une requete : les octets ASCII exacts `PASTE`.
// Tout autre contenu (vide, inconnu, tronque) est ignore sans reponse :
// le protocole est a sens unique, client vers daemon.

use tracing::{debug, info};

use crate::constants::PASTE_REQUEST;
use crate::history::store::HistoryStore;
use crate::ui::{Picker, PickerHandle};

/// Requete reconnue par le daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Ouvrir le selecteur d'historique
    Paste,
}

impl Request {
    /// Reconnait un message complet ; None si le contenu est inconnu.
    pub fn parse(message: &[u8]) -> Option<Self> {
        if message == PASTE_REQUEST {
            Some(Self::Paste)
        } else {
            None
        }
    }

    /// Representation sur le fil.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Paste => PASTE_REQUEST,
        }
    }
}

/// Traite un message complet recu d'un client.
///
/// Sur `PASTE`, ouvre le selecteur avec un snapshot de l'historique.
/// Retourne la requete traitee, ou None si le message est ignore.
pub fn dispatch(
    message: &[u8],
    store: &HistoryStore,
    picker: &mut dyn Picker,
    handle: &PickerHandle,
) -> Option<Request> {
    let Some(request) = Request::parse(message) else {
        debug!(bytes = message.len(), "unrecognized client message dropped");
        return None;
    };

    match request {
        Request::Paste => {
            if store.is_empty() {
                debug!("history is empty");
            }
            let entries = store.snapshot();
            debug!(entries = entries.len(), "opening picker");
            if let Err(e) = picker.open(entries, handle.clone()) {
                info!("picker not opened: {}", e);
            }
        }
    }
    Some(request)
}
