// Cbm - Injection dans le presse-papiers
// Ecrit l'entree activee depuis le selecteur dans le presse-papiers.
//
// L'ecriture est deleguee au backend. Un contenu en octets bruts est
// transmis tel quel au backend `command` ; arboard le convertit en texte
// (sequences invalides remplacees).

use tracing::{debug, warn};

use crate::clipboard::backend::ClipboardBackend;
use crate::error::CbmResult;
use crate::history::entry::ClipPayload;

/// Place `payload` dans le presse-papiers via `backend`.
///
/// # Errors
/// Retourne `CbmError::Clipboard` si le backend refuse l'ecriture.
pub fn set_clipboard(backend: &mut dyn ClipboardBackend, payload: &ClipPayload) -> CbmResult<()> {
    if matches!(payload, ClipPayload::Bytes(_)) {
        debug!(backend = backend.name(), "writing non UTF-8 content");
    }
    backend.write(payload).map_err(|e| {
        warn!(backend = backend.name(), "clipboard write failed: {}", e);
        e
    })
}
