// Cbm - Historique en memoire
// Liste ordonnee et dedupliquee des copies observees
//
// Ce module implemente le stockage en memoire des entrees du
// presse-papiers, de la plus ancienne a la plus recente.
//
// # Deduplication
// `record` refuse l'insertion si une entree de meme contenu existe deja,
// quelle que soit sa position. Une copie repetee ne deplace pas l'entree.
// Un index HashSet accompagne la liste pour un test de presence en O(1).
//
// # Propriete
// Le store est detenu par la boucle d'evenements et n'est manipule que
// depuis son thread. Les snapshots sont des copies : une modification
// ulterieure du store ne les affecte pas.
//
// # Duree de vie
// Aucune persistance : l'historique disparait avec le processus.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::clipboard::worker::ClipboardWorker;
use crate::error::CbmResult;
use crate::history::entry::{ClipPayload, HistoryEntry};

/// Historique du presse-papiers en memoire (plus ancienne en tete).
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    index: HashSet<ClipPayload>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute `payload` en fin d'historique s'il n'y figure pas deja.
    /// Retourne false pour un doublon (aucune modification).
    pub fn record(&mut self, payload: ClipPayload) -> bool {
        if self.index.contains(&payload) {
            return false;
        }
        self.index.insert(payload.clone());
        self.entries.push(HistoryEntry::new(payload));
        true
    }

    /// Copie ordonnee de toutes les entrees, plus ancienne en premier.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.clone()
    }

    /// Supprime l'entree de meme contenu. Une entree absente n'est
    /// pas une erreur : elle est seulement signalee dans les logs.
    pub fn remove(&mut self, payload: &ClipPayload) -> bool {
        if !self.index.remove(payload) {
            warn!(bytes = payload.len(), "history entry to delete is not present");
            return false;
        }
        self.entries.retain(|e| &e.payload != payload);
        debug!(bytes = payload.len(), "history entry deleted");
        true
    }

    /// Demande l'ecriture de `payload` dans le presse-papiers.
    /// L'historique n'est ni modifie ni reordonne.
    pub fn activate(&self, payload: &ClipPayload, clipboard: &ClipboardWorker) -> CbmResult<()> {
        if !self.index.contains(payload) {
            debug!(bytes = payload.len(), "activating an entry no longer in history");
        }
        clipboard.write(payload.clone())
    }

    /// Nombre d'entrees dans l'historique.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
