// Cbm - Selecteur sans interface
// Utilise quand `picker.command = none` : le contenu de l'historique est
// logue, aucune action n'est jamais renvoyee.

use tracing::{debug, info};

use crate::error::CbmResult;
use crate::history::entry::HistoryEntry;
use crate::ui::{Picker, PickerHandle};

/// Selecteur qui logue le snapshot recu.
pub struct HeadlessPicker {
    preview_length: usize,
}

impl HeadlessPicker {
    pub fn new(preview_length: usize) -> Self {
        Self { preview_length }
    }
}

impl Picker for HeadlessPicker {
    fn open(&mut self, entries: Vec<HistoryEntry>, _handle: PickerHandle) -> CbmResult<()> {
        info!(entries = entries.len(), "history requested");
        for (i, entry) in entries.iter().enumerate() {
            debug!(index = i, age_secs = entry.age_secs(), "{}", entry.preview(self.preview_length));
        }
        Ok(())
    }
}
