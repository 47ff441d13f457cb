// Cbm - Backends d'acces au presse-papiers
//
// Ce module definit le trait `ClipboardBackend` et ses deux implementations :
// - `ArboardBackend` : acces natif X11/Wayland/macOS via la crate arboard
// - `CommandBackend` : commandes externes (wl-paste / wl-copy, xclip...)
//
// # Decodage
// Le backend `command` lit des octets bruts sur stdout et les decode au
// mieux en `ClipPayload` (texte si UTF-8 valide, octets sinon). arboard ne
// fournit que du texte.
//
// # Disponibilite
// Le handle arboard est ouvert a la demande et rouvert apres un echec,
// pour qu'un serveur d'affichage absent au demarrage ne soit pas fatal.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{CbmError, CbmResult};
use crate::history::entry::ClipPayload;

/// Acces en lecture/ecriture a une ressource presse-papiers partagee.
pub trait ClipboardBackend {
    /// Nom court du backend (logs).
    fn name(&self) -> &'static str;

    /// Lit le contenu courant. `Ok(None)` si le presse-papiers ne
    /// contient pas de texte.
    fn read(&mut self) -> CbmResult<Option<ClipPayload>>;

    /// Remplace le contenu du presse-papiers.
    fn write(&mut self, payload: &ClipPayload) -> CbmResult<()>;
}

/// Backend natif base sur arboard.
#[derive(Default)]
pub struct ArboardBackend {
    clipboard: Option<arboard::Clipboard>,
}

impl ArboardBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> CbmResult<&mut arboard::Clipboard> {
        if self.clipboard.is_none() {
            let cb = arboard::Clipboard::new()
                .map_err(|e| CbmError::Clipboard(format!("cannot open clipboard: {}", e)))?;
            self.clipboard = Some(cb);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| CbmError::Clipboard("clipboard handle unavailable".into()))
    }
}

impl ClipboardBackend for ArboardBackend {
    fn name(&self) -> &'static str {
        "arboard"
    }

    fn read(&mut self) -> CbmResult<Option<ClipPayload>> {
        let result = self.handle()?.get_text();
        match result {
            Ok(text) => Ok(Some(ClipPayload::Text(text))),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => {
                self.clipboard = None;
                Err(CbmError::Clipboard(format!("read failed: {}", e)))
            }
        }
    }

    fn write(&mut self, payload: &ClipPayload) -> CbmResult<()> {
        let text = payload.to_text_lossy().into_owned();
        let result = self.handle()?.set_text(text);
        result.map_err(|e| {
            self.clipboard = None;
            CbmError::Clipboard(format!("write failed: {}", e))
        })
    }
}

/// Backend pilotant des commandes externes.
///
/// Les commandes sont decoupees sur les espaces, sans interpretation
/// par un shell.
pub struct CommandBackend {
    paste: Vec<String>,
    copy: Vec<String>,
}

impl CommandBackend {
    /// Cree le backend a partir des lignes de commande de lecture et d'ecriture.
    pub fn new(paste_command: &str, copy_command: &str) -> CbmResult<Self> {
        let paste = split_command(paste_command)
            .ok_or_else(|| CbmError::Clipboard("empty paste command".into()))?;
        let copy = split_command(copy_command)
            .ok_or_else(|| CbmError::Clipboard("empty copy command".into()))?;
        Ok(Self { paste, copy })
    }
}

impl ClipboardBackend for CommandBackend {
    fn name(&self) -> &'static str {
        "command"
    }

    fn read(&mut self) -> CbmResult<Option<ClipPayload>> {
        let output = Command::new(&self.paste[0])
            .args(&self.paste[1..])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| CbmError::Clipboard(format!("cannot run {}: {}", self.paste[0], e)))?;

        // Un statut non nul signifie "pas de contenu texte" pour wl-paste/xclip
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(ClipPayload::from_bytes(output.stdout)))
    }

    fn write(&mut self, payload: &ClipPayload) -> CbmResult<()> {
        let mut child = Command::new(&self.copy[0])
            .args(&self.copy[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CbmError::Clipboard(format!("cannot run {}: {}", self.copy[0], e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(payload.as_bytes())
                .map_err(|e| CbmError::Clipboard(format!("write to {} failed: {}", self.copy[0], e)))?;
        }

        let status = child.wait()?;
        if !status.success() {
            return Err(CbmError::Clipboard(format!("{} exited with {}", self.copy[0], status)));
        }
        Ok(())
    }
}

/// Decoupe une ligne de commande ; None si elle est vide.
pub(crate) fn split_command(line: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = line.split_whitespace().map(String::from).collect();
    if parts.is_empty() { None } else { Some(parts) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(
            split_command("wl-paste  --no-newline"),
            Some(vec!["wl-paste".to_string(), "--no-newline".to_string()])
        );
        assert_eq!(split_command("   "), None);
    }

    #[test]
    fn test_command_backend_rejects_empty() {
        assert!(CommandBackend::new("", "wl-copy").is_err());
        assert!(CommandBackend::new("wl-paste", "").is_err());
    }

    #[test]
    fn test_command_backend_reads_raw_stdout() {
        let mut backend = CommandBackend::new("printf abc", "true").unwrap();
        assert_eq!(backend.read().unwrap(), Some(ClipPayload::from("abc")));
    }

    #[test]
    fn test_command_backend_failure_means_empty() {
        let mut backend = CommandBackend::new("false", "true").unwrap();
        assert_eq!(backend.read().unwrap(), None);
    }

    #[test]
    fn test_command_backend_missing_program() {
        let mut backend = CommandBackend::new("cbm-no-such-program", "true").unwrap();
        assert!(matches!(backend.read(), Err(CbmError::Clipboard(_))));
    }

    #[test]
    fn test_command_backend_write() {
        let mut backend = CommandBackend::new("true", "cat").unwrap();
        backend.write(&"hello".into()).unwrap();
    }
}
