// Cbm - Types d'erreur centralises
//
// Ce module definit l'enumeration `CbmError` et le type alias
// `CbmResult<T>` utilises dans toute l'application.
//
// # Categories d'erreurs
// - `Connect`   : le client ne peut pas joindre le socket du daemon
// - `Bind`      : echec de creation du socket d'ecoute au demarrage
// - `AddrInUse` : un daemon vivant detient deja le socket
// - `Clipboard` : echec d'acces au presse-papiers (backend)
// - `Picker`    : echec de lancement du selecteur externe
// - `Config`    : erreur de parsing ou de lecture de la configuration
// - `Io`        : erreur d'I/O generique
//
// Chaque variante s'affiche avec un prefixe entre crochets pour
// faciliter le diagnostic dans les logs.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Enumeration de toutes les erreurs possibles dans Cbm.
#[derive(Debug, Error)]
pub enum CbmError {
    /// Le client n'a pas pu se connecter au socket du daemon
    #[error("[Connect] Error connecting to socket {}. Is daemon running?", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Echec de creation ou de liaison du socket d'ecoute
    #[error("[Bind] cannot bind {}: {source}", path.display())]
    Bind {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Le socket est detenu par un daemon encore vivant
    #[error("[Bind] {} is held by a running daemon", path.display())]
    AddrInUse { path: PathBuf },
    /// Erreur d'acces au presse-papiers
    #[error("[Clipboard] {0}")]
    Clipboard(String),
    /// Erreur du selecteur d'historique
    #[error("[Picker] {0}")]
    Picker(String),
    /// Ligne de configuration invalide
    #[error("[Config] line {line}: {message}")]
    Config { line: usize, message: String },
    /// Valeur de configuration invalide
    #[error("[Config] {key}: {message}")]
    ConfigValue { key: String, message: String },
    /// Fichier de configuration illisible
    #[error("[Config] cannot read {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Erreur d'I/O generique
    #[error("[Io] {0}")]
    Io(#[from] io::Error),
}

impl CbmError {
    /// Retourne true pour les erreurs de connectivite cote client.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CbmError::Connect { .. })
    }
}

/// Type Result specialise pour Cbm.
pub type CbmResult<T> = Result<T, CbmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let e = CbmError::Clipboard("no display".into());
        assert_eq!(e.to_string(), "[Clipboard] no display");

        let e = CbmError::Config { line: 3, message: "missing '='".into() };
        assert_eq!(e.to_string(), "[Config] line 3: missing '='");

        let e = CbmError::AddrInUse { path: PathBuf::from("./cbm_sock") };
        assert_eq!(e.to_string(), "[Bind] ./cbm_sock is held by a running daemon");
    }

    #[test]
    fn test_connect_is_connectivity() {
        let e = CbmError::Connect {
            path: PathBuf::from("./cbm_sock"),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        };
        assert!(e.is_connectivity());
        assert!(e.to_string().starts_with("[Connect]"));
        assert!(std::error::Error::source(&e).is_some());

        let e = CbmError::Picker("rofi missing".into());
        assert!(!e.is_connectivity());
    }
}
