// Cbm - Structure de configuration et valeurs par defaut
//
// Ce module definit la structure `Settings` qui centralise les parametres
// du daemon et du client : niveau de log, socket, backend presse-papiers,
// selecteur.
//
// # Chargement
// `Settings::load(path)` lit un fichier de configuration et applique les
// valeurs parsees sur les defauts. Les valeurs manquantes conservent leur
// defaut ; les valeurs numeriques hors bornes sont clampees ; une valeur
// non reconnue (niveau de log, backend) est une erreur.
//
// Le fichier n'est lu que s'il est donne explicitement (`--config`) et
// n'est jamais ecrit par le programme.
//
// # Priorite
// defauts < fichier de configuration < options de la ligne de commande

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::parser::{self, ParsedConfig};
use crate::constants::*;
use crate::error::{CbmError, CbmResult};

/// Niveau de log accepte par `--log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Parse depuis une chaine, sans tenir compte de la casse.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "WARNING" | "WARN" => Some(Self::Warning),
            "ERROR" => Some(Self::Error),
            "CRITICAL" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Niveau tracing correspondant (CRITICAL n'existe pas : ERROR).
    pub fn as_tracing(&self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error | Self::Critical => tracing::Level::ERROR,
        }
    }
}

/// Backend d'acces au presse-papiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Acces natif via arboard
    Arboard,
    /// Commandes externes (wl-paste / wl-copy par defaut)
    Command,
}

impl BackendKind {
    /// Parse depuis une chaine.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "arboard" => Some(Self::Arboard),
            "command" => Some(Self::Command),
            _ => None,
        }
    }
}

/// Configuration complete de l'application.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    // general
    pub log_level: LogLevel,
    pub socket_file: PathBuf,
    // clipboard
    pub backend: BackendKind,
    pub poll_interval_ms: u64,
    pub max_entry_size: usize,
    pub paste_command: String,
    pub copy_command: String,
    // picker
    pub picker_command: String,
    pub delete_exit_code: i32,
    pub preview_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            socket_file: PathBuf::from(DEFAULT_SOCKET_FILE),
            backend: BackendKind::Arboard,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            paste_command: DEFAULT_PASTE_COMMAND.to_string(),
            copy_command: DEFAULT_COPY_COMMAND.to_string(),
            picker_command: DEFAULT_PICKER_COMMAND.to_string(),
            delete_exit_code: DEFAULT_DELETE_EXIT_CODE,
            preview_length: DEFAULT_PREVIEW_LENGTH,
        }
    }
}

impl Settings {
    /// Charge la configuration depuis un fichier.
    ///
    /// # Errors
    /// - `CbmError::ConfigFile` : fichier illisible
    /// - `CbmError::Config` / `CbmError::ConfigValue` : contenu invalide
    pub fn load(path: &Path) -> CbmResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| CbmError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(&text)
    }

    /// Construit la configuration a partir du texte d'un fichier.
    pub fn from_text(text: &str) -> CbmResult<Self> {
        let config = parser::parse_config(text)?;
        let mut settings = Settings::default();
        settings.apply_parsed(&config)?;
        Ok(settings)
    }

    /// Applique les valeurs parsees sur la configuration courante.
    fn apply_parsed(&mut self, config: &ParsedConfig) -> CbmResult<()> {
        if let Some(gen) = config.get("general") {
            if let Some(v) = gen.get("log_level") {
                self.log_level = LogLevel::from_str(v)
                    .ok_or_else(|| invalid("general.log_level", v))?;
            }
            if let Some(v) = gen.get("socket_file") {
                if v.is_empty() {
                    return Err(invalid("general.socket_file", v));
                }
                self.socket_file = PathBuf::from(v);
            }
        }

        if let Some(clip) = config.get("clipboard") {
            if let Some(v) = clip.get("backend") {
                self.backend = BackendKind::from_str(v)
                    .ok_or_else(|| invalid("clipboard.backend", v))?;
            }
            if let Some(v) = clip.get("poll_interval_ms") {
                let ms: u64 = parser::parse_number(v)
                    .ok_or_else(|| invalid("clipboard.poll_interval_ms", v))?;
                self.poll_interval_ms = ms.clamp(20, 10_000);
            }
            if let Some(v) = clip.get("max_entry_size_kb") {
                let kb: usize = parser::parse_number(v)
                    .ok_or_else(|| invalid("clipboard.max_entry_size_kb", v))?;
                self.max_entry_size = kb.clamp(1, 65_536) * 1024;
            }
            if let Some(v) = clip.get("paste_command") {
                self.paste_command = v.clone();
            }
            if let Some(v) = clip.get("copy_command") {
                self.copy_command = v.clone();
            }
        }

        if let Some(picker) = config.get("picker") {
            if let Some(v) = picker.get("command") {
                self.picker_command = v.clone();
            }
            if let Some(v) = picker.get("delete_exit_code") {
                self.delete_exit_code = parser::parse_number(v)
                    .ok_or_else(|| invalid("picker.delete_exit_code", v))?;
            }
            if let Some(v) = picker.get("preview_length") {
                let len: usize = parser::parse_number(v)
                    .ok_or_else(|| invalid("picker.preview_length", v))?;
                self.preview_length = len.clamp(10, 500);
            }
        }

        Ok(())
    }

    /// Intervalle de scrutation du presse-papiers.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Retourne true si le selecteur graphique est desactive.
    pub fn is_headless(&self) -> bool {
        self.picker_command.trim().eq_ignore_ascii_case(HEADLESS_PICKER)
    }
}

fn invalid(key: &str, value: &str) -> CbmError {
    CbmError::ConfigValue {
        key: key.to_string(),
        message: format!("invalid value {:?}", value),
    }
}

/// Texte par defaut du fichier de configuration (`--print-config`).
pub fn default_config_text() -> String {
    format!(
        r#"# Cbm configuration
# Utilisation : cbm --config <fichier>

[general]
# DEBUG | INFO | WARNING | ERROR | CRITICAL
log_level = INFO
socket_file = {socket}

[clipboard]
# arboard | command
backend = arboard
poll_interval_ms = {poll}
max_entry_size_kb = {size_kb}
paste_command = "{paste}"
copy_command = "{copy}"

[picker]
# "none" : pas de selecteur, l'historique est logue
command = "{picker}"
delete_exit_code = {delete}
preview_length = {preview}
"#,
        socket = DEFAULT_SOCKET_FILE,
        poll = DEFAULT_POLL_INTERVAL_MS,
        size_kb = DEFAULT_MAX_ENTRY_SIZE / 1024,
        paste = DEFAULT_PASTE_COMMAND,
        copy = DEFAULT_COPY_COMMAND,
        picker = DEFAULT_PICKER_COMMAND,
        delete = DEFAULT_DELETE_EXIT_CODE,
        preview = DEFAULT_PREVIEW_LENGTH,
    )
}
