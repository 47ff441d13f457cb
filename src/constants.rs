// Cbm - Constantes globales
//
// Ce module centralise les constantes de l'application :
// - Protocole IPC (requete, plafond de message, taille de lecture)
// - Socket d'ecoute (chemin par defaut, backlog, permissions)
// - Valeurs par defaut de la configuration (presse-papiers, selecteur)

/// Unique requete definie par le protocole IPC.
pub const PASTE_REQUEST: &[u8] = b"PASTE";

/// Taille maximale d'un message IPC (octets).
pub const MESSAGE_CEILING: usize = 50_000;

/// Taille maximale d'une lecture sur une connexion (octets).
pub const READ_CHUNK_SIZE: usize = 8192;

/// File d'attente des connexions en attente d'accept.
pub const LISTEN_BACKLOG: i32 = 5;

/// Permissions du socket : lecture/ecriture proprietaire uniquement.
pub const SOCKET_MODE: u32 = 0o600;

/// Chemin du socket par defaut (relatif au repertoire courant).
pub const DEFAULT_SOCKET_FILE: &str = "./cbm_sock";

/// Intervalle de scrutation du presse-papiers par defaut (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Taille max par entree par defaut (1 Mo).
pub const DEFAULT_MAX_ENTRY_SIZE: usize = 1_048_576;

/// Commande de lecture du backend `command`.
pub const DEFAULT_PASTE_COMMAND: &str = "wl-paste --no-newline";

/// Commande d'ecriture du backend `command`.
pub const DEFAULT_COPY_COMMAND: &str = "wl-copy";

/// Selecteur externe par defaut (Alt+Delete supprime l'entree).
///
/// Shift+Delete est deja lie a `kb-delete-entry` par rofi.
pub const DEFAULT_PICKER_COMMAND: &str = "rofi -dmenu -i -p cbm -kb-custom-1 Alt+Delete";

/// Code de sortie du selecteur signifiant "supprimer" (kb-custom-1 de rofi).
pub const DEFAULT_DELETE_EXIT_CODE: i32 = 10;

/// Longueur d'apercu par defaut dans le selecteur (caracteres).
pub const DEFAULT_PREVIEW_LENGTH: usize = 80;

/// Valeur de `picker.command` desactivant le selecteur graphique.
pub const HEADLESS_PICKER: &str = "none";

/// Pause avant de reprendre l'accept apres une erreur (EMFILE, ENFILE).
pub const ACCEPT_RETRY_DELAY: std::time::Duration = std::time::Duration::from_millis(100);
