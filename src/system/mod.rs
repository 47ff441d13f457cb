// Cbm - Module system
// Integration avec le systeme d'exploitation
//
// # Sous-modules
// - `signals` : signaux de terminaison (SIGINT, SIGTERM, SIGHUP) recus
//               comme evenements de la boucle
//
// # Portabilite
// Ce module est specifique a Unix.

/// Signaux de terminaison du daemon.
pub mod signals;
