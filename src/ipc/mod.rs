// Cbm - Module ipc
// Communication locale entre le client ephemere et le daemon
//
// # Sous-modules
// - `listener` : socket Unix d'ecoute (nettoyage, liaison 0600, fermeture)
// - `session`  : accumulation des octets d'une connexion (fin de flux ou plafond)
// - `dispatch` : interpretation du message complet (`PASTE`)
// - `client`   : envoi d'une requete unique par le client
//
// # Protocole
// Octets bruts, sans prefixe de longueur ni delimiteur, a sens unique.
// Une connexion porte exactement un message ; aucune reponse n'est envoyee.

/// Envoi d'une requete par le client.
pub mod client;
/// Interpretation des messages complets.
pub mod dispatch;
/// Socket d'ecoute du daemon.
pub mod listener;
/// Accumulation des messages par connexion.
pub mod session;
