// Cbm - Arbre de modules (crate library)
//
// Ce fichier constitue le point d'entree de la crate library de Cbm.
// Il re-exporte tous les modules pour permettre l'acces depuis le binaire
// et faciliter les tests d'integration.
//
// # Modules
// - `app`       : daemon et boucle d'evenements unique
// - `clipboard` : backends, surveillance et ecriture du presse-papiers
// - `config`    : lecture de la configuration utilisateur
// - `constants` : constantes globales (protocole, tailles, defauts)
// - `error`     : types d'erreur centralises (CbmError, CbmResult)
// - `history`   : historique deduplique en memoire
// - `ipc`       : socket local, sessions, requetes, client
// - `system`    : signaux de terminaison
// - `ui`        : contrat avec le selecteur d'historique

#![cfg(unix)]

/// Daemon et boucle d'evenements.
pub mod app;
/// Acces au presse-papiers partage.
pub mod clipboard;
/// Configuration utilisateur et parseur de fichiers.
pub mod config;
/// Constantes globales de l'application.
pub mod constants;
/// Types d'erreur centralises.
pub mod error;
/// Gestion de l'historique en memoire.
pub mod history;
/// Protocole IPC sur socket Unix.
pub mod ipc;
/// Integration avec le systeme (signaux).
pub mod system;
/// Selecteur d'historique.
pub mod ui;
