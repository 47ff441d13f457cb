// Cbm - Module clipboard
// Adaptateur entre le presse-papiers systeme et l'historique
//
// Ce module fournit quatre sous-modules complementaires :
// - `backend`  : trait `ClipboardBackend` et implementations (arboard,
//   commandes externes type wl-paste/wl-copy)
// - `monitor`  : `ClipboardWatcher`, detecte les changements par scrutation
//   et fournit les nouveaux contenus a l'historique
// - `injector` : ecrit dans le presse-papiers l'entree choisie par l'utilisateur
// - `worker`   : thread dedie qui execute le backend hors de la boucle
//
// Toutes les fonctions publiques retournent des CbmResult ; la boucle
// d'evenements decide de ce qui est fatal (rien ici ne l'est). Les appels
// au backend sont bloquants et ne sont faits que depuis le thread `worker`.

/// Backends d'acces au presse-papiers.
pub mod backend;
/// Ecriture dans le presse-papiers.
pub mod injector;
/// Detection des changements du presse-papiers.
pub mod monitor;
/// Thread d'acces au presse-papiers.
pub mod worker;
