// Cbm - Module history
// Gestion de l'historique du presse-papiers en memoire
//
// Ce module est independant de la plateforme (pas d'appel systeme).
//
// # Sous-modules
// - `entry` : contenu decode (`ClipPayload`) et entree horodatee
// - `store` : liste ordonnee et dedupliquee, detenue par la boucle

/// Structure de donnees d'une entree de presse-papiers.
pub mod entry;
/// Historique ordonne et deduplique.
pub mod store;
