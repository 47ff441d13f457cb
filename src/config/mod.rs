// Cbm - Module config
// Lecture de la configuration utilisateur
//
// Ce module gere la configuration de Cbm via un fichier texte optionnel
// au format cle-valeur avec sections, donne par `--config`.
//
// # Sous-modules
// - `parser`   : parseur de fichiers cle-valeur avec sections, commentaires
//                et guillemets ; les lignes invalides sont des erreurs
// - `settings` : structure Settings (socket, log, presse-papiers, selecteur)
//                avec valeurs par defaut et validation des plages

/// Parseur de fichiers de configuration au format cle-valeur avec sections.
pub mod parser;
/// Structure de configuration et valeurs par defaut de l'application.
pub mod settings;
