// Cbm - Parseur format cle-valeur
// Format simple : sections [nom], cle = valeur, commentaires #
//
// # Format supporte
// - Sections : `[section_name]`
// - Cle-valeur : `key = value`
// - Guillemets : `key = "value with spaces # not a comment"`
// - Commentaires : `# ligne entiere` ou `key = value # inline`
// - Valeurs sans section sont affectees a la section "general"
//
// # Erreurs
// Contrairement a un parseur tolerant, toute ligne non reconnue est une
// erreur `CbmError::Config` portant son numero de ligne (a partir de 1) :
// une faute de frappe dans une commande de selecteur doit etre visible.

use std::collections::HashMap;

use crate::error::{CbmError, CbmResult};

/// Resultat du parsing : sections contenant des paires cle-valeur.
pub type ParsedConfig = HashMap<String, HashMap<String, String>>;

/// Parse un fichier de configuration au format cle-valeur avec sections.
pub fn parse_config(text: &str) -> CbmResult<ParsedConfig> {
    let mut config = ParsedConfig::new();
    let mut section = String::from("general");

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .map(str::trim)
                .ok_or_else(|| config_error(line_no, "unterminated section header"))?;
            if name.is_empty() {
                return Err(config_error(line_no, "empty section name"));
            }
            section = name.to_string();
            continue;
        }

        let (key, raw_value) = trimmed
            .split_once('=')
            .ok_or_else(|| config_error(line_no, "expected `key = value`"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(config_error(line_no, "missing key before '='"));
        }
        let value = parse_value(raw_value, line_no)?;

        config
            .entry(section.clone())
            .or_default()
            .insert(key.to_string(), value);
    }

    Ok(config)
}

/// Extrait la valeur : guillemets retires, commentaire inline ignore.
fn parse_value(raw: &str, line_no: usize) -> CbmResult<String> {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix('"') {
        let end = rest
            .find('"')
            .ok_or_else(|| config_error(line_no, "unterminated quoted value"))?;
        let tail = rest[end + 1..].trim();
        if !tail.is_empty() && !tail.starts_with('#') {
            return Err(config_error(line_no, "unexpected text after quoted value"));
        }
        return Ok(rest[..end].to_string());
    }
    let value = match raw.find('#') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    Ok(value.trim().to_string())
}

fn config_error(line: usize, message: &str) -> CbmError {
    CbmError::Config {
        line,
        message: message.to_string(),
    }
}

/// Parse une valeur numerique.
pub fn parse_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}
