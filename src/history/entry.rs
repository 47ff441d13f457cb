// Cbm - Structure HistoryEntry
// Represente une entree dans l'historique du presse-papiers
//
// Ce module definit les types de donnees fondamentaux de l'historique :
// - `ClipPayload`  : contenu copie, texte UTF-8 valide ou octets bruts
// - `HistoryEntry` : contenu + horodatage de la premiere observation
//
// # Decodage
// `ClipPayload::from_bytes` tente un decodage UTF-8 ; en cas d'echec les
// octets sont conserves tels quels. L'egalite (et donc la deduplication)
// est definie sur la variante et la valeur exacte.
//
// # Deduplication
// `HistoryEntry` compare uniquement le contenu, pas l'horodatage.

use std::borrow::Cow;

/// Contenu d'une copie, decode au mieux.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClipPayload {
    /// Texte UTF-8 valide
    Text(String),
    /// Octets non decodables en UTF-8
    Bytes(Vec<u8>),
}

impl ClipPayload {
    /// Decode des octets bruts : texte si UTF-8 valide, octets sinon.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Self::Text(text),
            Err(e) => Self::Bytes(e.into_bytes()),
        }
    }

    /// Octets du contenu, quelle que soit la variante.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(t) => t.as_bytes(),
            Self::Bytes(b) => b,
        }
    }

    /// Texte du contenu ; les sequences invalides sont remplacees.
    pub fn to_text_lossy(&self) -> Cow<'_, str> {
        match self {
            Self::Text(t) => Cow::Borrowed(t),
            Self::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Taille du contenu en octets.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for ClipPayload {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ClipPayload {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Une entree dans l'historique du presse-papiers.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Horodatage UTC de la capture (secondes depuis epoch Unix)
    pub captured_at: i64,
    /// Contenu copie
    pub payload: ClipPayload,
}

impl HistoryEntry {
    /// Cree une nouvelle entree avec le timestamp courant.
    pub fn new(payload: ClipPayload) -> Self {
        let captured_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        Self { captured_at, payload }
    }

    /// Apercu sur une ligne : premiere ligne tronquee, suivie du nombre
    /// de lignes restantes s'il y en a.
    pub fn preview(&self, max_len: usize) -> String {
        let text = self.payload.to_text_lossy();
        let mut lines = text.lines();
        let first = lines.next().unwrap_or("");
        let rest = lines.count();

        let mut out = if first.chars().count() <= max_len {
            first.to_string()
        } else {
            let mut s: String = first.chars().take(max_len.saturating_sub(3)).collect();
            s.push_str("...");
            s
        };
        if rest > 0 {
            out.push_str(&format!(" (+{} lines)", rest));
        }
        out
    }

    /// Retourne l'age de l'entree en secondes.
    pub fn age_secs(&self) -> u64 {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        (now - self.captured_at).max(0) as u64
    }
}

impl PartialEq for HistoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl Eq for HistoryEntry {}
