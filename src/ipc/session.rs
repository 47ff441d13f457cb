// Cbm - Session de connexion
// Accumulation des octets d'une connexion jusqu'a un message complet
//
// Le protocole n'a ni prefixe de longueur ni delimiteur : un message est
// complet a la fin de flux (lecture de 0 octet) ou quand le plafond de
// `MESSAGE_CEILING` octets est atteint. Une session ne porte qu'un seul
// message ; la connexion est fermee des qu'il est complet.
//
// # Structure
// - `Session`      : machine a etats pure (tampon, compteur, completion)
// - `read_message` : pilote asynchrone qui lit une connexion via une Session
//
// # Erreurs
// Une erreur de lecture (autre qu'une fin de flux) est loguee et termine
// la session avec les octets deja recus.

use std::os::unix::io::{AsRawFd, RawFd};

use tokio::io::AsyncReadExt;
use tokio::net::UnixStream;
use tracing::{debug, warn};

use crate::constants::{MESSAGE_CEILING, READ_CHUNK_SIZE};

/// Etat d'une session apres une lecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Le message n'est pas encore complet
    Pending,
    /// Fin de flux ou plafond atteint
    Complete,
}

/// Etat d'accumulation d'une connexion acceptee.
#[derive(Debug)]
pub struct Session {
    /// Identifiant de la connexion (descripteur de fichier)
    id: RawFd,
    chunks: Vec<Vec<u8>>,
    total: usize,
    ceiling: usize,
}

impl Session {
    pub fn new(id: RawFd) -> Self {
        Self::with_ceiling(id, MESSAGE_CEILING)
    }

    /// Cree une session avec un plafond specifique.
    pub fn with_ceiling(id: RawFd, ceiling: usize) -> Self {
        Self {
            id,
            chunks: Vec::new(),
            total: 0,
            ceiling,
        }
    }

    pub fn id(&self) -> RawFd {
        self.id
    }

    /// Nombre total d'octets recus.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Taille de la prochaine lecture : min(READ_CHUNK_SIZE, plafond - recu).
    pub fn next_read_len(&self) -> usize {
        READ_CHUNK_SIZE.min(self.ceiling - self.total)
    }

    /// Ajoute le resultat d'une lecture. Un morceau vide signale la fin
    /// de flux. Les octets au-dela du plafond sont ignores.
    pub fn ingest(&mut self, chunk: &[u8]) -> SessionState {
        if chunk.is_empty() {
            return SessionState::Complete;
        }
        let room = self.ceiling - self.total;
        let take = chunk.len().min(room);
        self.chunks.push(chunk[..take].to_vec());
        self.total += take;
        if self.total >= self.ceiling {
            SessionState::Complete
        } else {
            SessionState::Pending
        }
    }

    /// Concatene les morceaux recus en un seul message.
    pub fn into_message(self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// Lit une connexion jusqu'a completion puis la ferme.
///
/// Retourne l'identifiant de la connexion et le message accumule.
pub async fn read_message(mut stream: UnixStream) -> (RawFd, Vec<u8>) {
    let mut session = Session::new(stream.as_raw_fd());
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let want = session.next_read_len();
        match stream.read(&mut buf[..want]).await {
            Ok(n) => {
                if session.ingest(&buf[..n]) == SessionState::Complete {
                    break;
                }
            }
            Err(e) => {
                warn!(fd = session.id(), "Socket error {}", e);
                break;
            }
        }
    }

    debug!(fd = session.id(), bytes = session.total(), "client message complete");
    // La connexion est fermee ici, quel que soit le contenu recu
    drop(stream);
    (session.id(), session.into_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_partial_reads_accumulate() {
        let mut s = Session::new(3);
        assert_eq!(s.ingest(b"PA"), SessionState::Pending);
        assert_eq!(s.ingest(b"S"), SessionState::Pending);
        assert_eq!(s.ingest(b"TE"), SessionState::Pending);
        assert_eq!(s.ingest(b""), SessionState::Complete);
        assert_eq!(s.into_message(), b"PASTE".to_vec());
    }

    #[test]
    fn test_read_len_shrinks_near_ceiling() {
        let mut s = Session::new(3);
        assert_eq!(s.next_read_len(), READ_CHUNK_SIZE);
        for _ in 0..6 {
            s.ingest(&vec![b'x'; READ_CHUNK_SIZE]);
        }
        assert_eq!(s.total(), 6 * READ_CHUNK_SIZE);
        assert_eq!(s.next_read_len(), MESSAGE_CEILING - 6 * READ_CHUNK_SIZE);
    }

    #[test]
    fn test_ceiling_forces_completion() {
        let mut s = Session::new(3);
        let mut state = SessionState::Pending;
        while state == SessionState::Pending {
            let n = s.next_read_len();
            state = s.ingest(&vec![b'y'; n]);
        }
        assert_eq!(s.total(), MESSAGE_CEILING);
        assert_eq!(s.into_message().len(), MESSAGE_CEILING);
    }

    #[test]
    fn test_oversized_chunk_is_clipped() {
        let mut s = Session::with_ceiling(3, 4);
        assert_eq!(s.ingest(b"PASTE"), SessionState::Complete);
        assert_eq!(s.into_message(), b"PAST".to_vec());
    }

    #[tokio::test]
    async fn test_read_message_until_eof() {
        let (server, mut client) = UnixStream::pair().unwrap();
        let writer = async move {
            client.write_all(b"PA").await.unwrap();
            tokio::task::yield_now().await;
            client.write_all(b"STE").await.unwrap();
            client.shutdown().await.unwrap();
        };
        let (_, (_, message)) = tokio::join!(writer, read_message(server));
        assert_eq!(message, b"PASTE".to_vec());
    }

    #[tokio::test]
    async fn test_read_message_stops_at_ceiling() {
        let (server, mut client) = UnixStream::pair().unwrap();
        let writer = async move {
            // Le daemon ferme la connexion au plafond : l'ecriture peut echouer
            let _ = client.write_all(&vec![b'z'; MESSAGE_CEILING + 10_000]).await;
        };
        let (_, (_, message)) = tokio::join!(writer, read_message(server));
        assert_eq!(message.len(), MESSAGE_CEILING);
    }
}
