// Cbm - Client IPC
// Connexion unique : connecter, envoyer la requete, fermer.
//
// Aucune reponse n'est attendue. Le client est bloquant : il est utilise
// par un processus ephemere (raccourci clavier) et n'a pas de boucle.

use std::io::Write;
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;

use tracing::debug;

use crate::error::{CbmError, CbmResult};
use crate::ipc::dispatch::Request;

/// Envoie `request` au daemon ecoutant sur `path`.
///
/// # Errors
/// - `CbmError::Connect` : aucun daemon joignable sur `path`
/// - `CbmError::Io` : la connexion a ete coupee pendant l'envoi
pub fn send_request(path: &Path, request: Request) -> CbmResult<()> {
    debug!("Connecting to server to update.");
    let mut stream = UnixStream::connect(path).map_err(|source| CbmError::Connect {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Sending request to server.");
    stream.write_all(request.as_bytes())?;
    // Fin de flux : le daemon considere le message complet
    stream.shutdown(Shutdown::Write)?;
    Ok(())
}
