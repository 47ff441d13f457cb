// Cbm - Socket d'ecoute IPC
// Cycle de vie du point d'acces local : nettoyage, liaison, fermeture
//
// # Demarrage
// 1. Si un daemon vivant repond sur le chemin, echec (`AddrInUse`)
// 2. Suppression d'un socket perime (absence = succes)
// 3. Creation et liaison d'un socket Unix de type flux
// 4. Permissions 0600 sur le fichier du socket
// 5. Ecoute avec un backlog de `LISTEN_BACKLOG`
//
// # Fermeture
// `close` supprime le fichier du socket. Un fichier deja absent n'est pas
// une erreur ; toute autre erreur est loguee et n'empeche pas l'arret.
//
// socket2 est utilise pour fixer le backlog, que la bibliotheque standard
// ne permet pas de choisir.

use std::fs;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use socket2::{Domain, SockAddr, Socket, Type};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use crate::constants::{LISTEN_BACKLOG, SOCKET_MODE};
use crate::error::{CbmError, CbmResult};

/// Socket d'ecoute lie au point d'acces du daemon.
#[derive(Debug)]
pub struct IpcListener {
    inner: UnixListener,
    path: PathBuf,
}

impl IpcListener {
    /// Lie le socket d'ecoute a `path`.
    ///
    /// Doit etre appele depuis un runtime tokio.
    ///
    /// # Errors
    /// - `CbmError::AddrInUse` : un daemon vivant detient deja `path`
    /// - `CbmError::Bind` : nettoyage, liaison, chmod ou ecoute impossible
    pub fn bind(path: &Path) -> CbmResult<Self> {
        let bind_err = |source: io::Error| CbmError::Bind {
            path: path.to_path_buf(),
            source,
        };

        if endpoint_is_live(path) {
            return Err(CbmError::AddrInUse { path: path.to_path_buf() });
        }
        if remove_endpoint(path).map_err(bind_err)? {
            debug!(path = %path.display(), "stale socket file removed");
        }

        let socket = Socket::new(Domain::UNIX, Type::STREAM, None).map_err(bind_err)?;
        let addr = SockAddr::unix(path).map_err(bind_err)?;
        socket.bind(&addr).map_err(bind_err)?;
        fs::set_permissions(path, fs::Permissions::from_mode(SOCKET_MODE)).map_err(bind_err)?;
        socket.listen(LISTEN_BACKLOG).map_err(bind_err)?;
        socket.set_nonblocking(true).map_err(bind_err)?;

        let std_listener = std::os::unix::net::UnixListener::from(OwnedFd::from(socket));
        let inner = UnixListener::from_std(std_listener).map_err(bind_err)?;

        info!(path = %path.display(), "listening for clients");
        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    /// Attend et accepte la prochaine connexion.
    pub async fn accept(&self) -> io::Result<UnixStream> {
        let (stream, _addr) = self.inner.accept().await?;
        Ok(stream)
    }

    /// Chemin du point d'acces.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ferme le socket et supprime le fichier du point d'acces.
    pub fn close(self) {
        let Self { inner, path } = self;
        drop(inner);
        match remove_endpoint(&path) {
            Ok(true) => debug!(path = %path.display(), "socket file removed"),
            Ok(false) => debug!(path = %path.display(), "socket file already gone"),
            Err(e) => warn!("Failed to remove socket file: {}: {}", path.display(), e),
        }
    }
}

/// Supprime le fichier du point d'acces.
///
/// Retourne `Ok(false)` si le fichier n'existait pas.
pub fn remove_endpoint(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Un daemon vivant accepte les connexions ; un socket perime les refuse.
fn endpoint_is_live(path: &Path) -> bool {
    std::os::unix::net::UnixStream::connect(path).is_ok()
}
