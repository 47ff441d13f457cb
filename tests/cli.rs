// Cbm - Tests du binaire
// Pilote `cbm` comme le ferait un utilisateur : daemon, client, signaux.

use std::fs;
use std::io;
use std::os::unix::net::UnixStream;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::tempdir;

const CONFIG: &str = r#"
[clipboard]
backend = command
paste_command = true

[picker]
command = none
"#;

fn cbm() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cbm"))
}

fn wait_for(mut cond: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

fn wait_exit(child: &mut Child, timeout: Duration) -> Option<ExitStatus> {
    let mut status = None;
    wait_for(
        || {
            status = child.try_wait().ok().flatten();
            status.is_some()
        },
        timeout,
    );
    status
}

/// Le fichier existe des la liaison : attendre que le daemon accepte.
fn wait_listening(socket: &Path) -> bool {
    wait_for(|| UnixStream::connect(socket).is_ok(), Duration::from_secs(10))
}

fn daemon_command(config: &Path, socket: &Path) -> Command {
    let mut cmd = cbm();
    cmd.arg("--daemon")
        .arg("--config")
        .arg(config)
        .arg("--socket_file")
        .arg(socket)
        .args(["--log_level", "DEBUG"])
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

fn spawn_daemon(config: &Path, socket: &Path) -> Child {
    daemon_command(config, socket).spawn().unwrap()
}

fn stop_daemon(mut daemon: Child) -> Option<ExitStatus> {
    unsafe {
        libc::kill(daemon.id() as libc::pid_t, libc::SIGTERM);
    }
    let status = wait_exit(&mut daemon, Duration::from_secs(10));
    if status.is_none() {
        let _ = daemon.kill();
    }
    status
}

#[test]
fn test_client_without_daemon_exits_1() {
    let dir = tempdir().unwrap();
    let status = cbm()
        .arg("-s")
        .arg(dir.path().join("cbm_sock"))
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_client_error_is_one_line() {
    let dir = tempdir().unwrap();
    let output = cbm().arg("-s").arg(dir.path().join("cbm_sock")).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Is daemon running?"), "stderr: {}", stderr);
    assert!(!stderr.contains("os error"), "stderr: {}", stderr);
}

#[test]
fn test_print_config_is_loadable() {
    let dir = tempdir().unwrap();
    let output = cbm().arg("--print-config").output().unwrap();
    assert!(output.status.success());

    let config = dir.path().join("cbm.conf");
    fs::write(&config, &output.stdout).unwrap();
    // Config valide : seul le daemon absent fait echouer le client
    let status = cbm()
        .arg("--config")
        .arg(&config)
        .arg("--socket-file")
        .arg(dir.path().join("cbm_sock"))
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cbm.conf");
    fs::write(&config, "[clipboard]\nbackend = xsel\n").unwrap();
    let output = cbm().arg("-c").arg(&config).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("clipboard.backend"));
}

#[test]
fn test_daemon_lifecycle() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cbm.conf");
    let socket = dir.path().join("cbm_sock");
    fs::write(&config, CONFIG).unwrap();

    let mut daemon = spawn_daemon(&config, &socket);
    assert!(wait_listening(&socket), "daemon never listened");

    let status = cbm().arg("-s").arg(&socket).status().unwrap();
    assert!(status.success());

    // Signaux repetes pendant l'arret : absorbes
    let pid = daemon.id() as libc::pid_t;
    for _ in 0..3 {
        unsafe {
            libc::kill(pid, libc::SIGINT);
        }
    }

    let status = wait_exit(&mut daemon, Duration::from_secs(10));
    if status.is_none() {
        let _ = daemon.kill();
    }
    assert!(status.is_some_and(|s| s.success()), "daemon status: {:?}", status);
    assert!(!socket.exists());
}

#[test]
fn test_second_daemon_refuses_live_socket() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cbm.conf");
    let socket = dir.path().join("cbm_sock");
    fs::write(&config, CONFIG).unwrap();

    let mut first = spawn_daemon(&config, &socket);
    assert!(wait_listening(&socket));

    let mut second = spawn_daemon(&config, &socket);
    let status = wait_exit(&mut second, Duration::from_secs(10));
    assert_eq!(status.and_then(|s| s.code()), Some(1));
    // Le socket du premier daemon est intact
    assert!(socket.exists());

    unsafe {
        libc::kill(first.id() as libc::pid_t, libc::SIGTERM);
    }
    let status = wait_exit(&mut first, Duration::from_secs(10));
    if status.is_none() {
        let _ = first.kill();
    }
    assert!(status.is_some_and(|s| s.success()));
}

/// Temps CPU (utime + stime) du processus, en ticks d'horloge.
#[cfg(target_os = "linux")]
fn cpu_ticks(pid: u32) -> u64 {
    let stat = fs::read_to_string(format!("/proc/{}/stat", pid)).unwrap();
    let fields: Vec<&str> = stat[stat.rfind(')').unwrap() + 2..].split_whitespace().collect();
    fields[11].parse::<u64>().unwrap() + fields[12].parse::<u64>().unwrap()
}

#[cfg(target_os = "linux")]
#[test]
fn test_descriptor_exhaustion_does_not_spin() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("cbm.conf");
    let socket = dir.path().join("cbm_sock");
    fs::write(&config, CONFIG).unwrap();

    let mut cmd = daemon_command(&config, &socket);
    unsafe {
        cmd.pre_exec(|| {
            let limit = libc::rlimit {
                rlim_cur: 16,
                rlim_max: 16,
            };
            if libc::setrlimit(libc::RLIMIT_NOFILE, &limit) != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
    let daemon = cmd.spawn().unwrap();
    assert!(wait_listening(&socket), "daemon never listened");

    // Plus de connexions que de descripteurs libres : accept echoue en EMFILE
    let addr = socket2::SockAddr::unix(&socket).unwrap();
    let mut clients = Vec::new();
    for _ in 0..30 {
        let s = socket2::Socket::new(socket2::Domain::UNIX, socket2::Type::STREAM, None).unwrap();
        s.set_nonblocking(true).unwrap();
        let _ = s.connect(&addr);
        clients.push(s);
    }
    thread::sleep(Duration::from_millis(200));

    let hz = unsafe { libc::sysconf(libc::_SC_CLK_TCK) } as u64;
    let before = cpu_ticks(daemon.id());
    thread::sleep(Duration::from_secs(1));
    let used = cpu_ticks(daemon.id()) - before;
    assert!(used < hz / 2, "daemon used {} of {} ticks in 1s", used, hz);

    drop(clients);
    let status = stop_daemon(daemon);
    assert!(status.is_some_and(|s| s.success()), "daemon status: {:?}", status);
    assert!(!socket.exists());
}
