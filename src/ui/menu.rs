// Cbm - Selecteur externe de type dmenu
//
// Lance un programme qui lit une liste de lignes sur stdin et ecrit la
// ligne choisie sur stdout (rofi -dmenu, dmenu, wofi --dmenu, fzf).
//
// # Format
// Une ligne par entree, de la plus ancienne a la plus recente :
// `<index>: <apercu>`. L'index en tete permet de retrouver l'entree
// complete a partir de la ligne choisie, meme tronquee.
//
// # Resultat
// - code 0                   : activer la premiere entree choisie
// - code `delete_exit_code`  : supprimer les entrees choisies
// - autre code ou rien choisi : selecteur ferme sans action
//
// Le programme tourne dans une tache tokio ; `open` ne bloque jamais la
// boucle. Un seul selecteur est ouvert a la fois.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::clipboard::backend::split_command;
use crate::error::{CbmError, CbmResult};
use crate::history::entry::HistoryEntry;
use crate::ui::{Picker, PickerHandle};

/// Decision de l'utilisateur dans le selecteur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Entrees choisies pour activation
    Selected(Vec<usize>),
    /// Entrees choisies pour suppression
    Delete(Vec<usize>),
    /// Selecteur ferme sans choix
    Dismissed,
}

/// Selecteur pilotant un programme externe.
pub struct MenuPicker {
    program: String,
    args: Vec<String>,
    delete_exit_code: i32,
    preview_length: usize,
    running: Option<JoinHandle<()>>,
}

impl MenuPicker {
    /// Cree le selecteur a partir d'une ligne de commande (decoupee sur
    /// les espaces, sans shell).
    pub fn new(command: &str, delete_exit_code: i32, preview_length: usize) -> CbmResult<Self> {
        let mut parts = split_command(command)
            .ok_or_else(|| CbmError::Picker("empty picker command".into()))?;
        let program = parts.remove(0);
        Ok(Self::with_args(program, parts, delete_exit_code, preview_length))
    }

    pub fn with_args(program: String, args: Vec<String>, delete_exit_code: i32, preview_length: usize) -> Self {
        Self {
            program,
            args,
            delete_exit_code,
            preview_length,
            running: None,
        }
    }

    fn is_busy(&self) -> bool {
        self.running.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Picker for MenuPicker {
    fn open(&mut self, entries: Vec<HistoryEntry>, handle: PickerHandle) -> CbmResult<()> {
        if self.is_busy() {
            debug!("picker already open, request ignored");
            return Ok(());
        }

        let input = render_menu(&entries, self.preview_length);
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CbmError::Picker(format!("cannot launch {}: {}", self.program, e)))?;

        let delete_exit_code = self.delete_exit_code;
        self.running = Some(tokio::spawn(run_menu(child, input, entries, handle, delete_exit_code)));
        Ok(())
    }
}

/// Alimente le selecteur, attend sa fin et renvoie le choix a la boucle.
async fn run_menu(
    mut child: Child,
    input: String,
    entries: Vec<HistoryEntry>,
    handle: PickerHandle,
    delete_exit_code: i32,
) {
    if let Some(mut stdin) = child.stdin.take() {
        // Un selecteur peut fermer stdin avant la fin de la liste
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            debug!("picker stdin closed early: {}", e);
        }
    }

    let output = match child.wait_with_output().await {
        Ok(o) => o,
        Err(e) => {
            warn!("picker failed: {}", e);
            return;
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    match interpret(output.status.code(), &stdout, delete_exit_code) {
        MenuOutcome::Selected(indices) => {
            if let Some(entry) = indices.first().and_then(|&i| entries.get(i)) {
                handle.activate(entry.payload.clone());
            }
        }
        MenuOutcome::Delete(indices) => {
            let payloads: Vec<_> = indices
                .iter()
                .filter_map(|&i| entries.get(i))
                .map(|e| e.payload.clone())
                .collect();
            if !payloads.is_empty() {
                handle.remove(payloads);
            }
        }
        MenuOutcome::Dismissed => debug!("picker dismissed"),
    }
}

/// Produit l'entree du selecteur : une ligne `<index>: <apercu>` par entree.
pub fn render_menu(entries: &[HistoryEntry], preview_length: usize) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!("{}: {}\n", i, entry.preview(preview_length)));
    }
    out
}

/// Retrouve les index des lignes choisies.
pub fn parse_selection(stdout: &str) -> Vec<usize> {
    stdout
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(index, _)| index.trim().parse().ok())
        .collect()
}

/// Interprete le code de sortie et la sortie du selecteur.
pub fn interpret(code: Option<i32>, stdout: &str, delete_exit_code: i32) -> MenuOutcome {
    let indices = parse_selection(stdout);
    if indices.is_empty() {
        return MenuOutcome::Dismissed;
    }
    match code {
        Some(0) => MenuOutcome::Selected(indices),
        Some(c) if c == delete_exit_code => MenuOutcome::Delete(indices),
        _ => MenuOutcome::Dismissed,
    }
}
