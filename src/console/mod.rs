// Soundkeys Console
// Line-oriented front end: key chords and editor commands from stdin

mod commands;

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use soundkeys_core::{AudioService, Dispatched, EditSession, Soundboard};

pub use commands::{parse_line, Command, CommandError, HELP};

/// Whether the console keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Console state: the soundboard, one edit session and an output sink
pub struct Console<A: AudioService + 'static, W: Write> {
    board: Soundboard<A>,
    session: EditSession,
    out: W,
}

impl<A: AudioService + 'static, W: Write> Console<A, W> {
    pub fn new(board: Soundboard<A>, out: W) -> Self {
        Self {
            board,
            session: EditSession::new(),
            out,
        }
    }

    pub fn board(&self) -> &Soundboard<A> {
        &self.board
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Parse and run one input line
    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        match parse_line(line) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => Ok(Flow::Continue),
            Err(e) => {
                writeln!(self.out, "error: {}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    pub fn execute(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Press(event) => match self.board.handle_event(&event) {
                Ok(Dispatched::Played(path)) => writeln!(self.out, "play {}", path)?,
                Ok(Dispatched::LoopStarted(token)) => writeln!(self.out, "loop on {}", token)?,
                Ok(Dispatched::LoopStopped(token)) => writeln!(self.out, "loop off {}", token)?,
                Ok(Dispatched::StoppedAll) => writeln!(self.out, "stopped all")?,
                Ok(Dispatched::StoppedLooping) => writeln!(self.out, "stopped looping")?,
                Ok(Dispatched::Unbound) | Ok(Dispatched::ModifierKey) => {}
                Err(e) => writeln!(self.out, "audio error: {}", e)?,
            },
            Command::Edit => {
                self.session.open(self.board.table());
                if let Some(pending) = self.session.pending() {
                    writeln!(
                        self.out,
                        "editing: {} file={} loop={}",
                        pending.kind,
                        pending.file.as_deref().unwrap_or("-"),
                        pending.loopable
                    )?;
                }
            }
            Command::Click(key) => {
                self.session.click_key(&key);
                self.show()?;
            }
            Command::Kind(kind) => {
                let result = self.session.set_kind(kind);
                self.report(result)?;
            }
            Command::File(file) => {
                let result = self.session.select_file(file);
                self.report(result)?;
            }
            Command::Loop(loopable) => {
                let result = self.session.set_loopable(loopable);
                self.report(result)?;
            }
            Command::Save => match self.board.save_edit(&mut self.session) {
                Ok(true) => writeln!(self.out, "saved")?,
                Ok(false) => writeln!(self.out, "unchanged")?,
                Err(e) => writeln!(self.out, "error: {}", e)?,
            },
            Command::Clear => match self.board.clear_edit(&mut self.session) {
                Ok(true) => writeln!(self.out, "cleared")?,
                Ok(false) => writeln!(self.out, "nothing to clear")?,
                Err(e) => writeln!(self.out, "error: {}", e)?,
            },
            Command::Cancel => self.session.cancel(),
            Command::Show => self.show()?,
            Command::Loops => {
                let loops = self.board.active_loops();
                if loops.is_empty() {
                    writeln!(self.out, "no active loops")?;
                }
                for token in loops {
                    writeln!(self.out, "{}", token)?;
                }
            }
            Command::Write => match self.board.write_config() {
                Ok(()) => writeln!(self.out, "written")?,
                Err(e) => writeln!(self.out, "error: {}", e)?,
            },
            Command::Open(path) => match self.board.open_config(&path) {
                Ok(()) => {
                    self.session.cancel();
                    writeln!(self.out, "opened {}", path.display())?;
                }
                Err(e) => writeln!(self.out, "error: {}", e)?,
            },
            Command::ResetSettings => match self.board.reset_settings() {
                Ok(()) => writeln!(self.out, "settings reset")?,
                Err(e) => writeln!(self.out, "error: {}", e)?,
            },
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn show(&mut self) -> io::Result<()> {
        let summary = self.session.describe(self.board.table());
        writeln!(self.out, "{}", summary)
    }

    fn report<E: std::fmt::Display>(&mut self, result: Result<(), E>) -> io::Result<()> {
        if let Err(e) = result {
            writeln!(self.out, "error: {}", e)?;
        }
        Ok(())
    }

    /// Stop all sounds and hand the soundboard back
    pub fn finish(self) -> Soundboard<A> {
        if self.board.is_dirty() {
            log::warn!("Exiting with unsaved binding changes");
        }
        if let Err(e) = self.board.shutdown() {
            log::warn!("Failed to stop sounds on exit: {}", e);
        }
        self.board
    }
}

/// Read stdin until EOF, `:quit` or a shutdown signal
pub fn run<A, W>(mut console: Console<A, W>, running: Arc<AtomicBool>) -> io::Result<Soundboard<A>>
where
    A: AudioService + 'static,
    W: Write,
{
    let (tx, rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::warn!("stdin read failed: {}", e);
                    break;
                }
            }
        }
    });

    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => {
                if console.handle_line(&line)? == Flow::Quit {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                log::debug!("stdin closed");
                break;
            }
        }
    }

    Ok(console.finish())
}
