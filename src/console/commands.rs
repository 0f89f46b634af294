// Soundkeys Console - Command Parser
// One line of console input becomes one command

use std::path::PathBuf;

use soundkeys_core::{parse_chord, InputError, KeyCode, KeyEvent, PendingKind};

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Key-down event, written as a chord (`shift+k`)
    Press(KeyEvent),
    /// Open the edit session on the current selection
    Edit,
    /// Click a key in the editor; modifier keys toggle
    Click(KeyCode),
    Kind(PendingKind),
    File(Option<String>),
    Loop(bool),
    Save,
    Clear,
    Cancel,
    /// Describe the binding under the editor selection
    Show,
    /// List active loops
    Loops,
    /// Write the table to its config file
    Write,
    /// Switch to another config file
    Open(PathBuf),
    ResetSettings,
    Help,
    Quit,
}

/// Errors for lines that do not parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("unknown command ':{0}'")]
    Unknown(String),

    #[error(":{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("invalid argument for :{command}: '{value}'")]
    InvalidArgument { command: &'static str, value: String },
}

pub const HELP: &str = "\
<chord>           press a key, e.g. `k`, `shift+alt+k`, `shift++`
:key <name>       click a key in the editor (modifiers toggle)
:edit             open the editor on the selection
:kind <type>      sound | stopAll | stopLooping
:file [path]      choose the sound file (no path clears it)
:loop on|off      set the loop flag
:save | :clear | :cancel
:show             describe the selected binding
:loops            list active loops
:write            write the config file
:open <file>      switch to another config
:reset-settings   restore default settings
:quit";

/// Parse one line; blank lines and `#` comments yield `None`
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix(':') else {
        return Ok(Some(Command::Press(parse_chord(line)?)));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "edit" => Command::Edit,
        "key" => Command::Click(KeyCode::from(required("key", arg)?)),
        "kind" => {
            let value = required("kind", arg)?;
            Command::Kind(value.parse().map_err(|_| CommandError::InvalidArgument {
                command: "kind",
                value: value.to_string(),
            })?)
        }
        "file" => Command::File(if arg.is_empty() {
            None
        } else {
            Some(arg.to_string())
        }),
        "loop" => match required("loop", arg)? {
            "on" | "true" | "yes" => Command::Loop(true),
            "off" | "false" | "no" => Command::Loop(false),
            other => {
                return Err(CommandError::InvalidArgument {
                    command: "loop",
                    value: other.to_string(),
                })
            }
        },
        "save" => Command::Save,
        "clear" => Command::Clear,
        "cancel" => Command::Cancel,
        "show" => Command::Show,
        "loops" => Command::Loops,
        "write" | "w" => Command::Write,
        "open" => Command::Open(PathBuf::from(required("open", arg)?)),
        "reset-settings" => Command::ResetSettings,
        "help" | "h" => Command::Help,
        "quit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn required<'a>(command: &'static str, arg: &'a str) -> Result<&'a str, CommandError> {
    if arg.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(arg)
    }
}
