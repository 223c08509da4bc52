//! Line commands understood by the interactive shell.

use gtd_core::KeyPress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Hash(String),
    Back,
    Forward,
    Click(String),
    Pick {
        container: String,
        class: String,
        index: usize,
    },
    Type { id: String, text: String },
    Submit(String),
    Key(KeyPress),
    Confirm(bool),
    Tick,
    Online(bool),
    Show,
    State,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    Usage(&'static str),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("empty command"),
            Self::Unknown(name) => write!(f, "unknown command `{name}`; try `help`"),
            Self::Usage(usage) => write!(f, "usage: {usage}"),
        }
    }
}

pub const HELP: &str = "\
commands:
  go <route>                    navigate (inbox, clarify, actions, projects, review)
  hash <fragment>               replace the whole fragment, e.g. clarify?thingId=3
  back | forward                walk history
  click <id>                    click an element by id
  pick <container> <class> [n]  click the n-th rendered node with class (default 0)
  type <id> <text>              set a field value and fire input
  submit <form-id>              submit a form
  key <chord>                   press a key on the focused element, e.g. ctrl+1, Enter
  confirm yes|no                answer to give future confirmation prompts
  tick                          advance timers to now
  online | offline              report connectivity
  show                          print the visible screen
  state                         print the full state as JSON
  help | quit";

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    if name.is_empty() {
        return Err(ParseError::Empty);
    }

    let command = match name.to_ascii_lowercase().as_str() {
        "go" | "nav" => Command::Go(required(rest, "go <route>")?),
        "hash" => Command::Hash(rest.to_string()),
        "back" => Command::Back,
        "forward" => Command::Forward,
        "click" => Command::Click(required(rest, "click <id>")?),
        "pick" => {
            let mut parts = rest.split_whitespace();
            let usage = "pick <container> <class> [n]";
            let container = parts.next().ok_or(ParseError::Usage(usage))?;
            let class = parts.next().ok_or(ParseError::Usage(usage))?;
            let index = match parts.next() {
                Some(raw) => raw.parse().map_err(|_| ParseError::Usage(usage))?,
                None => 0,
            };
            Command::Pick {
                container: container.to_string(),
                class: class.to_string(),
                index,
            }
        }
        "type" => {
            let (id, text) = rest
                .split_once(char::is_whitespace)
                .map(|(id, text)| (id, text.trim()))
                .unwrap_or((rest, ""));
            Command::Type {
                id: required(id, "type <id> <text>")?,
                text: text.to_string(),
            }
        }
        "submit" => Command::Submit(required(rest, "submit <form-id>")?),
        "key" => Command::Key(KeyPress::parse(rest).ok_or(ParseError::Usage("key <chord>"))?),
        "confirm" => match rest.to_ascii_lowercase().as_str() {
            "yes" | "y" => Command::Confirm(true),
            "no" | "n" => Command::Confirm(false),
            _ => return Err(ParseError::Usage("confirm yes|no")),
        },
        "tick" => Command::Tick,
        "online" => Command::Online(true),
        "offline" => Command::Online(false),
        "show" => Command::Show,
        "state" => Command::State,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn required(value: &str, usage: &'static str) -> Result<String, ParseError> {
    if value.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(value.to_string())
    }
}
