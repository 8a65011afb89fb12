//! Chat command parsing
//!
//! A chat line addressed to the bot is split shell-style into arguments and
//! parsed into a closed set of commands. Every error has a user-facing
//! message, since it is sent straight back to the channel.

use std::collections::HashMap;

use thiserror::Error;

use crate::client::PublishOptions;
use crate::registry::Topic;

/// Usage text sent for `help` and for an empty command
pub const USAGE: &str = "\
Usage:
  publish <topic> <message...> [--server=URL] [--title=T] [--priority=P] [--tags=T1,T2]
  subscribe <topic> [--server=URL]
  unsubscribe <topic> [--server=URL]
  list
  help

Aliases: pub/send, sub/add, unsub/del/rm, ls
Put -- before message words that look like flags";

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Publish a message to a topic
    Publish {
        topic: Topic,
        message: String,
        options: PublishOptions,
    },
    /// Subscribe the channel to a topic
    Subscribe { topic: Topic },
    /// Unsubscribe the channel from a topic
    Unsubscribe { topic: Topic },
    /// List the channel's subscriptions
    List,
    /// Show usage
    Help,
    /// Unrecognized command word
    Unknown(String),
}

/// Errors from tokenizing or parsing a command line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unterminated quote in command")]
    UnterminatedQuote,
    #[error("trailing backslash in command")]
    TrailingEscape,
    #[error("missing topic, see 'help' for usage details")]
    MissingTopic,
    #[error("missing message, see 'help' for usage details")]
    MissingMessage,
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("flag --{0} needs a value")]
    MissingValue(String),
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
}

const SERVER_FLAGS: &[&str] = &["server"];
const PUBLISH_FLAGS: &[&str] = &["server", "title", "priority", "tags"];

impl Command {
    /// Parse arguments (without the leading mention)
    ///
    /// `base_url` is used when no `--server` is given.
    pub fn parse<S: AsRef<str>>(args: &[S], base_url: &str) -> Result<Self, CommandError> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };

        match name.as_ref() {
            "publish" | "pub" | "send" => parse_publish(rest, base_url),
            "subscribe" | "sub" | "add" => {
                let topic = parse_topic_only(rest, base_url)?;
                Ok(Command::Subscribe { topic })
            }
            "unsubscribe" | "unsub" | "del" | "rm" => {
                let topic = parse_topic_only(rest, base_url)?;
                Ok(Command::Unsubscribe { topic })
            }
            "list" | "ls" => match rest.first() {
                Some(extra) => Err(CommandError::UnexpectedArgument(extra.as_ref().to_string())),
                None => Ok(Command::List),
            },
            "help" | "--help" | "-h" => Ok(Command::Help),
            other => Ok(Command::Unknown(other.to_string())),
        }
    }
}

fn parse_publish<S: AsRef<str>>(args: &[S], base_url: &str) -> Result<Command, CommandError> {
    let mut parsed = ParsedArgs::parse(args, PUBLISH_FLAGS)?;

    if parsed.positionals.is_empty() {
        return Err(CommandError::MissingTopic);
    }
    let name = parsed.positionals.remove(0);
    let message = parsed.positionals.join(" ");
    if message.trim().is_empty() {
        return Err(CommandError::MissingMessage);
    }

    let topic = resolve_topic(&parsed, &name, base_url);
    let options = PublishOptions {
        title: parsed.flags.remove("title"),
        priority: parsed.flags.remove("priority"),
        tags: parsed
            .flags
            .remove("tags")
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
    };

    Ok(Command::Publish {
        topic,
        message,
        options,
    })
}

fn parse_topic_only<S: AsRef<str>>(args: &[S], base_url: &str) -> Result<Topic, CommandError> {
    let parsed = ParsedArgs::parse(args, SERVER_FLAGS)?;

    match parsed.positionals.as_slice() {
        [] => Err(CommandError::MissingTopic),
        [name] => Ok(resolve_topic(&parsed, name, base_url)),
        [_, extra, ..] => Err(CommandError::UnexpectedArgument(extra.clone())),
    }
}

fn resolve_topic(parsed: &ParsedArgs, name: &str, base_url: &str) -> Topic {
    let server = parsed
        .flags
        .get("server")
        .map(String::as_str)
        .unwrap_or(base_url);
    Topic::resolve(server, name)
}

/// Positionals and `--flag=value` / `--flag value` pairs
#[derive(Debug, Default)]
struct ParsedArgs {
    positionals: Vec<String>,
    flags: HashMap<String, String>,
}

impl ParsedArgs {
    fn parse<S: AsRef<str>>(args: &[S], allowed: &[&str]) -> Result<Self, CommandError> {
        let mut parsed = ParsedArgs::default();
        let mut iter = args.iter().map(AsRef::<str>::as_ref);

        while let Some(arg) = iter.next() {
            if arg == "--" {
                parsed.positionals.extend(iter.by_ref().map(String::from));
                break;
            }

            let Some((name, inline)) = split_flag(arg) else {
                parsed.positionals.push(arg.to_string());
                continue;
            };

            if !allowed.contains(&name) {
                return Err(CommandError::UnknownFlag(arg.to_string()));
            }

            let value = match inline {
                Some(value) => value.to_string(),
                None => iter
                    .next()
                    .map(String::from)
                    .ok_or_else(|| CommandError::MissingValue(name.to_string()))?,
            };
            parsed.flags.insert(name.to_string(), value);
        }

        Ok(parsed)
    }
}

/// Split `--name=value`, `--name`, `-s=value` or `-s` into a canonical flag
/// name and an optional inline value. Returns `None` for positionals.
fn split_flag(arg: &str) -> Option<(&str, Option<&str>)> {
    let body = if let Some(long) = arg.strip_prefix("--") {
        long
    } else if let Some(short) = arg.strip_prefix('-') {
        // Negative numbers and a lone dash are message text
        if short.is_empty() || short.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            return None;
        }
        short
    } else {
        return None;
    };

    let (name, value) = match body.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    };

    let name = match name {
        "s" => "server",
        "t" => "title",
        "p" => "priority",
        other => other,
    };

    Some((name, value))
}

/// Split a line into arguments using shell-style quoting
///
/// Supports single quotes (literal), double quotes (with `\"` and `\\`
/// escapes) and backslash escapes outside quotes. Adjacent quoted and
/// unquoted parts join into one argument.
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Normal,
        Single,
        Double,
    }

    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut state = State::Normal;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                c if c.is_whitespace() => {
                    if in_arg {
                        args.push(std::mem::take(&mut current));
                        in_arg = false;
                    }
                }
                '\'' => {
                    state = State::Single;
                    in_arg = true;
                }
                '"' => {
                    state = State::Double;
                    in_arg = true;
                }
                '\\' => {
                    let next = chars.next().ok_or(CommandError::TrailingEscape)?;
                    current.push(next);
                    in_arg = true;
                }
                c => {
                    current.push(c);
                    in_arg = true;
                }
            },
            State::Single => match c {
                '\'' => state = State::Normal,
                c => current.push(c),
            },
            State::Double => match c {
                '"' => state = State::Normal,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => return Err(CommandError::UnterminatedQuote),
                },
                c => current.push(c),
            },
        }
    }

    if state != State::Normal {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_arg {
        args.push(current);
    }

    Ok(args)
}
