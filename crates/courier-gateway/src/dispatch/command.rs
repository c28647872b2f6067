//! Text command parsing
//!
//! A command is a message whose content starts with the prefix character:
//! `!word rest of the line`.

/// Command word and remainder extracted from message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand<'a> {
    /// Lower-cased command word
    pub word: String,
    /// Everything after the first whitespace following the word, unmodified
    pub remainder: &'a str,
}

/// Parse a command out of message content
///
/// Returns `None` when the content does not start with `prefix` or when the
/// prefix is not followed by a word. A word with nothing after it has an empty
/// remainder.
pub fn parse_command(content: &str, prefix: char) -> Option<ParsedCommand<'_>> {
    let body = content.strip_prefix(prefix)?;
    let (word, remainder) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    if word.is_empty() {
        return None;
    }
    Some(ParsedCommand {
        word: word.to_lowercase(),
        remainder,
    })
}
