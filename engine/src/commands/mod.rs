//! Command grammar
//!
//! Script lines arrive as loosely formatted text and leave as canonical
//! directive strings for the actor. The grammar is a fixed, ordered list of
//! pattern attempts (explicit scanning with capture extraction, no regex)
//! so the priority between overlapping rules stays auditable:
//!
//! 1. `move to **LOC** and talk #TOPIC (EMOTION)`
//! 2. `move to **LOC** (EMOTION)`
//! 3. `move to **LOC**`
//! 4. `say {TEXT}`
//! 5. anything still starting with `$`: already canonical, passed through
//! 6. anything else: flagged, forwarded unchanged (best-effort)
//!
//! Parsing is total: no input ever produces an error, only a command the
//! caller may choose to log before submitting (or, for lines that never
//! carried the `$` command marker, skip outright).

/// One parsed script line.
///
/// The scheduler consumes this structure (the location of a movement is
/// what triggers interactive mode) while the actor only ever sees the
/// rendered [`directive`](ScriptCommand::directive) string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Movement, optionally with a conversation topic and an emotion.
    Move {
        location: String,
        topic: Option<String>,
        emotion: Option<String>,
    },

    /// Literal utterance.
    Say { text: String },

    /// Already-canonical `$`-prefixed directive, passed through unmodified.
    Verbatim(String),

    /// Carried the command marker but matched no grammar rule. Forwarded
    /// unchanged; the caller logs it as a parse failure.
    Degraded(String),

    /// No command marker and no matching grammar rule. Logged and never
    /// submitted.
    Unmarked(String),
}

impl ScriptCommand {
    /// Render the canonical directive string for the actor.
    pub fn directive(&self) -> String {
        match self {
            Self::Move {
                location,
                topic: Some(topic),
                emotion: Some(emotion),
            } => format!("$Move to {location} #{topic} ({emotion})"),
            Self::Move {
                location,
                topic: None,
                emotion: Some(emotion),
            } => format!("$move to {location} ({emotion})"),
            Self::Move { location, .. } => format!("$move to {location}"),
            Self::Say { text } => format!("Say\"{text}\""),
            Self::Verbatim(text) | Self::Degraded(text) | Self::Unmarked(text) => text.clone(),
        }
    }

    /// Target location, for movement commands.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Move { location, .. } => Some(location),
            _ => None,
        }
    }

    /// False for lines that matched no grammar rule.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Degraded(_) | Self::Unmarked(_))
    }
}

/// Parse one raw script line.
///
/// Trims surrounding whitespace, strips a single leading `$` command marker
/// and surrounding double quotes when present, then applies the grammar.
/// The marker buys a line nothing except the benefit of the doubt: a marked
/// line that matches no rule is still forwarded ([`ScriptCommand::Degraded`]),
/// while an unmarked one becomes [`ScriptCommand::Unmarked`] and is skipped.
pub fn parse_line(raw: &str) -> ScriptCommand {
    let line = raw.trim();
    let (body, marked) = match line.strip_prefix('$') {
        Some(body) => (body.trim_matches('"'), true),
        None => (line, false),
    };

    match parse_command(body) {
        ScriptCommand::Degraded(_) if !marked => ScriptCommand::Unmarked(line.to_string()),
        command => command,
    }
}

/// Apply the grammar rules to a marker-stripped command body.
///
/// Total function: bodies that match no rule come back as
/// [`ScriptCommand::Degraded`] carrying the input unchanged, so parsing an
/// already-canonical `$`-prefixed string always yields itself.
pub fn parse_command(body: &str) -> ScriptCommand {
    if let Some(rest) = body.strip_prefix("move to") {
        match parse_move(rest.trim()) {
            Some(command) => command,
            None => ScriptCommand::Degraded(body.to_string()),
        }
    } else if body.starts_with("say") {
        match extract_braced(body) {
            Some(text) => ScriptCommand::Say {
                text: text.to_string(),
            },
            None => ScriptCommand::Degraded(body.to_string()),
        }
    } else if body.starts_with('$') {
        ScriptCommand::Verbatim(body.to_string())
    } else {
        ScriptCommand::Degraded(body.to_string())
    }
}

/// Rules 1–3, in priority order, over the text after `move to`.
fn parse_move(rest: &str) -> Option<ScriptCommand> {
    let (location, after) = between_markers(rest)?;

    if let Some((topic, emotion)) = parse_talk_suffix(after) {
        return Some(ScriptCommand::Move {
            location: location.to_string(),
            topic: Some(topic),
            emotion: Some(emotion),
        });
    }

    if let Some(emotion) = parse_emotion_suffix(after) {
        return Some(ScriptCommand::Move {
            location: location.to_string(),
            topic: None,
            emotion: Some(emotion),
        });
    }

    Some(ScriptCommand::Move {
        location: location.to_string(),
        topic: None,
        emotion: None,
    })
}

/// Text between the first `**` pair, and everything after it.
fn between_markers(s: &str) -> Option<(&str, &str)> {
    let start = s.find("**")? + 2;
    let len = s[start..].find("**")?;
    Some((&s[start..start + len], &s[start + len + 2..]))
}

/// ` and talk #TOPIC (EMOTION)`: whitespace required between tokens,
/// TOPIC a single word, EMOTION everything up to the first `)`.
fn parse_talk_suffix(after: &str) -> Option<(String, String)> {
    let s = skip_ws(after)?;
    let s = skip_ws(s.strip_prefix("and")?)?;
    let s = skip_ws(s.strip_prefix("talk")?)?;
    let s = s.strip_prefix('#')?;

    let end = s
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let (topic, s) = s.split_at(end);

    let s = skip_ws(s)?;
    let s = s.strip_prefix('(')?;
    let emotion = &s[..s.find(')')?];
    Some((topic.to_string(), emotion.to_string()))
}

/// `(EMOTION)` directly after the location, optional leading whitespace.
fn parse_emotion_suffix(after: &str) -> Option<String> {
    let s = after.trim_start().strip_prefix('(')?;
    Some(s[..s.find(')')?].to_string())
}

/// Require at least one whitespace character, then skip it all.
fn skip_ws(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    if trimmed.len() == s.len() {
        None
    } else {
        Some(trimmed)
    }
}

/// Text strictly between the first `{` and the last `}`.
fn extract_braced(s: &str) -> Option<&str> {
    let start = s.find('{')? + 1;
    let end = s.rfind('}')?;
    if end > start {
        Some(&s[start..end])
    } else {
        None
    }
}
