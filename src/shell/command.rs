use serde_json::Value;
use thiserror::Error;

use crate::core::action::{Action, ActionType, Props, coerce_pop_count, props_from_value};
use crate::core::state::NavigationState;

/// One line of a replay script.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `<scene> [json]`: navigate using the scene's own type.
    Route { name: String, props: Props },
    /// `push|jump|replace|reset <scene> [json]`, `init <state-json>`
    Apply(Action),
    Pop(usize),
    Refresh(Props),
    Focus(String),
    Undo,
    /// Print the persisted state.
    State,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("'{0}' needs a scene key")]
    MissingKey(String),
    #[error("bad JSON payload: {0}")]
    Json(String),
}

/// Parses a script line. Blank lines and `#` comments give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "pop" | "back" => {
            let count = if rest.is_empty() {
                1
            } else {
                coerce_pop_count(&Value::String(rest.to_string()))
            };
            Command::Pop(count)
        }
        "refresh" => Command::Refresh(parse_props(rest)?),
        "focus" => {
            if rest.is_empty() {
                return Err(CommandError::MissingKey(word.to_string()));
            }
            Command::Focus(rest.to_string())
        }
        "undo" => Command::Undo,
        "state" => Command::State,
        "init" => {
            let state: NavigationState =
                serde_json::from_str(rest).map_err(|e| CommandError::Json(e.to_string()))?;
            Command::Apply(Action::init(state))
        }
        "push" | "jump" | "replace" | "reset" => {
            let kind: ActionType = word
                .parse()
                .map_err(|_| CommandError::MissingKey(word.to_string()))?;
            let (key, payload) = match rest.split_once(char::is_whitespace) {
                Some((key, payload)) => (key, payload.trim()),
                None => (rest, ""),
            };
            if key.is_empty() {
                return Err(CommandError::MissingKey(word.to_string()));
            }
            Command::Apply(Action::to(kind, key, parse_props(payload)?))
        }
        name => Command::Route {
            name: name.to_string(),
            props: parse_props(rest)?,
        },
    };
    Ok(Some(command))
}

fn parse_props(payload: &str) -> Result<Props, CommandError> {
    if payload.is_empty() {
        return Ok(Props::new());
    }
    let value: Value =
        serde_json::from_str(payload).map_err(|e| CommandError::Json(e.to_string()))?;
    Ok(props_from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   # open the feed"), Ok(None));
    }

    #[test]
    fn test_scene_name_with_payload() {
        let cmd = parse_line(r#"detail {"id": 4}"#).unwrap().unwrap();
        let Command::Route { name, props } = cmd else {
            panic!("expected Route, got {:?}", cmd);
        };
        assert_eq!(name, "detail");
        assert_eq!(props["id"], 4);
    }

    #[test]
    fn test_scalar_payload_is_wrapped() {
        let cmd = parse_line("detail 42").unwrap().unwrap();
        assert!(matches!(cmd, Command::Route { ref props, .. } if props["data"] == json!(42)));
    }

    #[test]
    fn test_pop_counts() {
        assert_eq!(parse_line("pop").unwrap(), Some(Command::Pop(1)));
        assert_eq!(parse_line("back 3").unwrap(), Some(Command::Pop(3)));
        assert_eq!(parse_line("pop many").unwrap(), Some(Command::Pop(1)));
    }

    #[test]
    fn test_explicit_action_kinds() {
        let cmd = parse_line(r#"reset home {"fresh": true}"#).unwrap().unwrap();
        let Command::Apply(action) = cmd else {
            panic!("expected Apply, got {:?}", cmd);
        };
        assert_eq!(action.kind, ActionType::Reset);
        assert_eq!(action.key.as_deref(), Some("home"));
        assert_eq!(action.props["fresh"], true);

        assert_eq!(
            parse_line("push"),
            Err(CommandError::MissingKey("push".to_string()))
        );
        assert_eq!(
            parse_line("focus"),
            Err(CommandError::MissingKey("focus".to_string()))
        );
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            parse_line("detail {not json"),
            Err(CommandError::Json(_))
        ));
    }

    #[test]
    fn test_init_parses_state() {
        let line = r#"init {"key":"root","current":"home","index":0,"stack":[{"key":"home"}]}"#;
        let cmd = parse_line(line).unwrap().unwrap();
        assert!(matches!(cmd, Command::Apply(ref a) if a.kind == ActionType::Init && a.state.is_some()));
    }
}
