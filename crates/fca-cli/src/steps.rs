//! Edit steps given on the command line.
//!
//! Syntax: `add-object:NAME[=ATTR,ATTR]`, `remove-object:NAME`,
//! `rename-object:OLD=NEW`, `add-attribute:NAME`, `remove-attribute:NAME`,
//! `rename-attribute:OLD=NEW`, `set:OBJECT=ATTR`, `clear:OBJECT=ATTR`,
//! `toggle:OBJECT=ATTR`, `undo`, `redo`.

use std::fmt;
use std::str::FromStr;

use fca_session::Edit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditStep {
    Apply(Edit),
    Undo,
    Redo,
}

impl fmt::Display for EditStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply(edit) => f.write_str(&edit.label()),
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
        }
    }
}

impl FromStr for EditStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "undo" => return Ok(Self::Undo),
            "redo" => return Ok(Self::Redo),
            _ => {}
        }
        let (kind, argument) = s
            .split_once(':')
            .ok_or_else(|| format!("expected KIND:ARGUMENT, got '{s}'"))?;
        let argument = argument.trim();
        if argument.is_empty() {
            return Err(format!("'{kind}' needs an argument"));
        }
        let edit = match kind.trim() {
            "add-object" => {
                let (name, intent) = argument.split_once('=').unwrap_or((argument, ""));
                Edit::AddObject {
                    name: name.trim().to_string(),
                    intent: intent
                        .split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(str::to_string)
                        .collect(),
                }
            }
            "remove-object" => Edit::RemoveObject {
                name: argument.to_string(),
            },
            "rename-object" => {
                let (old, new) = pair(argument)?;
                Edit::RenameObject { old, new }
            }
            "add-attribute" => Edit::AddAttribute {
                name: argument.to_string(),
            },
            "remove-attribute" => Edit::RemoveAttribute {
                name: argument.to_string(),
            },
            "rename-attribute" => {
                let (old, new) = pair(argument)?;
                Edit::RenameAttribute { old, new }
            }
            "set" | "clear" => {
                let (object, attribute) = pair(argument)?;
                Edit::SetIncidence {
                    object,
                    attribute,
                    value: kind.trim() == "set",
                }
            }
            "toggle" => {
                let (object, attribute) = pair(argument)?;
                Edit::ToggleIncidence { object, attribute }
            }
            other => return Err(format!("unknown edit '{other}'")),
        };
        Ok(Self::Apply(edit))
    }
}

fn pair(argument: &str) -> Result<(String, String), String> {
    match argument.split_once('=') {
        Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            Ok((left.trim().to_string(), right.trim().to_string()))
        }
        _ => Err(format!("expected LEFT=RIGHT, got '{argument}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_with_intent() {
        let step: EditStep = "add-object:child=juvenile, female".parse().unwrap();
        assert_eq!(
            step,
            EditStep::Apply(Edit::AddObject {
                name: "child".into(),
                intent: ["female".to_string(), "juvenile".to_string()].into(),
            })
        );
    }

    #[test]
    fn parses_history_steps() {
        assert_eq!("undo".parse::<EditStep>().unwrap(), EditStep::Undo);
        assert_eq!(" redo ".parse::<EditStep>().unwrap(), EditStep::Redo);
    }

    #[test]
    fn clear_sets_incidence_false() {
        let step: EditStep = "clear:girl=female".parse().unwrap();
        assert_eq!(
            step,
            EditStep::Apply(Edit::SetIncidence {
                object: "girl".into(),
                attribute: "female".into(),
                value: false,
            })
        );
    }

    #[test]
    fn rejects_malformed_steps() {
        assert!("rename-attribute:adult".parse::<EditStep>().is_err());
        assert!("explode:now".parse::<EditStep>().is_err());
        assert!("add-attribute:".parse::<EditStep>().is_err());
        assert!("toggle".parse::<EditStep>().is_err());
    }
}
