//! Line protocol between the engine and the agent.
//!
//! Inbound lines are routed by their literal prefix tag. Anything untagged is a
//! change notification for the parser. Every inbound line gets exactly one JSON
//! line back.

use serde::Serialize;
use tripmind_core::Action;

pub const MY_MOVE: &str = "[MY_MOVE]";
pub const INFO: &str = "[INFO]";
pub const FOR_DB: &str = "[FOR_DB]";

/// Acknowledgement token for every line that is not a move prompt.
pub const ACK: &str = "ACK";

/// `[FOR_DB]` bookkeeping messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bookkeeping<'a> {
    /// `[FOR_DB] purchase <player>`: a purchase decision is about to be made.
    Purchase { player: &'a str },
    /// `[FOR_DB] chosen <player>::<text>`: the purchase that was made.
    Chosen { player: &'a str, text: &'a str },
    /// Any other phase; acknowledged only.
    Other { phase: &'a str, player: &'a str },
}

/// A routed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// `[MY_MOVE] <phase>`. The phase word is passed through unvalidated.
    MyMove { phase: &'a str },
    /// `[INFO] <a> <b> <round>`: exactly four tokens.
    Round { round: &'a str },
    /// `[INFO] Game stopped [PlayerId named: <winner>]`.
    GameStopped { winner: &'a str },
    /// Any other `[INFO]` line.
    Info,
    Bookkeeping(Bookkeeping<'a>),
    /// Everything else goes to the change parser.
    Change(&'a str),
}

/// Route a trimmed, non-empty line.
pub fn route(line: &str) -> Inbound<'_> {
    if let Some(rest) = line.strip_prefix(MY_MOVE) {
        let phase = rest.split_whitespace().next().unwrap_or("");
        return Inbound::MyMove { phase };
    }

    if line.starts_with(INFO) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() == 4 {
            return Inbound::Round { round: parts[3] };
        }
        if parts.get(2) == Some(&"stopped") {
            let winner = parts
                .get(5)
                .and_then(|w| w.split(']').next())
                .filter(|w| !w.is_empty())
                .unwrap_or("unknown");
            return Inbound::GameStopped { winner };
        }
        return Inbound::Info;
    }

    if let Some(rest) = line.strip_prefix(FOR_DB) {
        let rest = rest.trim_start();
        let (phase, tail) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let tail = tail.trim();
        let bookkeeping = match phase {
            "purchase" => Bookkeeping::Purchase {
                player: first_word(tail),
            },
            "chosen" => {
                let (player, text) = tail.split_once("::").unwrap_or((tail, ""));
                Bookkeeping::Chosen {
                    player: player.trim(),
                    text: text.trim(),
                }
            }
            _ => Bookkeeping::Other {
                phase,
                player: first_word(tail),
            },
        };
        return Inbound::Bookkeeping(bookkeeping);
    }

    Inbound::Change(line)
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// One outbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Serialises as `"ACK"`.
    Ack(&'static str),
    /// Serialises as an array; empty passes.
    Actions(Vec<Action>),
}

impl Response {
    pub fn ack() -> Self {
        Response::Ack(ACK)
    }

    pub fn pass() -> Self {
        Response::Actions(Vec::new())
    }

    /// The JSON line to send, newline not included.
    pub fn to_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Cannot serialise response, passing instead: {}", e);
                "[]".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripmind_core::Phase;

    #[test]
    fn test_route_my_move() {
        assert_eq!(route("[MY_MOVE] purchase"), Inbound::MyMove { phase: "purchase" });
        assert_eq!(route("[MY_MOVE]"), Inbound::MyMove { phase: "" });
    }

    #[test]
    fn test_route_info() {
        assert_eq!(
            route("[INFO] Round is 3"),
            Inbound::Round { round: "3" }
        );
        assert_eq!(
            route("[INFO] Game stopped [PlayerId named: Russians]"),
            Inbound::GameStopped { winner: "Russians" }
        );
        assert_eq!(
            route("[INFO] Game stopped"),
            Inbound::GameStopped { winner: "unknown" }
        );
        assert_eq!(route("[INFO] Waiting for players to join"), Inbound::Info);
    }

    #[test]
    fn test_route_bookkeeping() {
        assert_eq!(
            route("[FOR_DB] purchase Russians"),
            Inbound::Bookkeeping(Bookkeeping::Purchase { player: "Russians" })
        );
        assert_eq!(
            route("[FOR_DB] chosen Germans::ProductionRule:buyInfantry -> 2"),
            Inbound::Bookkeeping(Bookkeeping::Chosen {
                player: "Germans",
                text: "ProductionRule:buyInfantry -> 2"
            })
        );
        assert_eq!(
            route("[FOR_DB] combat Germans"),
            Inbound::Bookkeeping(Bookkeeping::Other {
                phase: "combat",
                player: "Germans"
            })
        );
    }

    #[test]
    fn test_route_change() {
        let line = "Russians takes Berlin from Germans";
        assert_eq!(route(line), Inbound::Change(line));
    }

    #[test]
    fn test_response_lines() {
        assert_eq!(Response::ack().to_line(), "\"ACK\"");
        assert_eq!(Response::pass().to_line(), "[]");
        let actions = Response::Actions(vec![Action::new(Phase::Combat, "Karelia", "Ukraine", "armour")]);
        assert_eq!(
            actions.to_line(),
            r#"[{"delegate":"combat","from":"Karelia","to":"Ukraine","unit":"armour"}]"#
        );
    }
}
