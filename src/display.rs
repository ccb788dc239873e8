//! Output side of the detection state machine.
use std::fmt;

use log::info;

/// Overlay token pushed on every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateToken {
    None,
    Hidden,
    Seen,
}

impl StateToken {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hidden => "hidden",
            Self::Seen => "seen",
        }
    }
}

impl fmt::Display for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of overlay tokens and textual reports.
///
/// Both calls are fire-and-forget; implementations must not panic.
#[cfg_attr(test, mockall::automock)]
pub trait DisplaySink {
    fn set_state(&mut self, token: StateToken);
    fn report(&mut self, agent_name: &str, detected: bool, distance: f32);
}

/// Sink that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DisplaySink for LogSink {
    fn set_state(&mut self, token: StateToken) {
        info!("overlay: {token}");
    }

    fn report(&mut self, agent_name: &str, detected: bool, distance: f32) {
        let verdict = if detected { "seen by" } else { "hidden from" };
        info!("{verdict} {agent_name} at {distance:.1}m");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StateToken::None, "none")]
    #[case(StateToken::Hidden, "hidden")]
    #[case(StateToken::Seen, "seen")]
    fn tokens_render_lowercase(#[case] token: StateToken, #[case] expected: &str) {
        assert_eq!(token.to_string(), expected);
    }
}
