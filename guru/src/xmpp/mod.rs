//! Gateway-facing pieces: sender addressing, the chat command convention,
//! and the outbound send client.

pub mod client;

pub use client::{GatewayClient, XmppSender};

/// Strip the resource suffix from a gateway sender address, leaving the
/// bare JID (`alice@example.com/home` becomes `alice@example.com`).
pub fn bare_jid(sender: &str) -> &str {
    sender.split('/').next().unwrap_or(sender)
}

/// A chat body split per the command convention: a leading `/` marks a
/// command, the rest of the first token is the command name and the
/// remainder its argument. Some clients escape the slash as `\`, which is
/// accepted too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBody {
    pub command: Option<String>,
    pub arg: String,
}

impl ParsedBody {
    pub fn parse(body: &str) -> Self {
        let normalized = if let Some(rest) = body.strip_prefix('\\') {
            format!("/{rest}")
        } else {
            body.to_string()
        };

        if let Some(rest) = normalized.strip_prefix('/') {
            match rest.split_once(' ') {
                Some((command, arg)) => Self {
                    command: Some(command.to_string()),
                    arg: arg.trim().to_string(),
                },
                None => Self {
                    command: Some(rest.to_string()),
                    arg: String::new(),
                },
            }
        } else {
            Self {
                command: None,
                arg: body.trim().to_string(),
            }
        }
    }
}
