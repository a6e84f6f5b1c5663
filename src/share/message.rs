use serde::{Deserialize, Serialize};
use url::Url;

use crate::codec;
use crate::models::ShareRecord;

/// Payload handed to the platform's "compose a post" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub text: String,
    pub embeds: Vec<String>,
    pub close: bool,
}

/// Confirmation returned when the platform actually created a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastConfirmation {
    pub hash: String,
}

/// Everything a share attempt needs, built once per dispatch.
#[derive(Debug, Clone)]
pub struct PreparedShare {
    pub url: String,
    pub text: String,
}

impl PreparedShare {
    pub fn new(base_url: &Url, record: &ShareRecord) -> Self {
        Self {
            url: share_url(base_url, record),
            text: share_text(record),
        }
    }

    pub fn compose_request(&self) -> ComposeRequest {
        ComposeRequest {
            text: self.text.clone(),
            embeds: vec![self.url.clone()],
            close: false,
        }
    }

    /// Text blob copied when posting isn't possible.
    pub fn clipboard_text(&self) -> String {
        format!("{}\n\n{}", self.text, self.url)
    }
}

/// `<base>/share?data=<token>`
pub fn share_url(base_url: &Url, record: &ShareRecord) -> String {
    format!(
        "{}/share?data={}",
        base_url.as_str().trim_end_matches('/'),
        codec::encode(record)
    )
}

pub fn share_text(record: &ShareRecord) -> String {
    let opponent = match record.opponent_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => format!("🆚 vs @{}", name),
        _ => "🆚 vs Anonymous".to_string(),
    };
    format!(
        "🎮 ZeroX Party Mode!\n\n{}\n{}\n⚡ Played as: {}\n\n🎯 Join the fun:",
        record.result.headline(),
        opponent,
        record.player_symbol.as_str()
    )
}
