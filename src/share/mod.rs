//! Share dispatcher.
//!
//! A share runs through an ordered list of strategies. Each strategy is tried
//! once under a bounded wait and the first confirmed delivery wins. Posting
//! through the platform is full success; landing on the clipboard is partial
//! success and still reported as a failure. When nothing is confirmed the
//! first error (the root cause) is surfaced, not the fallback's.

mod compose;
mod message;

use async_trait::async_trait;
use std::{sync::Arc, sync::Mutex, time::Duration};
use tracing::{info, warn};

pub use compose::HttpComposeAction;
pub use message::{share_text, CastConfirmation, ComposeRequest, PreparedShare};

#[cfg(test)]
use mockall::automock;

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("share action unavailable")]
    Unavailable,

    #[error("share rejected: {0}")]
    Rejected(String),

    #[error("share request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("clipboard write failed: {0}")]
    Clipboard(String),

    #[error("no cast created")]
    NotConfirmed,

    #[error("timed out waiting for share confirmation")]
    TimedOut,
}

#[derive(Debug, thiserror::Error)]
pub enum ShareFailure {
    /// The share text reached the clipboard but nothing was posted.
    #[error("Copied to clipboard - {reason}")]
    CopiedToClipboard { reason: ShareError },

    #[error("Share failed: {0}")]
    Failed(ShareError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    Cast { hash: String },
}

/// What a strategy managed to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Cast(CastConfirmation),
    Clipboard,
}

/// The host platform's "compose a post" capability.
///
/// `Ok(None)` means the action ran but no post was created.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ComposeAction: Send + Sync {
    async fn compose(
        &self,
        request: &ComposeRequest,
    ) -> Result<Option<CastConfirmation>, ShareError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ShareError>;
}

#[async_trait]
pub trait ShareStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn attempt(&self, share: &PreparedShare) -> Result<Delivery, ShareError>;
}

pub struct ComposeStrategy {
    action: Arc<dyn ComposeAction>,
}

impl ComposeStrategy {
    pub fn new(action: Arc<dyn ComposeAction>) -> Self {
        Self { action }
    }
}

#[async_trait]
impl ShareStrategy for ComposeStrategy {
    fn name(&self) -> &'static str {
        "compose"
    }

    async fn attempt(&self, share: &PreparedShare) -> Result<Delivery, ShareError> {
        match self.action.compose(&share.compose_request()).await? {
            Some(confirmation) => Ok(Delivery::Cast(confirmation)),
            None => Err(ShareError::NotConfirmed),
        }
    }
}

pub struct ClipboardStrategy {
    clipboard: Arc<dyn Clipboard>,
}

impl ClipboardStrategy {
    pub fn new(clipboard: Arc<dyn Clipboard>) -> Self {
        Self { clipboard }
    }
}

#[async_trait]
impl ShareStrategy for ClipboardStrategy {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    async fn attempt(&self, share: &PreparedShare) -> Result<Delivery, ShareError> {
        self.clipboard.write_text(&share.clipboard_text()).await?;
        Ok(Delivery::Clipboard)
    }
}

pub struct ShareDispatcher {
    strategies: Vec<Box<dyn ShareStrategy>>,
    confirm_timeout: Duration,
}

impl ShareDispatcher {
    pub fn new(confirm_timeout: Duration) -> Self {
        Self {
            strategies: Vec::new(),
            confirm_timeout,
        }
    }

    pub fn with_strategy(mut self, strategy: impl ShareStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Platform compose first, clipboard as the single fallback tier.
    pub fn compose_then_clipboard(
        action: Arc<dyn ComposeAction>,
        clipboard: Arc<dyn Clipboard>,
        confirm_timeout: Duration,
    ) -> Self {
        Self::new(confirm_timeout)
            .with_strategy(ComposeStrategy::new(action))
            .with_strategy(ClipboardStrategy::new(clipboard))
    }

    pub async fn dispatch(&self, share: &PreparedShare) -> Result<ShareOutcome, ShareFailure> {
        let mut root_cause: Option<ShareError> = None;

        for strategy in &self.strategies {
            let attempt = tokio::time::timeout(self.confirm_timeout, strategy.attempt(share))
                .await
                .unwrap_or(Err(ShareError::TimedOut));

            match attempt {
                Ok(Delivery::Cast(confirmation)) => {
                    info!("📣 Shared via {} (cast {})", strategy.name(), confirmation.hash);
                    return Ok(ShareOutcome::Cast {
                        hash: confirmation.hash,
                    });
                }
                Ok(Delivery::Clipboard) => {
                    info!("📋 Share text copied via {}", strategy.name());
                    return Err(ShareFailure::CopiedToClipboard {
                        reason: root_cause.unwrap_or(ShareError::NotConfirmed),
                    });
                }
                Err(e) => {
                    warn!("⚠️ Share strategy '{}' failed: {}", strategy.name(), e);
                    root_cause.get_or_insert(e);
                }
            }
        }

        Err(ShareFailure::Failed(
            root_cause.unwrap_or(ShareError::Unavailable),
        ))
    }
}

/// Server-side clipboard: holds the text so the HTTP response can hand it to
/// the client to copy.
#[derive(Debug, Default)]
pub struct ResponseClipboard {
    text: Mutex<Option<String>>,
}

impl ResponseClipboard {
    pub fn take(&self) -> Option<String> {
        self.text.lock().ok().and_then(|mut slot| slot.take())
    }
}

#[async_trait]
impl Clipboard for ResponseClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ShareError> {
        let mut slot = self
            .text
            .lock()
            .map_err(|e| ShareError::Clipboard(e.to_string()))?;
        *slot = Some(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn share() -> PreparedShare {
        PreparedShare {
            url: "https://zerox.example/share?data=abc".to_string(),
            text: "🎮 ZeroX Party Mode!".to_string(),
        }
    }

    fn dispatcher(compose: MockComposeAction, clipboard: MockClipboard) -> ShareDispatcher {
        ShareDispatcher::compose_then_clipboard(Arc::new(compose), Arc::new(clipboard), TIMEOUT)
    }

    #[tokio::test]
    async fn confirmed_cast_skips_clipboard() {
        let mut compose = MockComposeAction::new();
        compose.expect_compose().times(1).returning(|request| {
            assert_eq!(request.embeds, vec!["https://zerox.example/share?data=abc".to_string()]);
            Ok(Some(CastConfirmation {
                hash: "0xabc".to_string(),
            }))
        });
        let mut clipboard = MockClipboard::new();
        clipboard.expect_write_text().times(0);

        let outcome = dispatcher(compose, clipboard).dispatch(&share()).await.unwrap();
        assert_eq!(
            outcome,
            ShareOutcome::Cast {
                hash: "0xabc".to_string()
            }
        );
    }

    #[tokio::test]
    async fn rejected_compose_falls_back_to_clipboard_once() {
        let mut compose = MockComposeAction::new();
        compose
            .expect_compose()
            .times(1)
            .returning(|_| Err(ShareError::Rejected("user dismissed".to_string())));
        let mut clipboard = MockClipboard::new();
        clipboard.expect_write_text().times(1).returning(|text| {
            assert_eq!(
                text,
                "🎮 ZeroX Party Mode!\n\nhttps://zerox.example/share?data=abc"
            );
            Ok(())
        });

        let failure = dispatcher(compose, clipboard)
            .dispatch(&share())
            .await
            .unwrap_err();
        assert!(matches!(
            failure,
            ShareFailure::CopiedToClipboard {
                reason: ShareError::Rejected(_)
            }
        ));
    }

    #[tokio::test]
    async fn unconfirmed_compose_falls_back_to_clipboard() {
        let mut compose = MockComposeAction::new();
        compose.expect_compose().times(1).returning(|_| Ok(None));
        let mut clipboard = MockClipboard::new();
        clipboard.expect_write_text().times(1).returning(|_| Ok(()));

        let failure = dispatcher(compose, clipboard)
            .dispatch(&share())
            .await
            .unwrap_err();
        assert_eq!(failure.to_string(), "Copied to clipboard - no cast created");
    }

    #[tokio::test]
    async fn total_failure_surfaces_the_root_cause() {
        let mut compose = MockComposeAction::new();
        compose
            .expect_compose()
            .times(1)
            .returning(|_| Err(ShareError::Rejected("sdk missing".to_string())));
        let mut clipboard = MockClipboard::new();
        clipboard
            .expect_write_text()
            .times(1)
            .returning(|_| Err(ShareError::Clipboard("permission denied".to_string())));

        let failure = dispatcher(compose, clipboard)
            .dispatch(&share())
            .await
            .unwrap_err();
        match failure {
            ShareFailure::Failed(ShareError::Rejected(msg)) => assert_eq!(msg, "sdk missing"),
            other => panic!("expected root cause, got {:?}", other),
        }
    }

    struct NeverConfirms;

    #[async_trait]
    impl ComposeAction for NeverConfirms {
        async fn compose(
            &self,
            _request: &ComposeRequest,
        ) -> Result<Option<CastConfirmation>, ShareError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
    }

    #[tokio::test]
    async fn slow_compose_times_out_into_clipboard() {
        let clipboard = Arc::new(ResponseClipboard::default());
        let dispatcher = ShareDispatcher::compose_then_clipboard(
            Arc::new(NeverConfirms),
            clipboard.clone(),
            Duration::from_millis(20),
        );

        let failure = dispatcher.dispatch(&share()).await.unwrap_err();
        assert!(matches!(
            failure,
            ShareFailure::CopiedToClipboard {
                reason: ShareError::TimedOut
            }
        ));
        assert_eq!(
            clipboard.take().as_deref(),
            Some("🎮 ZeroX Party Mode!\n\nhttps://zerox.example/share?data=abc")
        );
        assert!(clipboard.take().is_none());
    }

    #[tokio::test]
    async fn empty_dispatcher_reports_unavailable() {
        let failure = ShareDispatcher::new(TIMEOUT)
            .dispatch(&share())
            .await
            .unwrap_err();
        assert!(matches!(failure, ShareFailure::Failed(ShareError::Unavailable)));
    }
}
