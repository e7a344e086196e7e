//! Types exchanged between the stages of a chat turn.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use barista_core::types::{Context, SubCategory};

// =============================================================================
// Classification
// =============================================================================

/// Top-level classification of a turn. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Art,
    Workshop,
    Menu,
}

/// Requested price ordering, already tie-broken cheapest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSort {
    Cheapest,
    Expensive,
}

/// Everything the classifier extracts from one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    /// Winning domain after Art > Workshop > Menu priority.
    pub domain: Domain,
    pub is_art: bool,
    pub is_workshop: bool,
    pub is_rec_trigger: bool,
    pub is_cheapest: bool,
    pub is_expensive: bool,
    pub is_tired: bool,
    pub is_follow_up: bool,
    pub current_context: Option<Context>,
    pub sub_category: Option<SubCategory>,
    pub flavor_keywords: BTreeSet<String>,
    /// The message names the menu itself.
    pub mentions_menu: bool,
}

impl Signals {
    pub fn is_price_sort(&self) -> bool {
        self.is_cheapest || self.is_expensive
    }

    /// Price ordering to honor. Cheapest wins when both matched.
    pub fn price_sort(&self) -> Option<PriceSort> {
        if self.is_cheapest {
            Some(PriceSort::Cheapest)
        } else if self.is_expensive {
            Some(PriceSort::Expensive)
        } else {
            None
        }
    }
}

// =============================================================================
// Context resolution
// =============================================================================

/// Where a turn's resolved context came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    /// Named in the message.
    Explicit,
    /// Carried over from the session on a follow-up.
    Inherited,
    /// A drink sub-category was named without a general context.
    ImpliedBySubCategory,
    /// Forced to drink by an energy request.
    Energy,
    /// No context.
    Unset,
}

/// Output of the context resolver for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedContext {
    pub context: Option<Context>,
    pub sub_category: Option<SubCategory>,
    pub source: ContextSource,
}

/// Per-session memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub last_context: Option<Context>,
    pub last_sub_category: Option<SubCategory>,
}

// =============================================================================
// Replies
// =============================================================================

/// Which stage of the turn produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Menu,
    Art,
    Workshop,
    PriceMiss,
    Knowledge,
    MenuHint,
    DefaultHelp,
    Apology,
    Disabled,
}

/// The engine's answer to one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub source: ReplySource,
}

impl ChatReply {
    pub fn new(reply: impl Into<String>, source: ReplySource) -> Self {
        Self {
            reply: reply.into(),
            source,
        }
    }
}

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, rename = "sessionId", alias = "session_id")]
    pub session_id: Option<String>,
}

/// Response body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponseBody {
    pub reply: String,
}

impl From<ChatReply> for ChatResponseBody {
    fn from(reply: ChatReply) -> Self {
        Self { reply: reply.reply }
    }
}
