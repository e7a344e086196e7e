//! Context resolution across turns.
//!
//! Merges a turn's signals with the session memory to decide which menu
//! context and drink sub-category the turn is about, and writes the result
//! back once a menu reply has been produced.

use barista_core::types::{Context, SubCategory};
use tracing::debug;

use crate::types::{ContextSource, ResolvedContext, SessionState, Signals};

/// Resolves a turn's context from its signals and the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextResolver;

impl ContextResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the active context and sub-category.
    ///
    /// Order of precedence:
    /// 1. Context named in the message.
    /// 2. Session context, on a follow-up.
    /// 3. Drink, when only a drink sub-category was named.
    ///
    /// The sub-category named in the message wins over the session's, which
    /// is only inherited on a follow-up. An energy request forces Drink after
    /// all of the above.
    pub fn resolve(&self, signals: &Signals, session: Option<&SessionState>) -> ResolvedContext {
        let remembered = session.filter(|_| signals.is_follow_up);

        let (mut context, mut source) = match (signals.current_context, remembered) {
            (Some(ctx), _) => (Some(ctx), ContextSource::Explicit),
            (None, Some(SessionState {
                last_context: Some(ctx),
                ..
            })) => (Some(*ctx), ContextSource::Inherited),
            _ if signals.sub_category.is_some() => {
                (Some(Context::Drink), ContextSource::ImpliedBySubCategory)
            }
            _ => (None, ContextSource::Unset),
        };

        let sub_category: Option<SubCategory> = signals
            .sub_category
            .or_else(|| remembered.and_then(|s| s.last_sub_category));

        if signals.is_tired {
            context = Some(Context::Drink);
            source = ContextSource::Energy;
        }

        let resolved = ResolvedContext {
            context,
            sub_category,
            source,
        };
        debug!(
            context = ?resolved.context,
            sub_category = ?resolved.sub_category,
            context_source = ?resolved.source,
            "Context resolved"
        );
        resolved
    }

    /// Merge a resolved turn into session memory. Unset values never erase
    /// what the session already knows.
    pub fn write_back(&self, state: &mut SessionState, resolved: &ResolvedContext) {
        if let Some(ctx) = resolved.context {
            state.last_context = Some(ctx);
        }
        if let Some(sub) = resolved.sub_category {
            state.last_sub_category = Some(sub);
        }
    }
}
