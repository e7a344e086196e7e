//! Chat orchestrator: runs one turn through the fallback chain.
//!
//! Art and workshop questions are answered from their own listings. Menu
//! questions go catalog first, then (unless a price sort came up empty) the
//! knowledge base, then a menu hint, then generic help. Collaborator failures
//! never escape a turn; they degrade to a fixed reply.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use barista_core::config::ChatConfig;

use crate::classifier::IntentClassifier;
use crate::context::ContextResolver;
use crate::error::ChatError;
use crate::query_builder::{select_art_piece, CatalogQueryBuilder};
use crate::response::{
    ResponseComposer, APOLOGY_REPLY, DEFAULT_HELP_REPLY, DISABLED_REPLY, EMPTY_GALLERY_REPLY,
    MENU_HINT_REPLY, PRICE_MISS_REPLY,
};
use crate::session::SessionStore;
use crate::sources::{CatalogStore, KnowledgeBase};
use crate::types::{ChatReply, Domain, ReplySource, Signals};

/// Coordinates the stages of a chat turn.
pub struct ChatOrchestrator {
    classifier: IntentClassifier,
    resolver: ContextResolver,
    query_builder: CatalogQueryBuilder,
    composer: ResponseComposer,
    sessions: Arc<dyn SessionStore>,
    catalog: Arc<dyn CatalogStore>,
    knowledge: Arc<dyn KnowledgeBase>,
    config: ChatConfig,
}

impl ChatOrchestrator {
    pub fn new(
        config: ChatConfig,
        sessions: Arc<dyn SessionStore>,
        catalog: Arc<dyn CatalogStore>,
        knowledge: Arc<dyn KnowledgeBase>,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            resolver: ContextResolver::new(),
            query_builder: CatalogQueryBuilder::new(config.default_limit),
            composer: ResponseComposer::new(config.currency_symbol.clone()),
            sessions,
            catalog,
            knowledge,
            config,
        }
    }

    /// Answer one message. Always produces a reply.
    ///
    /// A blank or missing `session_id` makes the turn stateless.
    pub async fn handle_message(&self, message: &str, session_id: Option<&str>) -> ChatReply {
        if !self.config.enabled {
            return ChatReply::new(DISABLED_REPLY, ReplySource::Disabled);
        }

        let session_id = session_id.map(str::trim).filter(|id| !id.is_empty());
        let signals = self.classifier.classify(message);
        debug!(
            session_id = session_id.unwrap_or("-"),
            domain = ?signals.domain,
            rec = signals.is_rec_trigger,
            price_sort = ?signals.price_sort(),
            tired = signals.is_tired,
            follow_up = signals.is_follow_up,
            "Message classified"
        );

        let reply = match signals.domain {
            Domain::Art => self.art_turn(&signals).await,
            Domain::Workshop => self.workshop_turn().await,
            Domain::Menu => self.menu_turn(message, &signals, session_id).await,
        };

        info!(
            session_id = session_id.unwrap_or("-"),
            source = ?reply.source,
            "Chat turn complete"
        );
        reply
    }

    // =========================================================================
    // Art and workshops
    // =========================================================================

    async fn art_turn(&self, signals: &Signals) -> ChatReply {
        let items = match self.bounded(self.catalog.list_art_items(true)).await {
            Ok(items) => items,
            Err(e) => return self.apology("art", e),
        };
        debug!(rows = items.len(), "Gallery listed");

        if items.is_empty() {
            return ChatReply::new(EMPTY_GALLERY_REPLY, ReplySource::Art);
        }

        if signals.is_rec_trigger || signals.is_price_sort() {
            let mut rng = rand::rng();
            if let Some(piece) = select_art_piece(&items, signals, &mut rng) {
                return ChatReply::new(
                    self.composer.compose_art_pick(piece, signals),
                    ReplySource::Art,
                );
            }
        }
        ChatReply::new(self.composer.compose_art_listing(&items), ReplySource::Art)
    }

    async fn workshop_turn(&self) -> ChatReply {
        match self.bounded(self.catalog.list_workshops()).await {
            Ok(workshops) => {
                debug!(rows = workshops.len(), "Workshops listed");
                ChatReply::new(
                    self.composer.compose_workshops(&workshops),
                    ReplySource::Workshop,
                )
            }
            Err(e) => self.apology("workshop", e),
        }
    }

    // =========================================================================
    // Menu fallback chain
    // =========================================================================

    async fn menu_turn(
        &self,
        message: &str,
        signals: &Signals,
        session_id: Option<&str>,
    ) -> ChatReply {
        let session = session_id.map(|id| self.sessions.get_or_insert(id));
        let resolved = self.resolver.resolve(signals, session.as_ref());

        let stage = match self.query_builder.build(signals, &resolved) {
            Some(spec) => {
                let rows = match self.bounded(self.catalog.list_menu_items(&spec)).await {
                    Ok(rows) => rows,
                    Err(e) => return self.apology("menu", e),
                };
                debug!(rows = rows.len(), order_by = ?spec.order_by, limit = spec.limit, "Menu queried");

                if let Some(reply) = self.composer.compose_menu(&rows, signals, &resolved) {
                    if let (Some(id), Some(mut state)) = (session_id, session) {
                        self.resolver.write_back(&mut state, &resolved);
                        self.sessions.put(id, state);
                    }
                    return ChatReply::new(reply, ReplySource::Menu);
                }

                if signals.is_price_sort() {
                    return ChatReply::new(PRICE_MISS_REPLY, ReplySource::PriceMiss);
                }
                "empty_catalog"
            }
            None => "no_catalog_gate",
        };

        if let Some(answer) = self.knowledge_answer(message, stage).await {
            return ChatReply::new(answer, ReplySource::Knowledge);
        }

        if signals.mentions_menu {
            ChatReply::new(MENU_HINT_REPLY, ReplySource::MenuHint)
        } else {
            ChatReply::new(DEFAULT_HELP_REPLY, ReplySource::DefaultHelp)
        }
    }

    async fn knowledge_answer(&self, message: &str, stage: &str) -> Option<String> {
        match self.bounded(self.knowledge.search(message)).await {
            Ok(matches) => {
                let best = matches.into_iter().next();
                debug!(stage, matched = best.is_some(), "Knowledge searched");
                best.map(|m| m.response)
            }
            Err(e) => {
                debug!(stage, error = %e, "Knowledge search skipped");
                None
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Await a collaborator call under the configured timeout.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, ChatError>
    where
        F: Future<Output = Result<T, ChatError>>,
    {
        let ms = self.config.catalog_timeout_ms;
        tokio::time::timeout(Duration::from_millis(ms), fut)
            .await
            .map_err(|_| ChatError::CatalogTimeout(ms))?
    }

    fn apology(&self, stage: &str, err: ChatError) -> ChatReply {
        warn!(stage, error = %err, "Catalog read failed");
        ChatReply::new(APOLOGY_REPLY, ReplySource::Apology)
    }
}
