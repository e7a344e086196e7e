//! Reply composition.
//!
//! Turns catalog rows into reply text. Menu replies use the first matching
//! template in order: energy pick, price pick, plain suggestion.

use barista_core::types::{ArtItem, CatalogItem, Workshop};

use crate::types::{PriceSort, ResolvedContext, Signals};

// =============================================================================
// Fixed replies
// =============================================================================

pub const PRICE_MISS_REPLY: &str =
    "Sorry, I couldn't find any items matching those criteria. Try asking about something else on the menu!";

pub const MENU_HINT_REPLY: &str =
    "You can browse the full menu on our Menu page. Tell me what you're in the mood for and I'll suggest something!";

pub const DEFAULT_HELP_REPLY: &str =
    "I'm your barista assistant! Ask me for a recommendation, the cheapest coffee, something to wake you up, our art gallery, or upcoming workshops.";

pub const APOLOGY_REPLY: &str =
    "Sorry, I'm having trouble reaching the menu right now. Please try again in a moment.";

pub const DISABLED_REPLY: &str = "Sorry, chat is currently unavailable.";

pub const EMPTY_GALLERY_REPLY: &str =
    "There's nothing on the gallery wall right now. Check back soon for new pieces!";

pub const NO_WORKSHOPS_REPLY: &str =
    "There are no workshops scheduled right now. Check back soon!";

/// Number of tags quoted in a plain suggestion.
const DESCRIBED_TAGS: usize = 3;

/// Join names as "A", "A and B", or "A, B and C".
fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

// =============================================================================
// ResponseComposer
// =============================================================================

/// Formats replies with the shop's currency symbol.
#[derive(Debug, Clone)]
pub struct ResponseComposer {
    currency_symbol: String,
}

impl ResponseComposer {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn format_price(&self, price: f64) -> String {
        format!("{}{:.2}", self.currency_symbol, price)
    }

    /// Compose a menu reply. `items` must be non-empty; the first row is the
    /// main pick.
    pub fn compose_menu(
        &self,
        items: &[CatalogItem],
        signals: &Signals,
        resolved: &ResolvedContext,
    ) -> Option<String> {
        let (first, rest) = items.split_first()?;
        let price = self.format_price(first.price);

        if signals.is_tired {
            return Some(format!(
                "Need an energy boost? Try the {} ({}). It packs {} caffeine to get you going.",
                first.name,
                price,
                first.caffeine_level.descriptor()
            ));
        }

        if let Some(sort) = signals.price_sort() {
            let label = resolved.context.map(|c| c.label()).unwrap_or("item");
            let reply = match sort {
                PriceSort::Cheapest => {
                    format!("Our cheapest {} is the {} ({}).", label, first.name, price)
                }
                PriceSort::Expensive => {
                    format!("Our most premium {} is the {} ({}).", label, first.name, price)
                }
            };
            return Some(reply);
        }

        let mut reply = format!("I suggest {} ({}).", first.name, price);
        let tags: Vec<&str> = first
            .tags
            .iter()
            .take(DESCRIBED_TAGS)
            .map(String::as_str)
            .collect();
        if !tags.is_empty() {
            reply.push_str(&format!(" It's {}.", tags.join(", ")));
        }
        if !rest.is_empty() {
            let names: Vec<&str> = rest.iter().map(|i| i.name.as_str()).collect();
            reply.push_str(&format!(" You might also like {}.", join_names(&names)));
        }
        Some(reply)
    }

    /// Full gallery listing, one piece per line.
    pub fn compose_art_listing(&self, items: &[ArtItem]) -> String {
        if items.is_empty() {
            return EMPTY_GALLERY_REPLY.to_string();
        }
        let mut reply = String::from("Here's what's on our gallery wall:");
        for item in items {
            reply.push_str(&format!(
                "\n{} — {} — {}",
                item.title,
                item.artist,
                self.format_price(item.price)
            ));
        }
        reply
    }

    /// A single recommended piece.
    pub fn compose_art_pick(&self, item: &ArtItem, signals: &Signals) -> String {
        let price = self.format_price(item.price);
        match signals.price_sort() {
            Some(PriceSort::Cheapest) => format!(
                "Our most affordable piece is \"{}\" by {} ({}).",
                item.title, item.artist, price
            ),
            Some(PriceSort::Expensive) => format!(
                "Our most premium piece is \"{}\" by {} ({}).",
                item.title, item.artist, price
            ),
            None => format!(
                "I'd recommend \"{}\" by {} ({}). It's available on our gallery wall right now.",
                item.title, item.artist, price
            ),
        }
    }

    /// Every workshop with its remaining seats.
    pub fn compose_workshops(&self, workshops: &[Workshop]) -> String {
        if workshops.is_empty() {
            return NO_WORKSHOPS_REPLY.to_string();
        }
        let mut reply = String::from("Upcoming workshops:");
        for w in workshops {
            let seats = if w.is_sold_out() {
                "SOLD OUT".to_string()
            } else {
                match w.remaining() {
                    1 => "1 seat left".to_string(),
                    n => format!("{} seats left", n),
                }
            };
            reply.push_str(&format!(
                "\n{} — {} — {} — {}",
                w.title,
                w.datetime.format("%a %b %-d, %H:%M"),
                self.format_price(w.price),
                seats
            ));
        }
        reply
    }
}

impl Default for ResponseComposer {
    fn default() -> Self {
        Self::new("$")
    }
}

#[cfg(test)]
mod tests {
    use barista_core::types::{CaffeineLevel, Context};
    use chrono::NaiveDate;

    use super::*;
    use crate::classifier::IntentClassifier;
    use crate::context::ContextResolver;

    fn item(name: &str, price: f64, caffeine: CaffeineLevel, tags: &[&str]) -> CatalogItem {
        CatalogItem {
            id: 1,
            name: name.to_string(),
            category: "Robusta".to_string(),
            price,
            caffeine_level: caffeine,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn compose(text: &str, items: &[CatalogItem]) -> String {
        let signals = IntentClassifier::new().classify(text);
        let resolved = ContextResolver::new().resolve(&signals, None);
        ResponseComposer::default()
            .compose_menu(items, &signals, &resolved)
            .unwrap()
    }

    fn workshop(title: &str, seats: i64, booked: i64) -> Workshop {
        Workshop {
            id: 1,
            title: title.to_string(),
            datetime: NaiveDate::from_ymd_opt(2026, 11, 7)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            seats,
            booked,
            price: 35.0,
        }
    }

    // ---- Menu templates ----

    #[test]
    fn test_energy_template() {
        let reply = compose(
            "I'm tired",
            &[item("Robusta Rocket", 4.5, CaffeineLevel::Extreme, &["strong"])],
        );
        assert_eq!(
            reply,
            "Need an energy boost? Try the Robusta Rocket ($4.50). It packs extreme caffeine to get you going."
        );
    }

    #[test]
    fn test_energy_template_beats_price_template() {
        let reply = compose(
            "tired, cheapest please",
            &[item("Double Ristretto", 3.0, CaffeineLevel::VeryHigh, &[])],
        );
        assert!(reply.starts_with("Need an energy boost?"));
        assert!(reply.contains("very high caffeine"));
    }

    #[test]
    fn test_cheapest_template_with_context_label() {
        let reply = compose(
            "cheapest coffee",
            &[item("House Blend Drip", 2.5, CaffeineLevel::High, &[])],
        );
        assert_eq!(reply, "Our cheapest drink is the House Blend Drip ($2.50).");
    }

    #[test]
    fn test_expensive_template_without_context() {
        let reply = compose(
            "your most expensive option",
            &[item("Gold Latte", 9.0, CaffeineLevel::Medium, &[])],
        );
        assert_eq!(reply, "Our most premium item is the Gold Latte ($9.00).");
    }

    #[test]
    fn test_default_template_quotes_three_tags() {
        let reply = compose(
            "suggest something",
            &[item(
                "Mocha Velvet",
                5.25,
                CaffeineLevel::Medium,
                &["sweet", "chocolate", "creamy", "hot"],
            )],
        );
        assert_eq!(
            reply,
            "I suggest Mocha Velvet ($5.25). It's sweet, chocolate, creamy."
        );
    }

    #[test]
    fn test_default_template_fewer_tags() {
        let reply = compose(
            "suggest something",
            &[item("Espresso", 2.0, CaffeineLevel::High, &["strong"])],
        );
        assert_eq!(reply, "I suggest Espresso ($2.00). It's strong.");
    }

    #[test]
    fn test_default_template_no_tags() {
        let reply = compose(
            "suggest something",
            &[item("Water", 0.0, CaffeineLevel::None, &[])],
        );
        assert_eq!(reply, "I suggest Water ($0.00).");
    }

    #[test]
    fn test_default_template_mentions_other_rows() {
        let rows = vec![
            item("A", 1.0, CaffeineLevel::None, &[]),
            item("B", 1.0, CaffeineLevel::None, &[]),
            item("C", 1.0, CaffeineLevel::None, &[]),
        ];
        let reply = compose("suggest something", &rows);
        assert_eq!(reply, "I suggest A ($1.00). You might also like B and C.");
    }

    #[test]
    fn test_compose_menu_empty_rows() {
        let signals = IntentClassifier::new().classify("suggest something");
        let resolved = ContextResolver::new().resolve(&signals, None);
        assert!(ResponseComposer::default()
            .compose_menu(&[], &signals, &resolved)
            .is_none());
    }

    #[test]
    fn test_currency_symbol() {
        let composer = ResponseComposer::new("€");
        assert_eq!(composer.format_price(3.5), "€3.50");
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(&[]), "");
        assert_eq!(join_names(&["A"]), "A");
        assert_eq!(join_names(&["A", "B"]), "A and B");
        assert_eq!(join_names(&["A", "B", "C"]), "A, B and C");
    }

    // ---- Art ----

    #[test]
    fn test_art_listing() {
        let items = vec![
            ArtItem {
                id: 1,
                title: "Morning Pour".to_string(),
                artist: "L. Okafor".to_string(),
                price: 180.0,
                available: true,
            },
            ArtItem {
                id: 2,
                title: "Steam".to_string(),
                artist: "J. Park".to_string(),
                price: 95.5,
                available: true,
            },
        ];
        let reply = ResponseComposer::default().compose_art_listing(&items);
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "Morning Pour — L. Okafor — $180.00");
        assert_eq!(lines[2], "Steam — J. Park — $95.50");
    }

    #[test]
    fn test_art_listing_empty() {
        assert_eq!(
            ResponseComposer::default().compose_art_listing(&[]),
            EMPTY_GALLERY_REPLY
        );
    }

    #[test]
    fn test_art_pick_phrasing() {
        let piece = ArtItem {
            id: 1,
            title: "Steam".to_string(),
            artist: "J. Park".to_string(),
            price: 95.5,
            available: true,
        };
        let classifier = IntentClassifier::new();
        let composer = ResponseComposer::default();

        let reply = composer.compose_art_pick(&piece, &classifier.classify("cheapest painting"));
        assert_eq!(reply, "Our most affordable piece is \"Steam\" by J. Park ($95.50).");

        let reply = composer.compose_art_pick(&piece, &classifier.classify("recommend a painting"));
        assert!(reply.starts_with("I'd recommend \"Steam\" by J. Park"));
    }

    // ---- Workshops ----

    #[test]
    fn test_workshop_listing_marks_sold_out() {
        let workshops = vec![
            workshop("Latte Art Basics", 10, 4),
            workshop("Home Espresso Masterclass", 6, 6),
            workshop("Cupping 101", 8, 7),
        ];
        let reply = ResponseComposer::default().compose_workshops(&workshops);
        let lines: Vec<&str> = reply.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            "Latte Art Basics — Sat Nov 7, 10:30 — $35.00 — 6 seats left"
        );
        assert!(lines[2].ends_with("SOLD OUT"));
        assert!(lines[3].ends_with("1 seat left"));
    }

    #[test]
    fn test_overbooked_workshop_is_sold_out() {
        let reply = ResponseComposer::default().compose_workshops(&[workshop("X", 2, 5)]);
        assert!(reply.ends_with("SOLD OUT"));
    }

    #[test]
    fn test_no_workshops() {
        assert_eq!(
            ResponseComposer::default().compose_workshops(&[]),
            NO_WORKSHOPS_REPLY
        );
    }

    #[test]
    fn test_label_uses_resolved_context() {
        let signals = IntentClassifier::new().classify("cheapest snack");
        let resolved = ContextResolver::new().resolve(&signals, None);
        assert_eq!(resolved.context, Some(Context::Food));
        let reply = ResponseComposer::default()
            .compose_menu(
                &[item("Cookie", 1.5, CaffeineLevel::None, &[])],
                &signals,
                &resolved,
            )
            .unwrap();
        assert_eq!(reply, "Our cheapest food is the Cookie ($1.50).");
    }
}
