//! Presentation model for assistant turns.
//!
//! Both the terminal UI and the one-shot CLI build their output from the
//! types here, so the display rules live in one place:
//!
//! - a non-empty AI summary replaces the "I found N result(s)" sentence
//! - an item without a start date shows [`DATE_TBA`] and never a time line
//! - the address line is only shown when there is no venue
//! - a poster that cannot be loaded falls back to a per-kind placeholder

use std::fmt;

use crate::format::{format_message_time, format_start_date, results_headline};
use crate::types::{non_empty, ChatResponse, Item, ItemKind, Message, Role};

/// Sentinel shown for items without a start date.
pub const DATE_TBA: &str = "Date To Be Announced";

/// Shown instead of cards when the backend returned no items.
pub const NO_RESULTS: &str = "No results found. Try a different search.";

/// First line of an assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Headline<'a> {
    /// Backend-written summary
    Summary(&'a str),
    /// Result count sentence
    Count(u64),
}

impl Headline<'_> {
    pub fn text(&self) -> String {
        match self {
            Headline::Summary(text) => text.to_string(),
            Headline::Count(total) => results_headline(*total),
        }
    }
}

/// Identity of a card within one response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CardKey {
    Id(String),
    /// Positional fallback for items without an id
    Index(usize),
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardKey::Id(id) => write!(f, "{id}"),
            CardKey::Index(idx) => write!(f, "#{idx}"),
        }
    }
}

/// What to show in the poster slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterView<'a> {
    Image(&'a str),
    Placeholder(ItemKind),
}

/// Kind of detail row on a card; UIs pick icons and styles from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    Date,
    /// The "Date To Be Announced" sentinel
    DateTba,
    Time,
    Venue,
    Company,
    Address,
    Price,
}

impl DetailKind {
    /// Short label used by the plain-text renderer.
    pub fn label(&self) -> &'static str {
        match self {
            DetailKind::Date | DetailKind::DateTba => "Date",
            DetailKind::Time => "Time",
            DetailKind::Venue => "Venue",
            DetailKind::Company => "Company",
            DetailKind::Address => "Address",
            DetailKind::Price => "Price",
        }
    }
}

/// One labelled row on a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLine {
    pub kind: DetailKind,
    pub text: String,
}

/// Display model of one [`Item`].
#[derive(Debug, Clone, PartialEq)]
pub struct Card<'a> {
    pub key: CardKey,
    pub item: &'a Item,
}

impl<'a> Card<'a> {
    pub fn new(item: &'a Item, index: usize) -> Self {
        let key = match non_empty(&item.id) {
            Some(id) => CardKey::Id(id.to_string()),
            None => CardKey::Index(index),
        };
        Self { key, item }
    }

    pub fn kind(&self) -> ItemKind {
        self.item.kind
    }

    /// "💼 Job" or "🎉 Event"
    pub fn badge(&self) -> &'static str {
        match self.item.kind {
            ItemKind::Job => "💼 Job",
            ItemKind::Event => "🎉 Event",
        }
    }

    pub fn title(&self) -> Option<&'a str> {
        non_empty(&self.item.title)
    }

    pub fn is_date_unknown(&self) -> bool {
        non_empty(&self.item.start_date).is_none()
    }

    /// Poster URL if the item has one that looks loadable.
    pub fn poster_url(&self) -> Option<&'a str> {
        non_empty(&self.item.poster).filter(|url| is_loadable_image_url(url))
    }

    /// True when the item names a poster that cannot be loaded.
    pub fn poster_is_broken(&self) -> bool {
        non_empty(&self.item.poster).is_some() && self.poster_url().is_none()
    }

    /// Poster slot contents, given whether loading it already failed.
    pub fn poster(&self, image_failed: bool) -> PosterView<'a> {
        match self.poster_url() {
            Some(url) if !image_failed => PosterView::Image(url),
            _ => PosterView::Placeholder(self.item.kind),
        }
    }

    /// Detail rows in display order.
    pub fn details(&self) -> Vec<DetailLine> {
        let item = self.item;
        let mut lines = Vec::with_capacity(6);

        match non_empty(&item.start_date) {
            Some(date) => {
                lines.push(DetailLine {
                    kind: DetailKind::Date,
                    text: format_start_date(date),
                });
                if let Some(time) = non_empty(&item.start_time) {
                    let text = match non_empty(&item.timezone) {
                        Some(tz) => format!("{time} {tz}"),
                        None => time.to_string(),
                    };
                    lines.push(DetailLine {
                        kind: DetailKind::Time,
                        text,
                    });
                }
            }
            None => lines.push(DetailLine {
                kind: DetailKind::DateTba,
                text: DATE_TBA.to_string(),
            }),
        }

        let venue = non_empty(&item.venue);
        if let Some(venue) = venue {
            lines.push(detail(DetailKind::Venue, venue));
        }
        if let Some(company) = non_empty(&item.company) {
            lines.push(detail(DetailKind::Company, company));
        }
        if venue.is_none() {
            if let Some(address) = non_empty(&item.address) {
                lines.push(detail(DetailKind::Address, address));
            }
        }
        if let Some(price) = non_empty(&item.price) {
            lines.push(detail(DetailKind::Price, price));
        }

        lines
    }

    /// External "View Details" target.
    pub fn link(&self) -> Option<&'a str> {
        non_empty(&self.item.url)
    }

    pub fn source(&self) -> Option<&'a str> {
        non_empty(&self.item.source)
    }
}

fn detail(kind: DetailKind, text: &str) -> DetailLine {
    DetailLine {
        kind,
        text: text.to_string(),
    }
}

/// A terminal can only "load" web images, so only http(s) URLs qualify.
pub fn is_loadable_image_url(url: &str) -> bool {
    reqwest::Url::parse(url.trim())
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Display model of an assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantView<'a> {
    Error(&'a str),
    Results {
        headline: Headline<'a>,
        /// Intent/location line when the backend sent them
        context: Option<String>,
        cards: Vec<Card<'a>>,
    },
}

impl<'a> AssistantView<'a> {
    /// Build the view for an assistant message. User messages and assistant
    /// messages without data render nothing.
    pub fn from_message(message: &'a Message) -> Option<Self> {
        if message.role != Role::Assistant {
            return None;
        }
        if message.error {
            return Some(AssistantView::Error(
                message.content.as_deref().unwrap_or_default(),
            ));
        }
        message.data.as_ref().map(Self::from_response)
    }

    pub fn from_response(response: &'a ChatResponse) -> Self {
        let headline = match response.summary() {
            Some(summary) => Headline::Summary(summary),
            None => Headline::Count(response.total_results),
        };
        let cards = response
            .results
            .iter()
            .enumerate()
            .map(|(idx, item)| Card::new(item, idx))
            .collect();
        AssistantView::Results {
            headline,
            context: response_context(response),
            cards,
        }
    }
}

fn response_context(response: &ChatResponse) -> Option<String> {
    let parts: Vec<&str> = [non_empty(&response.intent), non_empty(&response.location)]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}

/// Plain-text rendering of one message, used by the one-shot CLI.
pub fn plain_lines(message: &Message) -> Vec<String> {
    let mut lines = vec![format!(
        "{} · {}",
        message.role.display_name(),
        format_message_time(message.timestamp)
    )];

    if message.is_user() {
        lines.push(message.content.clone().unwrap_or_default());
        return lines;
    }

    match AssistantView::from_message(message) {
        Some(AssistantView::Error(text)) => lines.push(text.to_string()),
        Some(AssistantView::Results {
            headline,
            context,
            cards,
        }) => {
            if let Headline::Summary(_) = headline {
                lines.push("AI Summary:".to_string());
            }
            lines.push(headline.text());
            if let Some(context) = context {
                lines.push(format!("({context})"));
            }
            if cards.is_empty() {
                lines.push(String::new());
                lines.push(NO_RESULTS.to_string());
            }
            for card in &cards {
                lines.push(String::new());
                lines.extend(card_plain_lines(card));
            }
        }
        None => {}
    }

    lines
}

fn card_plain_lines(card: &Card<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    match card.title() {
        Some(title) => lines.push(format!("[{}] {}", card.badge(), title)),
        None => lines.push(format!("[{}]", card.badge())),
    }
    for detail in card.details() {
        lines.push(format!("  {:<8} {}", format!("{}:", detail.kind.label()), detail.text));
    }
    if let PosterView::Image(url) = card.poster(false) {
        lines.push(format!("  {:<8} {}", "Poster:", url));
    }
    if let Some(url) = card.link() {
        lines.push(format!("  View Details: {url}"));
    }
    lines
}
