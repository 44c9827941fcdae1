//! Shared message formatting helpers for TUI rendering.

use ratatui::style::{Color, Modifier, Style};
use superexpat_core::render::DetailKind;
use superexpat_core::{ItemKind, Message, Role};

/// Role label and style for message headers.
pub fn role_label(msg: &Message) -> (&'static str, Style) {
    let style = match msg.role {
        Role::User => Style::default().fg(Color::Cyan),
        Role::Assistant if msg.error => Style::default().fg(Color::Red),
        Role::Assistant => Style::default().fg(Color::Green),
    };
    (msg.role.display_name(), style.add_modifier(Modifier::BOLD))
}

/// Icon shown in place of a poster that is missing or failed to load.
pub fn placeholder_icon(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Job => "💼",
        ItemKind::Event => "📅",
    }
}

/// Icon and style for one card detail row.
pub fn detail_icon(kind: DetailKind) -> (&'static str, Style) {
    match kind {
        DetailKind::Date => ("📅", Style::default()),
        // Sentinel date stands out from real dates.
        DetailKind::DateTba => (
            "📅",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ),
        DetailKind::Time => ("🕒", Style::default()),
        DetailKind::Venue => ("📍", Style::default()),
        DetailKind::Company => ("💼", Style::default()),
        DetailKind::Address => ("📍", Style::default().fg(Color::Gray)),
        DetailKind::Price => ("💲", Style::default().fg(Color::LightGreen)),
    }
}
