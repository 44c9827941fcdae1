//! UI rendering for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};
use superexpat_core::format::{format_message_time, pluralize, truncate_chars};
use superexpat_core::render::{AssistantView, Card, Headline, PosterView, NO_RESULTS};
use superexpat_core::Message;

use crate::app::{App, SAMPLE_QUERIES};
use crate::message_format::{detail_icon, placeholder_icon, role_label};

/// Header title color
const TITLE_COLOR: Color = Color::Rgb(120, 170, 255);
/// Border color for the messages block
const BORDER_MESSAGES: Color = Color::Rgb(80, 160, 80);
/// Border color for the input block
const BORDER_INPUT: Color = Color::Rgb(0, 150, 150);
/// Card frame color
const CARD_FRAME: Color = Color::Rgb(90, 90, 110);
/// AI summary accent
const SUMMARY_ACCENT: Color = Color::Rgb(200, 120, 255);
/// Dim gray for secondary text
const DIM: Color = Color::Rgb(128, 128, 128);

/// Poster URLs are informational; keep them to one row.
const POSTER_URL_MAX: usize = 60;

const INPUT_PLACEHOLDER: &str = "Try: 'events in London' or 'jobs in Berlin'";

/// Render the application UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Layout: header, messages, input, footer
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(5),    // Messages
        Constraint::Length(3), // Input
        Constraint::Length(1), // Footer
    ])
    .split(area);

    render_header(frame, chunks[0]);
    render_messages(frame, app, chunks[1]);
    render_input(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "SuperExpat AI Agent System",
            Style::default().fg(TITLE_COLOR).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Find Events & Jobs Worldwide with AI-Powered Search",
            Style::default().fg(DIM),
        )),
    ];
    let header = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn render_messages(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_MESSAGES))
        .title(" Chat ");
    let inner = block.inner(area);

    let lines = if app.messages().is_empty() {
        welcome_lines()
    } else {
        let mut lines = Vec::new();
        for (index, msg) in app.messages().iter().enumerate() {
            lines.extend(message_lines(app, index, msg));
            lines.push(Line::default());
        }
        if app.is_busy() {
            lines.push(Line::from(vec![
                Span::styled(app.spinner(), Style::default().fg(Color::Yellow)),
                Span::raw(" "),
                Span::styled("Searching with AI...", Style::default().fg(DIM).italic()),
            ]));
        }
        lines
    };

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let total = paragraph.line_count(inner.width);
    app.max_scroll = total.saturating_sub(inner.height as usize);
    if app.follow_tail || app.scroll_offset > app.max_scroll {
        app.scroll_offset = app.max_scroll;
    }
    let offset = u16::try_from(app.scroll_offset).unwrap_or(u16::MAX);

    frame.render_widget(paragraph.block(block).scroll((offset, 0)), area);
}

fn welcome_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "Welcome to SuperExpat AI Assistant",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(Span::styled(
            "Find events, jobs, and opportunities anywhere in the world powered by AI!",
            Style::default().fg(DIM),
        ))
        .alignment(Alignment::Center),
        Line::default(),
    ];
    for (i, query) in SAMPLE_QUERIES.iter().enumerate() {
        lines.push(
            Line::from(vec![
                Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Yellow)),
                Span::raw(title_case(query)),
            ])
            .alignment(Alignment::Center),
        );
    }
    lines
}

/// "events in London" -> "Events in London"
fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn message_header(msg: &Message) -> Line<'static> {
    let (label, style) = role_label(msg);
    Line::from(vec![
        Span::styled(label, style),
        Span::raw("  "),
        Span::styled(format_message_time(msg.timestamp), Style::default().fg(DIM)),
    ])
}

fn message_lines(app: &App, index: usize, msg: &Message) -> Vec<Line<'static>> {
    let mut lines = vec![message_header(msg)];

    if msg.is_user() {
        lines.push(Line::raw(msg.content.clone().unwrap_or_default()));
        return lines;
    }

    match AssistantView::from_message(msg) {
        Some(AssistantView::Error(text)) => {
            lines.push(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(Color::Red),
            )));
        }
        Some(AssistantView::Results {
            headline,
            context,
            cards,
        }) => {
            lines.extend(headline_lines(&headline));
            if let Some(context) = context {
                lines.push(Line::from(Span::styled(
                    context,
                    Style::default().fg(DIM).italic(),
                )));
            }
            if cards.is_empty() {
                lines.push(Line::from(Span::styled(NO_RESULTS, Style::default().fg(DIM))));
            }
            for card in &cards {
                lines.extend(card_lines(card, app.image_failed(index, &card.key)));
            }
        }
        None => {}
    }

    lines
}

fn headline_lines(headline: &Headline<'_>) -> Vec<Line<'static>> {
    match headline {
        Headline::Summary(text) => vec![
            Line::from(Span::styled(
                "✨ AI Summary",
                Style::default()
                    .fg(SUMMARY_ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(text.to_string()),
        ],
        Headline::Count(total) => vec![Line::from(vec![
            Span::raw("I found "),
            Span::styled(total.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(format!(" {} for you", pluralize(*total, "result"))),
        ])],
    }
}

fn card_lines(card: &Card<'_>, image_failed: bool) -> Vec<Line<'static>> {
    let frame_style = Style::default().fg(CARD_FRAME);
    let bar = || Span::styled("│ ", frame_style);

    let mut title = vec![
        Span::styled("┌ ", frame_style),
        Span::styled(card.badge(), Style::default().fg(Color::Yellow)),
    ];
    if let Some(text) = card.title() {
        title.push(Span::raw("  "));
        title.push(Span::styled(
            text.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    let mut lines = vec![Line::from(title)];

    lines.push(match card.poster(image_failed) {
        PosterView::Image(url) => Line::from(vec![
            bar(),
            Span::raw("🖼  "),
            Span::styled(truncate_chars(url, POSTER_URL_MAX), Style::default().fg(DIM)),
        ]),
        PosterView::Placeholder(kind) => Line::from(vec![
            bar(),
            Span::raw(format!("{}  ", placeholder_icon(kind))),
            Span::styled("no image", Style::default().fg(DIM).italic()),
        ]),
    });

    for detail in card.details() {
        let (icon, style) = detail_icon(detail.kind);
        lines.push(Line::from(vec![
            bar(),
            Span::raw(format!("{icon} ")),
            Span::styled(detail.text, style),
        ]));
    }

    if let Some(url) = card.link() {
        lines.push(Line::from(vec![
            bar(),
            Span::styled("View Details ↗ ", Style::default().fg(Color::LightBlue)),
            Span::styled(
                url.to_string(),
                Style::default()
                    .fg(Color::LightBlue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }

    let mut footer = vec![Span::styled("└", frame_style)];
    if let Some(source) = card.source() {
        footer.push(Span::styled(format!(" via {source}"), Style::default().fg(DIM)));
    }
    lines.push(Line::from(footer));
    lines
}

fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let busy = app.is_busy();
    let title = if busy { " Waiting for backend... " } else { " Ask " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if busy { DIM } else { BORDER_INPUT }))
        .title(title);
    let inner = block.inner(area);

    let typed = Line::raw(app.input.as_str()).width();
    let (content, hscroll) = if app.input.is_empty() {
        (
            Line::from(Span::styled(INPUT_PLACEHOLDER, Style::default().fg(DIM))),
            0,
        )
    } else {
        (Line::raw(app.input.clone()), input_scroll(typed, inner.width))
    };
    frame.render_widget(
        Paragraph::new(content)
            .block(block)
            .scroll((0, hscroll)),
        area,
    );

    if !busy {
        let visible = u16::try_from(typed).unwrap_or(u16::MAX).saturating_sub(hscroll);
        let x = inner.x + visible.min(inner.width.saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}

/// Columns to skip so the end of the input and the cursor stay visible.
fn input_scroll(typed: usize, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let hidden = (typed + 1).saturating_sub(width);
    u16::try_from(hidden).unwrap_or(u16::MAX)
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" send  "),
        Span::styled("↑/↓ PgUp/PgDn", Style::default().fg(Color::Yellow)),
        Span::raw(" scroll  "),
        Span::styled("End", Style::default().fg(Color::Yellow)),
        Span::raw(" follow  "),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::raw(" quit"),
    ];
    if app.messages().is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("1-4", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" sample query"));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().fg(DIM)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use superexpat_core::{ChatBackend, ChatResponse, Error};

    struct UnusedBackend;

    impl ChatBackend for UnusedBackend {
        fn send(&self, _message: &str) -> superexpat_core::Result<ChatResponse> {
            Err(Error::Transport("not used".to_string()))
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_welcome_screen_lists_samples() {
        let mut app = App::new(Arc::new(UnusedBackend));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("SuperExpat AI Agent System"));
        assert!(text.contains("Events in London"));
        assert!(text.contains("Festivals in Paris"));
        assert!(text.contains(INPUT_PLACEHOLDER));
    }

    #[test]
    fn test_card_lines_for_tba_item() {
        let item: superexpat_core::Item = serde_json::from_value(serde_json::json!({
            "type": "job",
            "title": "Barista",
            "start_time": "09:00",
            "company": "Bean There",
            "url": "https://jobs.example/1"
        }))
        .unwrap();
        let card = Card::new(&item, 0);
        let rendered: Vec<String> = card_lines(&card, false)
            .iter()
            .map(|line| line.to_string())
            .collect();

        assert!(rendered[0].contains("💼 Job"));
        assert!(rendered[0].contains("Barista"));
        assert!(rendered.iter().any(|l| l.contains("Date To Be Announced")));
        assert!(!rendered.iter().any(|l| l.contains("09:00")));
        assert!(rendered.iter().any(|l| l.contains("View Details")));
    }

    #[test]
    fn test_headline_count_text() {
        let line = &headline_lines(&Headline::Count(1))[0];
        assert_eq!(line.to_string(), "I found 1 result for you");
    }

    struct FixedBackend(ChatResponse);

    impl ChatBackend for FixedBackend {
        fn send(&self, _message: &str) -> superexpat_core::Result<ChatResponse> {
            Ok(self.0.clone())
        }
    }

    fn settled_app(response: serde_json::Value) -> App {
        let response: ChatResponse = serde_json::from_value(response).unwrap();
        let mut app = App::new(Arc::new(FixedBackend(response)));
        app.input = "events in London".to_string();
        app.submit_input();
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_busy() {
            assert!(Instant::now() < deadline, "request never settled");
            app.poll_pending();
            std::thread::sleep(Duration::from_millis(5));
        }
        app
    }

    #[test]
    fn test_follow_tail_reaches_last_card_after_wrapped_summary() {
        let summary = vec!["abcdefghijklmnopqrst"; 30].join(" ");
        let mut app = settled_app(serde_json::json!({
            "total_results": 1,
            "ai_summary": summary,
            "results": [{
                "id": "1",
                "type": "event",
                "title": "Thames Night Market",
                "start_date": "2025-11-22",
                "source": "riverside"
            }]
        }));
        let mut terminal = Terminal::new(TestBackend::new(40, 30)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        let text = buffer_text(&terminal);
        assert!(
            text.contains("via riverside"),
            "newest card footer should be visible, got:\n{text}"
        );
        assert_eq!(app.scroll_offset, app.max_scroll);
    }

    #[test]
    fn test_long_input_shows_its_end() {
        let mut app = App::new(Arc::new(UnusedBackend));
        app.input = format!("{}END", "x".repeat(150));
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render(frame, &mut app)).unwrap();

        assert!(buffer_text(&terminal).contains("xxxEND"));
    }

    #[test]
    fn test_input_scroll() {
        assert_eq!(input_scroll(5, 20), 0);
        assert_eq!(input_scroll(19, 20), 0);
        assert_eq!(input_scroll(20, 20), 1);
        assert_eq!(input_scroll(153, 58), 96);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("jobs in Berlin"), "Jobs in Berlin");
        assert_eq!(title_case(""), "");
    }
}
