use std::time::Instant;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, LineGauge, Paragraph, Wrap},
};
use chat_tui::{Message, Role};
use crate::app::App;

const PLACEHOLDER: &str = "Type your message...";

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };

        let bold_text = &after_open[..close];
        if bold_text.is_empty() {
            // "****" stays literal
            spans.push(Span::raw(rest[..open + 4].to_string()));
        } else {
            if open > 0 {
                spans.push(Span::raw(rest[..open].to_string()));
            }
            spans.push(Span::styled(
                bold_text.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.toasts.current().is_some() {
        render_toast(app, frame, chat_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Chat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.backend_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    let (label_style, alignment) = match msg.role() {
        Role::User => (Style::default().fg(Color::Cyan), Alignment::Right),
        Role::Bot => (Style::default().fg(Color::Yellow), Alignment::Left),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("{}:", msg.role().display_name()),
            label_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            msg.timestamp().format("%H:%M:%S").to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    ])
    .alignment(alignment)];

    for line in msg.content().lines() {
        let styled = match msg.role() {
            Role::User => Line::from(line.to_string()),
            Role::Bot => parse_markdown_line(line),
        };
        lines.push(styled.alignment(alignment));
    }
    lines.push(Line::default());
    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store area for mouse hit-testing and inner size for scroll calculations
    app.set_chat_viewport(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" Messages ({}) ", app.store.len()));

    let chat_text = if app.store.is_empty() && !app.is_awaiting() {
        Text::from(Span::styled(
            "No messages yet. Say hello!",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = app.store.messages().iter().flat_map(message_lines).collect();

        if app.is_awaiting() {
            lines.push(Line::from(Span::styled(
                "Bot:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let border_color = if app.is_awaiting() { Color::DarkGray } else { Color::Yellow };
    let title = if app.is_awaiting() { " Waiting for reply... " } else { " Send (Enter) " };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let draft = app.store.pending_input();

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let input = if draft.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
    } else {
        let visible_text: String = draft.chars().skip(scroll_offset).take(inner_width).collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(block), area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![
        Span::styled(" Enter ", key_style),
        Span::styled(" send ", label_style),
        Span::styled(" PgUp/PgDn ", key_style),
        Span::styled(" scroll ", label_style),
    ];
    if app.is_awaiting() {
        hints.extend(vec![
            Span::styled(" ^X ", key_style),
            Span::styled(" cancel ", label_style),
        ]);
    }
    if app.toasts.current().is_some() {
        hints.extend(vec![
            Span::styled(" Esc ", key_style),
            Span::styled(" dismiss ", label_style),
        ]);
    }
    hints.extend(vec![
        Span::styled(" ^C ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer = Paragraph::new(Line::from(hints)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Notification in the top-right corner of the chat, with a countdown bar
fn render_toast(app: &App, frame: &mut Frame, area: Rect) {
    let Some(toast) = app.toasts.current() else {
        return;
    };

    let width = 44.min(area.width);
    let height = 4.min(area.height);
    let popup_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + 1,
        width,
        height,
    );

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(
            format!(" {} ", toast.title),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Esc ").alignment(Alignment::Right));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [message_area, gauge_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);

    frame.render_widget(Paragraph::new(toast.message), message_area);

    let gauge = LineGauge::default()
        .filled_style(Style::default().fg(Color::Red))
        .line_set(symbols::line::THICK)
        .label("")
        .ratio(toast.remaining_ratio(Instant::now()));
    frame.render_widget(gauge, gauge_area);
}
