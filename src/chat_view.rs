// src/chat_view.rs

use crate::app::App;
use crate::session::{Message, Sender};
use crate::utils::sanitize_markup;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

pub fn draw_chat(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .margin(1)
        .split(size);

    let chat_vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(1),
                Constraint::Length(2),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(horizontal_chunks[0]);

    draw_messages(f, app, chat_vertical_chunks[0]);

    app.status_indicator.update_spinner();
    app.status_indicator.render(f, chat_vertical_chunks[1]);

    draw_input(f, app, chat_vertical_chunks[2]);
    draw_logs(f, app, horizontal_chunks[1], size);
}

fn draw_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let mut lines = Vec::new();
    for message in app.session.messages() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(message_lines(message, area));
    }

    let total_lines = lines.len() as u16;
    let max_scroll = total_lines.saturating_sub(area.height);
    if app.follow || app.chat_scroll > max_scroll {
        app.chat_scroll = max_scroll;
    }
    // Reaching the bottom again resumes following.
    if app.chat_scroll == max_scroll {
        app.follow = true;
    }

    let msgs_para = Paragraph::new(lines)
        .style(Style::default())
        .wrap(Wrap { trim: true });
    f.render_widget(msgs_para.scroll((app.chat_scroll, 0)), area);
}

fn base_style(sender: Sender) -> Style {
    Style::default().fg(match sender {
        Sender::User => Color::Rgb(255, 223, 128),
        Sender::Bot => Color::Rgb(144, 238, 144),
    })
}

/// Renders one message as a bordered block: a timestamped header, the
/// wrapped body, and a closing corner. Bot text is sanitized first since
/// it arrives from the wire.
fn message_lines(message: &Message, area: Rect) -> Vec<Line<'static>> {
    let style = base_style(message.sender);
    let indent = if message.sender == Sender::User {
        "  "
    } else {
        ""
    };
    let mut lines = Vec::new();

    let timestamp = message.timestamp.format("%H:%M").to_string();
    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("┌─".to_string(), style),
        Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
    ]));

    match message.sender {
        // User text is plain; no markup interpretation at all.
        Sender::User => flush_text_buffer(&mut lines, &message.text, area, style, indent),
        Sender::Bot => {
            let content = sanitize_markup(&message.text);
            let mut in_code_block = false;
            let mut code_buffer = String::new();
            let mut text_buffer = String::new();
            for line in content.lines() {
                if line.trim().starts_with("```") {
                    flush_text_buffer(&mut lines, &text_buffer, area, style, indent);
                    flush_code_buffer(&mut lines, &code_buffer, style, indent);
                    text_buffer.clear();
                    code_buffer.clear();
                    in_code_block = !in_code_block;
                    continue;
                }

                if in_code_block {
                    code_buffer.push_str(line);
                    code_buffer.push('\n');
                } else {
                    text_buffer.push_str(line);
                    text_buffer.push('\n');
                }
            }
            flush_text_buffer(&mut lines, &text_buffer, area, style, indent);
            flush_code_buffer(&mut lines, &code_buffer, style, indent);
        }
    }

    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("╰─".to_string(), style),
    ]));

    lines
}

fn flush_text_buffer(
    lines: &mut Vec<Line<'static>>,
    buffer: &str,
    area: Rect,
    style: Style,
    indent: &str,
) {
    if buffer.is_empty() {
        return;
    }

    let wrap_width = (area.width as usize).saturating_sub(4);
    for wrapped_line in wrap(buffer, wrap_width) {
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("│ ".to_string(), style),
            Span::styled(wrapped_line.to_string(), style),
        ]));
    }
}

fn flush_code_buffer(lines: &mut Vec<Line<'static>>, buffer: &str, style: Style, indent: &str) {
    if buffer.is_empty() {
        return;
    }

    let code_style = Style::default()
        .fg(Color::Rgb(209, 154, 102))
        .add_modifier(Modifier::BOLD);

    for code_line in buffer.lines() {
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled("│ ".to_string(), style),
            Span::styled("▎".to_string(), Style::default().fg(Color::DarkGray)),
            Span::styled(format!(" {}", code_line), code_style),
        ]));
    }
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    // Separator, text row, separator. A resize can leave fewer rows.
    if area.height < 3 {
        return;
    }
    let separator = "─".repeat(area.width as usize);
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator.clone(),
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height: 1,
        },
    );

    let input = Line::from(vec![
        Span::styled("→ ", Style::default().fg(Color::DarkGray)),
        Span::styled(&app.session.draft, Style::default().fg(Color::White)),
    ]);

    let visible_width = area.width.saturating_sub(2);
    let text_width = app.session.draft.as_str().width() as u16;
    let scroll_offset = text_width.saturating_sub(visible_width);

    f.render_widget(
        Paragraph::new(input).scroll((0, scroll_offset)),
        Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: area.height - 2,
        },
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        ))),
        Rect {
            x: area.x,
            y: area.y + area.height - 1,
            width: area.width,
            height: 1,
        },
    );

    let cursor_x = area.x + 2 + text_width - scroll_offset;
    f.set_cursor_position((cursor_x, area.y + 1));
}

fn draw_logs(f: &mut Frame, app: &App, area: Rect, size: Rect) {
    let bar_height = size.height.saturating_sub(2);
    let vsep: Vec<Line> = (0..bar_height).map(|_| Line::from("│")).collect();
    f.render_widget(
        Paragraph::new(vsep).style(Style::default().fg(Color::DarkGray)),
        Rect {
            x: area.x.saturating_sub(1),
            y: 1,
            width: 1,
            height: bar_height,
        },
    );

    let log_lines: Vec<Line> = app
        .logs
        .entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::DarkGray)),
                Span::raw(entry.as_str()),
            ])
        })
        .collect();

    // Pinned to the newest entry unless the user has scrolled back.
    let total_log_lines = log_lines.len() as u16;
    let max_log_scroll = total_log_lines.saturating_sub(area.height);
    let offset_back = app.logs.scroll_offset.min(max_log_scroll);
    let logs_scroll = max_log_scroll - offset_back;

    let logs_para = Paragraph::new(log_lines)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(logs_para.scroll((logs_scroll, 0)), area);
}
