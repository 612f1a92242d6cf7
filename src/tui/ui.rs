// Drawing - maps application state and rendered surface trees to widgets
//
// Layout, top to bottom: title bar, main area (transcript left, active
// surface right), optional log pane, composer, status bar. The surface pane
// is rebuilt from the store on every draw; render trees are never cached
// across frames.

use super::app::{App, ChatEntry, Focus, Role};
use crate::render::{RenderNode, TextSpan};
use crate::theme::Theme;
use crate::util::truncate_utf8_safe;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use unicode_width::UnicodeWidthStr;

const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

/// Render the whole UI for one frame
pub fn draw(f: &mut Frame, app: &App) {
    let log_height = if app.show_logs { 8 } else { 0 };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),          // title bar
            Constraint::Min(5),             // main area
            Constraint::Length(log_height), // log pane
            Constraint::Length(3),          // composer
            Constraint::Length(1),          // status bar
        ])
        .split(f.area());

    draw_title_bar(f, rows[0], app);
    draw_main(f, rows[1], app);
    if app.show_logs {
        draw_log_pane(f, rows[2], app);
    }
    draw_composer(f, rows[3], app);
    draw_status_bar(f, rows[4], app);
}

fn draw_title_bar(f: &mut Frame, area: Rect, app: &App) {
    let spinner = if app.loading {
        format!(" {} waiting for agent", SPINNER[app.animation_frame % SPINNER.len()])
    } else {
        String::new()
    };

    let title = Paragraph::new(format!(" surfcast · session {}{}", app.session_id, spinner))
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.title)),
        );
    f.render_widget(title, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_transcript(f, columns[0], app);
    draw_surface_pane(f, columns[1], app);
}

fn draw_transcript(f: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = Vec::new();

    for entry in &app.messages {
        lines.extend(transcript_entry_lines(entry, &app.theme));
        lines.push(Line::default());
    }

    // Keep the tail in view; Paragraph scrolls by line offset
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border))
                .title(" Conversation "),
        );
    f.render_widget(transcript, area);
}

fn transcript_entry_lines<'a>(entry: &'a ChatEntry, theme: &Theme) -> Vec<Line<'a>> {
    let (prefix, style) = match entry.role {
        Role::User => (
            "You",
            Style::default()
                .fg(theme.user_message)
                .add_modifier(Modifier::BOLD),
        ),
        Role::Assistant => ("Agent", Style::default().fg(theme.assistant_message)),
        Role::Notice => (
            "!",
            Style::default()
                .fg(theme.turn_failed)
                .add_modifier(Modifier::BOLD),
        ),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{prefix}: "), style),
        Span::raw(entry.content.as_str()),
    ])];

    if let Some(surface_id) = &entry.surface_id {
        lines.push(Line::from(Span::styled(
            format!("  ⧉ surface {surface_id}"),
            Style::default().fg(theme.label),
        )));
    }
    lines
}

fn draw_surface_pane(f: &mut Frame, area: Rect, app: &App) {
    let focused_pane = app.focus == Focus::Surface;
    let border_style = if focused_pane {
        Style::default().fg(app.theme.focused)
    } else {
        Style::default().fg(app.theme.border)
    };

    let lines = match app.render_active_surface() {
        Some(tree) => {
            let ctx = SurfaceViewCtx {
                app,
                now: Instant::now(),
                width: area.width.saturating_sub(4) as usize,
            };
            let mut lines = Vec::new();
            surface_lines(&tree, &ctx, 0, &mut lines);
            lines
        }
        None => vec![Line::from(Span::styled(
            "No surface yet. The agent will draw here.",
            Style::default().fg(app.theme.placeholder),
        ))],
    };

    let pane = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Surface ")
            .title_bottom(if focused_pane {
                " Tab next · Enter activate · Esc chat "
            } else {
                " Tab to interact "
            }),
    );
    f.render_widget(pane, area);
}

/// Read-only context for surface tree rendering
struct SurfaceViewCtx<'a> {
    app: &'a App,
    now: Instant,
    width: usize,
}

impl SurfaceViewCtx<'_> {
    fn is_focused(&self, component_id: &str) -> bool {
        self.app
            .focused_component()
            .is_some_and(|target| target.component_id == component_id)
    }

    fn focus_style(&self, component_id: &str, base: Style) -> Style {
        if self.is_focused(component_id) {
            base.bg(self.app.theme.focused_bg)
                .fg(self.app.theme.focused)
                .add_modifier(Modifier::BOLD)
        } else {
            base
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

/// Flatten one rendered node into styled lines
fn surface_lines(
    node: &RenderNode,
    ctx: &SurfaceViewCtx,
    depth: usize,
    out: &mut Vec<Line<'static>>,
) {
    let theme = &ctx.app.theme;
    let pad = indent(depth);

    match node {
        RenderNode::Card { title, children, .. } => {
            if let Some(title) = title {
                out.push(Line::from(Span::styled(
                    format!("{pad}┌ {title}"),
                    Style::default()
                        .fg(theme.card_title)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            for child in children {
                surface_lines(child, ctx, depth + 1, out);
            }
            out.push(Line::default());
        }

        RenderNode::Form { children, .. }
        | RenderNode::Row { children, .. }
        | RenderNode::Column { children, .. } => {
            // Line-oriented terminals stack Row children like Column ones;
            // the grouping still matters for focus order and form scope
            for child in children {
                surface_lines(child, ctx, depth, out);
            }
        }

        RenderNode::List { items, .. } => {
            for item in items {
                out.push(Line::from(Span::raw(format!("{pad}• {item}"))));
            }
        }

        RenderNode::Text { spans, .. } => {
            let mut parts: Vec<Span> = vec![Span::raw(pad)];
            for TextSpan { text, emphasis } in spans {
                let style = if *emphasis {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                parts.push(Span::styled(text.clone(), style));
            }
            out.push(Line::from(parts));
        }

        RenderNode::Label { text, .. } => {
            out.push(Line::from(Span::styled(
                format!("{pad}{text}"),
                Style::default().fg(theme.label),
            )));
        }

        RenderNode::Divider { .. } => {
            out.push(Line::from(Span::styled(
                format!("{pad}{}", "─".repeat(ctx.width.saturating_sub(pad.len()).max(1))),
                Style::default().fg(theme.border),
            )));
        }

        RenderNode::Image { src, alt, .. } => {
            let caption = if alt.is_empty() { "image" } else { alt.as_str() };
            out.push(Line::from(vec![
                Span::styled(format!("{pad}🖼 {caption} "), Style::default().fg(theme.image)),
                Span::styled(
                    format!("({})", truncate_utf8_safe(src, 40)),
                    Style::default().fg(theme.placeholder),
                ),
            ]));
        }

        RenderNode::Input { id, placeholder } => {
            let typed = ctx.app.edit_buffers.get(id).map(String::as_str).unwrap_or("");
            let (shown, style) = if typed.is_empty() {
                (placeholder.as_str(), Style::default().fg(theme.placeholder))
            } else {
                (typed, Style::default().fg(theme.input))
            };
            let cursor = if ctx.is_focused(id) { "_" } else { "" };
            out.push(Line::from(Span::styled(
                format!("{pad}[{shown}{cursor}]"),
                ctx.focus_style(id, style),
            )));
        }

        RenderNode::Select { id, options } => {
            let header = match ctx.app.select_chosen.get(id) {
                Some(label) => format!("{pad}{label} ▾"),
                None => format!("{pad}Select an option ▾"),
            };
            out.push(Line::from(Span::styled(
                header,
                ctx.focus_style(id, Style::default().fg(theme.select)),
            )));

            // Expand the option list only while focused
            if ctx.is_focused(id) {
                let cursor = ctx.app.select_cursors.get(id).copied().unwrap_or(0);
                for (index, option) in options.iter().enumerate() {
                    let marker = if index == cursor { "›" } else { " " };
                    out.push(Line::from(Span::styled(
                        format!("{pad}  {marker} {}", option.label),
                        if index == cursor {
                            Style::default().fg(theme.focused)
                        } else {
                            Style::default().fg(theme.placeholder)
                        },
                    )));
                }
            }
        }

        RenderNode::Button { id, label, .. } => {
            let locked = ctx.app.router.is_locked(id, ctx.now);
            let style = if locked {
                Style::default().fg(theme.button_locked)
            } else {
                Style::default().fg(theme.button)
            };
            let text = if locked {
                format!("{pad}[ {label} … ]")
            } else {
                format!("{pad}[ {label} ]")
            };
            out.push(Line::from(Span::styled(text, ctx.focus_style(id, style))));
        }

        RenderNode::MissingComponent { id } => {
            out.push(diagnostic_line(&pad, format!("component not found: {id}"), theme));
        }

        RenderNode::UnknownType { tag, .. } => {
            out.push(diagnostic_line(
                &pad,
                format!("unknown component type: {tag}"),
                theme,
            ));
        }

        RenderNode::StructuralError { message, .. } => {
            out.push(diagnostic_line(&pad, message.clone(), theme));
        }

        RenderNode::SurfaceNotFound { surface_id } => {
            out.push(diagnostic_line(
                &pad,
                format!("surface not found: {surface_id}"),
                theme,
            ));
        }
    }
}

fn diagnostic_line(pad: &str, message: String, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        format!("{pad}⚠ {message}"),
        Style::default().fg(theme.error),
    ))
}

fn draw_log_pane(f: &mut Frame, area: Rect, app: &App) {
    let entries = app.log_buffer.recent(area.height.saturating_sub(2) as usize);
    let lines: Vec<Line> = entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!(
                        "{} {:5} ",
                        entry.timestamp.format("%H:%M:%S"),
                        entry.level.as_str()
                    ),
                    Style::default().fg(app.theme.log_pane),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();

    let pane = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.log_pane))
            .title(" Logs "),
    );
    f.render_widget(pane, area);
}

fn draw_composer(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Composer;
    let border_style = if focused {
        Style::default().fg(app.theme.focused)
    } else {
        Style::default().fg(app.theme.border)
    };

    let cursor = if focused { "_" } else { "" };
    let composer = Paragraph::new(format!(" {}{}", app.input, cursor)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Message "),
    );
    f.render_widget(composer, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, app: &App) {
    // A live toast takes over the status line until it expires
    if let Some(toast) = &app.toast {
        let notice = Paragraph::new(format!(" {}", toast.message)).style(
            Style::default()
                .fg(app.theme.toast)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(notice, area);
        return;
    }

    let stats = &app.stats;
    let mut status = format!(
        " turns {} │ ops {} │ actions {}",
        stats.turns_completed, stats.ops_applied, stats.actions_sent,
    );
    if stats.turns_failed > 0 {
        status.push_str(&format!(" │ ✗ {}", stats.turns_failed));
    }
    status.push_str(" │ ^L logs · ^C quit");

    // Clip rather than wrap into a second row
    let max = area.width as usize;
    if status.width() > max {
        status = truncate_utf8_safe(&status, max).to_string();
    }

    let bar = Paragraph::new(status).style(Style::default().fg(app.theme.status_bar));
    f.render_widget(bar, area);
}
