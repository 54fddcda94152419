use super::state::ViewState;
use crate::console::ConsoleState;
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, state: &ConsoleState, view: &ViewState) {
    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(5),
    ];
    if state.has_error() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(8));
    constraints.push(Constraint::Length(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    draw_header(f, state, view, chunks[0]);
    draw_draft(f, state, view, chunks[1]);
    draw_projects(f, state, view, chunks[2]);

    let mut next = 3;
    if state.has_error() {
        draw_error(f, state, chunks[next]);
        next += 1;
    }

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[next]);
    draw_output(f, state, panes[0]);
    draw_config(f, state, panes[1]);

    draw_footer(f, view, chunks[next + 1]);
}

fn draw_header(f: &mut Frame, state: &ConsoleState, view: &ViewState, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            " Project Console ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | Backend: "),
        Span::styled(view.backend_url.as_str(), Style::default().fg(Color::White)),
        Span::raw(format!(" | Projects: {}", state.projects.len())),
    ]);
    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_draft(f: &mut Frame, state: &ConsoleState, view: &ViewState, area: Rect) {
    let border_style = if view.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let text = if state.project_name_draft.is_empty() && !view.editing {
        Span::styled("Enter project name", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(state.project_name_draft.as_str())
    };
    let block = Block::default()
        .title(" New project ")
        .borders(Borders::ALL)
        .border_style(border_style);
    f.render_widget(Paragraph::new(Line::from(text)).block(block), area);

    if view.editing {
        let x = draft_cursor_x(area, &state.project_name_draft);
        f.set_cursor_position(Position::new(x, area.y + 1));
    }
}

/// Column just past the draft text, pinned inside the box's right border.
fn draft_cursor_x(area: Rect, draft: &str) -> u16 {
    let offset = u16::try_from(draft.chars().count()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(offset)
        .min(area.right().saturating_sub(2))
}

fn draw_projects(f: &mut Frame, state: &ConsoleState, view: &ViewState, area: Rect) {
    let header = Row::new(vec![Cell::from("Name"), Cell::from("ID")])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = state
        .projects
        .iter()
        .map(|p| Row::new(vec![Cell::from(p.name.as_str()), Cell::from(p.id.as_str())]))
        .collect();

    let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)])
        .header(header)
        .block(Block::default().title(" Projects ").borders(Borders::ALL))
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut table_state = TableState::default();
    if !view.editing && !state.projects.is_empty() {
        table_state.select(Some(view.selected));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_error(f: &mut Frame, state: &ConsoleState, area: Rect) {
    let line = Line::from(Span::styled(
        format!("Error: {}", state.last_error),
        Style::default().fg(Color::Red),
    ));
    f.render_widget(Paragraph::new(line), area);
}

fn draw_output(f: &mut Frame, state: &ConsoleState, area: Rect) {
    let block = Block::default().title(" Output ").borders(Borders::ALL);
    let paragraph = Paragraph::new(state.last_output.as_str())
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_config(f: &mut Frame, state: &ConsoleState, area: Rect) {
    let block = Block::default().title(" Configuration ").borders(Borders::ALL);
    let paragraph = Paragraph::new(config_text(&state.config))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut Frame, view: &ViewState, area: Rect) {
    let keys = if view.editing {
        " [Enter] create  [Esc] cancel  [Backspace] delete char"
    } else {
        " [i] new  [j/k] select  [r] run  [d] delete  [l] refresh  [c] config  [q] quit"
    };
    let line = Line::from(Span::styled(keys, Style::default().fg(Color::DarkGray)));
    f.render_widget(Paragraph::new(line), area);
}

/// Two-space indented JSON, as shown in the configuration pane.
pub fn config_text(config: &serde_json::Value) -> String {
    serde_json::to_string_pretty(config).unwrap_or_else(|_| config.to_string())
}
