//! UI rendering

use super::app::{App, Mode};
use super::form::Form;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};

pub(crate) const FILTER_BAR_HEIGHT: u16 = 3;
pub(crate) const GRID_MIN_HEIGHT: u16 = 5;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;
const MAX_COLUMN_WIDTH: usize = 24;
const MIN_COLUMN_WIDTH: usize = 4;

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FILTER_BAR_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

pub fn draw(f: &mut Frame, app: &App) {
    let [filter_area, grid_area, missing_area, status_area] = split_main_chunks(f.area());

    draw_filter_bar(f, app, filter_area);
    draw_grid(f, app, grid_area);
    draw_missing_line(f, app, missing_area);
    draw_status_bar(f, app, status_area);

    if app.mode == Mode::Form
        && let Some(form) = &app.form
    {
        draw_form_modal(f, form);
    }
}

fn draw_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let selected = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let line = match (app.filter_column(), app.filter_value()) {
        (Some(column), value) => {
            let value = value
                .map(|v| v.to_string())
                .unwrap_or_else(|| "(no values)".to_string());
            Line::from(vec![
                Span::styled("Column ", label),
                Span::styled(format!("‹{}›", column), selected),
                Span::styled("  Value ", label),
                Span::styled(format!("‹{}›", value), selected),
                Span::styled(
                    format!(
                        "  {}/{} values, {} of {} rows",
                        app.values.len().min(app.value_idx + 1),
                        app.values.len(),
                        app.filtered.len(),
                        app.table.len()
                    ),
                    label,
                ),
            ])
        }
        (None, _) => Line::from(Span::styled("The sheet has no columns", label)),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.file_label()));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_grid(f: &mut Frame, app: &App, area: Rect) {
    let table = &app.filtered;
    let filter_col = app.column_idx;

    let widths: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            table
                .rows()
                .iter()
                .map(|row| row[idx].to_string().chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
                .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
        })
        .collect();

    let header_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let header = Row::new(table.columns().iter().enumerate().map(|(idx, name)| {
        let style = if idx == filter_col {
            header_style.add_modifier(Modifier::UNDERLINED)
        } else {
            header_style
        };
        Cell::from(name.clone()).style(style)
    }));

    let visible = area.height.saturating_sub(3) as usize;
    let rows = table
        .rows()
        .iter()
        .skip(app.row_offset)
        .take(visible)
        .map(|row| {
            Row::new(row.iter().map(|value| {
                if value.is_empty() {
                    Cell::from("·").style(Style::default().fg(Color::Red))
                } else {
                    Cell::from(value.to_string())
                }
            }))
        });

    let constraints = widths.iter().map(|w| Constraint::Length(*w as u16));
    let grid = Table::new(rows, constraints)
        .header(header)
        .column_spacing(GRID_COLUMN_SPACING)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Matching rows "),
        );
    f.render_widget(grid, area);
}

fn draw_missing_line(f: &mut Frame, app: &App, area: Rect) {
    let missing = app.missing_columns();
    if missing.is_empty() {
        return;
    }
    let text = format!(
        "Missing values in: {} (press f to fill)",
        missing.join(", ")
    );
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::Yellow),
    )));
    f.render_widget(paragraph, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help = match app.mode {
        Mode::Browse => {
            "←/→ column  ↑/↓ value  f fill  e edit  x export  r reload  q quit"
        }
        Mode::Form => "Tab/↓ next  Shift-Tab/↑ prev  Enter save  Esc cancel",
    };

    let status = if !app.status_message.is_empty() {
        app.status_message.clone()
    } else {
        help.to_string()
    };

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else if !app.status_message.is_empty() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    f.render_widget(Paragraph::new(Line::from(Span::styled(status, style))), area);
}

fn draw_form_modal(f: &mut Frame, form: &Form) {
    let area = centered_rect(70, 70, f.area());
    let modal_style = Style::default().fg(Color::White).bg(Color::Black);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(form.title())
        .border_style(Style::default().fg(Color::Green))
        .style(modal_style);

    let label_width = form
        .fields
        .iter()
        .map(|field| field.column.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let label = format!("{:>width$}: ", field.column, width = label_width);
            if idx == form.focus {
                let (before, after) = field.buffer.split_at(field.cursor);
                Line::from(vec![
                    Span::styled(label, Style::default().fg(Color::Cyan)),
                    Span::raw(before.to_string()),
                    Span::styled("│", Style::default().fg(Color::Yellow)),
                    Span::raw(after.to_string()),
                ])
            } else {
                Line::from(vec![
                    Span::styled(label, Style::default().fg(Color::DarkGray)),
                    Span::raw(field.buffer.clone()),
                ])
            }
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Enter to save, Esc to cancel",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Helper to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
