use crate::app::{App, Flow, Mode, Selection};
use crate::clock::Clock;
use crate::event::EventQueue;
use crate::form::{FieldValue, FormField, TaskForm};
use crate::model::{format_slot_range, format_time_range, Task};
use crate::storage::TaskStore;
use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use std::io::{stdout, Stdout};
use std::time::Duration;

const REDRAW_INTERVAL: Duration = Duration::from_millis(200);

pub fn run<S: TaskStore, C: Clock>(app: &mut App<S, C>, tick_interval: Duration) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(app, &mut terminal, tick_interval);
    teardown_terminal(&mut terminal)?;
    result
}

fn event_loop<S: TaskStore, C: Clock>(
    app: &mut App<S, C>,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    tick_interval: Duration,
) -> Result<()> {
    let events = EventQueue::start(tick_interval);
    loop {
        terminal.draw(|f| draw(f, app))?;
        if let Some(event) = events.next(REDRAW_INTERVAL)? {
            if app.handle_event(event) == Flow::Quit {
                break;
            }
        }
    }
    Ok(())
}

pub fn draw<S: TaskStore, C: Clock>(f: &mut Frame<'_>, app: &App<S, C>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(f.size());

    draw_header(f, app, layout[0]);
    draw_slots(f, app, layout[1]);
    draw_footer(f, app, layout[2]);

    if let Mode::Creating(form) = app.mode() {
        draw_form(f, form);
    }
}

fn draw_header<S: TaskStore, C: Clock>(f: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let mut spans = vec![Span::styled(
        format!("📅 {}", app.date().format("%A, %B %-d, %Y")),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if app.is_today() {
        spans.push(Span::raw("  •  "));
        spans.push(Span::styled("today", Style::default().fg(Color::Green)));
    }
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(paragraph, area);
}

fn draw_slots<S: TaskStore, C: Clock>(f: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let selection = match app.mode() {
        Mode::Selecting(sel) => Some(*sel),
        _ => None,
    };
    let highlight_now = app.is_today();

    let mut lines = Vec::new();
    let visible = app.viewport().rows();
    for (idx, slot) in app.grid().iter().filter(|(idx, _)| visible.contains(idx)) {
        let label = format!(" {} ", format_time_range(slot.start.time()));
        let style = if idx == app.cursor() {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else if highlight_now && idx == app.now_slot() {
            Style::default().bg(Color::Red).fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(label, style)));

        let selected = selection.filter(|_| idx == app.cursor());
        for (task_idx, task) in slot.tasks.iter().enumerate() {
            lines.push(task_line(task, task_idx, selected));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            "Schedule",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn task_line(task: &Task, idx: usize, selection: Option<Selection>) -> Line<'static> {
    let text = if task.done {
        format!("   ✓ {}", task.title)
    } else {
        format!("   • {} ({}m)", task.title, task.duration_minutes)
    };
    let mut style = Style::default().fg(if task.done {
        Color::DarkGray
    } else {
        Color::LightCyan
    });
    let mut spans = Vec::new();
    match selection {
        Some(sel) if sel.task_cursor == idx => {
            style = style.add_modifier(Modifier::REVERSED);
            spans.push(Span::styled(text, style));
            if sel.delete.is_pending() {
                spans.push(Span::styled(
                    "  press d again to delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ));
            }
        }
        _ => spans.push(Span::styled(text, style)),
    }
    Line::from(spans)
}

fn draw_footer<S: TaskStore, C: Clock>(f: &mut Frame<'_>, app: &App<S, C>, area: Rect) {
    let mut lines = vec![help_line(app.mode())];
    if let Some(message) = app.banner() {
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    let footer = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(footer, area);
}

fn help_line(mode: &Mode) -> Line<'static> {
    let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));
    let spans = match mode {
        Mode::Browsing => vec![
            key("↑↓", Color::LightCyan),
            Span::raw(" navigate  "),
            key("←→", Color::LightCyan),
            Span::raw(" change day  "),
            key("n", Color::LightMagenta),
            Span::raw(" new task  "),
            key("Enter", Color::LightYellow),
            Span::raw(" select  "),
            key("t", Color::LightGreen),
            Span::raw(" now  "),
            key("q", Color::LightRed),
            Span::raw(" quit"),
        ],
        Mode::Selecting(_) => vec![
            key("↑↓", Color::LightCyan),
            Span::raw(" choose task  "),
            key("d d", Color::LightRed),
            Span::raw(" delete  "),
            key("Esc", Color::LightYellow),
            Span::raw(" back"),
        ],
        Mode::Creating(_) => vec![
            key("Tab", Color::LightCyan),
            Span::raw(" switch field  "),
            key("Enter", Color::LightGreen),
            Span::raw(" save  "),
            key("Esc", Color::LightRed),
            Span::raw(" cancel"),
        ],
    };
    Line::from(spans)
}

fn draw_form(f: &mut Frame<'_>, form: &TaskForm) {
    let area = centered_rect(60, 50, f.size());
    let mut lines = vec![
        Line::from(Span::styled(
            format!("New Task at {}", format_slot_range(form.slot)),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field_line("Title", "Task title", &form.title, form.field == FormField::Title),
        field_line(
            "Duration",
            "minutes (default 30)",
            &form.duration,
            form.field == FormField::Duration,
        ),
        Line::from(""),
    ];
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::LightRed),
        )));
    }
    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    "New Task",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn field_line(
    label: &str,
    placeholder: &'static str,
    field: &FieldValue,
    active: bool,
) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value = if active {
        Span::styled(field.with_caret(), Style::default().fg(Color::Cyan))
    } else if field.value().is_empty() {
        Span::styled(placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(field.value().to_string(), Style::default().fg(Color::White))
    };
    Line::from(vec![Span::styled(format!("{}: ", label), label_style), value])
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
