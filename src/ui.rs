use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, ListView, Screen},
    calendar::{PICKER_HEIGHT, PICKER_WIDTH},
    form::{Field, TaskForm},
    toast::{Toast, ToastKind},
};

const LIST_HELP: &str = "j/k move · space done · e edit · d delete · n new · r refresh · q quit";
const FORM_HELP: &str = "tab move · enter select · ctrl+s save · esc back";
const PICKER_HELP: &str = "arrows/hjkl day · pgup/pgdn month · t today · enter pick · esc close";
const TASK_PLACEHOLDER: &str = "e.g. Buy milk";
const FORM_WIDTH: u16 = 60;

/// Labels that differ between the create and edit flows.
struct FormCopy {
    title: &'static str,
    submit: &'static str,
    busy: &'static str,
}

const CREATE_COPY: FormCopy = FormCopy {
    title: "New Task",
    submit: "Create task",
    busy: "Creating...",
};

const EDIT_COPY: FormCopy = FormCopy {
    title: "Edit Task",
    submit: "Update task",
    busy: "Updating...",
};

pub fn draw<B: Backend>(frame: &mut Frame<B>, app: &mut App) {
    let size = frame.size();
    match &app.screen {
        Screen::List => draw_list(frame, size, &mut app.list, app.submitting),
        Screen::Create(form) => draw_form(frame, size, form, app.submitting, &CREATE_COPY),
        Screen::Edit { form, .. } => draw_form(frame, size, form, app.submitting, &EDIT_COPY),
        Screen::LoadingEdit(_) => {
            frame.render_widget(
                Paragraph::new("Loading task data...").alignment(Alignment::Center),
                centered_rect(60, 20, size),
            );
        }
    }
    if let Some(toast) = app.toaster.current() {
        draw_toast(frame, size, toast);
    }
}

fn draw_list<B: Backend>(frame: &mut Frame<B>, area: Rect, list: &mut ListView, submitting: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Todo List",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(Span::styled("(n) New task", Style::default().fg(Color::Green)))
            .alignment(Alignment::Right),
        chunks[1],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(LIST_HELP, Style::default().fg(Color::DarkGray))),
        chunks[3],
    );

    let body = chunks[2];
    if list.is_loading {
        frame.render_widget(Paragraph::new("Loading..."), body);
    } else if let Some(error) = &list.error {
        let message = Paragraph::new(Span::styled(error.clone(), Style::default().fg(Color::Red)))
            .wrap(Wrap { trim: true });
        if list.tasks.is_empty() {
            frame.render_widget(message, body);
        } else {
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(1)].as_ref())
                .split(body);
            frame.render_widget(message, parts[0]);
            draw_table(frame, parts[1], list);
        }
    } else if list.tasks.is_empty() {
        frame.render_widget(Paragraph::new("No tasks."), body);
    } else {
        draw_table(frame, body, list);
    }

    if list.pending_delete.is_some() {
        draw_confirm(frame, area, list, submitting);
    }
}

fn draw_table<B: Backend>(frame: &mut Frame<B>, area: Rect, list: &mut ListView) {
    let rows: Vec<Row> = list
        .tasks
        .iter()
        .map(|task| {
            let style = if task.is_completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(if task.is_completed { "[x]" } else { "[ ]" }),
                Cell::from(task.task.clone()).style(style),
                Cell::from(task.due_label()).style(style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(10),
        Constraint::Length(10),
    ];
    let table = Table::new(rows)
        .header(
            Row::new(vec!["", "Task", "Due"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL))
        .widths(&widths)
        .column_spacing(2)
        .highlight_style(Style::default().add_modifier(Modifier::ITALIC | Modifier::BOLD))
        .highlight_symbol(">>");

    frame.render_stateful_widget(table, area, &mut list.table_state);
}

fn draw_confirm<B: Backend>(frame: &mut Frame<B>, area: Rect, list: &ListView, submitting: bool) {
    let target = list
        .pending_task()
        .map(|task| task.task.clone())
        .unwrap_or_default();
    let footer = if submitting {
        Line::from(Span::styled("Deleting...", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(vec![
            Span::styled("(y) Delete", Style::default().fg(Color::LightRed)),
            Span::raw("   "),
            Span::raw("(n) Cancel"),
        ])
    };
    let body = vec![
        Line::from(Span::styled(
            "Are you sure?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("This cannot be undone. The task will be permanently deleted."),
        Line::from(Span::styled(
            format!("\"{target}\""),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
        footer,
    ];
    let dialog = Paragraph::new(body)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(
                    "Delete task",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );

    let dialog_area = centered_rect(60, 40, area);
    frame.render_widget(Clear, dialog_area);
    frame.render_widget(dialog, dialog_area);
}

fn draw_form<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    form: &TaskForm,
    submitting: bool,
    copy: &FormCopy,
) {
    let width = area.width.min(FORM_WIDTH);
    let column = Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(fields_height(form)),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(column);

    frame.render_widget(
        Paragraph::new(Span::styled(
            copy.title,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        chunks[0],
    );

    let submit_label = if submitting { copy.busy } else { copy.submit };
    frame.render_widget(
        button(submit_label, form.focus == Field::Submit, submitting),
        chunks[2],
    );
    frame.render_widget(
        button("Back to list", form.focus == Field::Back, submitting),
        chunks[3],
    );
    let help = if form.picker.is_some() { PICKER_HELP } else { FORM_HELP };
    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        chunks[5],
    );

    // drawn last so the date popover covers the buttons
    render_fields(frame, chunks[1], form, submitting);
}

fn fields_height(form: &TaskForm) -> u16 {
    // task input + error line + date trigger (+ checkbox)
    3 + 1 + 3 + u16::from(form.show_completed)
}

/// Renders the task, due-date and (optionally) completed inputs of a form.
/// Pure over the form state and the in-flight flag.
pub fn render_fields<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    form: &TaskForm,
    submitting: bool,
) {
    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(3),
    ];
    if form.show_completed {
        constraints.push(Constraint::Length(1));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let task_focused = form.focus == Field::Task && form.picker.is_none();
    let task_text = if form.values.task.is_empty() {
        Span::styled(TASK_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(form.values.task.clone(), input_style(submitting))
    };
    // one column stays free for the cursor after the last glyph
    let visible = chunks[0].width.saturating_sub(3);
    let typed = u16::try_from(form.values.task.width()).unwrap_or(u16::MAX);
    let offset = typed.saturating_sub(visible);
    frame.render_widget(
        Paragraph::new(task_text)
            .scroll((0, offset))
            .block(field_block("Task", task_focused, submitting)),
        chunks[0],
    );
    if task_focused && !submitting {
        frame.set_cursor(chunks[0].x + 1 + typed - offset, chunks[0].y + 1);
    }

    if let Some(message) = form.task_error {
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::Red))),
            chunks[1],
        );
    }

    let date_style = if form.values.due_date.is_some() {
        input_style(submitting)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(form.due_label(), date_style)).block(
            field_block(
                "Due date (optional)",
                form.focus == Field::DueDate,
                submitting,
            ),
        ),
        chunks[2],
    );

    if form.show_completed {
        let mark = if form.values.is_completed { "[x]" } else { "[ ]" };
        let mut style = input_style(submitting);
        if form.focus == Field::Completed {
            style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        frame.render_widget(
            Paragraph::new(Span::styled(format!("{mark} Mark as completed"), style)),
            chunks[3],
        );
    }

    if let Some(picker) = &form.picker {
        let anchor = chunks[2];
        let popover = Rect::new(
            anchor.x,
            anchor.bottom(),
            PICKER_WIDTH,
            PICKER_HEIGHT,
        )
        .intersection(frame.size());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popover);
        frame.render_widget(Clear, popover);
        frame.render_widget(block, popover);
        frame.render_widget(picker, inner);
    }
}

fn input_style(disabled: bool) -> Style {
    if disabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}

fn field_block(title: &str, focused: bool, disabled: bool) -> Block<'_> {
    let border = match (focused, disabled) {
        (_, true) => Style::default().fg(Color::DarkGray),
        (true, false) => Style::default().fg(Color::Cyan),
        (false, false) => Style::default(),
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
}

fn button(label: &str, focused: bool, disabled: bool) -> Paragraph<'_> {
    let style = match (focused, disabled) {
        (_, true) => Style::default().fg(Color::DarkGray),
        (true, false) => Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        (false, false) => Style::default(),
    };
    Paragraph::new(Span::styled(label, style))
        .alignment(Alignment::Center)
        .block(field_block("", focused, disabled))
}

fn draw_toast<B: Backend>(frame: &mut Frame<B>, area: Rect, toast: &Toast) {
    let color = match toast.kind {
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
    };
    let width = area.width.min(50);
    let toast_area = Rect::new(area.right() - width, area.y, width, 4.min(area.height));
    let widget = Paragraph::new(toast.description.clone())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(
                    toast.title(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(Clear, toast_area);
    frame.render_widget(widget, toast_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
