use std::io;
use std::time::Duration;

use crate::quiz::{Effect, QuizApi, QuizEvent, QuizSession, QuizState};
use crate::tui::Theme;
use crate::utils::strip_controls_and_escapes;

use anyhow::{Context, Result};
use crossterm::event::KeyModifiers;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tokio::sync::mpsc;

const LOADING_TEXT: &str = "Отримуємо запитання...";
const RETRY_LABEL: &str = "Спробувати ще раз";
const START_LABEL: &str = "Почати опитування";
const START_AGAIN_LABEL: &str = "Пройти це опитування знову";
const FINISHED_TEXT: &str = "Опитування завершено!";
const VERDICT_HEADER: &str = "Вердикт ШІ";
const AWAITING_VERDICT_TEXT: &str = "Отримуємо вердикт від ШІ...";
const NEXT_LABEL: &str = "Далі";
const EXIT_LABEL: &str = " вийти";

pub async fn run(api: QuizApi) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;
    terminal.hide_cursor().context("failed to hide cursor")?;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut runner = QuizRunner::start(api, events_tx);

    let loop_result: Result<()> = async {
        loop {
            while let Ok(update) = events_rx.try_recv() {
                runner.dispatch(update);
            }

            terminal
                .draw(|frame| {
                    let area = frame.area();
                    frame.render_widget(Theme::backdrop(), area);
                    let chunks = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Min(5), Constraint::Length(4)])
                        .split(area);

                    let (title, body) = screen(runner.state());
                    let screen_widget = Paragraph::new(body)
                        .block(Theme::panel_with_line(title))
                        .wrap(Wrap { trim: false });
                    frame.render_widget(screen_widget, chunks[0]);

                    let footer = Paragraph::new(controls(runner.state()))
                        .block(Theme::panel_with_line(Theme::section_header("Керування")));
                    frame.render_widget(footer, chunks[1]);
                })
                .context("failed to render frame")?;

            if event::poll(Duration::from_millis(16))?
                && let Event::Key(key) = event::read()?
            {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if key.code == KeyCode::Esc
                    || (key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL))
                {
                    break Ok(());
                }

                if let Some(event) = key_to_event(runner.state(), key.code) {
                    runner.dispatch(event);
                }
            }
        }
    }
    .await;

    teardown_terminal(&mut terminal)?;

    loop_result
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

/// Owns the current state and turns reducer effects into background tasks
/// whose outcomes come back as events on `events`.
struct QuizRunner {
    api: QuizApi,
    state: QuizState,
    events: mpsc::UnboundedSender<QuizEvent>,
}

impl QuizRunner {
    fn start(api: QuizApi, events: mpsc::UnboundedSender<QuizEvent>) -> Self {
        let (state, effects) = QuizState::initial();
        let runner = Self { api, state, events };
        runner.perform(effects);
        runner
    }

    fn state(&self) -> &QuizState {
        &self.state
    }

    fn dispatch(&mut self, event: QuizEvent) {
        let current = std::mem::replace(&mut self.state, QuizState::Loading);
        let (next, effects) = current.update(event);
        self.state = next;
        self.perform(effects);
    }

    fn perform(&self, effects: Vec<Effect>) {
        for effect in effects {
            let events = self.events.clone();
            match effect {
                Effect::FetchQuestions => {
                    let api = self.api.clone();
                    tokio::spawn(async move {
                        let event = match api.fetch_questions().await {
                            Ok(set) => QuizEvent::QuestionsLoaded(set),
                            Err(err) => QuizEvent::QuestionsFailed(err.to_string()),
                        };
                        let _ = events.send(event);
                    });
                }
                Effect::ScheduleAdvance(delay) => {
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = events.send(QuizEvent::Advance);
                    });
                }
                Effect::RequestVerdict(answers) => {
                    let api = self.api.clone();
                    tokio::spawn(async move {
                        let event = match api.request_verdict(answers).await {
                            Ok(verdict) => QuizEvent::VerdictReceived(verdict),
                            Err(_) => QuizEvent::VerdictFailed,
                        };
                        let _ = events.send(event);
                    });
                }
            }
        }
    }
}

fn key_to_event(state: &QuizState, code: KeyCode) -> Option<QuizEvent> {
    match state {
        QuizState::LoadFailed { .. } => match code {
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') => Some(QuizEvent::Retry),
            _ => None,
        },
        QuizState::Idle { .. } | QuizState::Done { .. } => match code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(QuizEvent::Start),
            _ => None,
        },
        QuizState::InProgress(session) => {
            let option_count = session.current_question()?.options.len();
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(QuizEvent::SubmitAnswer),
                KeyCode::Up => {
                    let idx = match session.selected_index() {
                        Some(0) | None => option_count.checked_sub(1)?,
                        Some(idx) => idx - 1,
                    };
                    Some(QuizEvent::Select(idx))
                }
                KeyCode::Down => {
                    let idx = match session.selected_index() {
                        Some(idx) if idx + 1 < option_count => idx + 1,
                        _ => 0,
                    };
                    Some(QuizEvent::Select(idx))
                }
                KeyCode::Char(c) => {
                    let digit = c.to_digit(10)? as usize;
                    digit.checked_sub(1).map(QuizEvent::Select)
                }
                _ => None,
            }
        }
        QuizState::Loading | QuizState::AwaitingVerdict(_) => None,
    }
}

fn screen(state: &QuizState) -> (Line<'static>, Vec<Line<'static>>) {
    match state {
        QuizState::Loading => (
            Theme::title_line("careerquiz"),
            vec![Line::from(Theme::span(LOADING_TEXT))],
        ),
        QuizState::LoadFailed { message } => (
            Theme::title_line("careerquiz"),
            vec![Line::from(Span::styled(
                clean(message),
                Theme::danger(),
            ))],
        ),
        QuizState::Idle { questions } => (
            Theme::title_line("careerquiz"),
            vec![Line::from(Theme::span(format!(
                "Готово запитань: {}",
                questions.len()
            )))],
        ),
        QuizState::InProgress(session) => question_screen(session),
        QuizState::AwaitingVerdict(_) => (
            Theme::title_line(FINISHED_TEXT),
            vec![Theme::section_header(AWAITING_VERDICT_TEXT)],
        ),
        QuizState::Done { verdict, .. } => {
            let mut body = vec![Theme::section_header(VERDICT_HEADER), Line::default()];
            body.extend(clean(verdict).lines().map(|line| Line::from(line.to_string())));
            (Theme::title_line(FINISHED_TEXT), body)
        }
    }
}

fn question_screen(session: &QuizSession) -> (Line<'static>, Vec<Line<'static>>) {
    let total = session.questions().len();
    let title = Theme::title_line(format!("Запитання №{}/{}", session.index() + 1, total));
    let Some(question) = session.current_question() else {
        return (title, Vec::new());
    };

    let mut body = vec![Theme::section_header(clean(&question.text)), Line::default()];
    for (idx, option) in question.options.iter().enumerate() {
        let selected = session.selected_index() == Some(idx);
        let marker = if selected { "(•)" } else { "( )" };
        let text = format!("{marker} {}. {}", idx + 1, clean(option));
        body.push(if selected {
            Line::from(Span::styled(text, Theme::selected()))
        } else {
            Line::from(Theme::span(text))
        });
    }
    (title, body)
}

fn controls(state: &QuizState) -> Vec<Line<'static>> {
    let mut line = match state {
        QuizState::LoadFailed { .. } => vec![
            Theme::key_chip("Enter"),
            Theme::span(format!(" {RETRY_LABEL}")),
            Theme::bullet(),
        ],
        QuizState::Idle { .. } => vec![
            Theme::key_chip("Enter"),
            Theme::span(format!(" {START_LABEL}")),
            Theme::bullet(),
        ],
        QuizState::Done { .. } => vec![
            Theme::key_chip("Enter"),
            Theme::span(format!(" {START_AGAIN_LABEL}")),
            Theme::bullet(),
        ],
        QuizState::InProgress(session) => {
            let submit = if session.can_submit() {
                Theme::key_chip("Enter")
            } else {
                Theme::disabled_chip("Enter")
            };
            vec![
                Theme::key_chip("↑/↓"),
                Theme::span(" / "),
                Theme::key_chip("1-4"),
                Theme::span(" обрати"),
                Theme::bullet(),
                submit,
                Theme::span(format!(" {NEXT_LABEL}")),
                Theme::bullet(),
            ]
        }
        QuizState::Loading | QuizState::AwaitingVerdict(_) => Vec::new(),
    };

    line.extend([
        Theme::key_chip("Esc"),
        Theme::span(" / "),
        Theme::key_chip("Ctrl+C"),
        Theme::span(EXIT_LABEL),
    ]);
    vec![Line::from(line)]
}

fn clean(text: &str) -> String {
    strip_controls_and_escapes(text)
}
