//! Arena screen - hosts one mounted game through the attempt lifecycle.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use strum::IntoEnumIterator;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::tui::PortalContext;
use crate::tui::screen::{Screen, ScreenTransition};
use crate::tui::screens::centered_rect;
use puzzle_arena::{
    Arena, ArenaPhase, AttemptOutcome, AttemptTimer, CellAccent, Direction, GameView, InputMode,
    MAX_TIER, OutcomeTag, PlayerInput, Topic, TriviaQuestion, ViewBody,
};

/// Attempt clock period: ten ticks per second.
const TICK_PERIOD: Duration = Duration::from_millis(100);

/// State for the arena screen.
#[derive(Debug)]
pub struct ArenaScreen {
    arena: Arena,
    timer: AttemptTimer,
    input_buffer: String,
    choice: usize,
    cursor: (usize, usize),
    advice: Option<String>,
    solution: Option<String>,
    recorded: bool,
    advice_tx: mpsc::UnboundedSender<String>,
    advice_rx: mpsc::UnboundedReceiver<String>,
    oracle_tx: mpsc::UnboundedSender<TriviaQuestion>,
    oracle_rx: mpsc::UnboundedReceiver<TriviaQuestion>,
}

impl ArenaScreen {
    /// Mounts the given game, or `None` for an unknown id.
    #[instrument(skip(ctx))]
    pub fn mount(game_id: &'static str, level: u32, ctx: &mut PortalContext) -> Option<Self> {
        let definition = ctx.registry.get(game_id)?.clone();
        // The briefing shows once per session, and only before any level
        // has been cleared.
        let briefing =
            ctx.progress.get(game_id).unlocked_levels == 1 && !ctx.briefed.contains(game_id);
        if briefing {
            ctx.briefed.insert(game_id);
        }
        let arena = Arena::new(&definition, level, briefing, &mut ctx.rng);
        let (advice_tx, advice_rx) = mpsc::unbounded_channel();
        let (oracle_tx, oracle_rx) = mpsc::unbounded_channel();
        let mut screen = Self {
            arena,
            timer: AttemptTimer::start(TICK_PERIOD),
            input_buffer: String::new(),
            choice: 0,
            cursor: (0, 0),
            advice: None,
            solution: None,
            recorded: false,
            advice_tx,
            advice_rx,
            oracle_tx,
            oracle_rx,
        };
        screen.request_trivia(ctx);
        Some(screen)
    }

    /// Drains timers and async deliveries. Called once per frame.
    pub fn pump(&mut self, ctx: &mut PortalContext) {
        for _ in 0..self.timer.drain() {
            if let Some(outcome) = self.arena.tick(&mut ctx.rng) {
                self.on_outcome(outcome, ctx);
            }
        }
        while let Ok(question) = self.oracle_rx.try_recv() {
            if let Some(outcome) = self.arena.input(PlayerInput::Oracle(question), &mut ctx.rng) {
                self.on_outcome(outcome, ctx);
            }
        }
        while let Ok(advice) = self.advice_rx.try_recv() {
            self.advice = Some(advice);
        }
    }

    /// Kicks off a background trivia fetch for games that consume one.
    fn request_trivia(&mut self, ctx: &mut PortalContext) {
        if self.arena.definition().id() != "nebula_trivia" {
            return;
        }
        use rand::seq::IteratorRandom;
        let topic = Topic::iter()
            .choose(&mut ctx.rng)
            .unwrap_or(Topic::Space);
        let coach = ctx.coach.clone();
        let level = self.arena.level();
        let tx = self.oracle_tx.clone();
        debug!(?topic, level, "Requesting trivia question");
        tokio::spawn(async move {
            let question = coach.trivia(topic, level).await;
            let _ = tx.send(question);
        });
    }

    fn on_outcome(&mut self, outcome: AttemptOutcome, ctx: &mut PortalContext) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        let definition = self.arena.definition().clone();
        info!(
            game_id = definition.id(),
            score = outcome.score,
            success = outcome.success,
            "Attempt resolved"
        );
        if outcome.success {
            ctx.progress
                .complete_level(definition.id(), self.arena.level(), outcome.score);
        } else {
            self.solution = self.arena.solution();
        }
        let coach = ctx.coach.clone();
        let level = self.arena.level();
        let tag = if outcome.success {
            OutcomeTag::Win
        } else {
            OutcomeTag::Loss
        };
        let tx = self.advice_tx.clone();
        tokio::spawn(async move {
            let advice = coach.advice(definition.name(), level, tag).await;
            let _ = tx.send(advice);
        });
    }

    /// Resets transient per-attempt state and restarts the clock.
    fn fresh_attempt(&mut self, ctx: &mut PortalContext) {
        self.timer = AttemptTimer::start(TICK_PERIOD);
        self.input_buffer.clear();
        self.choice = 0;
        self.cursor = (0, 0);
        self.advice = None;
        self.solution = None;
        self.recorded = false;
        self.request_trivia(ctx);
    }

    fn retry(&mut self, ctx: &mut PortalContext) {
        self.arena.retry(&mut ctx.rng);
        self.fresh_attempt(ctx);
    }

    fn advance(&mut self, ctx: &mut PortalContext) {
        let next = self.arena.level() + 1;
        let frontier = ctx.progress.get(self.arena.definition().id()).unlocked_levels;
        if next <= frontier && next <= MAX_TIER {
            self.arena.advance(next, &mut ctx.rng);
            self.fresh_attempt(ctx);
        }
    }

    fn send(&mut self, input: PlayerInput, ctx: &mut PortalContext) {
        if let Some(outcome) = self.arena.input(input, &mut ctx.rng) {
            self.on_outcome(outcome, ctx);
        }
    }

    fn handle_active_key(&mut self, key: KeyEvent, view: &GameView, ctx: &mut PortalContext) {
        match view.input {
            InputMode::Text => match key.code {
                KeyCode::Char(c) => self.input_buffer.push(c),
                KeyCode::Backspace => {
                    self.input_buffer.pop();
                }
                KeyCode::Enter => {
                    let text = std::mem::take(&mut self.input_buffer);
                    self.send(PlayerInput::Submit(text), ctx);
                }
                _ => {}
            },
            InputMode::Choices(count) => match key.code {
                KeyCode::Up => {
                    self.choice = self.choice.checked_sub(1).unwrap_or(count.max(1) - 1)
                }
                KeyCode::Down => self.choice = (self.choice + 1) % count.max(1),
                KeyCode::Enter => self.send(PlayerInput::Choose(self.choice), ctx),
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    let picked = c.to_digit(10).unwrap_or(0) as usize;
                    if (1..=count).contains(&picked) {
                        self.send(PlayerInput::Choose(picked - 1), ctx);
                    }
                }
                _ => {}
            },
            InputMode::Grid { width, height } => match key.code {
                KeyCode::Up => self.cursor.0 = self.cursor.0.saturating_sub(1),
                KeyCode::Down => self.cursor.0 = (self.cursor.0 + 1).min(height - 1),
                KeyCode::Left => self.cursor.1 = self.cursor.1.saturating_sub(1),
                KeyCode::Right => self.cursor.1 = (self.cursor.1 + 1).min(width - 1),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    let cell = self.cursor.0 * width + self.cursor.1;
                    self.send(PlayerInput::Choose(cell), ctx);
                }
                _ => {}
            },
            InputMode::Moves => {
                let direction = match key.code {
                    KeyCode::Up => Some(Direction::Up),
                    KeyCode::Down => Some(Direction::Down),
                    KeyCode::Left => Some(Direction::Left),
                    KeyCode::Right => Some(Direction::Right),
                    _ => None,
                };
                if let Some(direction) = direction {
                    self.send(PlayerInput::Move(direction), ctx);
                }
            }
            InputMode::Locked => {}
        }
    }

    fn accent_style(accent: CellAccent) -> Style {
        match accent {
            CellAccent::Normal => Style::default(),
            CellAccent::Active => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            CellAccent::Good => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            CellAccent::Bad => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            CellAccent::Dim => Style::default().fg(Color::DarkGray),
        }
    }

    fn body_lines(&self, view: &GameView) -> Vec<Line<'static>> {
        match &view.body {
            ViewBody::Lines(lines) => lines.iter().map(|l| Line::from(l.clone())).collect(),
            ViewBody::Grid { width, cells } => {
                let cell_width = cells.iter().map(|c| c.label.len()).max().unwrap_or(1);
                cells
                    .chunks(*width)
                    .enumerate()
                    .map(|(row, chunk)| {
                        let mut spans = Vec::new();
                        for (col, cell) in chunk.iter().enumerate() {
                            let mut style = Self::accent_style(cell.accent);
                            if matches!(view.input, InputMode::Grid { .. })
                                && self.cursor == (row, col)
                            {
                                style = style.bg(Color::Blue);
                            }
                            spans.push(Span::styled(
                                format!(" {:^cell_width$} ", cell.label),
                                style,
                            ));
                        }
                        Line::from(spans)
                    })
                    .collect()
            }
        }
    }

    fn overlay_lines(&self) -> Option<Vec<Line<'static>>> {
        let outcome = self.arena.outcome()?;
        let mut lines = vec![
            if outcome.success {
                Line::from(Span::styled(
                    format!("LEVEL CLEARED  +{}", outcome.score),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    format!("ATTEMPT FAILED  {} pts", outcome.score),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ))
            },
            Line::from(""),
        ];
        if let Some(solution) = &self.solution {
            lines.push(Line::from(Span::styled(
                format!("Solution: {solution}"),
                Style::default().fg(Color::Yellow),
            )));
            lines.push(Line::from(""));
        }
        match &self.advice {
            Some(advice) => lines.push(Line::from(format!("Coach: {advice}"))),
            None => lines.push(Line::from(Span::styled(
                "Coach is thinking...",
                Style::default().fg(Color::DarkGray),
            ))),
        }
        lines.push(Line::from(""));
        let hints = if outcome.success {
            "r retry   n next level   esc back"
        } else {
            "r retry   esc back"
        };
        lines.push(Line::from(Span::styled(
            hints,
            Style::default().fg(Color::DarkGray),
        )));
        Some(lines)
    }
}

impl Screen for ArenaScreen {
    #[instrument(skip(self, frame, ctx))]
    fn render(&self, frame: &mut Frame, ctx: &PortalContext) {
        let view = self.arena.view();
        let area = frame.area();
        let rows = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        let definition = self.arena.definition();
        let progress = ctx.progress.get(definition.id());
        let header = Paragraph::new(format!(
            "{}  -  level {}/{MAX_TIER}  -  {}s  -  best {}",
            definition.name(),
            self.arena.level(),
            self.arena.elapsed_seconds(),
            progress.high_score
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, rows[0]);

        let mut lines = self.body_lines(&view);
        if !view.choices.is_empty() {
            lines.push(Line::from(""));
            for (i, choice) in view.choices.iter().enumerate() {
                let marker = if i == self.choice { "> " } else { "  " };
                let style = if i == self.choice {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(Span::styled(
                    format!("{marker}{}. {choice}", i + 1),
                    style,
                )));
            }
        }
        if view.input == InputMode::Text {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("> {}_", self.input_buffer),
                Style::default().fg(Color::Yellow),
            )));
        }
        let body = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(view.status.clone()));
        frame.render_widget(body, rows[1]);

        let footer_text = match self.arena.feedback() {
            Some(feedback) => feedback.to_string(),
            None => "esc give up / back".to_string(),
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, rows[2]);

        if self.arena.phase() == ArenaPhase::Briefing {
            let overlay = centered_rect(60, 40, area);
            frame.render_widget(Clear, overlay);
            let briefing = Paragraph::new(vec![
                Line::from(self.arena.briefing_text()),
                Line::from(""),
                Line::from(Span::styled(
                    "Press enter to start",
                    Style::default().fg(Color::Yellow),
                )),
            ])
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(definition.name()),
            );
            frame.render_widget(briefing, overlay);
        } else if let Some(lines) = self.overlay_lines() {
            let overlay = centered_rect(70, 50, area);
            frame.render_widget(Clear, overlay);
            let result = Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Result"));
            frame.render_widget(result, overlay);
        }
    }

    #[instrument(skip(self, ctx))]
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PortalContext) -> ScreenTransition {
        match self.arena.phase() {
            ArenaPhase::Briefing => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.arena.begin();
                    ScreenTransition::Stay
                }
                KeyCode::Esc => ScreenTransition::GoToPortal,
                _ => ScreenTransition::Stay,
            },
            ArenaPhase::Active => match key.code {
                KeyCode::Esc => {
                    // Walking out counts as a loss.
                    if let Some(outcome) = self.arena.give_up() {
                        self.on_outcome(outcome, ctx);
                    }
                    ScreenTransition::Stay
                }
                _ => {
                    let view = self.arena.view();
                    self.handle_active_key(key, &view, ctx);
                    ScreenTransition::Stay
                }
            },
            ArenaPhase::Won => match key.code {
                KeyCode::Char('r') => {
                    self.retry(ctx);
                    ScreenTransition::Stay
                }
                KeyCode::Char('n') | KeyCode::Enter => {
                    self.advance(ctx);
                    ScreenTransition::Stay
                }
                KeyCode::Esc | KeyCode::Char('q') => ScreenTransition::GoToPortal,
                _ => ScreenTransition::Stay,
            },
            ArenaPhase::Lost => match key.code {
                KeyCode::Char('r') => {
                    self.retry(ctx);
                    ScreenTransition::Stay
                }
                KeyCode::Esc | KeyCode::Char('q') => ScreenTransition::GoToPortal,
                _ => ScreenTransition::Stay,
            },
        }
    }
}
