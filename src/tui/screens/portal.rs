//! Game selection screen - tiered catalog with progress and level picker.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use tracing::{debug, info, instrument};

use crate::tui::PortalContext;
use crate::tui::screen::{Screen, ScreenTransition};
use crate::tui::screens::centered_rect;
use puzzle_arena::{GameDefinition, MAX_TIER};

/// One row of the sidebar.
#[derive(Debug, Clone)]
enum Entry {
    Header(String),
    Game(GameDefinition),
}

/// State for the game selection screen.
#[derive(Debug)]
pub struct PortalScreen {
    entries: Vec<Entry>,
    /// Indices into `entries` that are games, in display order.
    game_rows: Vec<usize>,
    selected: usize,
    /// Level picked for the selected game; `None` means the frontier.
    chosen_level: Option<u32>,
    confirm_reset: bool,
}

impl PortalScreen {
    /// Creates the screen from the registered catalog.
    #[instrument(skip(ctx))]
    pub fn new(ctx: &PortalContext) -> Self {
        let mut entries = Vec::new();
        let mut game_rows = Vec::new();
        for (category, games) in ctx.registry.grouped() {
            entries.push(Entry::Header(category.to_string()));
            for def in games {
                game_rows.push(entries.len());
                entries.push(Entry::Game(def.clone()));
            }
        }
        debug!(games = game_rows.len(), "Portal screen built");
        Self {
            entries,
            game_rows,
            selected: 0,
            chosen_level: None,
            confirm_reset: false,
        }
    }

    fn selected_game(&self) -> Option<&GameDefinition> {
        let row = *self.game_rows.get(self.selected)?;
        match &self.entries[row] {
            Entry::Game(def) => Some(def),
            Entry::Header(_) => None,
        }
    }

    /// The level the player will attempt: the picked one, clamped to the
    /// frontier, or the frontier itself.
    fn level_for(&self, ctx: &PortalContext, def: &GameDefinition) -> u32 {
        let frontier = ctx.progress.get(def.id()).unlocked_levels;
        self.chosen_level.unwrap_or(frontier).min(frontier).max(1)
    }

    fn select_previous(&mut self) {
        self.selected = match self.selected {
            0 => self.game_rows.len() - 1,
            i => i - 1,
        };
        self.chosen_level = None;
    }

    fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.game_rows.len();
        self.chosen_level = None;
    }
}

impl Screen for PortalScreen {
    #[instrument(skip(self, frame, ctx))]
    fn render(&self, frame: &mut Frame, ctx: &PortalContext) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        let title = Paragraph::new("Puzzle Arena")
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, rows[0]);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(rows[1]);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(row, entry)| match entry {
                Entry::Header(name) => ListItem::new(Line::from(Span::styled(
                    format!("- {name} -"),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                ))),
                Entry::Game(def) => {
                    let progress = ctx.progress.get(def.id());
                    let is_selected = self.game_rows.get(self.selected) == Some(&row);
                    let style = if is_selected {
                        Style::default()
                            .fg(Color::Black)
                            .bg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(Line::from(Span::styled(
                        format!(
                            " {:<18} Lv {:>2}/{MAX_TIER}",
                            def.name(),
                            progress.unlocked_levels
                        ),
                        style,
                    )))
                }
            })
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Games"));
        frame.render_widget(list, panes[0]);

        let detail = match self.selected_game() {
            Some(def) => {
                let progress = ctx.progress.get(def.id());
                let level = self.level_for(ctx, def);
                vec![
                    Line::from(Span::styled(
                        def.name(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )),
                    Line::from(def.description()),
                    Line::from(""),
                    Line::from(format!("Tier:       {}", def.category())),
                    Line::from(format!(
                        "Unlocked:   level {}/{MAX_TIER}",
                        progress.unlocked_levels
                    )),
                    Line::from(format!("High score: {}", progress.high_score)),
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("Play level {level}  (left/right to change)"),
                        Style::default().fg(Color::Yellow),
                    )),
                ]
            }
            None => vec![Line::from("No games registered")],
        };
        let detail = Paragraph::new(detail)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Details"));
        frame.render_widget(detail, panes[1]);

        let footer = Paragraph::new("up/down select   enter play   r reset all   q quit")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, rows[2]);

        if self.confirm_reset {
            let overlay = centered_rect(50, 20, area);
            frame.render_widget(Clear, overlay);
            let prompt = Paragraph::new(vec![
                Line::from("Wipe every level and high score?"),
                Line::from(""),
                Line::from(Span::styled(
                    "y to confirm - any other key cancels",
                    Style::default().fg(Color::Red),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Reset progress"),
            );
            frame.render_widget(prompt, overlay);
        }
    }

    #[instrument(skip(self, ctx))]
    fn handle_key(&mut self, key: KeyEvent, ctx: &mut PortalContext) -> ScreenTransition {
        if self.confirm_reset {
            self.confirm_reset = false;
            if key.code == KeyCode::Char('y') {
                info!("Reset confirmed");
                ctx.progress.reset_all();
                self.chosen_level = None;
            }
            return ScreenTransition::Stay;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_previous();
                ScreenTransition::Stay
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                ScreenTransition::Stay
            }
            KeyCode::Left => {
                if let Some(def) = self.selected_game() {
                    let level = self.level_for(ctx, def);
                    self.chosen_level = Some(level.saturating_sub(1).max(1));
                }
                ScreenTransition::Stay
            }
            KeyCode::Right => {
                if let Some(def) = self.selected_game() {
                    let frontier = ctx.progress.get(def.id()).unlocked_levels;
                    let level = self.level_for(ctx, def);
                    self.chosen_level = Some((level + 1).min(frontier));
                }
                ScreenTransition::Stay
            }
            KeyCode::Enter => match self.selected_game() {
                Some(def) => ScreenTransition::GoToArena {
                    game_id: def.id(),
                    level: self.level_for(ctx, def),
                },
                None => ScreenTransition::Stay,
            },
            KeyCode::Char('r') => {
                self.confirm_reset = true;
                ScreenTransition::Stay
            }
            KeyCode::Char('q') | KeyCode::Esc => ScreenTransition::Quit,
            _ => ScreenTransition::Stay,
        }
    }
}
