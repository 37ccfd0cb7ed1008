use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{
  self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
  MouseEventKind,
};
use crossword_engine::Direction::{self, Across, Down};
use crossword_engine::{
  Arrow, CellStatus, ClueSpec, Difficulty, Error, Pos, Prefetcher, Puzzle, PuzzleDefinition,
  PuzzleSource, SquareStyle, Validation, WordRef,
};
use ratatui::{
  DefaultTerminal, Frame,
  buffer::Buffer,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::Line,
  widgets::{Block, Clear, Padding, Paragraph, Widget, Wrap},
};
use ratatui_macros::line;
use tracing::{error, info};

use crate::keys::{KeySequence, Secret};

const SQUARE_WIDTH: u16 = 7;
const SQUARE_HEIGHT: u16 = 3;
const STRIDE_X: u16 = SQUARE_WIDTH + 1;
const STRIDE_Y: u16 = SQUARE_HEIGHT + 1;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const HELP: &str =
  "arrows: move  space: turn  tab: next clue  /: type word  enter: check  esc: quit";

pub type Source = dyn PuzzleSource + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
  Solving,
  /// Typing a whole answer for the active word.
  FillPrompt,
  Solved,
}

#[derive(Debug, Default)]
struct Overlays {
  admin: bool,
  dev: bool,
  answers: bool,
}

pub struct App {
  puzzle: Puzzle,
  prefetcher: Prefetcher<Source>,
  level: u32,
  levels_per_tier: u32,
  mode: Mode,
  prompt: String,
  secrets: KeySequence,
  overlays: Overlays,
  last_check: Option<Validation>,
  status: String,
  waiting_for_next: bool,
  next_ready: bool,
  /// Set by the puzzle's redraw listener, and by the app for its own state.
  dirty: Rc<Cell<bool>>,
  /// Where the grid was last drawn, for mapping mouse clicks to squares.
  grid_area: Cell<Rect>,
  /// Inside of each clue list as last drawn, with its scroll offset. One clue per line.
  across_list: Cell<(Rect, u16)>,
  down_list: Cell<(Rect, u16)>,
  running: bool,
}

impl App {
  pub fn new(
    first: PuzzleDefinition,
    prefetcher: Prefetcher<Source>,
    levels_per_tier: u32,
  ) -> Result<Self, Error> {
    let mut puzzle = Puzzle::new(first)?;
    let dirty = Rc::new(Cell::new(true));
    let flag = Rc::clone(&dirty);
    puzzle.on_redraw(move || flag.set(true));
    puzzle.next_clue();

    let mut app = Self {
      puzzle,
      prefetcher,
      level: 1,
      levels_per_tier,
      mode: Mode::Solving,
      prompt: String::new(),
      secrets: KeySequence::default(),
      overlays: Overlays::default(),
      last_check: None,
      status: String::new(),
      waiting_for_next: false,
      next_ready: false,
      dirty,
      grid_area: Cell::new(Rect::default()),
      across_list: Cell::new((Rect::default(), 0)),
      down_list: Cell::new((Rect::default(), 0)),
      running: true,
    };
    app.status = format!("Level 1: {}", app.difficulty());
    app.prefetch_following();
    Ok(app)
  }

  pub fn run(mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
    self.running = true;
    while self.running {
      if self.dirty.replace(false) {
        terminal.draw(|frame| self.draw(frame))?;
      }
      if event::poll(POLL_INTERVAL)? {
        self.handle_crossterm_events()?;
      } else {
        self.tick();
      }
    }
    Ok(())
  }

  fn draw(&self, frame: &mut Frame) {
    frame.render_widget(self, frame.area());
  }

  fn invalidate(&self) {
    self.dirty.set(true);
  }

  fn difficulty(&self) -> Difficulty {
    Difficulty::for_level(self.level, self.levels_per_tier)
  }

  fn next_difficulty(&self) -> Difficulty {
    Difficulty::for_level(self.level + 1, self.levels_per_tier)
  }

  /// Starts fetching the puzzle for the level after this one.
  fn prefetch_following(&mut self) {
    let next = self.next_difficulty();
    self.prefetcher.request(next);
  }

  /// Called whenever no input arrived within [POLL_INTERVAL].
  fn tick(&mut self) {
    if self.waiting_for_next {
      let difficulty = self.difficulty();
      if let Some(definition) = self.prefetcher.take(difficulty) {
        self.start_level(definition);
      } else if !self.prefetcher.is_in_flight() {
        // The last attempt gave up; keep trying while the player waits.
        self.prefetcher.request(difficulty);
      }
      return;
    }

    let next = self.next_difficulty();
    let ready = self.prefetcher.is_ready(next);
    if ready != self.next_ready {
      self.next_ready = ready;
      self.invalidate();
    }
  }

  fn next_level(&mut self) {
    if self.waiting_for_next {
      return;
    }
    self.level += 1;
    let difficulty = self.difficulty();
    info!(level = self.level, %difficulty, "advancing to next level");

    match self.prefetcher.take(difficulty) {
      Some(definition) => self.start_level(definition),
      None => {
        self.prefetcher.request(difficulty);
        self.waiting_for_next = true;
        self.status = format!("Fetching a {difficulty} puzzle for level {}...", self.level);
        self.invalidate();
      }
    }
  }

  fn start_level(&mut self, definition: PuzzleDefinition) {
    self.waiting_for_next = false;
    match self.puzzle.load(definition) {
      Ok(()) => {
        self.mode = Mode::Solving;
        self.prompt.clear();
        self.last_check = None;
        self.next_ready = false;
        self.puzzle.next_clue();
        self.status = format!("Level {}: {}", self.level, self.difficulty());
        self.prefetch_following();
      }
      Err(e) => {
        error!(error = %e, "could not load the next puzzle");
        self.level -= 1;
        self.status = format!("Could not load the next puzzle: {e}");
      }
    }
    self.invalidate();
  }

  /// Reads the crossterm events and updates the state of [`App`].
  fn handle_crossterm_events(&mut self) -> io::Result<()> {
    match event::read()? {
      // it's important to check KeyEventKind::Press to avoid handling key release events
      Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
      Event::Mouse(mouse) => self.on_mouse_event(mouse),
      Event::Resize(_, _) => self.invalidate(),
      _ => {}
    }
    Ok(())
  }

  /// Handles the key events and updates the state of [`App`].
  fn on_key_event(&mut self, key: KeyEvent) {
    if let (KeyModifiers::CONTROL, KeyCode::Char('c' | 'C')) = (key.modifiers, key.code) {
      return self.quit();
    }
    match self.mode {
      Mode::Solving => self.on_solving_key(key),
      Mode::FillPrompt => self.on_prompt_key(key),
      Mode::Solved => match key.code {
        KeyCode::Enter => self.next_level(),
        KeyCode::Esc => self.quit(),
        _ => {}
      },
    }
  }

  fn on_solving_key(&mut self, key: KeyEvent) {
    if let KeyCode::Char(c) = key.code {
      if self.secrets.is_armed() || matches!(c, '~' | '`') {
        if let Some(secret) = self.secrets.push(c) {
          self.apply_secret(secret);
        }
        return;
      }
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
      if key.code == KeyCode::Char('n') && self.overlays.admin {
        self.next_level();
      }
      return;
    }

    let cursor = self.puzzle.cursor().map(|c| c.pos);
    match key.code {
      KeyCode::Esc => {
        if self.secrets.is_armed() {
          self.secrets.reset();
        } else {
          self.quit();
        }
      }
      KeyCode::Up => {
        self.puzzle.arrow(Arrow::Up);
      }
      KeyCode::Down => {
        self.puzzle.arrow(Arrow::Down);
      }
      KeyCode::Left => {
        self.puzzle.arrow(Arrow::Left);
      }
      KeyCode::Right => {
        self.puzzle.arrow(Arrow::Right);
      }
      KeyCode::Tab => self.puzzle.next_clue(),
      KeyCode::BackTab => self.puzzle.previous_clue(),
      KeyCode::Enter => self.check(),
      KeyCode::Char(' ') => {
        if let Some(pos) = cursor {
          self.puzzle.focus(pos);
        }
      }
      KeyCode::Char('/') => {
        if self.puzzle.active_word().is_some() {
          self.mode = Mode::FillPrompt;
          self.prompt.clear();
          self.status.clear();
          self.invalidate();
        }
      }
      KeyCode::Char(c) => {
        if let Some(pos) = cursor {
          self.puzzle.enter_character(pos, c);
        }
      }
      KeyCode::Backspace => {
        if let Some(pos) = cursor {
          self.puzzle.backspace(pos);
        }
      }
      _ => {}
    }
  }

  fn on_prompt_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Solving;
        self.status.clear();
      }
      KeyCode::Enter => match self.puzzle.fill_active_word(&self.prompt) {
        Ok(()) => {
          self.mode = Mode::Solving;
          self.status.clear();
        }
        Err(Error::LengthMismatchError { expected, actual }) => {
          self.status = format!("That's {actual} letters; the answer has {expected}. Try again.");
        }
        Err(e) => self.status = e.to_string(),
      },
      KeyCode::Backspace => {
        self.prompt.pop();
      }
      KeyCode::Char(c) if c.is_ascii_alphabetic() => self.prompt.push(c.to_ascii_uppercase()),
      _ => {}
    }
    self.invalidate();
  }

  fn on_mouse_event(&mut self, mouse: MouseEvent) {
    if self.mode != Mode::Solving {
      return;
    }
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
      if let Some(pos) = self.square_at(mouse.column, mouse.row) {
        self.puzzle.focus(pos);
      } else if let Some(word) = self.clue_at(mouse.column, mouse.row) {
        if let Err(e) = self.puzzle.select_clue(word) {
          error!(error = %e, "could not select clicked clue");
        }
      }
    }
  }

  fn list_area(&self, direction: Direction) -> &Cell<(Rect, u16)> {
    match direction {
      Across => &self.across_list,
      Down => &self.down_list,
    }
  }

  /// The clue listed at the given terminal coordinates.
  fn clue_at(&self, x: u16, y: u16) -> Option<WordRef> {
    [Across, Down].into_iter().find_map(|direction| {
      let (area, scroll) = self.list_area(direction).get();
      if x < area.x || y < area.y || x >= area.right() || y >= area.bottom() {
        return None;
      }
      let index = usize::from(y - area.y) + usize::from(scroll);
      self
        .puzzle
        .definition()
        .clue_list(direction)
        .get(index)
        .map(ClueSpec::word_ref)
    })
  }

  /// The grid square drawn at the given terminal coordinates.
  fn square_at(&self, x: u16, y: u16) -> Option<Pos> {
    let area = self.grid_area.get();
    if x < area.x || y < area.y || x >= area.right() || y >= area.bottom() {
      return None;
    }
    let (dx, dy) = (x - area.x, y - area.y);
    if dx % STRIDE_X >= SQUARE_WIDTH || dy % STRIDE_Y >= SQUARE_HEIGHT {
      return None;
    }
    let pos = ((dy / STRIDE_Y) as usize, (dx / STRIDE_X) as usize);
    self.puzzle.grid().contains(pos).then_some(pos)
  }

  fn check(&mut self) {
    let validation = self.puzzle.check();
    if validation.is_complete() {
      self.mode = Mode::Solved;
      self.status = format!("Solved level {}!", self.level);
    } else {
      self.status = "Not quite right! The incorrect cells are marked in red.".to_string();
    }
    self.last_check = Some(validation);
    self.invalidate();
  }

  fn apply_secret(&mut self, secret: Secret) {
    info!(?secret, "secret key sequence");
    let overlays = &mut self.overlays;
    match secret {
      Secret::ToggleAdmin => overlays.admin = !overlays.admin,
      Secret::DevAnswers => {
        overlays.dev = true;
        overlays.answers = true;
      }
      Secret::ToggleDev => {
        overlays.dev = !overlays.dev;
        overlays.answers = false;
      }
      Secret::StopDev => {
        overlays.dev = false;
        overlays.answers = false;
      }
    }
    self.invalidate();
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    self.running = false;
  }

  fn render_grid(&self, area: Rect, buf: &mut Buffer) {
    let (rows, cols) = self.puzzle.grid().size();
    let grid_area = center(
      area,
      Constraint::Length(extent(cols, STRIDE_X)),
      Constraint::Length(extent(rows, STRIDE_Y)),
    );
    self.grid_area.set(grid_area);

    for (row, col) in self.puzzle.grid().positions() {
      let square_area = Rect {
        x: grid_area.x.saturating_add(extent(col, STRIDE_X)),
        y: grid_area.y.saturating_add(extent(row, STRIDE_Y)),
        width: SQUARE_WIDTH,
        height: SQUARE_HEIGHT,
      }
      .intersection(grid_area);
      if square_area.is_empty() {
        continue;
      }
      self.render_square((row, col), square_area, buf);
    }
  }

  fn render_square(&self, pos: Pos, area: Rect, buf: &mut Buffer) {
    let Some(cell) = self.puzzle.grid().get(pos) else {
      Block::new()
        .style(Style::new().bg(Color::Black))
        .render(area, buf);
      return;
    };

    let entry = self.puzzle.entries().get(pos);
    let mut style = square_style(self.puzzle.square_style(pos));
    let status = self.last_check.as_ref().and_then(|check| check.status(pos));
    if entry.locked {
      style = style.fg(Color::Green);
    } else if status == Some(CellStatus::Incorrect) {
      style = style.fg(Color::Red).add_modifier(Modifier::CROSSED_OUT);
    }

    let mut block = Block::new().style(style).padding(Padding::top(1));
    if let Some(number) = cell.clue_number() {
      block = block.title(Line::from(number.to_string()));
    }
    if self.overlays.dev {
      block = block.title_bottom(Line::from(format!("{},{}", pos.0, pos.1)).dim());
    }
    if self.overlays.answers {
      block = block.title_bottom(
        Line::from(cell.answer().to_string())
          .right_aligned()
          .italic(),
      );
    }

    let letter = entry.letter.map(String::from).unwrap_or_default();
    Paragraph::new(letter)
      .block(block)
      .centered()
      .render(area, buf);
  }

  fn render_sidebar(&self, area: Rect, buf: &mut Buffer) {
    let [clue_area, across_area, down_area] = Layout::vertical([
      Constraint::Length(6),
      Constraint::Fill(1),
      Constraint::Fill(1),
    ])
    .areas(area);

    let current = self
      .puzzle
      .active_word()
      .map(|clue| format!("{} {}: {}", clue.number, clue.direction, clue.clue))
      .unwrap_or_default();
    Paragraph::new(current)
      .wrap(Wrap { trim: true })
      .block(
        Block::bordered()
          .title(Line::from("Current clue").centered())
          .padding(Padding::horizontal(1)),
      )
      .render(clue_area, buf);

    self.render_clue_list(Across, across_area, buf);
    self.render_clue_list(Down, down_area, buf);
  }

  fn render_clue_list(&self, direction: Direction, area: Rect, buf: &mut Buffer) {
    let active = self.puzzle.active_word().map(|clue| clue.word_ref());
    let clues = self.puzzle.definition().clue_list(direction);

    let lines: Vec<Line> = clues
      .iter()
      .map(|clue| {
        let line = Line::from(format!("{}. {}", clue.number, clue.clue));
        if Some(clue.word_ref()) == active {
          line.reversed()
        } else {
          line
        }
      })
      .collect();

    // Keep the highlighted clue in view.
    let visible = area.height.saturating_sub(2);
    let scroll = clues
      .iter()
      .position(|clue| Some(clue.word_ref()) == active)
      .map(|i| (i as u16).saturating_sub(visible.saturating_sub(1)))
      .unwrap_or(0);

    let block = Block::bordered().title(Line::from(direction.to_string()).centered());
    self.list_area(direction).set((block.inner(area), scroll));
    Paragraph::new(lines)
      .scroll((scroll, 0))
      .block(block)
      .render(area, buf);
  }

  fn render_status(&self, area: Rect, buf: &mut Buffer) {
    let line = match (self.mode, self.puzzle.active_word()) {
      (Mode::FillPrompt, Some(word)) => line![
        format!("Type {} {}: ", word.number, word.direction).bold(),
        format!("{}_", self.prompt),
        "  ",
        self.status.clone().red(),
      ],
      _ => Line::from(self.status.clone()),
    };
    line.render(area, buf);
  }

  fn render_success(&self, area: Rect, buf: &mut Buffer) {
    let popup = center(area, Constraint::Length(44), Constraint::Length(7));
    let next = if self.waiting_for_next {
      "Fetching the next puzzle...".to_string()
    } else {
      format!("Press Enter for level {}", self.level + 1)
    };
    Clear.render(popup, buf);
    Paragraph::new(vec![
      Line::from("Congratulations!").bold().green(),
      Line::from(format!("You solved \"{}\".", self.puzzle.title())),
      Line::from(""),
      Line::from(next),
    ])
    .centered()
    .block(Block::bordered().padding(Padding::horizontal(1)))
    .render(popup, buf);
  }

  fn render_admin(&self, area: Rect, buf: &mut Buffer) {
    let [_, column] =
      Layout::horizontal([Constraint::Fill(1), Constraint::Length(46)]).areas(area);
    let [popup, _] = Layout::vertical([Constraint::Length(9), Constraint::Fill(1)]).areas(column);

    let prefetch = if self.prefetcher.is_in_flight() {
      "fetching"
    } else if self.next_ready {
      "ready"
    } else {
      "idle"
    };
    Clear.render(popup, buf);
    Paragraph::new(vec![
      Line::from(format!("Level: {} ({})", self.level, self.difficulty())),
      Line::from(format!("Next: {}", self.next_difficulty())),
      Line::from(format!("Prefetch: {prefetch}")),
      Line::from(format!("Source: {}", self.prefetcher.source().describe())),
      Line::from(""),
      Line::from("ctrl-n: skip to next level").dim(),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::bordered().title(Line::from("Admin").centered()))
    .render(popup, buf);
  }
}

impl Widget for &App {
  fn render(self, area: Rect, buf: &mut Buffer) {
    let [title_area, main_area, status_area, help_area] = Layout::vertical([
      Constraint::Length(2),
      Constraint::Fill(1),
      Constraint::Length(1),
      Constraint::Length(1),
    ])
    .areas(area);

    line![
      "Ratatui Crossword".bold().blue(),
      ": ".bold(),
      self.puzzle.title().to_string().bold(),
      format!("  level {}", self.level).dim(),
    ]
    .centered()
    .render(title_area, buf);

    let [puzzle_area, sidebar_area] =
      Layout::horizontal([Constraint::Fill(1), Constraint::Length(45)]).areas(main_area);

    self.render_grid(puzzle_area, buf);
    self.render_sidebar(sidebar_area, buf);
    self.render_status(status_area, buf);
    Line::from(HELP).dim().centered().render(help_area, buf);

    if self.overlays.admin {
      self.render_admin(area, buf);
    }
    if self.mode == Mode::Solved {
      self.render_success(area, buf);
    }
  }
}

fn square_style(style: SquareStyle) -> Style {
  let base_style = match style {
    SquareStyle::Blocked => return Style::new().bg(Color::Black),
    SquareStyle::Standard => Style::new().bg(Color::White),
    SquareStyle::Cursor => Style::new().bg(Color::LightRed),
    SquareStyle::Word => Style::new().bg(Color::LightYellow),
  };
  base_style.fg(Color::Black).add_modifier(Modifier::BOLD)
}

/// Terminal cells spanned by `n` squares at the given stride.
fn extent(n: usize, stride: u16) -> u16 {
  u16::try_from(n).unwrap_or(u16::MAX).saturating_mul(stride)
}

/// https://ratatui.rs/recipes/layout/center-a-widget/
fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
  let [area] = Layout::horizontal([horizontal])
    .flex(Flex::Center)
    .areas(area);
  let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
  area
}
