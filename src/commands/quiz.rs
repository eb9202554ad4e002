use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::card::{Card, CardType, Deck, FALSE_LITERAL, TRUE_LITERAL};
use crate::card_state::{CardSubState, explanation_text};
use crate::controller::{Action, SessionController};
use crate::error::QuizError;
use crate::llm::{CompletionBackend, KeyStore, OpenAiBackend, ensure_client, generate_deck};
use crate::palette::Palette;
use crate::session::Phase;
use crate::settings::Settings;
use crate::source::extract_text;
use crate::summary::ScoreSummary;
use crate::tui::Theme;
use crate::utils::{format_percent, pluralize};

use anyhow::{Context, Result};
use crossterm::event::KeyModifiers;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dialoguer::{Confirm, Select, theme::ColorfulTheme};
use log::{debug, info};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Wrap},
};
use tokio::sync::mpsc;

type GenerationResult = Result<Deck, QuizError>;

pub struct QuizOptions {
    pub path: PathBuf,
    pub settings: Settings,
    pub model: String,
    pub shuffle: bool,
    pub plain: bool,
}

pub async fn run(store: &KeyStore, options: QuizOptions) -> Result<()> {
    options.settings.validate()?;
    let text = extract_text(&options.path)?;
    let source_name = options
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| options.path.display().to_string());

    let client = ensure_client(store)?;
    let backend = OpenAiBackend::new(client, options.model);
    info!("generating with model {}", backend.model());

    let request = GenerationRequest {
        backend: Arc::new(backend),
        text: Arc::from(text),
        settings: options.settings,
        shuffle: options.shuffle,
    };

    if options.plain {
        run_plain(&request).await
    } else {
        start_quiz_session(request, source_name).await
    }
}

/// Everything needed to ask for a fresh deck, shareable with a spawned task.
#[derive(Clone)]
struct GenerationRequest {
    backend: Arc<dyn CompletionBackend>,
    text: Arc<str>,
    settings: Settings,
    shuffle: bool,
}

impl GenerationRequest {
    async fn generate(&self) -> GenerationResult {
        let deck = generate_deck(self.backend.as_ref(), &self.text, &self.settings).await?;
        Ok(if self.shuffle { deck.shuffled() } else { deck })
    }
}

fn spawn_generation(
    request: &GenerationRequest,
    results: &mpsc::UnboundedSender<GenerationResult>,
) {
    let request = request.clone();
    let results = results.clone();
    tokio::spawn(async move {
        let _ = results.send(request.generate().await);
    });
}

/// What a key press asks the session loop to do.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Generate,
    NewSession,
    Dispatch(Action),
}

struct QuizApp {
    controller: SessionController,
    settings: Settings,
    source_name: String,
    pending: bool,
    last_error: Option<String>,
}

impl QuizApp {
    fn new(source_name: impl Into<String>, settings: Settings) -> Self {
        Self {
            controller: SessionController::new(),
            settings,
            source_name: source_name.into(),
            pending: false,
            last_error: None,
        }
    }

    fn begin_generation(&mut self) {
        self.pending = true;
        self.last_error = None;
    }

    /// A failed generation leaves the controller untouched.
    fn apply_generation(&mut self, result: GenerationResult) {
        self.pending = false;
        match result {
            Ok(deck) => {
                self.last_error = None;
                self.controller.start(deck);
            }
            Err(err) => {
                debug!("generation failed: {err:?}");
                self.last_error = Some(err.to_string());
            }
        }
    }

    fn command_for_key(&self, code: KeyCode) -> Option<Command> {
        if self.pending {
            return None;
        }
        match self.controller.phase() {
            Phase::Setup => match code {
                KeyCode::Char('g') | KeyCode::Char('G') => Some(Command::Generate),
                _ => None,
            },
            Phase::Finished => match code {
                KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::NewSession),
                _ => None,
            },
            Phase::InProgress => {
                let view = self.controller.view();
                let card = view.card?;
                card_action(card, view.card_state, code).map(Command::Dispatch)
            }
        }
    }
}

fn card_action(card: &Card, state: &CardSubState, code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char(' ') | KeyCode::Enter => {
            if !state.is_flipped() {
                Some(Action::Reveal)
            } else if card.is_choice() {
                Some(Action::Next)
            } else {
                None
            }
        }
        // Cards hold at most `MAX_OPTIONS` (9) options, one digit each.
        KeyCode::Char(digit @ '1'..='9') if card.is_choice() => {
            let position = digit.to_digit(10)? as usize;
            Some(Action::Choose(position - 1))
        }
        KeyCode::Char('t') | KeyCode::Char('T') if is_true_false(card) => {
            Some(Action::Select(TRUE_LITERAL.to_string()))
        }
        KeyCode::Char('f') | KeyCode::Char('F') if is_true_false(card) => {
            Some(Action::Select(FALSE_LITERAL.to_string()))
        }
        KeyCode::Char('k' | 'K' | 'y' | 'Y') if !card.is_choice() => Some(Action::SelfGrade(true)),
        KeyCode::Char('n' | 'N' | 'd' | 'D') if !card.is_choice() => {
            Some(Action::SelfGrade(false))
        }
        _ => None,
    }
}

fn is_true_false(card: &Card) -> bool {
    card.card_type() == CardType::TrueFalse
}

async fn start_quiz_session(request: GenerationRequest, source_name: String) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    )
    .context("failed to configure terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to start terminal")?;
    terminal.hide_cursor().context("failed to hide cursor")?;

    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let mut app = QuizApp::new(source_name, request.settings.clone());
    app.begin_generation();
    spawn_generation(&request, &results_tx);

    let loop_result: Result<()> = async {
        loop {
            while let Ok(result) = results_rx.try_recv() {
                app.apply_generation(result);
            }
            app.controller.dispatch(Action::Tick, Instant::now());

            terminal
                .draw(|frame| draw(frame, &app))
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

                match app.command_for_key(key.code) {
                    Some(Command::Generate) => {
                        app.begin_generation();
                        spawn_generation(&request, &results_tx);
                    }
                    Some(Command::NewSession) => {
                        app.controller.dispatch(Action::Restart, Instant::now());
                        app.begin_generation();
                        spawn_generation(&request, &results_tx);
                    }
                    Some(Command::Dispatch(action)) => {
                        app.controller.dispatch(action, Instant::now());
                    }
                    None => {}
                }
            }
        }
    }
    .await;

    teardown_terminal(&mut terminal)?;

    loop_result
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        PopKeyboardEnhancementFlags,
        LeaveAlternateScreen
    )
    .context("failed to restore terminal")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

fn draw(frame: &mut Frame, app: &QuizApp) {
    let area = frame.area();
    frame.render_widget(Theme::backdrop(), area);
    let view = app.controller.view();

    let controls = Paragraph::new(instructions_text(app))
        .block(Theme::panel_with_line(Theme::section_header("Controls")))
        .wrap(Wrap { trim: false });

    match (view.phase, view.card, view.summary) {
        (Phase::InProgress, Some(card), _) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(5),
                    Constraint::Length(4),
                ])
                .split(area);

            let ratio = (view.progress_percent / 100.0).clamp(0.0, 1.0);
            let gauge = Gauge::default()
                .block(Theme::panel("Progress"))
                .gauge_style(Theme::label())
                .ratio(ratio)
                .label(format!("{}/{}", view.index + 1, view.total));
            frame.render_widget(gauge, chunks[0]);

            let header = Line::from(vec![
                Theme::label_span(format!(" Card {}/{}", view.index + 1, view.total)),
                Theme::bullet(),
                Theme::span(format!("Score {}", view.score)),
                Theme::bullet(),
                Theme::span(format!("{} ", card.card_type())),
            ]);
            let body = Paragraph::new(card_lines(card, view.card_state))
                .block(Theme::panel_with_line(header))
                .wrap(Wrap { trim: false });
            frame.render_widget(body, chunks[1]);
            frame.render_widget(controls, chunks[2]);
        }
        (Phase::Finished, _, Some(summary)) => {
            let chunks = split_body(area);
            let body = Paragraph::new(score_lines(&summary))
                .block(Theme::panel("Results"))
                .wrap(Wrap { trim: false });
            frame.render_widget(body, chunks[0]);
            frame.render_widget(controls, chunks[1]);
        }
        _ => {
            let chunks = split_body(area);
            let body = Paragraph::new(setup_lines(app))
                .block(Theme::panel("Flashmind"))
                .wrap(Wrap { trim: false });
            frame.render_widget(body, chunks[0]);
            frame.render_widget(controls, chunks[1]);
        }
    }
}

fn split_body(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(area)
}

fn setup_lines(app: &QuizApp) -> Vec<Line<'static>> {
    let settings = &app.settings;
    let types = settings
        .card_types
        .enabled()
        .iter()
        .map(|card_type| card_type.label())
        .collect::<Vec<_>>()
        .join(", ");

    let status = if app.pending {
        Span::styled("Generating flashcards...", Theme::warning())
    } else if let Some(err) = &app.last_error {
        Span::styled(err.clone(), Theme::danger())
    } else {
        Theme::span("Ready.")
    };

    vec![
        Line::from(vec![
            Theme::label_span("Document: "),
            Theme::span(app.source_name.clone()),
        ]),
        Line::from(vec![
            Theme::label_span("Cards: "),
            Theme::span(settings.card_count.to_string()),
            Theme::bullet(),
            Theme::label_span("Difficulty: "),
            Theme::span(settings.difficulty.to_string()),
            Theme::bullet(),
            Theme::label_span("Language: "),
            Theme::span(settings.language.clone()),
        ]),
        Line::from(vec![Theme::label_span("Types: "), Theme::span(types)]),
        Line::default(),
        Line::from(status),
    ]
}

fn text_lines(text: &str) -> impl Iterator<Item = Line<'static>> + '_ {
    text.lines().map(|line| Line::from(line.to_string()))
}

fn card_lines(card: &Card, state: &CardSubState) -> Vec<Line<'static>> {
    let mut lines = vec![Theme::section_header("Q:")];
    lines.extend(text_lines(&card.question));

    if let Some(choices) = card.choices() {
        lines.push(Line::default());
        for (position, choice) in choices.iter().enumerate() {
            let mark = state.option_mark(card, choice);
            lines.push(Line::from(vec![
                Theme::key_chip((position + 1).to_string()),
                Theme::span(format!(" {} ", Theme::option_marker(mark))),
                Span::styled(choice.to_string(), Theme::option(mark)),
            ]));
        }
        if let Some(verdict) = state.verdict() {
            lines.push(Line::default());
            lines.push(if verdict {
                Line::from(Span::styled("Correct!", Theme::success()))
            } else {
                Line::from(Span::styled("Wrong", Theme::danger()))
            });
        }
    }

    if state.is_flipped() {
        lines.push(Line::default());
        lines.push(Theme::section_header("A:"));
        lines.push(Line::from(Span::styled(
            card.correct_answer().to_string(),
            Theme::success(),
        )));
        lines.push(Line::default());
        lines.push(Theme::section_header("Explanation:"));
        lines.extend(text_lines(explanation_text(card)));
    }
    lines
}

fn score_lines(summary: &ScoreSummary) -> Vec<Line<'static>> {
    let band = summary.grade();
    vec![
        Line::from(vec![
            Theme::label_span("Grade: "),
            Span::styled(band.grade, Theme::bold_in(band.color)),
        ]),
        Line::from(Span::styled(band.message, Theme::bold_in(band.color))),
        Line::default(),
        Line::from(vec![
            Theme::label_span("Correct: "),
            Span::styled(summary.correct.to_string(), Theme::success()),
        ]),
        Line::from(vec![
            Theme::label_span("Wrong: "),
            Span::styled(summary.incorrect().to_string(), Theme::danger()),
        ]),
        Line::from(vec![
            Theme::label_span("Accuracy: "),
            Theme::span(format_percent(summary.accuracy)),
            Theme::span(format!(" of {}", pluralize("card", summary.total))),
        ]),
    ]
}

fn exit_spans() -> [Span<'static>; 4] {
    [
        Theme::key_chip("Esc"),
        Theme::span(" / "),
        Theme::key_chip("Ctrl+C"),
        Theme::span(" exit"),
    ]
}

fn instructions_text(app: &QuizApp) -> Vec<Line<'static>> {
    let mut line = Vec::new();
    let view = app.controller.view();

    if app.pending {
        line.push(Theme::span("Generating flashcards"));
    } else {
        match (view.phase, view.card) {
            (Phase::InProgress, Some(card)) => {
                line.extend(card_instructions(card, view.card_state));
            }
            (Phase::Finished, _) => {
                line.push(Theme::key_chip("R"));
                line.push(Theme::span(" new session"));
            }
            _ => {
                line.push(Theme::key_chip("G"));
                line.push(Theme::span(if app.last_error.is_some() {
                    " try again"
                } else {
                    " generate"
                }));
            }
        }
    }
    line.push(Theme::bullet());
    line.extend(exit_spans());
    vec![Line::from(line)]
}

fn card_instructions(card: &Card, state: &CardSubState) -> Vec<Span<'static>> {
    let next_keys = |label: &'static str| {
        vec![
            Theme::key_chip("Space"),
            Theme::span(" or "),
            Theme::key_chip("Enter"),
            Theme::span(label),
        ]
    };

    if let Some(choices) = card.choices() {
        if !state.has_answered() {
            let mut spans = vec![
                Theme::key_chip(format!("1-{}", choices.len())),
                Theme::span(" choose"),
            ];
            if is_true_false(card) {
                spans.push(Theme::bullet());
                spans.push(Theme::key_chip("T"));
                spans.push(Theme::span(" / "));
                spans.push(Theme::key_chip("F"));
                spans.push(Theme::span(" answer"));
            }
            spans
        } else if !state.is_flipped() {
            next_keys(" show answer")
        } else {
            next_keys(" next card")
        }
    } else if !state.is_flipped() {
        next_keys(" show answer")
    } else {
        vec![
            Theme::key_chip("K"),
            Span::styled(" Knew it", Theme::success()),
            Theme::bullet(),
            Theme::key_chip("N"),
            Span::styled(" Didn't know", Theme::danger()),
        ]
    }
}

async fn run_plain(request: &GenerationRequest) -> Result<()> {
    let theme = ColorfulTheme::default();
    let mut controller = SessionController::new();

    loop {
        let Some(deck) = generate_plain(request, &theme).await? else {
            return Ok(());
        };
        controller.start(deck);
        play_plain(&mut controller, &theme)?;

        if let Some(summary) = controller.view().summary {
            print_summary(&summary);
        }
        let again = Confirm::with_theme(&theme)
            .with_prompt("Start a new session?")
            .default(false)
            .interact()
            .context("Failed to read answer")?;
        if !again {
            return Ok(());
        }
        controller.dispatch(Action::Restart, Instant::now());
    }
}

async fn generate_plain(
    request: &GenerationRequest,
    theme: &ColorfulTheme,
) -> Result<Option<Deck>> {
    loop {
        println!("{}", Palette::dim("Generating flashcards..."));
        match request.generate().await {
            Ok(deck) => {
                println!(
                    "{}",
                    Palette::paint(
                        Palette::SUCCESS,
                        format!("Generated {}.", pluralize("card", deck.len()))
                    )
                );
                return Ok(Some(deck));
            }
            Err(err) if err.is_input_rejection() => return Err(err.into()),
            Err(err) => {
                println!("{}", Palette::paint(Palette::DANGER, &err));
                let retry = Confirm::with_theme(theme)
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()
                    .context("Failed to read answer")?;
                if !retry {
                    return Ok(None);
                }
            }
        }
    }
}

fn play_plain(controller: &mut SessionController, theme: &ColorfulTheme) -> Result<()> {
    while controller.phase() == Phase::InProgress {
        let view = controller.view();
        let Some(card) = view.card.cloned() else {
            break;
        };
        println!(
            "\n{} {}",
            Palette::bold(
                Palette::ACCENT,
                format!("Card {}/{}", view.index + 1, view.total)
            ),
            Palette::dim(card.card_type())
        );
        println!("{}", card.question);

        if let Some(choices) = card.choices() {
            let picked = Select::with_theme(theme)
                .with_prompt("Your answer")
                .items(&choices)
                .default(0)
                .interact()
                .context("Failed to read answer")?;
            controller.dispatch(Action::Choose(picked), Instant::now());
            controller.dispatch(Action::Reveal, Instant::now());
            match controller.card_state().verdict() {
                Some(true) => println!("{}", Palette::bold(Palette::SUCCESS, "Correct!")),
                _ => println!("{}", Palette::bold(Palette::DANGER, "Wrong")),
            }
            print_back(&card);
            controller.dispatch(Action::Next, Instant::now());
        } else {
            Select::with_theme(theme)
                .with_prompt("Think of your answer")
                .items(&["Show answer"])
                .default(0)
                .interact()
                .context("Failed to read answer")?;
            controller.dispatch(Action::Reveal, Instant::now());
            print_back(&card);
            let graded = Select::with_theme(theme)
                .with_prompt("Did you know it?")
                .items(&["I knew it", "I didn't know"])
                .default(0)
                .interact()
                .context("Failed to read answer")?;
            controller.dispatch(Action::SelfGrade(graded == 0), Instant::now());
        }
    }
    Ok(())
}

fn print_back(card: &Card) {
    println!(
        "{} {}",
        Palette::bold(Palette::INFO, "Answer:"),
        Palette::paint(Palette::SUCCESS, card.correct_answer())
    );
    println!("{}", Palette::dim(explanation_text(card)));
}

fn print_summary(summary: &ScoreSummary) {
    let band = summary.grade();
    println!(
        "\n{} {}",
        Palette::bold(band.color, format!("Grade {}", band.grade)),
        Palette::paint(band.color, band.message)
    );
    println!(
        "{} correct, {} wrong, accuracy {}",
        Palette::paint(Palette::SUCCESS, summary.correct),
        Palette::paint(Palette::DANGER, summary.incorrect()),
        format_percent(summary.accuracy)
    );
}
