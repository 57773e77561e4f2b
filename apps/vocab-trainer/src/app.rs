//! Application state and logic.

use crate::audio::{self, Speaker};
use crate::config::Config;
use crate::db::{Database, DbResult};
use crate::import::{self, SyncReport};
use crate::models::{CardId, CategoryFilter, Flashcard, Vocabulary};
use crate::quiz::{QuizAnswer, QuizEngine};
use crate::selection::{clamp_sample_size, select_sample, QUIZ_MIN_CARDS, SPELLING_MIN_CARDS};
use crate::spelling::{SpellingAnswer, SpellingEngine};
use crate::store::CardStore;
use crate::study::{StudyEngine, StudyStep};
use crate::timer::{Scheduler, TimerEvent, TimerId};
use crossterm::event::{KeyCode, KeyEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Step for the word-count controls.
const COUNT_STEP: usize = 5;

pub struct App {
    pub db: Database,
    pub config: Config,
    pub store: CardStore,
    pub loaded_files: Vec<String>,
    pub view: View,
    pub mode: Option<Mode>,
    pub filters: Filters,
    pub quiz_count: usize,
    pub spelling_count: usize,
    pub selected: usize,
    pub flipped: HashSet<CardId>,
    pub scheduler: Scheduler,
    pub speaker: Box<dyn Speaker>,
    rng: StdRng,
    quiz_advance: Option<TimerId>,
    pub spelling_input: String,
    pub show_review: bool,
    /// Why the current mode has no session.
    pub notice: Option<String>,
    pub editing: bool,
    pub input_buffer: String,
    pub input_field: InputField,
    edit_target: Option<CardId>,
    edit_draft: Option<Vocabulary>,
    pub confirm: Option<Confirm>,
    pub message: Option<String>,
    pub show_help: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browse,
    Study,
    Quiz,
    Spelling,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Browse => "Browse",
            Self::Study => "Study",
            Self::Quiz => "Quiz",
            Self::Spelling => "Spelling",
        }
    }
}

/// The active session. Only one exists at a time.
pub enum Mode {
    Study(StudyEngine),
    Quiz(QuizEngine),
    Spelling(SpellingEngine),
}

/// Category filter per view.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filters {
    pub browse: CategoryFilter,
    pub study: CategoryFilter,
    pub quiz: CategoryFilter,
    pub spelling: CategoryFilter,
}

impl Filters {
    pub fn get(&self, view: View) -> CategoryFilter {
        match view {
            View::Browse => self.browse,
            View::Study => self.study,
            View::Quiz => self.quiz,
            View::Spelling => self.spelling,
        }
    }

    fn get_mut(&mut self, view: View) -> &mut CategoryFilter {
        match view {
            View::Browse => &mut self.browse,
            View::Study => &mut self.study,
            View::Quiz => &mut self.quiz,
            View::Spelling => &mut self.spelling,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    None,
    ImportPath,
    EditWord,
    EditMeaning,
    EditWordType,
    EditPhonetic,
    EditExampleEn,
    EditExampleVi,
}

impl InputField {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::ImportPath => "Import file",
            Self::EditWord => "Word",
            Self::EditMeaning => "Meaning",
            Self::EditWordType => "Word type",
            Self::EditPhonetic => "Phonetic",
            Self::EditExampleEn => "Example (English)",
            Self::EditExampleVi => "Example (Vietnamese)",
        }
    }

    /// Prompt that follows this one when editing a card.
    fn next_edit(self) -> Option<Self> {
        match self {
            Self::EditWord => Some(Self::EditMeaning),
            Self::EditMeaning => Some(Self::EditWordType),
            Self::EditWordType => Some(Self::EditPhonetic),
            Self::EditPhonetic => Some(Self::EditExampleEn),
            Self::EditExampleEn => Some(Self::EditExampleVi),
            _ => None,
        }
    }

    fn edit_slot(self, vocabulary: &mut Vocabulary) -> Option<&mut String> {
        match self {
            Self::EditWord => Some(&mut vocabulary.word),
            Self::EditMeaning => Some(&mut vocabulary.meaning),
            Self::EditWordType => Some(&mut vocabulary.word_type),
            Self::EditPhonetic => Some(&mut vocabulary.phonetic),
            Self::EditExampleEn => Some(&mut vocabulary.example_en),
            Self::EditExampleVi => Some(&mut vocabulary.example_vi),
            Self::None | Self::ImportPath => None,
        }
    }
}

/// Destructive actions awaiting a `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Delete(CardId),
    DeleteAll,
}

impl App {
    pub fn new() -> anyhow::Result<Self> {
        let config = Config::load();
        if Config::config_path().is_some_and(|p| !p.exists()) {
            if let Err(e) = config.save() {
                tracing::warn!(error = %e, "could not write default config");
            }
        }
        let db_path = Config::db_path().unwrap_or_else(|| "vocab.db".into());
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::open(&db_path)?;
        let speaker = audio::from_config(&config.audio);

        let mut app = Self::with_parts(db, config, speaker, StdRng::from_os_rng())?;
        app.sync_import_dir();
        Ok(app)
    }

    /// Build the app from already opened parts and load saved cards.
    pub fn with_parts(
        db: Database,
        config: Config,
        speaker: Box<dyn Speaker>,
        rng: StdRng,
    ) -> DbResult<Self> {
        let store = CardStore::from_parts(db.load_cards()?, db.load_batch_counter()?);
        let loaded_files = db.load_loaded_files()?;
        tracing::info!(cards = store.len(), batches = store.batch_counter(), "loaded card store");

        Ok(Self {
            quiz_count: config.quiz.word_count,
            spelling_count: config.spelling.word_count,
            db,
            config,
            store,
            loaded_files,
            view: View::Browse,
            mode: None,
            filters: Filters::default(),
            selected: 0,
            flipped: HashSet::new(),
            scheduler: Scheduler::new(),
            speaker,
            rng,
            quiz_advance: None,
            spelling_input: String::new(),
            show_review: false,
            notice: None,
            editing: false,
            input_buffer: String::new(),
            input_field: InputField::None,
            edit_target: None,
            edit_draft: None,
            confirm: None,
            message: None,
            show_help: false,
        })
    }

    pub fn can_quit(&self) -> bool {
        self.view == View::Browse && !self.editing && self.confirm.is_none()
    }

    /// Import new files from the import directory.
    pub fn sync_import_dir(&mut self) -> SyncReport {
        let Some(dir) = self.config.import_dir() else {
            return SyncReport::default();
        };
        let report = import::sync_directory(&mut self.store, &dir, &mut self.loaded_files);
        if !report.batches.is_empty() {
            self.persist();
            if let Err(e) = self.db.save_loaded_files(&self.loaded_files) {
                tracing::warn!(error = %e, "failed to save loaded import files");
            }
            self.message = Some(format!(
                "Loaded {} new words from {} file(s)",
                report.added(),
                report.newly_loaded.len()
            ));
        }
        report
    }

    fn persist(&mut self) {
        let saved = self
            .db
            .save_cards(self.store.cards())
            .and_then(|_| self.db.save_batch_counter(self.store.batch_counter()));
        if let Err(e) = saved {
            tracing::warn!(error = %e, "failed to save cards");
            self.message = Some(format!("Save failed: {}", e));
        }
    }

    /// Cards listed in Browse, in store order.
    pub fn browse_cards(&self) -> Vec<&Flashcard> {
        let filter = self.filters.browse;
        self.store.cards().iter().filter(|c| filter.matches(c)).collect()
    }

    pub fn selected_card(&self) -> Option<&Flashcard> {
        self.browse_cards().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let len = self.browse_cards().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Cards available to a view under its current filter.
    pub fn available(&self, view: View) -> usize {
        self.store.count(self.filters.get(view))
    }

    /// Sample size a restart would use.
    pub fn effective_count(&self, view: View) -> usize {
        match view {
            View::Quiz => clamp_sample_size(self.quiz_count, QUIZ_MIN_CARDS, self.available(view)),
            View::Spelling => {
                clamp_sample_size(self.spelling_count, SPELLING_MIN_CARDS, self.available(view))
            }
            View::Browse | View::Study => self.available(view),
        }
    }

    fn adjust_count(&mut self, up: bool) {
        let (count, minimum) = match self.view {
            View::Quiz => (&mut self.quiz_count, QUIZ_MIN_CARDS),
            View::Spelling => (&mut self.spelling_count, SPELLING_MIN_CARDS),
            View::Browse | View::Study => return,
        };
        let maximum = self.store.count(self.filters.get(self.view)).max(minimum);
        let stepped = if up {
            count.saturating_add(COUNT_STEP)
        } else {
            count.saturating_sub(COUNT_STEP)
        };
        *count = stepped.clamp(minimum, maximum);
    }

    fn cycle_filter(&mut self) {
        let batches = self.store.batch_ids();
        let filter = self.filters.get_mut(self.view);
        *filter = filter.cycle(&batches);
        tracing::debug!(view = self.view.name(), filter = %self.filters.get(self.view), "category changed");
    }

    /// Dispatch timers that came due.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        for event in self.scheduler.fire_due(now) {
            tracing::debug!(?event, "timer fired");
            self.on_timer(event, now);
        }
    }

    fn on_timer(&mut self, event: TimerEvent, now: Instant) {
        match event {
            TimerEvent::QuizClock => {
                if let Some(Mode::Quiz(quiz)) = &mut self.mode {
                    quiz.tick();
                }
            }
            TimerEvent::QuizAdvance => {
                self.quiz_advance = None;
                self.advance_quiz();
            }
            TimerEvent::SpellingClearInput => {
                let Some(Mode::Spelling(spelling)) = &self.mode else { return };
                self.spelling_input.clear();
                if spelling.question().is_some_and(|q| !q.answered) {
                    let delay = self.config.spelling.feedback_hide_delay();
                    self.scheduler.schedule_once(TimerEvent::SpellingHideFeedback, delay, now);
                }
            }
            TimerEvent::SpellingHideFeedback => {
                if let Some(Mode::Spelling(spelling)) = &mut self.mode {
                    spelling.clear_retry_feedback();
                }
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.message = None;

        if self.show_help {
            self.show_help = false;
            return;
        }

        if let Some(confirm) = self.confirm.take() {
            if key.code == KeyCode::Char('y') {
                self.apply_confirm(confirm);
            } else {
                self.message = Some("Cancelled".to_string());
            }
            return;
        }

        if self.editing {
            self.handle_edit_key(key);
            return;
        }

        match self.view {
            View::Browse => self.handle_browse_key(key),
            View::Study => self.handle_study_key(key),
            View::Quiz => self.handle_quiz_key(key),
            View::Spelling => self.handle_spelling_key(key),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.stop_editing(),
            KeyCode::Enter => self.finish_editing(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn start_editing(&mut self, field: InputField, initial: String) {
        self.editing = true;
        self.input_field = field;
        self.input_buffer = initial;
    }

    fn stop_editing(&mut self) {
        self.editing = false;
        self.input_buffer.clear();
        self.input_field = InputField::None;
        self.edit_target = None;
        self.edit_draft = None;
    }

    fn finish_editing(&mut self) {
        match self.input_field {
            InputField::ImportPath => {
                let path = PathBuf::from(self.input_buffer.trim());
                self.import_path(path);
            }
            InputField::None => {}
            field => {
                let value = self.input_buffer.trim().to_string();
                let Some(draft) = self.edit_draft.as_mut() else {
                    self.stop_editing();
                    return;
                };
                if let Some(slot) = field.edit_slot(draft) {
                    *slot = value;
                }
                if let Some(next) = field.next_edit() {
                    self.input_buffer = next.edit_slot(draft).cloned().unwrap_or_default();
                    self.input_field = next;
                    return;
                }
                self.save_edit();
            }
        }
        self.stop_editing();
    }

    fn save_edit(&mut self) {
        let (Some(id), Some(vocabulary)) = (self.edit_target, self.edit_draft.take()) else {
            return;
        };

        if self.store.update_vocabulary(id, vocabulary) {
            self.persist();
            self.message = Some("Card updated".to_string());
        } else {
            self.message = Some("Word and meaning are required, and the word must be unique".to_string());
        }
    }

    fn import_path(&mut self, path: PathBuf) {
        if path.as_os_str().is_empty() {
            return;
        }
        match import::import_file(&mut self.store, &path) {
            Ok(report) => {
                self.persist();
                self.message = Some(format!(
                    "Category {}: {} added, {} duplicates, {} skipped",
                    report.batch, report.added, report.duplicates, report.skipped
                ));
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "import failed");
                self.message = Some(format!("Import failed: {}", e));
            }
        }
    }

    fn apply_confirm(&mut self, confirm: Confirm) {
        match confirm {
            Confirm::Delete(id) => {
                if self.store.remove(id) {
                    self.flipped.remove(&id);
                    self.persist();
                    self.clamp_selection();
                    self.message = Some("Card deleted".to_string());
                }
            }
            Confirm::DeleteAll => {
                let count = self.store.len();
                self.store.clear();
                self.flipped.clear();
                self.filters = Filters::default();
                self.selected = 0;
                self.persist();
                self.message = Some(format!("Deleted all {} cards", count));
            }
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.browse_cards().len();
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.selected_card().map(|c| c.id) {
                    if !self.flipped.remove(&id) {
                        self.flipped.insert(id);
                    }
                }
            }
            KeyCode::Char('v') => {
                if let Some(card) = self.selected_card() {
                    self.speaker.speak(card.word());
                }
            }
            KeyCode::Char('e') => {
                if let Some((id, vocabulary)) = self.selected_card().map(|c| (c.id, c.vocabulary.clone())) {
                    self.edit_target = Some(id);
                    self.start_editing(InputField::EditWord, vocabulary.word.clone());
                    self.edit_draft = Some(vocabulary);
                }
            }
            KeyCode::Char('s') => {
                let synonyms = self
                    .selected_card()
                    .map(|c| c.vocabulary.synonyms().join(", "))
                    .unwrap_or_default();
                if synonyms.is_empty() {
                    self.message = Some("No synonyms for this card".to_string());
                } else {
                    self.speaker.speak(&synonyms);
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_card().map(|c| c.id) {
                    self.confirm = Some(Confirm::Delete(id));
                }
            }
            KeyCode::Char('D') => {
                if self.store.is_empty() {
                    self.message = Some("No cards to delete".to_string());
                } else {
                    self.confirm = Some(Confirm::DeleteAll);
                }
            }
            KeyCode::Char('x') => {
                self.store.shuffle(&mut self.rng);
                self.persist();
                self.message = Some("Shuffled".to_string());
            }
            KeyCode::Tab => {
                self.cycle_filter();
                self.selected = 0;
            }
            KeyCode::Char('i') => self.start_editing(InputField::ImportPath, String::new()),
            KeyCode::Char('R') => {
                let report = self.sync_import_dir();
                if report.batches.is_empty() {
                    self.message = Some("No new import files".to_string());
                }
            }
            KeyCode::Char('1') => self.enter_view(View::Study),
            KeyCode::Char('2') => self.enter_view(View::Quiz),
            KeyCode::Char('3') => self.enter_view(View::Spelling),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }

    /// Switch view, discarding any running session and its timers.
    pub fn enter_view(&mut self, view: View) {
        self.view = view;
        match view {
            View::Browse => {
                self.reset_session();
                self.clamp_selection();
            }
            View::Study => self.start_study(),
            View::Quiz => self.start_quiz(),
            View::Spelling => self.start_spelling(),
        }
    }

    fn reset_session(&mut self) {
        self.scheduler.cancel_all();
        self.quiz_advance = None;
        self.mode = None;
        self.notice = None;
        self.show_review = false;
        self.spelling_input.clear();
    }

    fn start_study(&mut self) {
        self.reset_session();
        let cards = self.store.filtered(self.filters.study);
        self.mode = Some(Mode::Study(StudyEngine::new(cards)));
    }

    fn start_quiz(&mut self) {
        self.reset_session();
        let sample = select_sample(
            self.store.cards(),
            self.filters.quiz,
            self.quiz_count,
            QUIZ_MIN_CARDS,
            &mut self.rng,
        );
        match sample.and_then(|cards| QuizEngine::new(cards, StdRng::from_rng(&mut self.rng))) {
            Ok(quiz) => {
                self.scheduler
                    .schedule_every(TimerEvent::QuizClock, Duration::from_secs(1), Instant::now());
                self.mode = Some(Mode::Quiz(quiz));
            }
            Err(e) => {
                tracing::info!(error = %e, "quiz not started");
                self.notice = Some(format!("Quiz {}. Add cards or pick another category.", e));
            }
        }
    }

    fn start_spelling(&mut self) {
        self.reset_session();
        let sample = select_sample(
            self.store.cards(),
            self.filters.spelling,
            self.spelling_count,
            SPELLING_MIN_CARDS,
            &mut self.rng,
        );
        match sample.and_then(SpellingEngine::new) {
            Ok(spelling) => self.mode = Some(Mode::Spelling(spelling)),
            Err(e) => {
                tracing::info!(error = %e, "spelling not started");
                self.notice = Some(format!("Spelling {}. Add cards or pick another category.", e));
            }
        }
    }

    fn handle_study_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.enter_view(View::Browse);
                return;
            }
            KeyCode::Tab => {
                self.cycle_filter();
                self.start_study();
                return;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                return;
            }
            _ => {}
        }

        let Some(Mode::Study(study)) = &mut self.mode else { return };
        match key.code {
            KeyCode::Char(' ') => study.flip(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::Enter => {
                let step = study.next(&mut self.store);
                if step != StudyStep::Ignored {
                    self.persist();
                }
                if step == StudyStep::Completed {
                    self.message = Some("All cards in this category learned!".to_string());
                }
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('b') => {
                study.previous();
            }
            KeyCode::Char('v') => {
                if let Some(card) = study.current() {
                    self.speaker.speak(card.word());
                }
            }
            _ => {}
        }
    }

    fn handle_quiz_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.enter_view(View::Browse),
            KeyCode::Tab => self.cycle_filter(),
            KeyCode::Up => self.adjust_count(true),
            KeyCode::Down => self.adjust_count(false),
            KeyCode::Char('r') => self.start_quiz(),
            KeyCode::Char('w') => self.show_review = !self.show_review,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Enter => {
                // Skip the rest of the feedback delay
                if let Some(id) = self.quiz_advance.take() {
                    self.scheduler.cancel(id);
                    self.advance_quiz();
                }
            }
            KeyCode::Char(c) => {
                if let Some(slot) = answer_slot(c) {
                    self.answer_quiz(slot);
                }
            }
            _ => {}
        }
    }

    fn answer_quiz(&mut self, slot: usize) {
        let Some(Mode::Quiz(quiz)) = &mut self.mode else { return };
        match quiz.answer_slot(slot, self.speaker.as_ref()) {
            QuizAnswer::Ignored => {}
            QuizAnswer::Correct | QuizAnswer::Incorrect { .. } => {
                let delay = self.config.quiz.answer_delay();
                let id = self.scheduler.schedule_once(TimerEvent::QuizAdvance, delay, Instant::now());
                self.quiz_advance = Some(id);
            }
        }
    }

    fn advance_quiz(&mut self) {
        let Some(Mode::Quiz(quiz)) = &mut self.mode else { return };
        if quiz.advance() {
            self.scheduler.cancel_event(TimerEvent::QuizClock);
        }
    }

    fn handle_spelling_key(&mut self, key: KeyEvent) {
        let completed = match &self.mode {
            Some(Mode::Spelling(spelling)) => spelling.is_completed(),
            _ => true,
        };

        match key.code {
            KeyCode::Esc => self.enter_view(View::Browse),
            KeyCode::F(5) => self.start_spelling(),
            KeyCode::Left | KeyCode::Right => self.cycle_filter(),
            KeyCode::Up => self.adjust_count(true),
            KeyCode::Down => self.adjust_count(false),
            KeyCode::Char('r') if completed => self.start_spelling(),
            KeyCode::Char('w') if completed => self.show_review = !self.show_review,
            KeyCode::Char('q') if completed => self.enter_view(View::Browse),
            _ if completed => {}
            KeyCode::Enter => self.submit_spelling(),
            KeyCode::Tab => {
                if let Some(Mode::Spelling(spelling)) = &mut self.mode {
                    spelling.request_hint();
                }
            }
            KeyCode::F(2) => {
                if let Some(Mode::Spelling(spelling)) = &self.mode {
                    if let Some(card) = spelling.current() {
                        self.speaker.speak(card.word());
                    }
                }
            }
            KeyCode::Backspace => {
                self.spelling_input.pop();
            }
            KeyCode::Char(c) => self.spelling_input.push(c),
            _ => {}
        }
    }

    fn submit_spelling(&mut self) {
        let Some(Mode::Spelling(spelling)) = &mut self.mode else { return };

        if spelling.question().is_some_and(|q| q.answered) {
            self.scheduler.cancel_event(TimerEvent::SpellingClearInput);
            self.scheduler.cancel_event(TimerEvent::SpellingHideFeedback);
            self.spelling_input.clear();
            spelling.next_question();
            return;
        }

        let outcome = spelling.submit(&self.spelling_input, self.speaker.as_ref());
        self.scheduler.cancel_event(TimerEvent::SpellingClearInput);
        self.scheduler.cancel_event(TimerEvent::SpellingHideFeedback);
        if let SpellingAnswer::Retry { .. } = outcome {
            let delay = self.config.spelling.retry_clear_delay();
            self.scheduler.schedule_once(TimerEvent::SpellingClearInput, delay, Instant::now());
        }
    }
}

/// Map `1`-`4` and `a`-`d` to option slots.
fn answer_slot(c: char) -> Option<usize> {
    match c {
        '1'..='4' => c.to_digit(10).map(|d| d as usize - 1),
        'a'..='d' => Some(c as usize - 'a' as usize),
        _ => None,
    }
}
