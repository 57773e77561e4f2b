//! UI rendering for vocab trainer.

use crate::app::{App, Confirm, InputField, Mode, View};
use crate::models::{format_clock, Flashcard, ReportDetail, SessionReport, WrongAnswer};
use crate::quiz::{QuizEngine, QuizPhase};
use crate::spelling::{SpellingEngine, SpellingFeedback, MAX_ATTEMPTS};
use crate::study::StudyEngine;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    match (app.view, &app.mode) {
        (View::Browse, _) => draw_browse(f, app, chunks[1]),
        (View::Study, Some(Mode::Study(study))) => draw_study(f, app, study, chunks[1]),
        (View::Quiz, Some(Mode::Quiz(quiz))) => draw_quiz(f, app, quiz, chunks[1]),
        (View::Spelling, Some(Mode::Spelling(spelling))) => draw_spelling(f, app, spelling, chunks[1]),
        _ => draw_notice(f, app, chunks[1]),
    }

    draw_footer(f, app, chunks[2]);

    if app.show_help {
        draw_help(f);
    }

    if app.editing {
        draw_input(f, app);
    }

    if let Some(confirm) = app.confirm {
        draw_confirm(f, app, confirm);
    }

    if let Some(msg) = &app.message {
        draw_message(f, msg);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let (total, learned) = app.store.stats();
    let tabs: Vec<Span> = [View::Browse, View::Study, View::Quiz, View::Spelling]
        .iter()
        .flat_map(|view| {
            let style = if *view == app.view {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            [Span::styled(format!(" {} ", view.name()), style), Span::raw("|")]
        })
        .collect();

    let mut spans = vec![Span::styled("Vocab Trainer ", Style::default().add_modifier(Modifier::BOLD))];
    spans.extend(tabs);
    spans.push(Span::raw(format!(
        "  {}  {} cards, {} learned",
        app.filters.get(app.view),
        total,
        learned
    )));

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn study_nav_keys(app: &App) -> String {
    let (back, next) = match &app.mode {
        Some(Mode::Study(study)) => (study.can_go_back(), study.can_go_next()),
        _ => (false, false),
    };
    let mut keys = Vec::new();
    if back {
        keys.push("Left:Prev");
    }
    if next {
        keys.push("Right:Next");
    }
    keys.push("Space:Flip  v:Speak  Tab:Category  Esc:Back");
    keys.join("  ")
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let study_keys;
    let keys = match app.view {
        View::Browse => "j/k:Move  Space:Flip  v:Speak  s:Synonyms  e:Edit  d:Delete  D:Delete all  x:Shuffle  Tab:Category  i:Import  1/2/3:Study/Quiz/Spell  ?:Help  q:Quit",
        View::Study => {
            study_keys = study_nav_keys(app);
            study_keys.as_str()
        }
        View::Quiz => "1-4/a-d:Answer  Enter:Skip  Tab:Category  Up/Down:Words  r:Restart  w:Review  Esc:Back",
        View::Spelling => "Enter:Check/Next  Tab:Hint  F2:Speak  Left/Right:Category  Up/Down:Words  F5:Restart  Esc:Back",
    };
    let footer = Paragraph::new(keys)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn draw_browse(f: &mut Frame, app: &App, area: Rect) {
    let cards = app.browse_cards();
    if cards.is_empty() {
        let msg = Paragraph::new("No cards yet. Press 'i' to import a word list.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Cards "));
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let items: Vec<ListItem> = cards
        .iter()
        .map(|card| {
            let mut spans = vec![Span::styled(
                card.word().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if !card.vocabulary.word_type.is_empty() {
                spans.push(Span::styled(
                    format!(" ({})", card.vocabulary.word_type),
                    Style::default().fg(Color::Cyan),
                ));
            }
            if app.flipped.contains(&card.id) {
                spans.push(Span::raw(format!(" - {}", card.meaning())));
            }
            if card.is_learned {
                spans.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = format!(" Cards ({}) ", cards.len());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, chunks[0], &mut state);

    if let Some(card) = cards.get(app.selected) {
        let flipped = app.flipped.contains(&card.id);
        let detail = Paragraph::new(card_lines(app, card, flipped))
            .block(Block::default().borders(Borders::ALL).title(format!(" Category {} ", card.batch)))
            .wrap(Wrap { trim: true });
        f.render_widget(detail, chunks[1]);
    }
}

/// Front of a card, plus the back when revealed.
fn card_lines<'a>(app: &App, card: &'a Flashcard, revealed: bool) -> Vec<Line<'a>> {
    let vocab = &card.vocabulary;
    let mut lines = vec![
        Line::from(Span::styled(
            vocab.word.as_str(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ];
    if !vocab.word_type.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("({})", vocab.word_type),
            Style::default().fg(Color::Cyan),
        )));
    }
    if app.config.display.show_phonetic && !vocab.phonetic.is_empty() {
        lines.push(Line::from(vocab.phonetic.as_str()));
    }
    if !revealed {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Space to reveal", Style::default().fg(Color::DarkGray))));
        return lines;
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        vocab.meaning.as_str(),
        Style::default().fg(Color::Green),
    )));

    if app.config.display.show_examples {
        let synonyms = vocab.synonyms();
        if !synonyms.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(format!("Synonyms: {}", synonyms.join(" · "))));
        } else if !vocab.example_en.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                vocab.example_en.as_str(),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        }
        if !vocab.example_vi.is_empty() {
            lines.push(Line::from(Span::styled(
                vocab.example_vi.as_str(),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }
    lines
}

fn draw_study(f: &mut Frame, app: &App, study: &StudyEngine, area: Rect) {
    if study.is_empty() {
        let msg = Paragraph::new("No cards in this category yet.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Study "));
        f.render_widget(msg, area);
        return;
    }
    let Some(card) = study.current() else { return };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let (learned, total) = study.progress();
    let ratio = if total == 0 { 0.0 } else { learned as f64 / total as f64 };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio)
        .label(format!("Card {} of {} | {} learned", study.cursor() + 1, total, learned));
    f.render_widget(gauge, chunks[0]);

    let title = if study.is_complete() {
        " All learned! "
    } else if card.is_learned {
        " Learned "
    } else {
        " Study "
    };
    let body = Paragraph::new(card_lines(app, card, study.is_flipped()))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(body, chunks[1]);
}

fn draw_quiz(f: &mut Frame, app: &App, quiz: &QuizEngine, area: Rect) {
    if let QuizPhase::Completed(report) = quiz.phase() {
        draw_report(f, app, report, quiz.wrong_answers(), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(5), Constraint::Min(0)])
        .split(area);

    let status = Paragraph::new(format!(
        "Question {} of {}   Score: {}   Time: {}   Words: {}",
        (quiz.position() + 1).min(quiz.total()),
        quiz.total(),
        quiz.score(),
        format_clock(quiz.elapsed_secs()),
        app.effective_count(View::Quiz),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[0]);

    let Some(question) = quiz.question() else { return };

    let prompt = Paragraph::new(question.prompt.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" Which word means "))
        .wrap(Wrap { trim: true });
    f.render_widget(prompt, chunks[1]);

    let feedback = match quiz.phase() {
        QuizPhase::Feedback(feedback) => Some(feedback),
        _ => None,
    };

    let mut lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(slot, option)| {
            let style = match feedback {
                Some(_) if option.card_id == question.target_id => Style::default().fg(Color::Green),
                Some(fb) if option.card_id == fb.chosen => Style::default().fg(Color::Red),
                _ => Style::default(),
            };
            let mut text = format!(" [{}] {}", slot + 1, option.word);
            if !option.word_type.is_empty() {
                text.push_str(&format!(" ({})", option.word_type));
            }
            Line::from(Span::styled(text, style))
        })
        .collect();

    if let Some(fb) = feedback {
        lines.push(Line::from(""));
        lines.push(if fb.correct {
            Line::from(Span::styled("Correct!", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)))
        } else {
            let slot = question.correct_slot().map_or(0, |s| s + 1);
            Line::from(Span::styled(
                format!("Wrong. The answer is [{}] {}", slot, fb.answer),
                Style::default().fg(Color::Red),
            ))
        });
    }

    let options = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Options "));
    f.render_widget(options, chunks[2]);
}

fn draw_spelling(f: &mut Frame, app: &App, spelling: &SpellingEngine, area: Rect) {
    if let Some(report) = spelling.report() {
        draw_report(f, app, report, spelling.wrong_answers(), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let status = Paragraph::new(format!(
        "Question {} of {}   Score: {}   Streak: {}   Right/Wrong: {}/{} ({}%)   Words: {}",
        spelling.position() + 1,
        spelling.total(),
        spelling.score(),
        spelling.streak(),
        spelling.correct_count(),
        spelling.wrong_count(),
        spelling.accuracy(),
        app.effective_count(View::Spelling),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[0]);

    let (Some(card), Some(question)) = (spelling.current(), spelling.question()) else { return };

    let prompt = Paragraph::new(card.meaning())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" Spell the word for "))
        .wrap(Wrap { trim: true });
    f.render_widget(prompt, chunks[1]);

    let mut hint = vec![Span::styled(
        question.hint.as_str(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )];
    if !card.vocabulary.word_type.is_empty() {
        hint.push(Span::raw(format!("  ({})", card.vocabulary.word_type)));
    }
    let hint = Paragraph::new(Line::from(hint))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(format!(" Hint {}/2 ", question.hint_level)));
    f.render_widget(hint, chunks[2]);

    let input_style = match spelling.feedback() {
        Some(SpellingFeedback::Correct { .. }) => Style::default().fg(Color::Green),
        Some(SpellingFeedback::OutOfAttempts { .. }) => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let input = Paragraph::new(app.spelling_input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Attempt {}/{} ",
            (question.attempts + 1).min(MAX_ATTEMPTS),
            MAX_ATTEMPTS
        )));
    f.render_widget(input, chunks[3]);
    if !question.answered && !app.editing {
        let width = app.spelling_input.chars().count() as u16;
        f.set_cursor_position((chunks[3].x + 1 + width, chunks[3].y + 1));
    }

    let feedback = match spelling.feedback() {
        Some(SpellingFeedback::Correct { points }) => Line::from(Span::styled(
            format!("Correct! +{} points. Enter for the next word.", points),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Some(SpellingFeedback::Retry { remaining }) => Line::from(Span::styled(
            format!("Not quite. {} attempt(s) left.", remaining),
            Style::default().fg(Color::Yellow),
        )),
        Some(SpellingFeedback::OutOfAttempts { answer }) => Line::from(Span::styled(
            format!("The word was \"{}\". Enter for the next word.", answer),
            Style::default().fg(Color::Red),
        )),
        None => Line::from(""),
    };
    f.render_widget(Paragraph::new(feedback).alignment(Alignment::Center), chunks[4]);
}

fn draw_report(f: &mut Frame, app: &App, report: &SessionReport, wrong: &[WrongAnswer], area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    let detail = match report.detail {
        ReportDetail::ElapsedSecs(secs) => format!("Time: {}", format_clock(secs)),
        ReportDetail::PeakStreak(streak) => format!("Best streak: {}", streak),
    };
    let lines = vec![
        Line::from(Span::styled(
            report.grade().label(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("Correct: {}   Wrong: {}", report.correct, report.wrong)),
        Line::from(format!("Accuracy: {}%   Score: {}", report.accuracy, report.score)),
        Line::from(detail),
        Line::from(""),
        Line::from(Span::styled(
            "r:Play again  w:Review mistakes  q:Back",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let summary = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Finished "));
    f.render_widget(summary, chunks[0]);

    if !app.show_review {
        return;
    }

    let items: Vec<ListItem> = if wrong.is_empty() {
        vec![ListItem::new("No mistakes!")]
    } else {
        wrong
            .iter()
            .map(|w| {
                let mut spans = vec![Span::styled(w.word.as_str(), Style::default().fg(Color::Red))];
                if !w.word_type.is_empty() {
                    spans.push(Span::raw(format!(" ({})", w.word_type)));
                }
                if !w.phonetic.is_empty() {
                    spans.push(Span::raw(format!(" {}", w.phonetic)));
                }
                spans.push(Span::raw(format!(" - {}", w.meaning)));
                ListItem::new(Line::from(spans))
            })
            .collect()
    };
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Mistakes ({}) ", wrong.len())),
    );
    f.render_widget(list, chunks[1]);
}

fn draw_notice(f: &mut Frame, app: &App, area: Rect) {
    let text = app
        .notice
        .as_deref()
        .unwrap_or("Nothing to practice here yet.");
    let msg = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", app.view.name())))
        .wrap(Wrap { trim: true });
    f.render_widget(msg, area);
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help = r#"
Vocab Trainer Keybindings

Browse:
  j/k, Up/Down    Move
  Space, Enter    Flip card
  v               Speak word
  s               Speak synonyms
  e               Edit all fields (Enter moves to the next)
  d / D           Delete card / all cards
  x               Shuffle
  Tab             Next category
  i               Import a file (.json or text table)
  R               Rescan import directory
  1 / 2 / 3       Study / Quiz / Spelling
  q               Quit

Study:
  Left/Right      Previous / next (marks learned)
  Space           Flip

Quiz:
  1-4, a-d        Answer
  Up/Down         Word count
  r               Restart with current settings

Spelling:
  Enter           Check answer, then next word
  Tab             More hint (-2 points)
  F2              Speak word
  F5              Restart

Press any key to close
"#;

    let popup = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

fn draw_input(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 15, f.area());
    f.render_widget(Clear, area);

    let title = match app.input_field {
        InputField::ImportPath => "Path to import (.json or text table)",
        field => field.prompt(),
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    f.render_widget(input, area);

    let width = app.input_buffer.chars().count() as u16;
    f.set_cursor_position((area.x + 1 + width, area.y + 1));
}

fn draw_confirm(f: &mut Frame, app: &App, confirm: Confirm) {
    let area = centered_rect(50, 15, f.area());
    f.render_widget(Clear, area);

    let question = match confirm {
        Confirm::Delete(id) => {
            let word = app.store.get(id).map(|c| c.word()).unwrap_or("this card");
            format!("Delete \"{}\"? (y/n)", word)
        }
        Confirm::DeleteAll => format!("Delete ALL {} cards? This cannot be undone. (y/n)", app.store.len()),
    };
    let popup = Paragraph::new(question)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title(" Confirm "))
        .wrap(Wrap { trim: true });
    f.render_widget(popup, area);
}

fn draw_message(f: &mut Frame, msg: &str) {
    let area = Rect::new(
        f.area().x + 2,
        f.area().height.saturating_sub(5),
        f.area().width.saturating_sub(4),
        3,
    );
    f.render_widget(Clear, area);

    let message = Paragraph::new(msg)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, area);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Silent;
    use crate::config::Config;
    use crate::db::Database;
    use crate::models::Vocabulary;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::{backend::TestBackend, Terminal};

    fn app_with(words: &[&str]) -> App {
        let db = Database::in_memory().unwrap();
        let mut app = App::with_parts(db, Config::default(), Box::new(Silent), StdRng::seed_from_u64(1)).unwrap();
        let batch = app.store.next_batch();
        for w in words {
            let vocab = Vocabulary::new(*w, format!("meaning of {}", w))
                .with_word_type("n")
                .with_phonetic("/x/")
                .with_examples("Synonyms: one, two", "ví dụ");
            app.store.add(vocab, batch);
        }
        app
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_browse_empty_and_filled() {
        let empty = app_with(&[]);
        assert!(render(&empty).contains("No cards yet"));

        let mut app = app_with(&["apple", "banana"]);
        assert!(render(&app).contains("apple"));
        press(&mut app, KeyCode::Char(' '));
        let screen = render(&app);
        assert!(screen.contains("meaning of apple"));
        assert!(screen.contains("Synonyms: one · two"));
    }

    #[test]
    fn test_every_view_renders() {
        let mut app = app_with(&["apple", "banana", "cherry", "damson"]);
        for key in ['1', '2', '3'] {
            press(&mut app, KeyCode::Esc);
            press(&mut app, KeyCode::Char(key));
            render(&app);
        }
        assert!(render(&app).contains("Spell the word"));
    }

    #[test]
    fn test_study_footer_hides_disabled_moves() {
        let mut app = app_with(&["apple", "banana"]);
        press(&mut app, KeyCode::Char('1'));
        let screen = render(&app);
        assert!(!screen.contains("Left:Prev"));
        assert!(screen.contains("Right:Next"));

        press(&mut app, KeyCode::Right);
        let screen = render(&app);
        assert!(screen.contains("Left:Prev"));
        assert!(screen.contains("Right:Next"));

        press(&mut app, KeyCode::Right);
        let screen = render(&app);
        assert!(screen.contains("Left:Prev"));
        assert!(!screen.contains("Right:Next"));
    }

    #[test]
    fn test_edit_prompts_render() {
        let mut app = app_with(&["apple"]);
        press(&mut app, KeyCode::Char('e'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Enter);
        }
        let screen = render(&app);
        assert!(screen.contains("Phonetic"));
        assert!(screen.contains("/x/"));
    }

    #[test]
    fn test_quiz_notice_when_too_few_cards() {
        let mut app = app_with(&["apple"]);
        press(&mut app, KeyCode::Char('2'));
        assert!(render(&app).contains("need at least 4"));
    }

    #[test]
    fn test_overlays_render() {
        let mut app = app_with(&["apple"]);
        press(&mut app, KeyCode::Char('d'));
        assert!(render(&app).contains("Delete \"apple\""));
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('?'));
        assert!(render(&app).contains("Keybindings"));
    }

    #[test]
    fn test_spelling_report_with_review() {
        let mut app = app_with(&["apple"]);
        press(&mut app, KeyCode::Char('3'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('x'));
            press(&mut app, KeyCode::Enter);
        }
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('w'));
        let screen = render(&app);
        assert!(screen.contains("Keep practicing!"));
        assert!(screen.contains("Mistakes (1)"));
    }
}
