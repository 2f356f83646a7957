//! Numbered interactive menu: search, details, export, exit.
//!
//! The menu is a thin driver over [`Explorer`]; it owns the only state of a session
//! ([`ExplorerState`]) and reads input through a [`Prompt`] so scripted input can
//! stand in for the terminal.
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;
use std::io::{self, Write};

use crate::errors::{ExplorerError, Result};
use crate::explorer::{ExportOutcome, ExportTargets, Explorer};
use crate::graph::{MovieDetail, MovieSummary};
use crate::utils::table;

/// Actors listed in the details view before the rest is summarized.
pub const MAX_LISTED_ACTORS: usize = 5;

const RULE: &str = "==================================================";

/// Source of menu input.
pub trait Prompt {
    /// Next line with surrounding whitespace removed; `None` ends the session.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// Terminal input with line editing and history.
pub struct EditorPrompt {
    editor: DefaultEditor,
}

impl EditorPrompt {
    /// # Errors
    /// `ExplorerError::Io` if the terminal cannot be set up.
    pub fn new() -> Result<Self> {
        let editor =
            DefaultEditor::new().map_err(|e| ExplorerError::Io(io::Error::other(e.to_string())))?;
        Ok(Self { editor })
    }
}

impl Prompt for EditorPrompt {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let line = line.trim().to_string();
                if !line.is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Some(line)
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => None,
            Err(e) => {
                tracing::warn!(error = %e, "terminal input failed");
                None
            }
        }
    }
}

/// Pre-recorded input; runs out like end of input.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    lines: VecDeque<String>,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }
}

impl Prompt for ScriptedPrompt {
    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.lines.pop_front().map(|l| l.trim().to_string())
    }
}

/// What the menu remembers between choices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerState {
    pub last_results: Vec<MovieSummary>,
    pub selected: Option<MovieSummary>,
}

enum Pick {
    Chosen(usize),
    NotANumber,
    OutOfRange,
    Ended,
}

fn pick_number(prompt: &mut dyn Prompt, count: usize) -> Pick {
    let Some(line) = prompt.read_line(&format!("Movie number (1-{count}): ")) else {
        return Pick::Ended;
    };
    match line.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Pick::Chosen(n - 1),
        Ok(_) => Pick::OutOfRange,
        Err(_) => Pick::NotANumber,
    }
}

fn year_text(year: Option<i64>) -> String {
    year.map_or_else(|| "unknown".to_string(), |y| y.to_string())
}

/// Search hits as a numbered table, or a one-line notice when there are none.
#[must_use]
pub fn render_movie_list(movies: &[MovieSummary]) -> String {
    if movies.is_empty() {
        return "No results found.".to_string();
    }
    let rows: Vec<Vec<String>> = movies
        .iter()
        .enumerate()
        .map(|(i, m)| vec![(i + 1).to_string(), m.title.clone(), year_text(m.released_year)])
        .collect();
    format!(
        "{} movie(s) found:\n{}",
        movies.len(),
        table::render(&["#", "Title", "Released"], &rows)
    )
}

#[must_use]
pub fn render_details(detail: &MovieDetail) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "Movie details".to_string(),
        RULE.to_string(),
        format!("Title: {}", detail.title),
        format!("Released: {}", year_text(detail.released_year)),
    ];
    if let Some(tagline) = &detail.tagline {
        lines.push(format!("Tagline: {tagline}"));
    }

    lines.push(String::new());
    lines.push("Directors:".to_string());
    if detail.directors.is_empty() {
        lines.push("   (no director information)".to_string());
    }
    lines.extend(detail.directors.iter().map(|d| format!("   - {d}")));

    lines.push(String::new());
    lines.push("Actors:".to_string());
    if detail.actors.is_empty() {
        lines.push("   (no actor information)".to_string());
    }
    lines.extend(detail.actors.iter().take(MAX_LISTED_ACTORS).map(|a| format!("   - {a}")));
    if detail.actors.len() > MAX_LISTED_ACTORS {
        lines.push(format!("   ... and {} more", detail.actors.len() - MAX_LISTED_ACTORS));
    }
    lines.push(RULE.to_string());
    lines.join("\n")
}

fn print_menu(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Movie Graph Explorer")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "1. Search movies")?;
    writeln!(out, "2. Show movie details")?;
    writeln!(out, "3. Export graph.json for the selected movie")?;
    writeln!(out, "4. Exit")?;
    writeln!(out, "{RULE}")
}

/// Run the menu until the user exits or input ends.
///
/// Failures of individual operations are reported on `out` and the menu keeps going.
///
/// # Errors
/// Only failures writing to `out`.
pub fn run_menu(
    explorer: &Explorer<'_>,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
    state: &mut ExplorerState,
    targets: &ExportTargets,
) -> io::Result<()> {
    loop {
        print_menu(out)?;
        let Some(choice) = prompt.read_line("Choice (1-4): ") else {
            writeln!(out, "Session ended.")?;
            return Ok(());
        };
        let keep_going = match choice.as_str() {
            "1" => search(explorer, prompt, out, state)?,
            "2" => details(explorer, prompt, out, state)?,
            "3" => export(explorer, prompt, out, state, targets)?,
            "4" => {
                writeln!(out, "Exiting...")?;
                return Ok(());
            }
            _ => {
                writeln!(out, "Invalid choice. Enter a number from 1 to 4.")?;
                true
            }
        };
        if !keep_going {
            writeln!(out, "Session ended.")?;
            return Ok(());
        }
    }
}

// Each handler returns Ok(false) when input ended mid-dialog.

fn search(
    explorer: &Explorer<'_>,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
    state: &mut ExplorerState,
) -> io::Result<bool> {
    let Some(term) = prompt.read_line("Movie title to search: ") else {
        return Ok(false);
    };
    if term.is_empty() {
        writeln!(out, "Search term cannot be empty.")?;
        return Ok(true);
    }
    match explorer.search_movies(&term) {
        Ok(movies) => {
            writeln!(out, "{}", render_movie_list(&movies))?;
            state.last_results = movies;
        }
        Err(e) => {
            tracing::warn!(error = %e, "search failed");
            state.last_results.clear();
            writeln!(out, "Search failed: {e}")?;
        }
    }
    Ok(true)
}

fn details(
    explorer: &Explorer<'_>,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
    state: &mut ExplorerState,
) -> io::Result<bool> {
    if state.last_results.is_empty() {
        writeln!(out, "Search for movies first.")?;
        return Ok(true);
    }
    let index = match pick_number(prompt, state.last_results.len()) {
        Pick::Chosen(i) => i,
        Pick::NotANumber => {
            writeln!(out, "Please enter a valid number.")?;
            return Ok(true);
        }
        Pick::OutOfRange => {
            writeln!(out, "Invalid number. Pick one from the list.")?;
            return Ok(true);
        }
        Pick::Ended => return Ok(false),
    };
    let movie = state.last_results[index].clone();
    state.selected = Some(movie.clone());
    match explorer.movie_details(&movie.title) {
        Ok(Some(detail)) => writeln!(out, "{}", render_details(&detail))?,
        Ok(None) => writeln!(out, "No details found for '{}'.", movie.title)?,
        Err(e) => {
            tracing::warn!(error = %e, title = %movie.title, "details failed");
            writeln!(out, "Details failed: {e}")?;
        }
    }
    Ok(true)
}

fn export(
    explorer: &Explorer<'_>,
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
    state: &mut ExplorerState,
    targets: &ExportTargets,
) -> io::Result<bool> {
    let movie = match &state.selected {
        Some(movie) => movie.clone(),
        None if state.last_results.is_empty() => {
            writeln!(out, "Select a movie first (use 'Show movie details').")?;
            return Ok(true);
        }
        None => {
            writeln!(out, "No movie selected; pick one of the last search results.")?;
            match pick_number(prompt, state.last_results.len()) {
                Pick::Chosen(i) => {
                    let movie = state.last_results[i].clone();
                    state.selected = Some(movie.clone());
                    movie
                }
                Pick::NotANumber | Pick::OutOfRange => {
                    writeln!(out, "Invalid number.")?;
                    return Ok(true);
                }
                Pick::Ended => return Ok(false),
            }
        }
    };

    writeln!(out, "Exporting '{}'...", movie.title)?;
    match explorer.export(&movie.title, targets) {
        Ok(ExportOutcome::Written { path, graph }) => {
            writeln!(
                out,
                "graph.json written: {} ({} nodes, {} links)",
                path.display(),
                graph.nodes.len(),
                graph.links.len()
            )?;
            if let Some(dot) = &targets.dot {
                writeln!(out, "DOT written: {}", dot.display())?;
            }
        }
        Ok(ExportOutcome::NotFound) => {
            writeln!(out, "Could not export: movie '{}' not found.", movie.title)?;
        }
        Err(e) => {
            tracing::warn!(error = %e, title = %movie.title, "export failed");
            writeln!(out, "Export failed: {e}")?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(actors: usize) -> MovieDetail {
        MovieDetail {
            title: "Heat".into(),
            released_year: None,
            tagline: None,
            directors: vec![],
            actors: (1..=actors).map(|i| format!("Actor {i}")).collect(),
        }
    }

    #[test]
    fn details_truncate_long_cast() {
        let text = render_details(&detail(8));
        assert!(text.contains("Released: unknown"));
        assert!(text.contains("(no director information)"));
        assert!(text.contains("   - Actor 5"));
        assert!(!text.contains("Actor 6"));
        assert!(text.contains("   ... and 3 more"));
        assert!(!text.contains("Tagline"));
    }

    #[test]
    fn details_exactly_five_actors_has_no_summary() {
        let text = render_details(&detail(5));
        assert!(text.contains("   - Actor 5"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn empty_result_list_notice() {
        assert_eq!(render_movie_list(&[]), "No results found.");
    }

    #[test]
    fn scripted_prompt_trims_and_runs_out() {
        let mut p = ScriptedPrompt::new([" 2 ", "x"]);
        assert_eq!(p.read_line("?").as_deref(), Some("2"));
        assert_eq!(p.read_line("?").as_deref(), Some("x"));
        assert_eq!(p.read_line("?"), None);
    }

    #[test]
    fn pick_number_bounds() {
        let mut p = ScriptedPrompt::new(["0", "3", "abc", "2"]);
        assert!(matches!(pick_number(&mut p, 2), Pick::OutOfRange));
        assert!(matches!(pick_number(&mut p, 2), Pick::OutOfRange));
        assert!(matches!(pick_number(&mut p, 2), Pick::NotANumber));
        assert!(matches!(pick_number(&mut p, 2), Pick::Chosen(1)));
        assert!(matches!(pick_number(&mut p, 2), Pick::Ended));
    }
}
