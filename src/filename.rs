//! Movie filename grammar: structured parsing, canonical rendering and sort
//! name derivation.
//!
//! Filenames follow `[Studio] {Series N} Name (Actor, Actor).ext`, every
//! group optional. Token bodies are restricted to letters, digits, space,
//! comma, apostrophe, hyphen and period, so entity names containing the
//! grammar's own delimiters do not round-trip.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

/// Longest stem (without extension) for which the actor list is still
/// appended when rendering. Beyond this the list is silently dropped.
const MAX_STEM_WITH_ACTORS: usize = 250;

lazy_static! {
    static ref STEM_RE: Regex = Regex::new(concat!(
        r"^",
        r"(?:\[([A-Za-z0-9 .,'-]+)\])?",
        r" ?",
        r"(?:\{([A-Za-z0-9 .,'-]+?)(?: ([0-9]+))?\})?",
        r" ?",
        r"([A-Za-z0-9 .,'-]+)?",
        r" ?",
        r"(?:\(([A-Za-z0-9 .,'-]+)\))?",
        r"$",
    ))
    .unwrap();
    static ref NON_SORTABLE_RE: Regex = Regex::new(r"[^a-z0-9 ]").unwrap();
    static ref LEADING_ARTICLE_RE: Regex = Regex::new(r"^(?:a|an|the) ").unwrap();
}

/// Components recovered from a movie filename.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFilename {
    pub name: Option<String>,
    pub studio: Option<String>,
    pub series: Option<String>,
    pub series_number: Option<i64>,
    /// Comma-space joined actor list, exactly as it appears in the filename.
    pub actors: Option<String>,
}

impl ParsedFilename {
    /// Actor names split out of the joined list.
    pub fn actor_names(&self) -> Vec<String> {
        match &self.actors {
            Some(actors) => actors.split(", ").map(str::to_string).collect(),
            None => Vec::new(),
        }
    }
}

/// Everything the renderer needs to know about a movie. Field order mirrors
/// the rendered layout.
#[derive(Debug, Clone, Default)]
pub struct RenderInput<'a> {
    pub studio: Option<&'a str>,
    pub series: Option<&'a str>,
    pub series_number: Option<i64>,
    pub name: Option<&'a str>,
    pub actors: Vec<&'a str>,
    /// Current filename, used for extension recovery and as a fallback when
    /// no component renders anything.
    pub filename: &'a str,
}

/// Parses a filename (with extension) into its structured components.
///
/// A stem that does not match the grammar at all becomes the display name
/// wholesale, with every other field absent.
pub fn parse_filename(filename: &str) -> ParsedFilename {
    let stem = file_stem(filename);
    let Some(captures) = STEM_RE.captures(stem) else {
        return ParsedFilename {
            name: Some(stem.trim().to_string()),
            ..ParsedFilename::default()
        };
    };
    let group = |i: usize| captures.get(i).map(|m| m.as_str().to_string());
    ParsedFilename {
        studio: group(1),
        series: group(2),
        series_number: captures.get(3).and_then(|m| m.as_str().parse().ok()),
        name: group(4).map(|name| name.trim().to_string()),
        actors: group(5),
    }
}

/// Renders the canonical filename for a movie.
///
/// Builds `[studio] {series N} name (actors)` left to right, appends the
/// extension of the current filename, and keeps the current filename
/// unchanged when nothing at all was rendered. The actor list is appended
/// only while the stem stays under the length cutoff.
pub fn render_filename(input: &RenderInput) -> String {
    let ext = file_extension(input.filename);
    let mut rendered = String::new();

    if let Some(studio) = input.studio {
        rendered.push_str(&format!("[{}]", studio));
    }
    if let Some(series) = input.series {
        if !rendered.is_empty() {
            rendered.push(' ');
        }
        rendered.push_str(&format!("{{{}", series));
        if let Some(number) = input.series_number {
            rendered.push_str(&format!(" {}", number));
        }
        rendered.push('}');
    }
    if let Some(name) = input.name {
        if !rendered.is_empty() {
            rendered.push(' ');
        }
        rendered.push_str(name);
    }
    if !input.actors.is_empty() {
        let actors = format!("({})", input.actors.join(", "));
        if rendered.len() + actors.len() < MAX_STEM_WITH_ACTORS {
            if !rendered.is_empty() {
                rendered.push(' ');
            }
            rendered.push_str(&actors);
        }
    }

    if rendered.is_empty() {
        return input.filename.to_string();
    }
    rendered.push_str(ext);
    rendered
}

/// Normalized ordering key: lowercased, stripped of everything outside
/// `[a-z0-9 ]`, with a single leading article removed.
pub fn sort_name(name: Option<&str>) -> String {
    match name {
        Some(name) => {
            let lowercased = name.to_lowercase();
            let lowered = NON_SORTABLE_RE.replace_all(&lowercased, "");
            LEADING_ARTICLE_RE.replace(&lowered, "").into_owned()
        }
        None => String::new(),
    }
}

fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(filename)
}

/// Extension including the leading dot, or `""` when there is none.
fn file_extension(filename: &str) -> &str {
    match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => &filename[filename.len() - ext.len() - 1..],
        None => "",
    }
}
