//! Section heuristics: each resume / JD section is a `SectionRule` (heading
//! pattern, where the block stops, how it splits). Capture and split are pure
//! functions so every rule can be exercised on its own.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Where a captured section block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// First blank line or next heading-shaped line.
    BlankLineOrHeading,
    /// Next heading-shaped line only. Blank lines stay inside the block so
    /// they can separate entries.
    Heading,
}

/// How a captured block is broken into items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPolicy {
    /// Commas, bullet glyphs and newlines all separate items.
    Delimited,
    /// Blank lines separate entries; each entry keeps its inner newlines.
    Paragraphs,
    /// Bullet-marked lines (`•`, `-`, `*`, `N.`) if any exist, else one item
    /// per line. An inline list on the heading line splits on commas.
    BulletsOrLines,
}

#[derive(Debug)]
pub struct SectionRule {
    pub name: &'static str,
    pub heading: Regex,
    pub terminator: Terminator,
    pub split: SplitPolicy,
}

impl SectionRule {
    /// `alternatives` is a regex alternation of heading words, e.g. `skills?`.
    /// The heading must start a line and end with a colon or the line end.
    /// One leading qualifier word ("Technical Skills") is allowed when the
    /// heading has a colon or is capitalised.
    pub fn new(
        name: &'static str,
        alternatives: &str,
        terminator: Terminator,
        split: SplitPolicy,
    ) -> Self {
        let pattern =
            format!(r"(?im)^[ \t]*(?:([a-z]+)[ \t]+)?(?:{alternatives})[ \t]*(:|$)");
        Self {
            name,
            heading: Regex::new(&pattern).expect("section heading pattern is valid"),
            terminator,
            split,
        }
    }

    /// Byte offset just past the first acceptable heading.
    fn find_heading(&self, text: &str) -> Option<usize> {
        self.heading.captures_iter(text).find_map(|caps| {
            let whole = caps.get(0)?;
            let qualified = caps.get(1).is_some();
            let has_colon = caps.get(2).is_some_and(|m| m.as_str() == ":");
            heading_shape_ok(whole.as_str(), qualified, has_colon).then_some(whole.end())
        })
    }
}

pub static SKILLS: Lazy<SectionRule> = Lazy::new(|| {
    SectionRule::new(
        "skills",
        "skills?",
        Terminator::BlankLineOrHeading,
        SplitPolicy::Delimited,
    )
});

pub static EDUCATION: Lazy<SectionRule> = Lazy::new(|| {
    SectionRule::new(
        "education",
        "education",
        Terminator::Heading,
        SplitPolicy::Paragraphs,
    )
});

pub static EXPERIENCE: Lazy<SectionRule> = Lazy::new(|| {
    SectionRule::new(
        "experience",
        "experience|employment|work",
        Terminator::Heading,
        SplitPolicy::Paragraphs,
    )
});

pub static REQUIREMENTS: Lazy<SectionRule> = Lazy::new(|| {
    SectionRule::new(
        "requirements",
        "requirements|qualifications",
        Terminator::BlankLineOrHeading,
        SplitPolicy::BulletsOrLines,
    )
});

pub static RESPONSIBILITIES: Lazy<SectionRule> = Lazy::new(|| {
    SectionRule::new(
        "responsibilities",
        "responsibilities|duties|role",
        Terminator::BlankLineOrHeading,
        SplitPolicy::BulletsOrLines,
    )
});

/// `Capitalized Words:` alone on a line.
static GENERIC_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*[A-Z][\w&/ -]{0,40}:[ \t]*$").expect("generic heading pattern is valid")
});

/// A known section word, optionally qualified, optionally followed by a colon.
static KNOWN_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^[ \t]*(?:([a-z]+)[ \t]+)?(?:skills?|education|experience|employment|work|projects?|certifications?|summary|profile|objective|requirements|qualifications|responsibilities|duties|role|about(?:[ \t]+us)?|benefits|contact|interests|awards|publications|references)[ \t]*(:.*)?$",
    )
    .expect("known heading pattern is valid")
});

static DELIMITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,•\n]").expect("delimiter pattern is valid"));

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("paragraph pattern is valid"));

static BULLET_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[•▪●*-][ \t]*|\d+[.)][ \t]+)(.*\S)").expect("bullet pattern is valid")
});

/// Raw text captured under a heading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionBlock {
    /// Text after the colon on the heading line itself.
    pub inline: String,
    /// Following lines up to the terminator.
    pub body: String,
}

impl SectionBlock {
    pub fn is_empty(&self) -> bool {
        self.inline.trim().is_empty() && self.body.trim().is_empty()
    }

    fn joined(&self) -> String {
        match (self.inline.is_empty(), self.body.is_empty()) {
            (true, _) => self.body.clone(),
            (false, true) => self.inline.clone(),
            (false, false) => format!("{}\n{}", self.inline, self.body),
        }
    }
}

/// Locates the first heading matching `rule` and captures its block.
/// Returns `None` when the heading does not occur.
pub fn capture_section(text: &str, rule: &SectionRule) -> Option<SectionBlock> {
    let start = rule.find_heading(text)?;
    let rest = &text[start..];
    let (inline, body) = match rest.find('\n') {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => (rest, ""),
    };

    let mut lines = Vec::new();
    for line in body.lines() {
        let blank = line.trim().is_empty();
        if blank && rule.terminator == Terminator::BlankLineOrHeading {
            break;
        }
        if !blank && is_heading_line(line) {
            break;
        }
        lines.push(line);
    }

    Some(SectionBlock {
        inline: inline.trim().to_string(),
        body: lines.join("\n").trim_end().to_string(),
    })
}

/// Breaks a captured block into trimmed, non-empty items per `policy`.
pub fn split_block(block: &SectionBlock, policy: SplitPolicy) -> Vec<String> {
    match policy {
        SplitPolicy::Delimited => DELIMITERS
            .split(&block.joined())
            .map(clean_item)
            .filter(|s| !s.is_empty())
            .collect(),
        SplitPolicy::Paragraphs => PARAGRAPH_BREAK
            .split(block.joined().trim())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        SplitPolicy::BulletsOrLines => {
            let joined = block.joined();
            let bullets: Vec<String> = BULLET_LINE
                .captures_iter(&joined)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !bullets.is_empty() {
                return bullets;
            }

            let mut items: Vec<String> = block
                .inline
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            items.extend(
                block
                    .body
                    .lines()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            );
            items
        }
    }
}

/// Captures and splits in one step. Missing heading → empty list.
pub fn extract_items(text: &str, rule: &SectionRule) -> Vec<String> {
    match capture_section(text, rule) {
        Some(block) if !block.is_empty() => split_block(&block, rule.split),
        Some(_) => {
            debug!("Section '{}' has a heading but no content", rule.name);
            vec![]
        }
        None => {
            debug!("Section '{}' not found", rule.name);
            vec![]
        }
    }
}

/// True when `line` opens another section and so ends the current block.
pub fn is_heading_line(line: &str) -> bool {
    if GENERIC_HEADING.is_match(line) {
        return true;
    }
    KNOWN_HEADING.captures(line).is_some_and(|caps| {
        caps.get(0).is_some_and(|whole| {
            heading_shape_ok(whole.as_str(), caps.get(1).is_some(), caps.get(2).is_some())
        })
    })
}

/// A qualified heading ("Work Experience") needs a colon or capitalised
/// words, so prose like "Rust experience" is not taken for a heading.
fn heading_shape_ok(matched: &str, qualified: bool, has_colon: bool) -> bool {
    if !qualified || has_colon {
        return true;
    }
    matched
        .split(':')
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .all(|word| word.chars().next().is_some_and(char::is_uppercase))
}

fn clean_item(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['-', '*', '▪', '●', '·'])
        .trim()
        .to_string()
}
