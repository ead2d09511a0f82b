//! Randomized cosmetic rewrites applied to model output.

use crate::config::RewriteConfig;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

mod random;

pub use random::{RandomSource, SeededRandom, SequenceRandom, ThreadRandom};

const INTERJECTIONS: &[&str] = &["Interestingly,", "Surprisingly,", "Notably,"];
const EMPHASIS_SENTENCE: &str = "This point deserves emphasis.";

static SUBSTITUTIONS: Lazy<Vec<Substitution>> = Lazy::new(|| {
    vec![
        Substitution::new(
            "for example",
            &[(0.7, "for instance"), (0.4, "as an illustration")],
            "say",
        ),
        Substitution::new("therefore", &[(0.6, "consequently"), (0.3, "thus")], "so"),
        Substitution::new("utilize", &[], "use"),
        Substitution::new(
            "in conclusion",
            &[(0.7, "To summarize"), (0.4, "Ultimately")],
            "In summary",
        ),
        Substitution::new(
            "this shows that",
            &[(0.6, "This demonstrates"), (0.3, "This indicates")],
            "This means",
        ),
    ]
});

static SENTENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^.!?]+)([.!?])").expect("valid regex"));
static SENTENCE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid regex"));
static DANGLING_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^.?!\s])\s*\n").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}|\n").expect("valid regex"));

/// Words shorter than this are never treated as accidental repeats.
const MIN_REPEATED_WORD_LEN: usize = 5;

struct Substitution {
    pattern: Regex,
    /// Tried in order, each with a fresh draw; the first whose threshold the
    /// draw exceeds wins.
    alternatives: &'static [(f64, &'static str)],
    fallback: &'static str,
}

impl Substitution {
    fn new(
        phrase: &str,
        alternatives: &'static [(f64, &'static str)],
        fallback: &'static str,
    ) -> Self {
        let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(phrase)))
            .expect("valid substitution pattern");
        Self {
            pattern,
            alternatives,
            fallback,
        }
    }

    fn pick(&self, random: &mut dyn RandomSource) -> &'static str {
        for &(threshold, alternative) in self.alternatives {
            if random.next_f64() > threshold {
                return alternative;
            }
        }
        self.fallback
    }
}

#[derive(Clone, Debug, Default)]
pub struct Rewriter {
    config: RewriteConfig,
}

impl Rewriter {
    pub fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    pub fn rewrite(&self, text: &str, random: &mut dyn RandomSource) -> String {
        let text = substitute_phrases(text, random);
        let text = self.add_interjections(&text, random);
        let text = self.add_emphasis(&text, random);
        cleanup(&text)
    }

    fn add_interjections(&self, text: &str, random: &mut dyn RandomSource) -> String {
        SENTENCE
            .replace_all(text, |caps: &Captures| {
                if random.next_f64() <= self.config.interjection_threshold {
                    return caps[0].to_string();
                }
                let interjection = INTERJECTIONS[random.next_index(INTERJECTIONS.len())];

                let body = &caps[1];
                let trimmed = body.trim_start();
                if trimmed.is_empty() {
                    return caps[0].to_string();
                }
                let lead = &body[..body.len() - trimmed.len()];
                format!(
                    "{lead}{interjection} {}{}",
                    lowercase_sentence_start(trimmed),
                    &caps[2]
                )
            })
            .into_owned()
    }

    fn add_emphasis(&self, text: &str, random: &mut dyn RandomSource) -> String {
        text.split("\n\n")
            .map(|paragraph| {
                if random.next_f64() > self.config.emphasis_threshold
                    && paragraph.chars().count() > self.config.emphasis_min_len
                {
                    let mut sentences = split_sentences(paragraph);
                    if sentences.len() > 2 {
                        sentences.insert(1, EMPHASIS_SENTENCE);
                        return sentences.join(" ");
                    }
                }
                paragraph.to_string()
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn substitute_phrases(text: &str, random: &mut dyn RandomSource) -> String {
    let mut text = text.to_string();
    for substitution in SUBSTITUTIONS.iter() {
        text = substitution
            .pattern
            .replace_all(&text, |caps: &Captures| {
                match_case(&caps[0], substitution.pick(random))
            })
            .into_owned();
    }
    text
}

/// Deterministic final pass: drops repeated words, turns dangling newlines
/// into sentence ends and squeezes whitespace. Applying it twice changes
/// nothing.
pub fn cleanup(text: &str) -> String {
    let text = collapse_repeated_words(text);
    let text = DANGLING_NEWLINE.replace_all(&text, "${1}. ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

fn collapse_repeated_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0;
    let mut previous: Option<&str> = None;

    for word in WORD.find_iter(text) {
        let gap = &text[last_end..word.start()];
        let repeated = previous.map_or(false, |p| is_repeat(p, word.as_str()))
            && !gap.is_empty()
            && gap.chars().all(char::is_whitespace);

        if !repeated {
            out.push_str(gap);
            out.push_str(word.as_str());
            previous = Some(word.as_str());
        }
        last_end = word.end();
    }
    out.push_str(&text[last_end..]);
    out
}

fn is_repeat(previous: &str, word: &str) -> bool {
    previous.chars().count() >= MIN_REPEATED_WORD_LEN
        && previous.to_lowercase() == word.to_lowercase()
}

fn split_sentences(paragraph: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for brk in SENTENCE_BREAK.find_iter(paragraph) {
        // terminators are ascii, the sentence keeps its own
        sentences.push(&paragraph[start..brk.start() + 1]);
        start = brk.end();
    }
    if start < paragraph.len() {
        sentences.push(&paragraph[start..]);
    }
    sentences
}

/// Gives `replacement` the capitalization of the first letter of `matched`.
fn match_case(matched: &str, replacement: &str) -> String {
    let upper = matched.chars().next().map_or(false, char::is_uppercase);
    with_first_char_case(replacement, upper)
}

fn lowercase_sentence_start(sentence: &str) -> String {
    let first_word = sentence
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default();
    let keep = first_word == "I" || first_word.chars().nth(1).map_or(false, char::is_uppercase);
    if keep {
        sentence.to_string()
    } else {
        with_first_char_case(sentence, false)
    }
}

fn with_first_char_case(s: &str, upper: bool) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if upper => first.to_uppercase().chain(chars).collect(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
