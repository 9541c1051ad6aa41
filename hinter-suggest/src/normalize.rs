//! Cleaning up search terms before they are looked up.
//!
//! Terms go through a [`SanitizePolicy`] to strip markup, then are lowercased
//! and stripped of punctuation. Optionally, letters from other scripts that
//! look exactly like Latin letters (Cyrillic `о`, Greek `Ο`, ...) are folded
//! onto their Latin twins, so that terms typed with the wrong keyboard layout
//! still match.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::{collections::HashSet, sync::Arc};

lazy_static! {
    /// An opening, closing or self-closing tag. Group 1 is the tag name.
    static ref TAG: Regex = Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").unwrap();

    /// A comment, or any other markup declaration.
    static ref DECLARATION: Regex = Regex::new(r"(?s)<!.*?>").unwrap();

    /// The entities that commonly show up in pasted text.
    static ref ENTITY: Regex = Regex::new(r"&(amp|lt|gt|quot|#39|apos|nbsp);").unwrap();
}

/// Which markup survives sanitization.
///
/// The policy is compiled once at startup and shared by every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizePolicy {
    /// Lowercase names of the tags that are kept. Every other tag is removed,
    /// keeping its text content.
    allowed_tags: HashSet<String>,
}

impl SanitizePolicy {
    /// A policy that removes all markup.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Keep the given tags, in addition to any already allowed.
    #[must_use]
    pub fn allow_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_tags
            .extend(tags.into_iter().map(|t| t.as_ref().to_lowercase()));
        self
    }

    /// Remove disallowed markup and control characters from `input`, then
    /// decode common HTML entities.
    ///
    /// Entities are decoded last, so escaped markup such as `&lt;b&gt;`
    /// survives as literal text.
    pub fn sanitize(&self, input: &str) -> String {
        let without_declarations = DECLARATION.replace_all(input, "");
        let without_tags = TAG.replace_all(&without_declarations, |caps: &Captures| {
            if self.allowed_tags.contains(&caps[1].to_lowercase()) {
                caps[0].to_string()
            } else {
                String::new()
            }
        });
        let without_controls: String = without_tags
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        ENTITY
            .replace_all(&without_controls, |caps: &Captures| {
                match &caps[1] {
                    "amp" => "&",
                    "lt" => "<",
                    "gt" => ">",
                    "quot" => "\"",
                    "#39" | "apos" => "'",
                    _ => " ",
                }
                .to_string()
            })
            .into_owned()
    }
}

/// Sanitize, lowercase, drop punctuation and collapse whitespace.
pub fn normalize_string(input: &str, policy: &SanitizePolicy) -> String {
    let sanitized = policy.sanitize(input);
    let folded: String = sanitized
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'ё' => 'е',
            c if c.is_alphanumeric() => c,
            _ => ' ',
        })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Like [`normalize_string`], but also folds look-alike letters onto Latin
/// after lowercasing.
pub fn equal_shaped_normalize_string(input: &str, policy: &SanitizePolicy) -> String {
    to_equal_shaped_latin(&normalize_string(input, policy))
}

/// Replace Cyrillic and Greek letters that are drawn the same as a Latin
/// letter with that Latin letter. Other characters are kept.
pub fn to_equal_shaped_latin(input: &str) -> String {
    input.chars().map(equal_shaped_latin).collect()
}

/// The Latin twin of `c`, or `c` itself.
fn equal_shaped_latin(c: char) -> char {
    match c {
        // Cyrillic
        'А' => 'A',
        'В' => 'B',
        'Е' => 'E',
        'К' => 'K',
        'М' => 'M',
        'Н' => 'H',
        'О' => 'O',
        'Р' => 'P',
        'С' => 'C',
        'Т' => 'T',
        'У' => 'Y',
        'Х' => 'X',
        'Ѕ' => 'S',
        'І' => 'I',
        'Ј' => 'J',
        'Ԛ' => 'Q',
        'Ԝ' => 'W',
        'а' => 'a',
        'е' => 'e',
        'о' => 'o',
        'р' => 'p',
        'с' => 'c',
        'у' => 'y',
        'х' => 'x',
        'ѕ' => 's',
        'і' => 'i',
        'ј' => 'j',
        'ԛ' => 'q',
        'ԝ' => 'w',
        // Greek
        'Α' => 'A',
        'Β' => 'B',
        'Ε' => 'E',
        'Ζ' => 'Z',
        'Η' => 'H',
        'Ι' => 'I',
        'Κ' => 'K',
        'Μ' => 'M',
        'Ν' => 'N',
        'Ο' => 'O',
        'Ρ' => 'P',
        'Τ' => 'T',
        'Υ' => 'Y',
        'Χ' => 'X',
        'ο' => 'o',
        c => c,
    }
}

/// A search term as typed, and the form it is looked up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTerm {
    /// The term as typed, after equal-shaped folding if that is enabled.
    pub part: String,

    /// The term to look up.
    pub normalized: String,
}

/// Normalizes search terms and index keys the same way.
#[derive(Debug, Clone)]
pub struct Normalizer {
    /// Markup policy, shared with every clone of this normalizer.
    policy: Arc<SanitizePolicy>,

    /// Whether to fold look-alike letters onto Latin.
    equal_shaped: bool,
}

impl Normalizer {
    /// Create a normalizer using `policy`.
    pub fn new(policy: SanitizePolicy, equal_shaped: bool) -> Self {
        Self {
            policy: Arc::new(policy),
            equal_shaped,
        }
    }

    /// Whether look-alike letters are folded onto Latin.
    pub fn equal_shaped(&self) -> bool {
        self.equal_shaped
    }

    /// Normalize a string with this normalizer's mode.
    pub fn normalize(&self, input: &str) -> String {
        if self.equal_shaped {
            equal_shaped_normalize_string(input, &self.policy)
        } else {
            normalize_string(input, &self.policy)
        }
    }

    /// Turn a raw search term into the pair of strings a lookup needs.
    ///
    /// In equal-shaped mode the raw term itself is folded first, so the lookup
    /// sees the folded spelling in both places.
    pub fn prepare(&self, part: &str) -> PreparedTerm {
        let part = if self.equal_shaped {
            to_equal_shaped_latin(part)
        } else {
            part.to_string()
        };
        let normalized = self.normalize(&part);
        PreparedTerm { part, normalized }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(SanitizePolicy::strict(), false)
    }
}
