use std::fmt;

use serde::Serialize;

use super::lexer::{is_ident_char, is_keyword};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Delete,
    Ignore,
    Skip,
}

/// Which directories an `exists` predicate is checked against,
/// relative to the directory the rule is evaluated in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Here,
    Parent,
    Parents,
    Child,
    Children,
    Sibling,
}

impl Location {
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "here" => Some(Self::Here),
            "parent" => Some(Self::Parent),
            "parents" => Some(Self::Parents),
            "child" => Some(Self::Child),
            "children" => Some(Self::Children),
            "sibling" => Some(Self::Sibling),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Here => "here",
            Self::Parent => "parent",
            Self::Parents => "parents",
            Self::Child => "child",
            Self::Children => "children",
            Self::Sibling => "sibling",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum Predicate {
    Exists { location: Location, pattern: String },
    Not { negated: Box<Predicate> },
}

impl Predicate {
    pub fn exists(location: Location, pattern: impl Into<String>) -> Self {
        Self::Exists {
            location,
            pattern: pattern.into(),
        }
    }

    pub fn negate(inner: Predicate) -> Self {
        Self::Not {
            negated: Box::new(inner),
        }
    }
}

/// A right-nested chain of `and`-joined predicates: `a and (b and c)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum Condition {
    Leaf { predicate: Predicate },
    And {
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

impl Condition {
    pub fn leaf(predicate: Predicate) -> Self {
        Self::Leaf { predicate }
    }

    /// Folds predicates listed left to right into a right-nested tree.
    /// Returns `None` for an empty list.
    pub fn fold(predicates: Vec<Predicate>) -> Option<Self> {
        let mut iter = predicates.into_iter().rev();
        let last = Self::leaf(iter.next()?);
        Some(iter.fold(last, |right, predicate| Self::And {
            left: Box::new(Self::leaf(predicate)),
            right: Box::new(right),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub action: Action,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Rule {
    pub fn new(action: Action, target: impl Into<String>) -> Self {
        Self {
            action,
            target: target.into(),
            condition: None,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

struct PatternDisplay<'a>(&'a str);

impl fmt::Display for PatternDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let raw = self.0;
        if !raw.is_empty() && !is_keyword(raw) && raw.chars().all(is_ident_char) {
            return f.write_str(raw);
        }
        f.write_str("\"")?;
        for c in raw.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\t' => f.write_str("\\t")?,
                c => write!(f, "{c}")?,
            }
        }
        f.write_str("\"")
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delete => "delete",
            Self::Ignore => "ignore",
            Self::Skip => "skip",
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exists {
                location: Location::Here,
                pattern,
            } => write!(f, "exists {}", PatternDisplay(pattern)),
            Self::Exists { location, pattern } => {
                write!(f, "{location} exists {}", PatternDisplay(pattern))
            }
            Self::Not { negated } => write!(f, "not {negated}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf { predicate } => write!(f, "{predicate}"),
            Self::And { left, right } => write!(f, "{left} and {right}"),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action, PatternDisplay(&self.target))?;
        if let Some(condition) = &self.condition {
            write!(f, " when {condition}")?;
        }
        Ok(())
    }
}
