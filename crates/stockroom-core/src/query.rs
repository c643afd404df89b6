//! Typed list queries and search filters.
//!
//! A search never becomes a query string inside this crate. The raw term is
//! parsed into a [`SearchTerm`], which produces a [`Filter`] made of
//! `(field, operator, value)` [`Condition`]s. Each store adapter translates
//! that value into its native form (PostgREST query parameters, bound SQL
//! parameters, or in-process matching via [`Filter::matches`]).

use std::cmp::Ordering;

use crate::models::Item;

/// A column of the `items` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Name,
    Category,
    Location,
    CreatedAt,
}

impl Field {
    /// Column name in the backing table.
    pub fn column(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Category => "category",
            Field::Location => "location",
            Field::CreatedAt => "created_at",
        }
    }

    fn text_of(self, item: &Item) -> Option<String> {
        match self {
            Field::Id => Some(item.id.clone()),
            Field::Name => item.name.clone(),
            Field::Category => item.category.clone(),
            Field::Location => item.location.clone(),
            Field::CreatedAt => Some(item.created_at.to_rfc3339()),
        }
    }

    fn compare(self, a: &Item, b: &Item) -> Ordering {
        match self {
            Field::CreatedAt => a.created_at.cmp(&b.created_at),
            other => other.text_of(a).cmp(&other.text_of(b)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Exact equality.
    Eq,
    /// Case-insensitive `LIKE`: `%` matches any run, `_` any single character.
    ILike,
}

/// One `(field, operator, value)` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: Field,
    pub op: Operator,
    pub value: String,
}

impl Condition {
    pub fn ilike(field: Field, pattern: impl Into<String>) -> Self {
        Self {
            field,
            op: Operator::ILike,
            value: pattern.into(),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        let Some(text) = self.field.text_of(item) else {
            return false;
        };
        match self.op {
            Operator::Eq => text == self.value,
            Operator::ILike => {
                let pattern: Vec<char> = self.value.to_lowercase().chars().collect();
                let text: Vec<char> = text.to_lowercase().chars().collect();
                like_match(&pattern, &text)
            }
        }
    }
}

/// A filter over items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Matches when at least one condition matches.
    AnyOf(Vec<Condition>),
}

impl Filter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            Filter::AnyOf(conditions) => conditions.iter().any(|c| c.matches(item)),
        }
    }
}

/// Sort order for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub field: Field,
    pub descending: bool,
}

impl Order {
    /// `created_at DESC`.
    pub fn newest_first() -> Self {
        Self {
            field: Field::CreatedAt,
            descending: true,
        }
    }

    /// Compare two items under this order. Ties compare equal so that a
    /// stable sort keeps the store's own order.
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let ord = self.field.compare(a, b);
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::newest_first()
    }
}

/// Everything a store needs to produce a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: Option<Filter>,
    pub order: Order,
}

impl ListQuery {
    /// Every item, newest first.
    pub fn all() -> Self {
        Self::default()
    }

    /// Newest-first listing narrowed by `term` when it holds any text.
    pub fn search(term: Option<&str>) -> Self {
        Self {
            filter: SearchTerm::parse(term).map(|t| t.filter()),
            order: Order::newest_first(),
        }
    }
}

/// A non-empty, trimmed and lowercased search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// Returns `None` when `raw` is absent, empty or only whitespace.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The term wrapped in `%` wildcards on both sides.
    pub fn pattern(&self) -> String {
        format!("%{}%", self.0)
    }

    /// `name ILIKE %term% OR category ILIKE %term%`.
    pub fn filter(&self) -> Filter {
        let pattern = self.pattern();
        Filter::AnyOf(vec![
            Condition::ilike(Field::Name, pattern.clone()),
            Condition::ilike(Field::Category, pattern),
        ])
    }
}

/// SQL `LIKE` matching over already-lowercased characters.
fn like_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // Position of the last `%` seen and the text index it currently covers up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = backtrack {
            backtrack = Some((star_p, star_t + 1));
            p = star_p + 1;
            t = star_t + 1;
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '%')
}
