//! Destination selection and per-destination style tables.

/// Publishing destination for one render session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Rich HTML with strict markup constraints (inline-styleable elements,
    /// no scripts, no external stylesheets).
    RichHtml,
    /// Plain text with glyph conventions (emoji bullets, circled numbering).
    PlainText,
}

/// Ordered-list numbering convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OrderedStyle {
    /// `1.` `2.` `3.`
    Arabic,
    /// `①` `②` `③`, falling back to arabic past ⑳.
    Circled,
}

const CIRCLED: [char; 20] = [
    '①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩', '⑪', '⑫', '⑬', '⑭', '⑮', '⑯', '⑰', '⑱',
    '⑲', '⑳',
];

/// Glyph table for one destination.
///
/// The rich-HTML destination expresses structure through markup and mostly
/// ignores the list glyphs; the plain-text destination is built from these.
#[derive(Debug, Clone)]
pub struct StyleTable {
    /// Prefix glyph per heading level (index 0 = h1).
    pub heading_prefixes: [String; 6],
    /// Unordered list bullet.
    pub bullet: String,
    /// Ordered list numbering convention.
    pub ordered: OrderedStyle,
    /// Glyph for a completed task item.
    pub task_checked: String,
    /// Glyph for an open task item.
    pub task_unchecked: String,
}

impl StyleTable {
    /// Defaults for the rich-HTML destination.
    #[must_use]
    pub fn rich_default() -> Self {
        Self {
            heading_prefixes: Default::default(),
            bullet: String::new(),
            ordered: OrderedStyle::Arabic,
            task_checked: String::new(),
            task_unchecked: String::new(),
        }
    }

    /// Defaults for plain-text social destinations.
    #[must_use]
    pub fn plain_default() -> Self {
        Self {
            heading_prefixes: [
                "✦ ".to_owned(),
                "❖ ".to_owned(),
                "◆ ".to_owned(),
                "◇ ".to_owned(),
                "▸ ".to_owned(),
                "· ".to_owned(),
            ],
            bullet: "🔹".to_owned(),
            ordered: OrderedStyle::Circled,
            task_checked: "✅".to_owned(),
            task_unchecked: "⬜".to_owned(),
        }
    }

    /// Default table for a destination.
    #[must_use]
    pub fn for_destination(destination: Destination) -> Self {
        match destination {
            Destination::RichHtml => Self::rich_default(),
            Destination::PlainText => Self::plain_default(),
        }
    }

    /// Prefix glyph for a heading level (1-based, clamped to 6).
    #[must_use]
    pub fn heading_prefix(&self, level: u8) -> &str {
        let index = usize::from(level.clamp(1, 6)) - 1;
        &self.heading_prefixes[index]
    }

    /// Ordered-list marker for a 1-based position.
    #[must_use]
    pub fn ordered_marker(&self, n: u64) -> String {
        match self.ordered {
            OrderedStyle::Arabic => format!("{n}."),
            OrderedStyle::Circled => {
                let index = usize::try_from(n).ok().filter(|i| (1..=20).contains(i));
                match index {
                    Some(i) => CIRCLED[i - 1].to_string(),
                    None => format!("{n}."),
                }
            }
        }
    }
}
