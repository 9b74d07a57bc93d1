//! Token tree model.
//!
//! Parsing produces a tree of [`Token`]s owned by their parent. Every token is
//! tagged with a [`TokenKind`] carrying kind-specific data, and a coarse
//! [`Kind`] tag used for render dispatch.

use crate::placeholder::PlaceholderId;

/// Coarse node-kind tag.
///
/// One tag per [`TokenKind`] variant, used as the key of the render dispatch
/// table. Computed once per node via [`TokenKind::tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Document,
    Paragraph,
    Heading,
    Quote,
    Callout,
    Widget,
    CodeBlock,
    List,
    Item,
    Table,
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    Link,
    Image,
    LocalImage,
    Text,
    InlineCode,
    Html,
    Mark,
    Icon,
    FootnoteRef,
    FootnoteSection,
    FootnoteDef,
    MathInline,
    MathBlock,
    Rule,
    HardBreak,
    SoftBreak,
}

/// Callout flavor, parsed from the `[!kind]` marker of a classified quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl CalloutKind {
    /// Parse a marker name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "note" | "info" => Some(Self::Note),
            "tip" | "hint" => Some(Self::Tip),
            "important" => Some(Self::Important),
            "warning" | "warn" => Some(Self::Warning),
            "caution" | "danger" => Some(Self::Caution),
            _ => None,
        }
    }

    /// Display label used when the callout has no explicit title.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }

    /// CSS class suffix for the rich-HTML destination.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }
}

/// Classification of a blockquote, computed once from its marker line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteClass {
    /// Ordinary quote, no marker.
    Plain,
    /// `[!note]`-style callout with an optional inline title.
    Callout {
        kind: CalloutKind,
        title: Option<String>,
    },
    /// `[!widget]` box whose body is a widget spec for the remote renderer.
    Widget,
}

/// Classify a blockquote by its first line.
///
/// Recognizes `[!name]` markers at the start of the line followed by an
/// optional title. Unknown marker names classify as [`QuoteClass::Plain`] so
/// unrecognized custom blocks fall back to default quote rendering.
#[must_use]
pub fn classify_quote(first_line: &str) -> QuoteClass {
    let line = first_line.trim_start();
    let Some(rest) = line.strip_prefix("[!") else {
        return QuoteClass::Plain;
    };
    let Some(close) = rest.find(']') else {
        return QuoteClass::Plain;
    };
    let name = &rest[..close];
    let title = rest[close + 1..].trim();

    if name.eq_ignore_ascii_case("widget") {
        return QuoteClass::Widget;
    }
    match CalloutKind::parse(name) {
        Some(kind) => QuoteClass::Callout {
            kind,
            title: if title.is_empty() {
                None
            } else {
                Some(title.to_owned())
            },
        },
        None => QuoteClass::Plain,
    }
}

/// Tagged node data.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Root of the tree.
    Document,
    Paragraph,
    /// Heading. `number` and `anchor` are assigned during the annotation pass.
    Heading {
        level: u8,
        number: Option<String>,
        anchor: Option<String>,
    },
    /// Plain blockquote.
    Quote,
    /// Classified callout box.
    Callout {
        kind: CalloutKind,
        title: Option<String>,
    },
    /// Classified widget box. `source` is the raw widget spec; the
    /// placeholder is assigned when the spec is submitted for remote render.
    Widget {
        source: String,
        placeholder: Option<PlaceholderId>,
    },
    /// Fenced or indented code block. `rendered` holds precomputed highlight
    /// markup stashed by the annotation pass.
    CodeBlock {
        lang: Option<String>,
        source: String,
        rendered: Option<String>,
    },
    /// List; `start` is `Some` for ordered lists.
    List { start: Option<u64> },
    /// List item; `task` is `Some(checked)` for task-list items.
    Item { task: Option<bool> },
    Table { columns: usize },
    TableHead,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Strikethrough,
    /// Link. `reference` is assigned when a destination renders links as
    /// numbered references instead of hyperlinks.
    Link {
        url: String,
        title: String,
        reference: Option<usize>,
    },
    /// Remote image; children hold the alt text.
    Image { url: String, title: String },
    /// Locally referenced image; `key` is the canonical registry key assigned
    /// during the annotation pass. Children hold the alt text.
    LocalImage { origin: String, key: Option<String> },
    Text(String),
    InlineCode(String),
    /// Raw HTML passed through from the source document.
    Html(String),
    /// `==marked==` span; children hold the content.
    Mark,
    /// `:icon[name]` inline icon.
    Icon { name: String },
    /// Footnote reference; `index` is assigned in source order.
    FootnoteRef {
        label: String,
        index: Option<usize>,
    },
    /// Synthetic container holding all hoisted footnote definitions.
    FootnoteSection,
    FootnoteDef {
        label: String,
        index: Option<usize>,
    },
    MathInline {
        source: String,
        placeholder: Option<PlaceholderId>,
    },
    MathBlock {
        source: String,
        placeholder: Option<PlaceholderId>,
    },
    Rule,
    HardBreak,
    SoftBreak,
}

impl TokenKind {
    /// The coarse dispatch tag for this node.
    #[must_use]
    pub fn tag(&self) -> Kind {
        match self {
            Self::Document => Kind::Document,
            Self::Paragraph => Kind::Paragraph,
            Self::Heading { .. } => Kind::Heading,
            Self::Quote => Kind::Quote,
            Self::Callout { .. } => Kind::Callout,
            Self::Widget { .. } => Kind::Widget,
            Self::CodeBlock { .. } => Kind::CodeBlock,
            Self::List { .. } => Kind::List,
            Self::Item { .. } => Kind::Item,
            Self::Table { .. } => Kind::Table,
            Self::TableHead => Kind::TableHead,
            Self::TableRow => Kind::TableRow,
            Self::TableCell => Kind::TableCell,
            Self::Emphasis => Kind::Emphasis,
            Self::Strong => Kind::Strong,
            Self::Strikethrough => Kind::Strikethrough,
            Self::Link { .. } => Kind::Link,
            Self::Image { .. } => Kind::Image,
            Self::LocalImage { .. } => Kind::LocalImage,
            Self::Text(_) => Kind::Text,
            Self::InlineCode(_) => Kind::InlineCode,
            Self::Html(_) => Kind::Html,
            Self::Mark => Kind::Mark,
            Self::Icon { .. } => Kind::Icon,
            Self::FootnoteRef { .. } => Kind::FootnoteRef,
            Self::FootnoteSection => Kind::FootnoteSection,
            Self::FootnoteDef { .. } => Kind::FootnoteDef,
            Self::MathInline { .. } => Kind::MathInline,
            Self::MathBlock { .. } => Kind::MathBlock,
            Self::Rule => Kind::Rule,
            Self::HardBreak => Kind::HardBreak,
            Self::SoftBreak => Kind::SoftBreak,
        }
    }
}

/// A node in the parsed tree, exclusively owned by its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub children: Vec<Token>,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(kind: TokenKind, children: Vec<Token>) -> Self {
        Self { kind, children }
    }

    /// Concatenated text content of this subtree.
    ///
    /// Collects `Text` and `InlineCode` leaves; soft breaks become newlines.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            TokenKind::Text(t) | TokenKind::InlineCode(t) => out.push_str(t),
            TokenKind::SoftBreak | TokenKind::HardBreak => out.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}
