// Describes the tokens found in documentation comments.
// The tokenizer only ever produces the punctuation kinds, `String`, `Whitespace`, `Newline` and
// `EndOfInput`. `Intro`, `Outro` and the tag names are synthesized by the screener.

/// Block and inline tag names known to the screener.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TagName {
    Api,
    Author,
    Copyright,
    Deprecated,
    InheritDoc,
    Internal,
    Link,
    Method,
    Package,
    Param,
    Property,
    PropertyRead,
    PropertyWrite,
    Return,
    See,
    Since,
    Throws,
    Todo,
    Uses,
    UsedBy,
    Var,
    Version,
}

impl TagName {
    /// Every tag name, in the order they are listed in the documentation.
    pub const ALL: [TagName; 22] = [
        TagName::Api,
        TagName::Author,
        TagName::Copyright,
        TagName::Deprecated,
        TagName::InheritDoc,
        TagName::Internal,
        TagName::Link,
        TagName::Method,
        TagName::Package,
        TagName::Param,
        TagName::Property,
        TagName::PropertyRead,
        TagName::PropertyWrite,
        TagName::Return,
        TagName::See,
        TagName::Since,
        TagName::Throws,
        TagName::Todo,
        TagName::Uses,
        TagName::UsedBy,
        TagName::Var,
        TagName::Version,
    ];

    /// Canonical lowercase spelling, without the leading `@`.
    pub fn as_str(&self) -> &'static str {
        match self {
            TagName::Api => "api",
            TagName::Author => "author",
            TagName::Copyright => "copyright",
            TagName::Deprecated => "deprecated",
            TagName::InheritDoc => "inheritdoc",
            TagName::Internal => "internal",
            TagName::Link => "link",
            TagName::Method => "method",
            TagName::Package => "package",
            TagName::Param => "param",
            TagName::Property => "property",
            TagName::PropertyRead => "property-read",
            TagName::PropertyWrite => "property-write",
            TagName::Return => "return",
            TagName::See => "see",
            TagName::Since => "since",
            TagName::Throws => "throws",
            TagName::Todo => "todo",
            TagName::Uses => "uses",
            TagName::UsedBy => "used-by",
            TagName::Var => "var",
            TagName::Version => "version",
        }
    }

    /// Looks up the word following an `@`. Compound names are only reachable through their base
    /// word: `property` (which the screener may extend to `property-read`/`property-write`) and
    /// `used` (which only counts as a tag once the screener has seen `-by`).
    pub fn from_base_name(word: &str) -> Option<TagName> {
        let name = match word.trim().to_lowercase().as_str() {
            "api" => TagName::Api,
            "author" => TagName::Author,
            "copyright" => TagName::Copyright,
            "deprecated" => TagName::Deprecated,
            "inheritdoc" => TagName::InheritDoc,
            "internal" => TagName::Internal,
            "link" => TagName::Link,
            "method" => TagName::Method,
            "package" => TagName::Package,
            "param" => TagName::Param,
            "property" => TagName::Property,
            "return" => TagName::Return,
            "see" => TagName::See,
            "since" => TagName::Since,
            "throws" => TagName::Throws,
            "todo" => TagName::Todo,
            "uses" => TagName::Uses,
            "used" => TagName::UsedBy,
            "var" => TagName::Var,
            "version" => TagName::Version,
            _ => return None,
        };
        Some(name)
    }

    /// The text a screened tag token carries, e.g. `@property-read`.
    pub fn token_text(&self) -> String {
        format!("@{}", self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TokenKind {
    Star,
    Slash,
    At,
    Dollar,
    OBrace,
    CBrace,
    OAngle,
    CAngle,
    OParen,
    CParen,
    OBrack,
    CBrack,
    Dot,
    Minus,
    Pipe,
    Backslash,
    Colon,
    Amp,
    Comma,
    /// A run of letters. After screening, any text without a more specific kind.
    String,
    Whitespace,
    Newline,
    /// `/**`
    Intro,
    /// `*/`
    Outro,
    EndOfInput,
    Tag(TagName),
}

impl TokenKind {
    /// Maps a single character to its punctuation kind. Anything unknown is `String`.
    pub fn from_char(c: char) -> TokenKind {
        match c {
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '@' => TokenKind::At,
            '$' => TokenKind::Dollar,
            '{' => TokenKind::OBrace,
            '}' => TokenKind::CBrace,
            '<' => TokenKind::OAngle,
            '>' => TokenKind::CAngle,
            '(' => TokenKind::OParen,
            ')' => TokenKind::CParen,
            '[' => TokenKind::OBrack,
            ']' => TokenKind::CBrack,
            '.' => TokenKind::Dot,
            '-' => TokenKind::Minus,
            '|' => TokenKind::Pipe,
            '\\' => TokenKind::Backslash,
            ':' => TokenKind::Colon,
            '&' => TokenKind::Amp,
            ',' => TokenKind::Comma,
            c if c.is_whitespace() => TokenKind::Whitespace,
            _ => TokenKind::String,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, TokenKind::Tag(_))
    }
}

/// A token and where it starts in the comment, as a byte offset.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Token {
        Token {
            kind,
            text: text.into(),
            offset,
        }
    }
}
