//! Recognizers for the small textual grammars found inside tags: names, variables, versions,
//! element references, file paths, email addresses and links.
//!
//! The parser collects the text of a field from the token stream first and then validates it
//! here as a whole, so every `is_*` function requires its recognizer to consume the entire input.
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, alphanumeric1, char, one_of, satisfy},
    combinator::{all_consuming, opt, recognize, verify},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, terminated, tuple},
    Parser,
};

use crate::{ParseInput, ParseResult};

/// Runs `parser` over the whole of `input`.
fn matches_all<'a, O, P>(parser: P, input: &'a str) -> bool
where
    P: Parser<ParseInput<'a>, O, nom::error::Error<ParseInput<'a>>>,
{
    all_consuming(parser)(ParseInput::new(input)).is_ok()
}

/// Parses an identifier, currently \[_A-Za-z]\[_A-Za-z0-9]*.
pub fn identifier(input: ParseInput) -> ParseResult<ParseInput> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// A class or namespace name: identifiers, each optionally preceded by a backslash.
///
/// # Example
/// \Foo\Bar_2
pub fn qualified_name(input: ParseInput) -> ParseResult<ParseInput> {
    recognize(many1(pair(opt(char('\\')), identifier)))(input)
}

/// A `$` followed by an identifier.
pub fn variable(input: ParseInput) -> ParseResult<ParseInput> {
    recognize(pair(char('$'), identifier))(input)
}

fn version_chars(input: ParseInput) -> ParseResult<ParseInput> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))(input)
}

/// One of the accepted version spellings:
/// `1.0.0`/`v1.0.0` (a digit and at least one more character), `@placeholder@`, `$keyword$`
/// or `vcs:` (the keyword itself follows as a separate `$...$` field).
pub fn version(input: ParseInput) -> ParseResult<ParseInput> {
    // `vcs:` goes first: `1.0:` would otherwise stop as `1.0`.
    alt((
        recognize(terminated(version_chars, char(':'))),
        recognize(tuple((
            opt(one_of("vV")),
            satisfy(|c| c.is_ascii_digit()),
            version_chars,
        ))),
        recognize(delimited(char('@'), version_chars, char('@'))),
        recognize(delimited(char('$'), version_chars, char('$'))),
    ))(input)
}

/// A reference to a structural element:
/// `Name::CONSTANT`, `Name::$property`, `Name::method()`, `$variable`, `function()` or `Name`.
pub fn element(input: ParseInput) -> ParseResult<ParseInput> {
    let call = || recognize(pair(identifier, tag("()")));
    let member = recognize(tuple((
        qualified_name,
        tag("::"),
        alt((call(), variable, identifier)),
    )));
    alt((
        all_consuming(member),
        all_consuming(variable),
        all_consuming(recognize(pair(qualified_name, opt(tag("()"))))),
    ))(input)
}

/// A relative or absolute file path. May be empty.
pub fn file_path(input: ParseInput) -> ParseResult<ParseInput> {
    take_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '/' | '_' | '-'))(input)
}

fn email_local_part(input: ParseInput) -> ParseResult<ParseInput> {
    let atext = |c: char| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-".contains(c);
    recognize(separated_list1(char('.'), take_while1(atext)))(input)
}

fn domain_label(input: ParseInput) -> ParseResult<ParseInput> {
    verify(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
        |label: &ParseInput| {
            let label = label.fragment();
            label.len() <= 63 && !label.starts_with('-') && !label.ends_with('-')
        },
    )(input)
}

/// `local@example.org`. The domain needs at least two labels.
pub fn email(input: ParseInput) -> ParseResult<ParseInput> {
    recognize(tuple((
        email_local_part,
        char('@'),
        domain_label,
        many1(pair(char('.'), domain_label)),
    )))(input)
}

pub fn is_identifier(input: &str) -> bool {
    matches_all(identifier, input)
}

pub fn is_qualified_name(input: &str) -> bool {
    matches_all(qualified_name, input)
}

pub fn is_variable(input: &str) -> bool {
    matches_all(variable, input)
}

pub fn is_version(input: &str) -> bool {
    matches_all(version, input)
}

pub fn is_element(input: &str) -> bool {
    matches_all(element, input)
}

pub fn is_file_path(input: &str) -> bool {
    matches_all(file_path, input)
}

pub fn is_email(input: &str) -> bool {
    matches_all(email, input)
}

/// An absolute URL: `scheme://host...` for schemes with an authority (`http`, `ftp`, ...), or
/// `scheme:rest` for the others (`mailto:`, `urn:`).
pub fn is_uri(input: &str) -> bool {
    let Some((scheme, rest)) = input.split_once(':') else {
        return false;
    };
    let scheme_ok = matches_all(
        recognize(pair(
            alpha1,
            take_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        )),
        scheme,
    );
    // `Name::member` is an element reference, not a URI.
    if !scheme_ok || rest.is_empty() || rest.starts_with(':') {
        return false;
    }
    let Ok(url) = url::Url::parse(input) else {
        return false;
    };
    if !url.has_authority() {
        return true;
    }
    // `Url::parse` repairs `https:example.org`; the slashes have to be spelled out.
    let host_ok = url.scheme() == "file" || url.host_str().is_some_and(|h| !h.is_empty());
    rest.starts_with("//") && host_ok
}
