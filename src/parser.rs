//! Recursive-descent parser turning a documentation comment into a `Document`.
//!
//! The parser drives a `Screener` and never looks at raw characters itself. Optional fields
//! (versions, types) are parsed speculatively: the cursor position is saved before the attempt
//! and restored if it fails, and the field takes its default value.
use tracing::debug;

use crate::ast::{
    placeholder, ApiTag, AuthorTag, BlockTags, CopyrightTag, DeprecatedTag, Description,
    Direction, Document, InheritDocTag, InternalTag, LinkTag, MethodArgument,
    MethodTag, PackageTag, ParamTag, PropertyTag, RawApi, RawAuthor, RawCopyright,
    RawDeprecated, RawInheritDoc, RawInternal, RawLink, RawMethod, RawPackage, RawParam,
    RawProperty, RawReturn, RawSee, RawSince, RawThrows, RawTodo, RawUsedBy, RawUses, RawVar,
    RawVersion, ReturnTag, SeeTag, SinceTag, Tag, ThrowsTag, TodoTag, UsedByTag, UsesTag, VarTag,
    VersionTag,
};
use crate::error::ParseError;
use crate::grammar;
use crate::screener::Screener;
use crate::token::{TagName, Token, TokenKind};

/// Parses a single comment. A parser is used up by `parse`.
pub struct Parser<'a> {
    // The trimmed comment, quoted by every error.
    comment: &'a str,
    screener: Screener<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(comment: &'a str) -> Parser<'a> {
        let comment = comment.trim();
        Parser {
            comment,
            screener: Screener::new(comment),
        }
    }

    /// Parses the whole comment, from `/**` to `*/`. An empty comment gives an empty document.
    pub fn parse(mut self) -> Result<Document, ParseError> {
        let result = self.parse_comment();
        if let Err(err) = &result {
            debug!(%err, "failed to parse comment");
        }
        result
    }

    #[tracing::instrument(level = "debug", skip(self), fields(len = self.comment.len()))]
    fn parse_comment(&mut self) -> Result<Document, ParseError> {
        if self.comment.is_empty() {
            return Ok(Document::default());
        }
        self.skip_whitespace()?;
        self.match_token(TokenKind::Intro)?;
        self.skip_whitespace()?;
        let mut inline_tags = vec![];
        let text = self.parse_description(&mut inline_tags, false)?;
        let tags = self.parse_block_tags()?;
        self.match_token(TokenKind::Outro)?;
        self.skip_whitespace()?;
        self.match_token(TokenKind::EndOfInput)?;
        Ok(Document {
            description: Description::new(&text, inline_tags),
            tags,
        })
    }

    fn parse_block_tags(&mut self) -> Result<BlockTags, ParseError> {
        let mut tags = BlockTags::default();
        while let Some(TokenKind::Tag(name)) = self.current_kind()? {
            match name {
                TagName::Api => tags.api = Some(self.parse_api_tag()?),
                TagName::Author => tags.author.push(self.parse_author_tag()?),
                TagName::Copyright => tags.copyright.push(self.parse_copyright_tag()?),
                TagName::Deprecated => tags.deprecated = Some(self.parse_deprecated_tag()?),
                TagName::InheritDoc => tags.inherit_doc = Some(self.parse_inherit_doc_tag(false)?),
                TagName::Internal => tags.internal.push(self.parse_internal_tag(false)?),
                TagName::Link => tags.link.push(self.parse_link_tag(false)?),
                TagName::Method => tags.method.push(self.parse_method_tag()?),
                TagName::Package => tags.package = Some(self.parse_package_tag()?),
                TagName::Param => tags.param.push(self.parse_param_tag()?),
                TagName::Property | TagName::PropertyRead | TagName::PropertyWrite => {
                    tags.property.push(self.parse_property_tag()?)
                }
                TagName::Return => tags.returns = Some(self.parse_return_tag()?),
                TagName::See => tags.see.push(self.parse_see_tag()?),
                TagName::Since => tags.since.push(self.parse_since_tag()?),
                TagName::Throws => tags.throws.push(self.parse_throws_tag()?),
                TagName::Todo => tags.todo.push(self.parse_todo_tag()?),
                TagName::Uses => tags.uses.push(self.parse_uses_tag()?),
                TagName::UsedBy => tags.used_by.push(self.parse_used_by_tag()?),
                TagName::Var => tags.var = Some(self.parse_var_tag()?),
                TagName::Version => tags.version.push(self.parse_version_tag()?),
            }
            self.skip_whitespace()?;
        }
        Ok(tags)
    }

    /// Collects text up to the next block tag, the end of the comment or (inside an inline tag)
    /// the closing `}`. Inline tags are appended to `inline_tags` and replaced by placeholders.
    fn parse_description(
        &mut self,
        inline_tags: &mut Vec<Tag>,
        is_inline: bool,
    ) -> Result<String, ParseError> {
        let mut text = String::new();
        while let Some(token) = self.current()? {
            let kind = token.kind;
            if kind.is_tag() || kind == TokenKind::Outro || (is_inline && kind == TokenKind::CBrace)
            {
                return Ok(text);
            }
            if kind == TokenKind::OBrace {
                self.screener.reset_peek();
                let next = self
                    .screener
                    .peek_while_any(&[TokenKind::Whitespace])?
                    .map(|t| t.kind);
                let inline: Option<Tag> = match next {
                    Some(TokenKind::Tag(TagName::InheritDoc)) => {
                        Some(self.parse_inherit_doc_tag(true)?.into())
                    }
                    Some(TokenKind::Tag(TagName::Internal)) => {
                        Some(self.parse_internal_tag(true)?.into())
                    }
                    Some(TokenKind::Tag(TagName::Link)) => Some(self.parse_link_tag(true)?.into()),
                    _ => None,
                };
                if let Some(tag) = inline {
                    text.push_str(&placeholder(inline_tags.len()));
                    inline_tags.push(tag);
                    continue;
                }
            }
            text.push_str(&token.text);
            self.screener.move_next();
        }
        Err(self.unexpected_end())
    }

    fn parse_trailing_description(&mut self, is_inline: bool) -> Result<Description, ParseError> {
        let mut inline_tags = vec![];
        let text = self.parse_description(&mut inline_tags, is_inline)?;
        Ok(Description::new(&text, inline_tags))
    }

    fn parse_api_tag(&mut self) -> Result<ApiTag, ParseError> {
        self.match_tag(TagName::Api)?;
        Ok(ApiTag::bare(RawApi))
    }

    fn parse_author_tag(&mut self) -> Result<AuthorTag, ParseError> {
        self.match_tag(TagName::Author)?;
        self.skip_whitespace()?;
        let name = self.collect_until(|k| {
            k.is_tag() || matches!(k, TokenKind::OAngle | TokenKind::Outro)
        })?;
        let mut email = String::new();
        if self.screener.is_token(TokenKind::OAngle)? {
            self.match_token(TokenKind::OAngle)?;
            email = self.collect_until(|k| k == TokenKind::CAngle)?.trim().to_string();
            if self.current_kind()?.is_none() {
                return Err(self.unexpected_end());
            }
            if !grammar::is_email(&email) {
                return Err(ParseError::InvalidEmail {
                    email,
                    comment: self.comment.to_string(),
                });
            }
            self.match_token(TokenKind::CAngle)?;
        }
        Ok(AuthorTag::bare(RawAuthor {
            name: name.trim().to_string(),
            email,
        }))
    }

    fn parse_copyright_tag(&mut self) -> Result<CopyrightTag, ParseError> {
        self.match_tag(TagName::Copyright)?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(CopyrightTag::new(RawCopyright, description))
    }

    fn parse_deprecated_tag(&mut self) -> Result<DeprecatedTag, ParseError> {
        self.match_tag(TagName::Deprecated)?;
        self.skip_whitespace()?;
        let version = self.speculate(|p| p.parse_version());
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(DeprecatedTag::new(RawDeprecated { version }, description))
    }

    fn parse_inherit_doc_tag(&mut self, is_inline: bool) -> Result<InheritDocTag, ParseError> {
        if is_inline {
            self.match_token(TokenKind::OBrace)?;
            self.skip_whitespace()?;
        }
        self.match_tag(TagName::InheritDoc)?;
        if is_inline {
            self.skip_whitespace()?;
            self.match_token(TokenKind::CBrace)?;
        }
        Ok(InheritDocTag::bare(RawInheritDoc))
    }

    fn parse_internal_tag(&mut self, is_inline: bool) -> Result<InternalTag, ParseError> {
        if is_inline {
            self.match_token(TokenKind::OBrace)?;
            self.skip_whitespace()?;
        }
        self.match_tag(TagName::Internal)?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(is_inline)?;
        if is_inline {
            self.match_token(TokenKind::CBrace)?;
        }
        Ok(InternalTag::new(RawInternal, description))
    }

    fn parse_link_tag(&mut self, is_inline: bool) -> Result<LinkTag, ParseError> {
        if is_inline {
            self.match_token(TokenKind::OBrace)?;
            self.skip_whitespace()?;
        }
        self.match_tag(TagName::Link)?;
        self.skip_whitespace()?;
        let uri = self.parse_link()?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(is_inline)?;
        if is_inline {
            self.match_token(TokenKind::CBrace)?;
        }
        Ok(LinkTag::new(RawLink { uri }, description))
    }

    fn parse_method_tag(&mut self) -> Result<MethodTag, ParseError> {
        self.match_tag(TagName::Method)?;
        self.skip_whitespace()?;
        let return_type = self.parse_optional_type("void");

        let name = self.collect_until(|k| k == TokenKind::OParen)?;
        if !grammar::is_identifier(&name) {
            return Err(ParseError::InvalidMethod {
                name,
                comment: self.comment.to_string(),
            });
        }
        self.match_token(TokenKind::OParen)?;
        self.skip_whitespace()?;

        let mut arguments = vec![];
        while !matches!(self.current_kind()?, None | Some(TokenKind::CParen)) {
            let type_expr = self.parse_optional_type("mixed");
            let name = self.parse_variable()?;
            arguments.push(MethodArgument { type_expr, name });
            self.skip_whitespace()?;
            if !self.screener.is_token(TokenKind::Comma)? {
                break;
            }
            self.match_token(TokenKind::Comma)?;
            self.skip_whitespace()?;
        }
        self.match_token(TokenKind::CParen)?;

        let description = self.parse_trailing_description(false)?;
        Ok(MethodTag::new(
            RawMethod {
                return_type,
                name,
                arguments,
            },
            description,
        ))
    }

    fn parse_package_tag(&mut self) -> Result<PackageTag, ParseError> {
        self.match_tag(TagName::Package)?;
        self.skip_whitespace()?;
        // Namespaces are spelled like class names.
        let name = self.parse_class_name()?;
        Ok(PackageTag::bare(RawPackage { name }))
    }

    fn parse_param_tag(&mut self) -> Result<ParamTag, ParseError> {
        self.match_tag(TagName::Param)?;
        self.skip_whitespace()?;
        let type_expr = self.parse_optional_type("mixed");
        let name = self.parse_optional_variable()?;
        let description = self.parse_trailing_description(false)?;
        Ok(ParamTag::new(RawParam { type_expr, name }, description))
    }

    fn parse_property_tag(&mut self) -> Result<PropertyTag, ParseError> {
        let token = self.current()?.ok_or_else(|| self.unexpected_end())?;
        let direction = match token.kind {
            TokenKind::Tag(TagName::Property) => Direction::READ_WRITE,
            TokenKind::Tag(TagName::PropertyRead) => Direction::READ,
            TokenKind::Tag(TagName::PropertyWrite) => Direction::WRITE,
            _ => return Err(self.unexpected(&token)),
        };
        self.screener.move_next();
        self.skip_whitespace()?;
        let type_expr = self.parse_optional_type("mixed");
        let name = self.parse_variable()?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(PropertyTag::new(
            RawProperty {
                direction,
                type_expr,
                name,
            },
            description,
        ))
    }

    fn parse_return_tag(&mut self) -> Result<ReturnTag, ParseError> {
        self.match_tag(TagName::Return)?;
        self.skip_whitespace()?;
        let type_expr = self.parse_type(false)?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(ReturnTag::new(RawReturn { type_expr }, description))
    }

    fn parse_see_tag(&mut self) -> Result<SeeTag, ParseError> {
        self.match_tag(TagName::See)?;
        self.skip_whitespace()?;
        let reference = match self.speculate(|p| p.parse_link()) {
            Some(link) => link,
            None => self.parse_element()?,
        };
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(SeeTag::new(RawSee { reference }, description))
    }

    fn parse_since_tag(&mut self) -> Result<SinceTag, ParseError> {
        self.match_tag(TagName::Since)?;
        self.skip_whitespace()?;
        let version = self.parse_version()?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(SinceTag::new(RawSince { version }, description))
    }

    fn parse_throws_tag(&mut self) -> Result<ThrowsTag, ParseError> {
        self.match_tag(TagName::Throws)?;
        self.skip_whitespace()?;
        let class = self.parse_class_name()?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(ThrowsTag::new(RawThrows { class }, description))
    }

    fn parse_todo_tag(&mut self) -> Result<TodoTag, ParseError> {
        self.match_tag(TagName::Todo)?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(TodoTag::new(RawTodo, description))
    }

    fn parse_uses_tag(&mut self) -> Result<UsesTag, ParseError> {
        self.match_tag(TagName::Uses)?;
        self.skip_whitespace()?;
        let reference = self.parse_reference()?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(UsesTag::new(RawUses { reference }, description))
    }

    fn parse_used_by_tag(&mut self) -> Result<UsedByTag, ParseError> {
        self.match_tag(TagName::UsedBy)?;
        self.skip_whitespace()?;
        let reference = self.parse_reference()?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(UsedByTag::new(RawUsedBy { reference }, description))
    }

    fn parse_var_tag(&mut self) -> Result<VarTag, ParseError> {
        self.match_tag(TagName::Var)?;
        self.skip_whitespace()?;
        let type_expr = self.parse_optional_type("mixed");
        let name = self.parse_optional_variable()?;
        let description = self.parse_trailing_description(false)?;
        Ok(VarTag::new(RawVar { type_expr, name }, description))
    }

    fn parse_version_tag(&mut self) -> Result<VersionTag, ParseError> {
        self.match_tag(TagName::Version)?;
        self.skip_whitespace()?;
        let version = self.parse_version()?;
        self.skip_whitespace()?;
        let description = self.parse_trailing_description(false)?;
        Ok(VersionTag::new(RawVersion { version }, description))
    }

    /// Parses a type expression such as `int|string[]` or `(A&B)[]|null`.
    ///
    /// At the top level the expression ends before whitespace or `*/`. With `recursive` set it
    /// must be wrapped in parentheses, which are kept in the result.
    fn parse_type(&mut self, recursive: bool) -> Result<String, ParseError> {
        if recursive {
            self.match_token(TokenKind::OParen)?;
        }
        let mut text = String::new();
        loop {
            let token = self.current()?.ok_or_else(|| self.unexpected_end())?;
            match token.kind {
                TokenKind::OParen => text.push_str(&self.parse_type(true)?),
                TokenKind::Dollar => {
                    self.screener.move_next();
                    match self.current()? {
                        Some(word)
                            if word.kind == TokenKind::String
                                && word.text.to_lowercase() == "this" =>
                        {
                            text.push_str("$this");
                            self.screener.move_next();
                        }
                        Some(other) => return Err(self.unexpected(&other)),
                        None => return Err(self.unexpected_end()),
                    }
                }
                TokenKind::Backslash | TokenKind::String => {
                    text.push_str(&self.parse_class_name()?)
                }
                // Includes whitespace and `*/` right after an operator or an opening parenthesis.
                _ => return Err(self.unexpected(&token)),
            }

            while self.screener.is_token(TokenKind::OBrack)? {
                self.match_token(TokenKind::OBrack)?;
                self.match_token(TokenKind::CBrack)?;
                text.push_str("[]");
            }

            match self.current()? {
                None => break,
                Some(next) => match next.kind {
                    TokenKind::Whitespace | TokenKind::Outro => break,
                    TokenKind::CParen if recursive => break,
                    TokenKind::Amp | TokenKind::Pipe => {
                        text.push_str(&next.text);
                        self.screener.move_next();
                    }
                    _ => return Err(self.unexpected(&next)),
                },
            }
        }
        if recursive {
            self.match_token(TokenKind::CParen)?;
            return Ok(format!("({})", text));
        }
        Ok(text)
    }

    /// Speculatively parses a type and the whitespace after it, falling back to `default`.
    fn parse_optional_type(&mut self, default: &str) -> String {
        self.speculate(|p| {
            let type_expr = p.parse_type(false)?;
            p.skip_whitespace()?;
            Ok(type_expr)
        })
        .unwrap_or_else(|| default.to_string())
    }

    fn parse_class_name(&mut self) -> Result<String, ParseError> {
        let name =
            self.collect_until(|k| !matches!(k, TokenKind::String | TokenKind::Backslash))?;
        if !grammar::is_qualified_name(&name) {
            return Err(ParseError::InvalidType {
                name,
                comment: self.comment.to_string(),
            });
        }
        Ok(name)
    }

    fn parse_variable(&mut self) -> Result<String, ParseError> {
        self.match_token(TokenKind::Dollar)?;
        let name = format!("${}", self.collect_until(|k| k != TokenKind::String)?);
        if !grammar::is_variable(&name) {
            return Err(ParseError::InvalidVariable {
                name,
                comment: self.comment.to_string(),
            });
        }
        Ok(name)
    }

    // A variable and the whitespace after it, if the next token starts one.
    fn parse_optional_variable(&mut self) -> Result<Option<String>, ParseError> {
        if !self.screener.is_token(TokenKind::Dollar)? {
            return Ok(None);
        }
        let name = self.parse_variable()?;
        self.skip_whitespace()?;
        Ok(Some(name))
    }

    fn parse_version(&mut self) -> Result<String, ParseError> {
        let version = self.collect_until(|k| matches!(k, TokenKind::Whitespace | TokenKind::Outro))?;
        if !grammar::is_version(&version) {
            return Err(ParseError::InvalidVersion {
                version,
                comment: self.comment.to_string(),
            });
        }
        if !version.ends_with(':') {
            return Ok(version);
        }

        // `vcs: $keyword$`
        self.skip_whitespace()?;
        self.match_token(TokenKind::Dollar)?;
        let mut version = format!("{} $", version);
        loop {
            let token = self.current()?.ok_or_else(|| self.unexpected_end())?;
            self.screener.move_next();
            version.push_str(&token.text);
            if token.kind == TokenKind::Dollar {
                return Ok(version);
            }
        }
    }

    fn parse_link(&mut self) -> Result<String, ParseError> {
        let link = self.collect_until(|k| {
            matches!(k, TokenKind::Whitespace | TokenKind::Outro | TokenKind::CBrace)
        })?;
        if !grammar::is_uri(&link) {
            return Err(ParseError::InvalidLink {
                link,
                comment: self.comment.to_string(),
            });
        }
        Ok(link)
    }

    fn parse_element(&mut self) -> Result<String, ParseError> {
        let name = self.collect_until(|k| matches!(k, TokenKind::Whitespace | TokenKind::Outro))?;
        if !grammar::is_element(&name) {
            return Err(ParseError::InvalidElement {
                name,
                comment: self.comment.to_string(),
            });
        }
        Ok(name)
    }

    // Tried in order: link, element, file path.
    fn parse_reference(&mut self) -> Result<String, ParseError> {
        if let Some(link) = self.speculate(|p| p.parse_link()) {
            return Ok(link);
        }
        if let Some(element) = self.speculate(|p| p.parse_element()) {
            return Ok(element);
        }
        let name = self.collect_until(|k| matches!(k, TokenKind::Whitespace | TokenKind::Outro))?;
        if !grammar::is_file_path(&name) {
            return Err(ParseError::InvalidFile {
                name,
                comment: self.comment.to_string(),
            });
        }
        Ok(name)
    }

    /// Runs `attempt`; on failure rewinds the cursor to where it was and returns `None`.
    fn speculate<T>(
        &mut self,
        attempt: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Option<T> {
        let position = self.screener.position();
        match attempt(self) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(position, %err, "rolling back");
                self.screener.set_position(position);
                None
            }
        }
    }

    // Concatenates token texts until `stop` holds for the current token or the input ends.
    fn collect_until(&mut self, stop: impl Fn(TokenKind) -> bool) -> Result<String, ParseError> {
        let mut text = String::new();
        while let Some(token) = self.screener.get_token()? {
            if stop(token.kind) {
                break;
            }
            text.push_str(&token.text);
            self.screener.move_next();
        }
        Ok(text)
    }

    /// Consumes the current token if it has the given kind.
    fn match_token(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.current()? {
            None => Err(self.unexpected_end()),
            Some(token) if token.kind != kind => Err(self.unexpected(&token)),
            Some(token) => {
                self.screener.move_next();
                Ok(token)
            }
        }
    }

    fn match_tag(&mut self, name: TagName) -> Result<Token, ParseError> {
        self.match_token(TokenKind::Tag(name))
    }

    fn skip_whitespace(&mut self) -> Result<(), ParseError> {
        self.screener.skip_while(TokenKind::Whitespace)
    }

    fn current(&mut self) -> Result<Option<Token>, ParseError> {
        Ok(self.screener.get_token()?.cloned())
    }

    fn current_kind(&mut self) -> Result<Option<TokenKind>, ParseError> {
        Ok(self.screener.get_token()?.map(|t| t.kind))
    }

    fn unexpected(&self, token: &Token) -> ParseError {
        ParseError::unexpected_token(token, self.comment)
    }

    fn unexpected_end(&self) -> ParseError {
        ParseError::unexpected_end(self.comment)
    }
}
