//! Defines the document model produced by the parser.
//!
//! Naming convention: RawFoo is the payload of a Foo tag without its description. Foo wraps it
//! in `Described`, which adds the description text and the inline tags referenced from it.

/// Text of a description together with the inline tags it refers to.
///
/// Every inline tag is replaced in `text` by the placeholder `{{{{i}}}}`, where `i` is the tag's
/// index in `inline_tags`.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Description {
    pub text: String,
    pub inline_tags: Vec<Tag>,
}

impl Description {
    /// Surrounding whitespace is not part of a description.
    pub fn new(text: &str, inline_tags: Vec<Tag>) -> Description {
        Description {
            text: text.trim().to_string(),
            inline_tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.inline_tags.is_empty()
    }
}

impl From<&str> for Description {
    fn from(text: &str) -> Self {
        Description::new(text, vec![])
    }
}

/// The placeholder standing in for inline tag `index` inside a description.
pub fn placeholder(index: usize) -> String {
    format!("{{{{{{{{{}}}}}}}}}", index)
}

/// A tag payload together with its description.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Described<Thing> {
    pub description: Description,
    pub thing: Thing,
}

impl<Thing> Described<Thing> {
    pub fn new(thing: Thing, description: Description) -> Described<Thing> {
        Described { description, thing }
    }

    /// For tags which never carry a description.
    pub fn bare(thing: Thing) -> Described<Thing> {
        Described::new(thing, Description::default())
    }
}

/// Whether a `@property` can be read, written or both.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Direction {
    pub readable: bool,
    pub writable: bool,
}

impl Direction {
    pub const READ: Direction = Direction {
        readable: true,
        writable: false,
    };
    pub const WRITE: Direction = Direction {
        readable: false,
        writable: true,
    };
    pub const READ_WRITE: Direction = Direction {
        readable: true,
        writable: true,
    };
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawApi;

pub type ApiTag = Described<RawApi>;

/// `@author name <email>`. Both parts may be empty.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawAuthor {
    pub name: String,
    pub email: String,
}

pub type AuthorTag = Described<RawAuthor>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawCopyright;

pub type CopyrightTag = Described<RawCopyright>;

/// `@deprecated [version] [description]`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawDeprecated {
    pub version: Option<String>,
}

pub type DeprecatedTag = Described<RawDeprecated>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawInheritDoc;

pub type InheritDocTag = Described<RawInheritDoc>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawInternal;

pub type InternalTag = Described<RawInternal>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawLink {
    pub uri: String,
}

pub type LinkTag = Described<RawLink>;

/// One argument of a `@method` signature.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodArgument {
    pub type_expr: String,
    pub name: String,
}

impl From<(&str, &str)> for MethodArgument {
    fn from((type_expr, name): (&str, &str)) -> Self {
        MethodArgument {
            type_expr: type_expr.to_string(),
            name: name.to_string(),
        }
    }
}

/// `@method [return type] name(args) [description]`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawMethod {
    pub return_type: String,
    pub name: String,
    pub arguments: Vec<MethodArgument>,
}

pub type MethodTag = Described<RawMethod>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawPackage {
    pub name: String,
}

pub type PackageTag = Described<RawPackage>;

/// `@param [type] [$name] [description]`. The type defaults to `mixed`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawParam {
    pub type_expr: String,
    pub name: Option<String>,
}

pub type ParamTag = Described<RawParam>;

/// `@property`, `@property-read` and `@property-write`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawProperty {
    pub direction: Direction,
    pub type_expr: String,
    pub name: String,
}

pub type PropertyTag = Described<RawProperty>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawReturn {
    pub type_expr: String,
}

pub type ReturnTag = Described<RawReturn>;

/// `@see` refers to either a link or an element.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawSee {
    pub reference: String,
}

pub type SeeTag = Described<RawSee>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawSince {
    pub version: String,
}

pub type SinceTag = Described<RawSince>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawThrows {
    pub class: String,
}

pub type ThrowsTag = Described<RawThrows>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawTodo;

pub type TodoTag = Described<RawTodo>;

/// `@uses` refers to either an element or a file.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawUses {
    pub reference: String,
}

pub type UsesTag = Described<RawUses>;

/// The counterpart of `@uses`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawUsedBy {
    pub reference: String,
}

pub type UsedByTag = Described<RawUsedBy>;

/// `@var [type] [$name] [description]`. The type defaults to `mixed`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawVar {
    pub type_expr: String,
    pub name: Option<String>,
}

pub type VarTag = Described<RawVar>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RawVersion {
    pub version: String,
}

pub type VersionTag = Described<RawVersion>;

/// Any tag. Inline tags are stored this way; block tags get typed slots in `BlockTags`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum RawTag {
    Api(RawApi),
    Author(RawAuthor),
    Copyright(RawCopyright),
    Deprecated(RawDeprecated),
    InheritDoc(RawInheritDoc),
    Internal(RawInternal),
    Link(RawLink),
    Method(RawMethod),
    Package(RawPackage),
    Param(RawParam),
    Property(RawProperty),
    Return(RawReturn),
    See(RawSee),
    Since(RawSince),
    Throws(RawThrows),
    Todo(RawTodo),
    Uses(RawUses),
    UsedBy(RawUsedBy),
    Var(RawVar),
    Version(RawVersion),
}

pub type Tag = Described<RawTag>;

macro_rules! into_tag {
    ($($raw:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<Described<$raw>> for Tag {
                fn from(tag: Described<$raw>) -> Self {
                    Described {
                        description: tag.description,
                        thing: RawTag::$variant(tag.thing),
                    }
                }
            }
        )*
    };
}

into_tag! {
    RawApi => Api,
    RawAuthor => Author,
    RawCopyright => Copyright,
    RawDeprecated => Deprecated,
    RawInheritDoc => InheritDoc,
    RawInternal => Internal,
    RawLink => Link,
    RawMethod => Method,
    RawPackage => Package,
    RawParam => Param,
    RawProperty => Property,
    RawReturn => Return,
    RawSee => See,
    RawSince => Since,
    RawThrows => Throws,
    RawTodo => Todo,
    RawUses => Uses,
    RawUsedBy => UsedBy,
    RawVar => Var,
    RawVersion => Version,
}

/// The block tags of a comment. A repeated singleton tag keeps its last occurrence.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct BlockTags {
    pub api: Option<ApiTag>,
    pub author: Vec<AuthorTag>,
    pub copyright: Vec<CopyrightTag>,
    pub deprecated: Option<DeprecatedTag>,
    pub inherit_doc: Option<InheritDocTag>,
    pub internal: Vec<InternalTag>,
    pub link: Vec<LinkTag>,
    pub method: Vec<MethodTag>,
    pub package: Option<PackageTag>,
    pub param: Vec<ParamTag>,
    pub property: Vec<PropertyTag>,
    pub returns: Option<ReturnTag>,
    pub see: Vec<SeeTag>,
    pub since: Vec<SinceTag>,
    pub throws: Vec<ThrowsTag>,
    pub todo: Vec<TodoTag>,
    pub used_by: Vec<UsedByTag>,
    pub uses: Vec<UsesTag>,
    pub var: Option<VarTag>,
    pub version: Vec<VersionTag>,
}

impl BlockTags {
    pub fn is_empty(&self) -> bool {
        *self == BlockTags::default()
    }
}

/// A parsed documentation comment.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Document {
    pub description: Description,
    pub tags: BlockTags,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() -> () {
        assert_eq!(placeholder(0), "{{{{0}}}}");
        assert_eq!(placeholder(12), "{{{{12}}}}");
    }

    #[test]
    fn test_description_is_trimmed() -> () {
        let description = Description::new("\n  Some text {{{{0}}}} \n", vec![]);
        assert_eq!(description.text, "Some text {{{{0}}}}");
        assert!(Description::from(" \n ").is_empty());
    }

    #[test]
    fn test_into_tag() -> () {
        let link = LinkTag::new(
            RawLink {
                uri: "https://example.org".to_string(),
            },
            Description::from("Text"),
        );
        let tag = Tag::from(link.clone());
        assert_eq!(tag.description, link.description);
        match tag.thing {
            RawTag::Link(RawLink { uri }) => assert_eq!(uri, "https://example.org"),
            _ => panic!(),
        }

        let tag: Tag = InheritDocTag::bare(RawInheritDoc).into();
        assert_eq!(tag.thing, RawTag::InheritDoc(RawInheritDoc));
        assert!(tag.description.is_empty());
    }

    #[test]
    fn test_empty_document() -> () {
        let document = Document::default();
        assert!(document.description.is_empty());
        assert!(document.tags.is_empty());
    }
}
