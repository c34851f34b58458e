use docblock::ast::{
    Direction, MethodArgument, RawAuthor, RawInheritDoc, RawLink, RawMethod, RawParam,
    RawProperty, RawReturn, RawSince, RawThrows,
};
use docblock::token::TokenKind;
use docblock::{parse, BlockTags, Described, Description, ParseError, RawTag, Screener, Tag};
use pretty_assertions::assert_eq;

const CLASS_COMMENT: &str = "
/**
 * This class represents a parser for doc comments.
 *
 * Use it like {@link https://gustav.fieselschweif.de the manual} says.
 *
 * @internal
 * @author Chris Köcher <ckone@fieselschweif.de>
 * @link   https://gustav.fieselschweif.de
 * @since  1.0.0
 */
";

const METHOD_COMMENT: &str = "    /**
     * Sets the position.
     *
     * @param int $pos
     *   The new position
     * @return $this
     * @throws ParserException
     */";

#[test]
fn test_class_comment() -> () {
    let document = parse(CLASS_COMMENT).unwrap();

    let manual: Tag = Described::new(
        RawTag::Link(RawLink {
            uri: "https://gustav.fieselschweif.de".to_string(),
        }),
        Description::from("the manual"),
    );
    assert_eq!(
        document.description,
        Description::new(
            "This class represents a parser for doc comments.\n\nUse it like {{{{0}}}} says.",
            vec![manual]
        )
    );

    assert_eq!(document.tags.internal.len(), 1);
    assert!(document.tags.internal[0].description.is_empty());
    assert_eq!(
        document.tags.author[0].thing,
        RawAuthor {
            name: "Chris Köcher".to_string(),
            email: "ckone@fieselschweif.de".to_string(),
        }
    );
    assert_eq!(
        document.tags.link[0].thing.uri,
        "https://gustav.fieselschweif.de"
    );
    assert_eq!(
        document.tags.since[0].thing,
        RawSince {
            version: "1.0.0".to_string()
        }
    );
}

#[test]
fn test_method_comment() -> () {
    let document = parse(METHOD_COMMENT).unwrap();
    assert_eq!(document.description, Description::from("Sets the position."));
    assert_eq!(
        document.tags,
        BlockTags {
            param: vec![Described::new(
                RawParam {
                    type_expr: "int".to_string(),
                    name: Some("$pos".to_string()),
                },
                Description::from("The new position"),
            )],
            returns: Some(Described::bare(RawReturn {
                type_expr: "$this".to_string()
            })),
            throws: vec![Described::bare(RawThrows {
                class: "ParserException".to_string()
            })],
            ..BlockTags::default()
        }
    );
}

#[test]
fn test_magic_members() -> () {
    let document = parse(
        "/**
          * @property-read int $count Number of items
          * @property-write string[] $names
          * @method static|null find(int $id, $options) Finds one {@inheritDoc}
          */",
    )
    .unwrap();

    let properties: Vec<&RawProperty> = document.tags.property.iter().map(|t| &t.thing).collect();
    assert_eq!(
        properties,
        vec![
            &RawProperty {
                direction: Direction::READ,
                type_expr: "int".to_string(),
                name: "$count".to_string(),
            },
            &RawProperty {
                direction: Direction::WRITE,
                type_expr: "string[]".to_string(),
                name: "$names".to_string(),
            },
        ]
    );
    assert_eq!(
        document.tags.property[0].description,
        Description::from("Number of items")
    );

    let method = &document.tags.method[0];
    assert_eq!(
        method.thing,
        RawMethod {
            return_type: "static|null".to_string(),
            name: "find".to_string(),
            arguments: vec![
                MethodArgument::from(("int", "$id")),
                MethodArgument::from(("mixed", "$options")),
            ],
        }
    );
    assert_eq!(
        method.description,
        Description::new(
            "Finds one {{{{0}}}}",
            vec![Described::bare(RawTag::InheritDoc(RawInheritDoc))]
        )
    );
}

#[test]
fn test_errors_quote_the_comment() -> () {
    let err = parse("  /** @see 123 */\n").expect_err("");
    assert_eq!(
        err,
        ParseError::InvalidElement {
            name: "123".to_string(),
            comment: "/** @see 123 */".to_string(),
        }
    );
    assert_eq!(
        err.to_string(),
        "invalid element name \"123\" in \"/** @see 123 */\""
    );

    let err = parse("/** text } */ tail").expect_err("");
    assert_eq!(
        err.to_string(),
        "unexpected token \"tail\" in \"/** text } */ tail\" on position 14"
    );
}

#[test]
fn test_screener_is_public() -> () {
    let mut screener = Screener::new("/** @since 1.0 */");
    screener.skip_until(TokenKind::Outro).unwrap();
    assert_eq!(screener.get_token().unwrap().map(|t| t.offset), Some(15));
    screener.set_position(0);
    assert!(screener.is_token(TokenKind::Intro).unwrap());
}

#[test]
fn test_lines_without_star_prefix() -> () {
    let document = parse("/**\n  Loose text\n  @since 2.0\n */").unwrap();
    assert_eq!(document.description, Description::from("Loose text"));
    assert_eq!(document.tags.since[0].thing.version, "2.0");
}
