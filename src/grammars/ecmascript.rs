//! ECMAScript-flavored grammar
//!
//! Keywords, operator tables, `//` and `/* */` comments, three quote forms
//! (template literals admit `${ }` interpolation spans), and the usual
//! closure pairs. Plain quotes and comments fast-forward to their closer so
//! their bodies come out as single tokens.

use crate::error::Error;
use crate::grammar::{Grammar, GroupDef, GroupKind};
use crate::matcher::{entities, Entity, Matcher};
use crate::token::TokenKind;

use super::{comment_fast_forward, quote_fast_forward};

const KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "finally", "for", "function", "get",
    "if", "import", "in", "instanceof", "let", "new", "of", "return", "set", "static", "super",
    "switch", "this", "throw", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Top-level pattern: one capture group per entity, longest alternatives
/// first, with a single-character catch-all so every byte is covered.
const TOP: &str = r#"(?x)
  (\r\n|\n|\r)
| ([\ \t]+)
| ( /\* | \*/ | //
  | ` | " | '
  | \$\{
  | => | \.\.\. | \?\.
  | === | !== | == | !=
  | <<= | >>>= | >>> | >>= | >> | <<
  | <= | >=
  | \*\*= | \*\* | \+\+ | --
  | &&= | && | \|\|= | \|\| | \?\?= | \?\?
  | [-+*/%&|^]=
  | [-+*/%&|^~!<>=?:]
  | [{}()\[\];,]
  | \.
  )
| ( 0[xX][0-9a-fA-F_]+ | 0[bB][01_]+ | 0[oO][0-7_]+
  | [0-9][0-9_]* (?: \. [0-9][0-9_]* )? (?: [eE][+-]?[0-9]+ )?
  )
| ( [A-Za-z_$][A-Za-z0-9_$]* )
| ( [\s\S] )
"#;

/// In-quote pattern: escapes stay intact, quote characters and `${` go
/// through grouping, everything else is body text.
const QUOTE: &str = r#"(?x)
  (\r\n|\n|\r)
| (\\[\s\S])
| ( ` | " | ' | \$\{ )
| ( [^\\`"'\r\n$]+ | \$ | \\ )
"#;

/// In-comment pattern: only the block closer is structural.
const COMMENT: &str = r#"(?x)
  (\r\n|\n|\r)
| (\*/)
| ( [^\r\n*]+ | \* )
"#;

pub fn grammar() -> Result<Grammar, Error> {
    let matcher = Matcher::new(
        "ecmascript",
        TOP,
        vec![
            Entity::Tag(TokenKind::Break),
            Entity::Tag(TokenKind::Whitespace),
            Entity::Hook(entities::punctuation),
            Entity::Tag(TokenKind::Number),
            Entity::Hook(entities::words),
            Entity::Tag(TokenKind::Sequence),
        ],
    )?;
    let quote_matcher = Matcher::new(
        "ecmascript",
        QUOTE,
        vec![
            Entity::Tag(TokenKind::Break),
            Entity::Tag(TokenKind::Literal),
            Entity::Hook(entities::punctuation),
            Entity::Tag(TokenKind::Quote),
        ],
    )?;
    let comment_matcher = Matcher::new(
        "ecmascript",
        COMMENT,
        vec![
            Entity::Tag(TokenKind::Break),
            Entity::Hook(entities::punctuation),
            Entity::Tag(TokenKind::Comment),
        ],
    )?;

    let grammar = Grammar::builder("ecmascript")
        .keywords(KEYWORDS)
        .assigners(&[
            "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=",
            "&&=", "||=", "??=",
        ])
        .combinators(&["=>", ".", "?.", "...", "?", ":"])
        .operators(&[
            "+", "-", "*", "/", "%", "**", "==", "!=", "===", "!==", "<", ">", "<=", ">=", "<<",
            ">>", ">>>", "&", "|", "^", "~", "!", "&&", "||", "??", "++", "--",
        ])
        .breakers(&[";", ","])
        .comment(GroupDef::pair("//", "\n").on_open(comment_fast_forward))
        .comment(GroupDef::pair("/*", "*/").on_open(comment_fast_forward))
        .quote(GroupDef::pair("'", "'").on_open(quote_fast_forward))
        .quote(GroupDef::pair("\"", "\"").on_open(quote_fast_forward))
        .quote(GroupDef::pair("`", "`").with_spans())
        .closure(GroupDef::pair("{", "}"))
        .closure(GroupDef::pair("(", ")"))
        .closure(GroupDef::pair("[", "]"))
        .span(GroupDef::pair("${", "}"))
        .maybe_identifier(r"^[A-Za-z_$][A-Za-z0-9_$]*$")?
        .goal_matcher(GroupKind::Quote, quote_matcher)
        .goal_matcher(GroupKind::Comment, comment_matcher)
        .build(matcher);
    Ok(grammar)
}
