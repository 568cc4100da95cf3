//! Tag-markup grammar
//!
//! A small HTML/Markdown-ish syntax: `<!-- -->` comments, `< >` and `</ >`
//! tag closures with quoted attribute values, and triple-backtick code
//! fences whose bodies are delegated to the ECMAScript grammar. The root
//! goal flattens, so runs of plain text merge into single tokens.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::Group;
use crate::error::Error;
use crate::grammar::{After, Delegation, Grammar, GroupDef};
use crate::matcher::{entities, Entity, Matcher};
use crate::token::TokenKind;

use super::{comment_fast_forward, quote_fast_forward};

const TOP: &str = r#"(?x)
  (\r\n|\n|\r)
| ([\ \t]+)
| ( <!-- | --> | </ | < | > | ``` | " | = | / | - )
| ( [A-Za-z][A-Za-z0-9]* )
| ( [\s\S] )
"#;

/// A closing fence at the start of a line.
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^```").expect("fence pattern"));

/// Open hook for code fences: the rest of the fence line is left to the
/// outer stream as an info string, the body up to the closing fence is
/// delegated to the ECMAScript grammar. Without a closing fence the body
/// stays in the markup stream.
fn fence_open(source: &str, offset: usize, _group: &Group) -> Option<After> {
    let line_end = source[offset..].find('\n')?;
    let body_start = offset + line_end + 1;
    let close = FENCE_CLOSE.find_at(source, body_start)?;
    Some(After::Delegate(Delegation {
        range: body_start..close.start(),
        syntax: "ecmascript".to_string(),
    }))
}

pub fn grammar() -> Result<Grammar, Error> {
    let matcher = Matcher::new(
        "markup",
        TOP,
        vec![
            Entity::Tag(TokenKind::Break),
            Entity::Tag(TokenKind::Whitespace),
            Entity::Hook(entities::punctuation),
            Entity::Tag(TokenKind::Word),
            Entity::Tag(TokenKind::Sequence),
        ],
    )?;

    let grammar = Grammar::builder("markup")
        .assigners(&["="])
        .nonbreakers(&["-"])
        .comment(GroupDef::pair("<!--", "-->").on_open(comment_fast_forward))
        .quote(GroupDef::pair("\"", "\"").on_open(quote_fast_forward))
        .closure(GroupDef::pair("<", ">"))
        .closure(GroupDef::pair("</", ">"))
        .closure(GroupDef::pair("```", "```").on_open(fence_open))
        .flatten_root()
        .build(matcher);
    Ok(grammar)
}

#[cfg(test)]
mod tests {
    use crate::driver::tokenize;
    use crate::grammar::{GrammarRegistry, Options};
    use crate::token::{Punctuator, Token, TokenKind};

    fn lex(source: &str) -> Vec<Token> {
        let registry = GrammarRegistry::with_defaults().unwrap();
        tokenize(source, &Options::syntax("markup"), &registry)
            .unwrap()
            .collect()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_plain_text_flattens() {
        let tokens = lex("a!!b");
        assert_eq!(texts(&tokens), vec!["a", "!!", "b"]);
        assert_eq!(tokens[1].kind, TokenKind::Sequence);
    }

    #[test]
    fn test_comment_is_one_token() {
        let tokens = lex("<!-- c -->x");
        assert_eq!(texts(&tokens), vec!["<!-- c ", "-->", "x"]);
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[1].punctuator, Some(Punctuator::Closer));
    }

    #[test]
    fn test_tag_with_attribute() {
        let tokens = lex(r#"<a href="x">b</a>"#);
        assert_eq!(
            texts(&tokens),
            vec!["<", "a", " ", "href", "=", "\"x", "\"", ">", "b", "</", "a", ">"]
        );
        assert_eq!(tokens[0].punctuator, Some(Punctuator::Opener));
        assert_eq!(tokens[4].punctuator, Some(Punctuator::Assigner));
        assert_eq!(tokens[5].kind, TokenKind::Quote);
        assert_eq!(tokens[7].punctuator, Some(Punctuator::Closer));
        assert_eq!(tokens[8].depth, 0);
    }

    #[test]
    fn test_stray_tag_closer_is_fault() {
        let tokens = lex("a > b");
        assert_eq!(tokens[2].text, ">");
        assert_eq!(tokens[2].kind, TokenKind::Fault);
    }

    #[test]
    fn test_fence_delegates_to_ecmascript() {
        let source = "x\n```js\nlet y\n```\n";
        let tokens = lex(source);
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, source);

        let keyword = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Keyword)
            .expect("delegated keyword");
        assert_eq!(keyword.text, "let");
        assert_eq!(keyword.line, 2);
        // Delegated tokens carry the outer lineage.
        assert!(keyword.hint.starts_with("markup"));
        assert!(keyword.hint.contains("ecmascript"));

        let close = tokens
            .iter()
            .rfind(|t| t.text == "```")
            .expect("closing fence");
        assert_eq!(close.punctuator, Some(Punctuator::Closer));
    }

    #[test]
    fn test_unterminated_fence_stays_in_markup() {
        let registry = GrammarRegistry::with_defaults().unwrap();
        let mut tokenizer =
            tokenize("```\ntext", &Options::syntax("markup"), &registry).unwrap();
        let tokens: Vec<Token> = tokenizer.by_ref().collect();
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, "```\ntext");
        assert_eq!(tokenizer.depth(), 1);
    }
}
