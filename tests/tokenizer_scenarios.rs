//! End-to-end tokenization scenarios against the bundled grammars
//!
//! Each scenario pins down one observable contract of the engine: semantic
//! tagging, comment and quote folding, interpolation nesting, fault
//! containment, and cross-grammar delegation.

use rstest::rstest;

use glint::{tokenize, GrammarRegistry, Options, Punctuator, Token, TokenKind};

fn lex(syntax: &str, source: &str) -> Vec<Token> {
    let registry = GrammarRegistry::with_defaults().expect("bundled grammars");
    tokenize(source, &Options::syntax(syntax), &registry)
        .expect("known syntax")
        .collect()
}

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[rstest]
#[case("a+b", vec![TokenKind::Identifier, TokenKind::Punctuation, TokenKind::Identifier])]
#[case("if x", vec![TokenKind::Keyword, TokenKind::Whitespace, TokenKind::Identifier])]
#[case("1;2", vec![TokenKind::Number, TokenKind::Punctuation, TokenKind::Number])]
#[case("\u{1f600}", vec![TokenKind::Sequence])]
fn test_expression_kinds(#[case] source: &str, #[case] expected: Vec<TokenKind>) {
    let kinds: Vec<TokenKind> = lex("ecmascript", source).iter().map(|t| t.kind).collect();
    assert_eq!(kinds, expected, "for {:?}", source);
}

#[test]
fn test_line_comment_folds_to_one_token() {
    let tokens = lex("ecmascript", "// hi\nx");
    assert_eq!(texts(&tokens), vec!["// hi", "\n", "x"]);
    assert_eq!(tokens[0].kind, TokenKind::Comment);
    assert_eq!(tokens[0].depth, 1);
    assert_eq!(tokens[1].punctuator, Some(Punctuator::Closer));
    assert_eq!(tokens[2].depth, 0);
    assert_eq!((tokens[2].line, tokens[2].column), (1, 0));
}

#[test]
fn test_template_literal_nests_spans() {
    let tokens = lex("ecmascript", "`a${b({})}c`");
    assert_eq!(
        texts(&tokens),
        vec!["`a", "${", "b", "(", "{", "}", ")", "}", "c", "`"]
    );
    // quote(1) -> span(2) -> paren(3) -> brace(4)
    let depths: Vec<usize> = tokens.iter().map(|t| t.depth).collect();
    assert_eq!(depths, vec![1, 2, 2, 3, 4, 4, 3, 2, 1, 1]);
    assert_eq!(tokens[1].punctuator, Some(Punctuator::Span));
    assert_eq!(tokens[2].kind, TokenKind::Identifier);
}

#[test]
fn test_unterminated_quote_reaches_end_at_depth() {
    let registry = GrammarRegistry::with_defaults().unwrap();
    let mut tokenizer = tokenize("x = 'abc", &Options::default(), &registry).unwrap();
    let tokens: Vec<Token> = tokenizer.by_ref().collect();

    let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(rebuilt, "x = 'abc");
    assert_eq!(tokens.last().unwrap().kind, TokenKind::Quote);
    assert_eq!(tokenizer.depth(), 1);
}

#[test]
fn test_stray_closer_is_contained() {
    let tokens = lex("ecmascript", "a } b");
    assert_eq!(texts(&tokens), vec!["a", " ", "}", " ", "b"]);
    assert_eq!(tokens[2].kind, TokenKind::Fault);
    // Tokenization continues normally after the fault.
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].depth, 0);
}

#[test]
fn test_mismatched_closer_does_not_pop() {
    let registry = GrammarRegistry::with_defaults().unwrap();
    let mut tokenizer = tokenize("(a }", &Options::default(), &registry).unwrap();
    let tokens: Vec<Token> = tokenizer.by_ref().collect();

    let fault = tokens.iter().find(|t| t.text == "}").unwrap();
    assert_eq!(fault.kind, TokenKind::Fault);
    assert_eq!(fault.depth, 1);
    // The paren group is still open.
    assert_eq!(tokenizer.depth(), 1);
}

#[test]
fn test_balanced_nesting_returns_to_root() {
    let registry = GrammarRegistry::with_defaults().unwrap();
    let mut tokenizer =
        tokenize("{ a: [1, (2)] }", &Options::default(), &registry).unwrap();
    let tokens: Vec<Token> = tokenizer.by_ref().collect();

    assert_eq!(tokenizer.depth(), 0);
    let openers = tokens.iter().filter(|t| t.punctuator == Some(Punctuator::Opener));
    let closers = tokens.iter().filter(|t| t.punctuator == Some(Punctuator::Closer));
    assert_eq!(openers.count(), closers.count());
}

#[test]
fn test_keyword_demotion_in_member_position() {
    let tokens = lex("ecmascript", "a.return; return");
    let words: Vec<&Token> = tokens.iter().filter(|t| t.text == "return").collect();
    assert_eq!(words[0].kind, TokenKind::Identifier);
    assert_eq!(words[1].kind, TokenKind::Keyword);
}

#[test]
fn test_inset_tracking() {
    let tokens = lex("ecmascript", "{\n  x\n}");
    let x = tokens.iter().find(|t| t.text == "x").unwrap();
    assert_eq!(x.inset, "  ");
    assert_eq!(x.column, 2);
    let inset = tokens.iter().find(|t| t.kind == TokenKind::Inset).unwrap();
    assert_eq!(inset.text, "  ");
}

#[test]
fn test_markup_fence_delegation() {
    let source = "before\n```js\nconst a = `b${c}`;\n```\nafter";
    let tokens = lex("markup", source);

    let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(rebuilt, source);

    // Delegated tokens are tagged by the inner grammar but positioned and
    // nested relative to the outer document.
    let keyword = tokens.iter().find(|t| t.kind == TokenKind::Keyword).unwrap();
    assert_eq!(keyword.text, "const");
    assert_eq!(keyword.line, 2);
    assert!(keyword.depth >= 1);
    assert!(keyword.hint.starts_with("markup"));

    let after = tokens.iter().find(|t| t.text == "after").unwrap();
    assert_eq!(after.depth, 0);
    assert_eq!(after.line, 4);
}

#[test]
fn test_hints_name_goal_lineage() {
    let tokens = lex("ecmascript", "x '-' y");
    assert_eq!(tokens[0].hint, "ecmascript");
    let body = tokens.iter().find(|t| t.kind == TokenKind::Quote).unwrap();
    assert_eq!(body.hint, "ecmascript quote in-quote");
}

#[test]
fn test_lazy_pull_does_not_scan_ahead() {
    // Pulling a single token from a large source must not require consuming
    // the stream; laziness is observable through the iterator protocol.
    let source = "a ".repeat(10_000);
    let registry = GrammarRegistry::with_defaults().unwrap();
    let mut tokenizer = tokenize(&source, &Options::default(), &registry).unwrap();
    let first = tokenizer.next().unwrap();
    assert_eq!(first.text, "a");
    assert_eq!(first.offset, 0);
}
