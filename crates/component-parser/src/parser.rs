//! Recursive descent parser for component statements.
//!
//! The statement level is driven by the token stream. Right-hand sides,
//! function bodies and export declarations are read as raw source with the
//! depth-aware helpers in [`crate::scan`], after which the lexer is re-seeked
//! past them.

use crate::ast::*;
use crate::collect::collect;
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::line_index::LineIndex;
use crate::literal::{classify, LiteralError};
use crate::scan::{
    dollar_references, find_assignment, find_closing, find_top_level_char, is_identifier,
    split_top_level, statement_end, CodeScanner,
};
use crate::template::TemplateParser;
use crate::{ParseOptions, ParseResult};
use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use tracing::debug;

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

/// The component parser.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// The lexer, positioned after `current`.
    lexer: Lexer<'src>,
    /// The current token.
    current: Token,
    /// Parser options.
    options: ParseOptions,
    variables: IndexMap<SmolStr, Variable>,
    functions: IndexMap<SmolStr, Function>,
    imports: Vec<ImportRecord>,
    exports: Vec<ExportRecord>,
    /// Content start and end of the first `<template>` region.
    template: Option<(usize, usize)>,
    /// Parse errors collected during parsing.
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str, options: ParseOptions) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next().unwrap_or(Token {
            kind: TokenKind::Eof,
            span: TextRange::empty(TextSize::from(source.len() as u32)),
        });
        Self {
            source,
            lexer,
            current,
            options,
            variables: IndexMap::new(),
            functions: IndexMap::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            template: None,
            errors: Vec::new(),
        }
    }

    /// Parses the source into a [`ParseResult`].
    pub fn parse(mut self) -> ParseResult {
        loop {
            match self.current_kind() {
                TokenKind::Eof => break,
                TokenKind::Newline | TokenKind::Semicolon => self.advance(),
                TokenKind::DollarIdent => self.parse_declaration(),
                TokenKind::Import => self.parse_import(),
                TokenKind::Export => self.parse_export(),
                TokenKind::LAngle if self.at_template_open() => self.parse_template_region(),
                _ => self.unexpected_statement(),
            }
        }

        self.resolve_computed();
        self.finish()
    }

    // === Token helpers ===

    fn current_kind(&self) -> TokenKind {
        self.current.kind
    }

    fn current_start(&self) -> usize {
        usize::from(self.current.span.start())
    }

    fn current_end(&self) -> usize {
        usize::from(self.current.span.end())
    }

    fn current_text(&self) -> &'src str {
        &self.source[self.current_start()..self.current_end()]
    }

    fn advance(&mut self) {
        let end = TextSize::from(self.source.len() as u32);
        self.current = self.lexer.next().unwrap_or(Token {
            kind: TokenKind::Eof,
            span: TextRange::empty(end),
        });
    }

    /// Moves the token stream to `offset`.
    fn seek(&mut self, offset: usize) {
        self.lexer = Lexer::at(self.source, offset);
        self.advance();
    }

    fn peek_kind(&self) -> TokenKind {
        self.lexer
            .clone()
            .next()
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Describes the current token for error messages.
    fn found(&self) -> String {
        match self.current_kind() {
            TokenKind::Eof | TokenKind::Newline => self.current_kind().name().to_string(),
            _ => format!("'{}'", self.current_text()),
        }
    }

    /// Skips the rest of the statement containing the current token.
    fn skip_statement(&mut self) {
        let start = self.current_start();
        let end = statement_end(self.source, start).end;
        self.seek(end.max(self.current_end()));
    }

    fn error(&mut self, kind: ParseErrorKind, span: TextRange, suggestion: Option<String>) {
        debug!(error = %kind, "recoverable parse error");
        let mut error = ParseError::new(kind, span);
        error.suggestion = suggestion;
        self.errors.push(error);
    }

    fn unexpected_statement(&mut self) {
        let start = self.current_start();
        let statement = &self.source[start..statement_end(self.source, start).end];
        let suggestion = if self.check(TokenKind::Ident) && find_assignment(statement).is_some() {
            format!(
                "component variables start with '$', e.g. ${} = ...",
                self.current_text()
            )
        } else {
            "remove the statement or move it into a function body".to_string()
        };
        self.error(
            ParseErrorKind::UnexpectedToken {
                expected: "a declaration, import, export or <template>".to_string(),
                found: self.found(),
            },
            self.current.span,
            Some(suggestion),
        );
        self.skip_statement();
    }

    // === Declarations ===

    fn parse_declaration(&mut self) {
        let start = self.current_start();
        let name = SmolStr::new(&self.current_text()[1..]);
        self.advance();

        let mut reactive = self.eat(TokenKind::Bang);
        let mut type_name = None;
        if self.check(TokenKind::Colon) {
            let type_start = self.current_end();
            match scan_type(self.source, type_start) {
                Some(type_end) => {
                    let ty = self.source[type_start..type_end].trim();
                    if ty.is_empty() {
                        self.error(
                            ParseErrorKind::InvalidValue {
                                name: name.to_string(),
                                message: "missing type after ':'".to_string(),
                            },
                            range(start, type_end),
                            Some(format!("write ${name}: type = value")),
                        );
                        self.skip_statement();
                        return;
                    }
                    type_name = Some(SmolStr::new(ty));
                    self.seek(type_end);
                    reactive |= self.eat(TokenKind::Bang);
                }
                None => {
                    self.error(
                        ParseErrorKind::UnexpectedToken {
                            expected: "'='".to_string(),
                            found: "end of statement".to_string(),
                        },
                        range(start, self.current_end()),
                        Some(format!("write ${name}: type = value")),
                    );
                    self.skip_statement();
                    return;
                }
            }
        }

        if !self.check(TokenKind::Eq) {
            self.error(
                ParseErrorKind::UnexpectedToken {
                    expected: "'='".to_string(),
                    found: self.found(),
                },
                self.current.span,
                Some(format!("write ${name} = value")),
            );
            self.skip_statement();
            return;
        }

        let rhs_start = self.current_end();
        let stmt = statement_end(self.source, rhs_start);
        let rhs = &self.source[rhs_start..stmt.end];
        let span = range(start, stmt.end);
        self.seek(stmt.end);

        if let Some(delimiter) = stmt.open {
            self.error(
                ParseErrorKind::UnbalancedDelimiter { delimiter },
                span,
                Some(format!("close the '{delimiter}' opened in ${name}")),
            );
            return;
        }
        if stmt.unterminated.is_some() {
            self.error(
                ParseErrorKind::UnterminatedString,
                span,
                Some("add the closing quote".to_string()),
            );
            return;
        }
        if self.variables.contains_key(&name) || self.functions.contains_key(&name) {
            self.error(
                ParseErrorKind::DuplicateDeclaration {
                    name: name.to_string(),
                },
                span,
                Some("rename one of the declarations".to_string()),
            );
            return;
        }

        match parse_function(rhs) {
            Some(Ok(parts)) => {
                self.functions.insert(
                    name.clone(),
                    Function {
                        name,
                        params: parts.params,
                        is_arrow: parts.is_arrow,
                        is_async: parts.is_async,
                        body: parts.body,
                        block_body: parts.block_body,
                        span,
                    },
                );
            }
            Some(Err(message)) => {
                self.error(
                    ParseErrorKind::InvalidParameters {
                        name: name.to_string(),
                        message,
                    },
                    span,
                    Some("parameters are written name, name: type or name = default".to_string()),
                );
            }
            None => match classify(rhs) {
                Ok(value) => {
                    self.variables.insert(
                        name.clone(),
                        Variable {
                            name,
                            reactive,
                            computed: false,
                            has_type_annotation: type_name.is_some(),
                            type_name,
                            value,
                            dependencies: Vec::new(),
                            span,
                        },
                    );
                }
                Err(error) => self.literal_error(&name, error, span),
            },
        }
    }

    fn literal_error(&mut self, name: &str, error: LiteralError, span: TextRange) {
        let (kind, suggestion) = match error {
            LiteralError::Missing => (
                ParseErrorKind::InvalidValue {
                    name: name.to_string(),
                    message: "missing value after '='".to_string(),
                },
                format!("provide a value, e.g. ${name} = 0"),
            ),
            LiteralError::UnterminatedString => (
                ParseErrorKind::UnterminatedString,
                "add the closing quote".to_string(),
            ),
            LiteralError::Unbalanced(delimiter) => (
                ParseErrorKind::UnbalancedDelimiter { delimiter },
                format!("close the '{delimiter}' opened in ${name}"),
            ),
            LiteralError::Invalid(message) => (
                ParseErrorKind::InvalidValue {
                    name: name.to_string(),
                    message,
                },
                "write signal(\"key\", initial)".to_string(),
            ),
        };
        self.error(kind, span, Some(suggestion));
    }

    /// Marks variables whose right-hand side reads other declared variables as computed.
    fn resolve_computed(&mut self) {
        let resolved: Vec<(usize, Vec<SmolStr>)> = self
            .variables
            .values()
            .enumerate()
            .filter_map(|(index, variable)| {
                let raw = match &variable.value {
                    ValueLiteral::Expression(raw)
                    | ValueLiteral::Array(raw)
                    | ValueLiteral::Object(raw) => raw,
                    _ => return None,
                };
                let mut dependencies: Vec<SmolStr> = Vec::new();
                for reference in dollar_references(raw) {
                    if reference.name != variable.name
                        && self.variables.contains_key(reference.name)
                        && !dependencies.iter().any(|d| d == reference.name)
                    {
                        dependencies.push(SmolStr::new(reference.name));
                    }
                }
                (!dependencies.is_empty()).then_some((index, dependencies))
            })
            .collect();

        for (index, dependencies) in resolved {
            if let Some((_, variable)) = self.variables.get_index_mut(index) {
                let raw = variable.value.to_js();
                variable.value = ValueLiteral::Expression(raw);
                variable.computed = true;
                variable.reactive = false;
                variable.dependencies = dependencies;
            }
        }
    }

    // === Imports ===

    fn parse_import(&mut self) {
        let start = self.current_start();
        self.advance();

        match self.import_clauses() {
            Ok((clauses, source, type_only)) => {
                let span = range(start, self.current_start());
                if !self.current_kind().is_terminator() {
                    self.error(
                        ParseErrorKind::InvalidModuleStatement {
                            statement: "import",
                            message: format!("unexpected {} after the module path", self.found()),
                        },
                        self.current.span,
                        Some("put each import on its own line".to_string()),
                    );
                    self.skip_statement();
                }
                for (kind, names) in clauses {
                    self.imports.push(ImportRecord {
                        kind,
                        names,
                        source: source.clone(),
                        type_only,
                        span,
                    });
                }
            }
            Err(message) => {
                self.error(
                    ParseErrorKind::InvalidModuleStatement {
                        statement: "import",
                        message,
                    },
                    range(start, self.current_end()),
                    Some("write import Name from './module'".to_string()),
                );
                self.skip_statement();
            }
        }
    }

    /// Parses everything after `import`, ending on the token after the module path.
    #[allow(clippy::type_complexity)]
    fn import_clauses(
        &mut self,
    ) -> Result<(Vec<(ImportKind, Vec<ImportName>)>, String, bool), String> {
        let type_only = self.check(TokenKind::Ident)
            && self.current_text() == "type"
            && !matches!(self.peek_kind(), TokenKind::From | TokenKind::Comma);
        if type_only {
            self.advance();
        }

        if self.check(TokenKind::String) {
            let source = self.string_value();
            self.advance();
            return Ok((vec![(ImportKind::SideEffect, Vec::new())], source, false));
        }

        let mut clauses = Vec::new();
        let mut needs_more = false;
        if self.check(TokenKind::Ident) {
            clauses.push((
                ImportKind::Default,
                vec![ImportName::same(self.current_text())],
            ));
            self.advance();
            needs_more = self.eat(TokenKind::Comma);
        }

        if self.check(TokenKind::LBrace) {
            clauses.push((ImportKind::Named, self.named_list("import")?));
        } else if self.eat(TokenKind::Star) {
            if !self.eat(TokenKind::As) {
                return Err(format!("expected 'as' after '*', found {}", self.found()));
            }
            if !self.check(TokenKind::Ident) {
                return Err(format!("expected a namespace name, found {}", self.found()));
            }
            clauses.push((
                ImportKind::Namespace,
                vec![ImportName {
                    imported: SmolStr::new("*"),
                    local: SmolStr::new(self.current_text()),
                }],
            ));
            self.advance();
        } else if clauses.is_empty() || needs_more {
            return Err(format!(
                "expected a default name, '{{' or '*', found {}",
                self.found()
            ));
        }

        if !self.eat(TokenKind::From) {
            return Err(format!("expected 'from', found {}", self.found()));
        }
        if !self.check(TokenKind::String) {
            return Err(format!("expected a module path, found {}", self.found()));
        }
        let source = self.string_value();
        self.advance();
        Ok((clauses, source, type_only))
    }

    /// Parses `{ a, b as c }`, ending on the token after `}`.
    fn named_list(&mut self, statement: &str) -> Result<Vec<ImportName>, String> {
        let mut names = Vec::new();
        self.advance();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            if !is_name_token(self.current_kind()) {
                return Err(format!("expected a name, found {}", self.found()));
            }
            // `type` modifiers on individual names
            if self.current_text() == "type" && is_name_token(self.peek_kind()) {
                self.advance();
            }
            let imported = SmolStr::new(self.current_text());
            self.advance();

            let local = if self.eat(TokenKind::As) {
                if !is_name_token(self.current_kind()) {
                    return Err(format!("expected a name after 'as', found {}", self.found()));
                }
                let local = SmolStr::new(self.current_text());
                self.advance();
                local
            } else {
                if statement == "import" && imported == "default" {
                    return Err("'default' must be renamed with 'as'".to_string());
                }
                imported.clone()
            };
            names.push(ImportName { imported, local });

            self.skip_newlines();
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.eat(TokenKind::RBrace) {
                break;
            }
            return Err(format!("expected ',' or '}}', found {}", self.found()));
        }
        Ok(names)
    }

    fn string_value(&self) -> String {
        let text = self.current_text();
        text.get(1..text.len().saturating_sub(1))
            .unwrap_or_default()
            .to_string()
    }

    // === Exports ===

    fn parse_export(&mut self) {
        let start = self.current_start();
        let stmt_end = statement_end(self.source, start).end;
        let declaration = self.source[start..stmt_end].trim_end().to_string();
        let span = range(start, stmt_end);
        self.advance();

        let record = match self.current_kind() {
            TokenKind::Default => {
                self.advance();
                Ok(self.default_export(declaration, span))
            }
            TokenKind::LBrace => self.named_list("export").and_then(|names| {
                let source = if self.eat(TokenKind::From) {
                    if !self.check(TokenKind::String) {
                        return Err(format!("expected a module path, found {}", self.found()));
                    }
                    Some(self.string_value())
                } else {
                    None
                };
                Ok(ExportRecord {
                    kind: ExportKind::Named,
                    names,
                    is_function: false,
                    declaration,
                    source,
                    span,
                })
            }),
            TokenKind::Star => {
                self.advance();
                let names = if self.eat(TokenKind::As) && self.check(TokenKind::Ident) {
                    let name = SmolStr::new(self.current_text());
                    self.advance();
                    vec![ImportName {
                        imported: SmolStr::new("*"),
                        local: name,
                    }]
                } else {
                    Vec::new()
                };
                if self.eat(TokenKind::From) && self.check(TokenKind::String) {
                    Ok(ExportRecord {
                        kind: ExportKind::Named,
                        names,
                        is_function: false,
                        declaration,
                        source: Some(self.string_value()),
                        span,
                    })
                } else {
                    Err("expected export * from './module'".to_string())
                }
            }
            TokenKind::Async | TokenKind::Function => {
                self.eat(TokenKind::Async);
                if self.eat(TokenKind::Function) && self.check(TokenKind::Ident) {
                    Ok(ExportRecord {
                        kind: ExportKind::Named,
                        names: vec![ImportName::same(self.current_text())],
                        is_function: true,
                        declaration,
                        source: None,
                        span,
                    })
                } else {
                    Err("expected a function name".to_string())
                }
            }
            TokenKind::Ident => self.declaration_export(declaration, span),
            _ => Err(format!(
                "expected a declaration, '{{', '*' or 'default', found {}",
                self.found()
            )),
        };

        match record {
            Ok(record) => self.exports.push(record),
            Err(message) => self.error(
                ParseErrorKind::InvalidModuleStatement {
                    statement: "export",
                    message,
                },
                span,
                Some("write export const NAME = value or export { name }".to_string()),
            ),
        }
        self.seek(stmt_end);
    }

    fn default_export(&mut self, declaration: String, span: TextRange) -> ExportRecord {
        let mut is_function = false;
        self.eat(TokenKind::Async);
        let name = if self.eat(TokenKind::Function) {
            is_function = true;
            self.check(TokenKind::Ident).then(|| self.current_text())
        } else if self.check(TokenKind::Ident) && self.current_text() == "class" {
            self.advance();
            self.check(TokenKind::Ident).then(|| self.current_text())
        } else if self.check(TokenKind::Ident) && self.peek_kind().is_terminator() {
            Some(self.current_text())
        } else {
            None
        };

        ExportRecord {
            kind: ExportKind::Default,
            names: name.map(ImportName::same).into_iter().collect(),
            is_function,
            declaration,
            source: None,
            span,
        }
    }

    /// `export const|let|var name = ...` and `export class Name`.
    fn declaration_export(&mut self, declaration: String, span: TextRange) -> Result<ExportRecord, String> {
        let keyword = self.current_text();
        self.advance();
        match keyword {
            "const" | "let" | "var" => {
                let mut names = Vec::new();
                if self.check(TokenKind::Ident) {
                    names.push(ImportName::same(self.current_text()));
                }
                let is_function = find_assignment(&declaration)
                    .map(|eq| matches!(parse_function(&declaration[eq + 1..]), Some(Ok(_))))
                    .unwrap_or(false);
                Ok(ExportRecord {
                    kind: ExportKind::Named,
                    names,
                    is_function,
                    declaration,
                    source: None,
                    span,
                })
            }
            "class" if self.check(TokenKind::Ident) => Ok(ExportRecord {
                kind: ExportKind::Named,
                names: vec![ImportName::same(self.current_text())],
                is_function: false,
                declaration,
                source: None,
                span,
            }),
            other => Err(format!("unsupported export form '{other}'")),
        }
    }

    // === Template ===

    fn at_template_open(&self) -> bool {
        let rest = &self.source[self.current_start()..];
        rest.strip_prefix("<template").is_some_and(|after| {
            after
                .chars()
                .next()
                .map_or(true, |c| c == '>' || c == '/' || c.is_whitespace())
        })
    }

    fn parse_template_region(&mut self) {
        let start = self.current_start();
        let Some(gt) = self.source[start..].find('>').map(|i| start + i) else {
            self.error(
                ParseErrorKind::UnclosedTemplate,
                range(start, self.source.len()),
                Some("finish the <template> tag with '>'".to_string()),
            );
            self.seek(self.source.len());
            return;
        };
        let content_start = gt + 1;
        let self_closing = self.source[..gt].ends_with('/');

        let (content_end, after) = if self_closing {
            (content_start, content_start)
        } else {
            match find_template_close(self.source, content_start) {
                Some(close) => close,
                None => {
                    self.error(
                        ParseErrorKind::UnclosedTemplate,
                        range(start, content_start),
                        Some("add </template> after the markup".to_string()),
                    );
                    (self.source.len(), self.source.len())
                }
            }
        };

        if self.template.is_some() {
            self.error(
                ParseErrorKind::DuplicateTemplate,
                range(start, content_start),
                Some("merge the markup into the first <template>".to_string()),
            );
        } else {
            self.template = Some((content_start, content_end));
        }
        self.seek(after);
    }

    // === Result assembly ===

    fn finish(mut self) -> ParseResult {
        let (template, template_span, fragment) = match self.template {
            Some((start, end)) => {
                let (fragment, errors) =
                    TemplateParser::new(self.source, start, end, self.options.max_depth).parse();
                self.errors.extend(errors);
                (
                    self.source[start..end].to_string(),
                    Some(range(start, end)),
                    fragment,
                )
            }
            None => (String::new(), None, Fragment::default()),
        };

        let collected = collect(&fragment, self.source, &self.functions);

        let line_index = LineIndex::new(self.source);
        let mut errors = self.errors;
        errors.sort_by_key(|e| e.span.start());
        for error in &mut errors {
            error.line = Some(line_index.line(error.span.start()));
        }

        ParseResult {
            variables: self.variables,
            functions: self.functions,
            template,
            template_span,
            fragment,
            bindings: collected.bindings,
            events: collected.events,
            control_flow: collected.control_flow,
            imports: self.imports,
            exports: self.exports,
            errors,
        }
    }
}

fn is_name_token(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident
            | TokenKind::Default
            | TokenKind::As
            | TokenKind::From
            | TokenKind::Async
            | TokenKind::Function
            | TokenKind::Import
            | TokenKind::Export
    )
}

/// Finds the end of a `: type` annotation starting at `start`: the `=` or `!` that follows it.
///
/// Returns `None` if the statement ends first.
fn scan_type(source: &str, start: usize) -> Option<usize> {
    let mut depth = 0u32;
    for (i, c) in CodeScanner::new(source, start) {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            // `=>` in function types is not a closing angle bracket
            '>' if !source[..i].ends_with('=') => depth = depth.saturating_sub(1),
            '=' if depth == 0 && !matches!(source[i + 1..].chars().next(), Some('>' | '=')) => {
                return Some(i)
            }
            '!' if depth == 0 => return Some(i),
            '\n' | ';' if depth == 0 => return None,
            _ => {}
        }
    }
    None
}

/// Finds the matching `</template>` for content starting at `from`.
///
/// Returns the content end and the offset past the closing tag.
fn find_template_close(source: &str, from: usize) -> Option<(usize, usize)> {
    let mut depth = 1u32;
    for (i, _) in source[from..].match_indices('<') {
        let at = from + i;
        let rest = &source[at..];
        if rest.starts_with("</template") {
            depth -= 1;
            if depth == 0 {
                let after = rest.find('>').map(|j| at + j + 1).unwrap_or(source.len());
                return Some((at, after));
            }
        } else if let Some(after) = rest.strip_prefix("<template") {
            if after
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c.is_whitespace())
            {
                depth += 1;
            }
        }
    }
    None
}

/// The parts of a function right-hand side.
#[derive(Debug, PartialEq)]
struct FunctionParts {
    params: Vec<Param>,
    is_arrow: bool,
    is_async: bool,
    body: String,
    block_body: bool,
}

/// Recognizes arrow functions and `function` expressions.
///
/// Returns `None` when `rhs` is not a function, and `Some(Err)` when it is
/// one with an invalid parameter list.
fn parse_function(rhs: &str) -> Option<Result<FunctionParts, String>> {
    let text = rhs.trim();
    let (is_async, text) = match strip_word(text, "async") {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    if let Some(rest) = strip_word(text, "function") {
        let rest = rest.trim_start();
        let name_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        let rest = rest[name_len..].trim_start();
        if !rest.starts_with('(') {
            return None;
        }
        let close = find_closing(rest, 1, ')')?;
        let after = rest[close + 1..].trim_start();
        let after = skip_return_type(after, '{');
        if !after.starts_with('{') || find_closing(after, 1, '}') != Some(after.len() - 1) {
            return None;
        }
        return Some(parse_params(&rest[1..close]).map(|params| FunctionParts {
            params,
            is_arrow: false,
            is_async,
            body: after[1..after.len() - 1].trim().to_string(),
            block_body: true,
        }));
    }

    let (param_list, after) = if text.starts_with('(') {
        let close = find_closing(text, 1, ')')?;
        (&text[1..close], skip_return_type(text[close + 1..].trim_start(), '='))
    } else {
        let len = text
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(text.len());
        let name = &text[..len];
        if !is_identifier(name) {
            return None;
        }
        (name, text[len..].trim_start())
    };

    let body = after.strip_prefix("=>")?.trim();
    let block_body = body.starts_with('{') && find_closing(body, 1, '}') == Some(body.len() - 1);
    let body = if block_body {
        body[1..body.len() - 1].trim()
    } else {
        body
    };

    Some(parse_params(param_list).map(|params| FunctionParts {
        params,
        is_arrow: true,
        is_async,
        body: body.to_string(),
        block_body,
    }))
}

/// Strips `word` when followed by whitespace or `(`.
fn strip_word<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    rest.starts_with(|c: char| c.is_whitespace() || c == '(')
        .then(|| rest.trim_start())
}

/// Skips a `: ReturnType` annotation up to the depth-zero `stop` (`=` of `=>`, or `{`).
fn skip_return_type(text: &str, stop: char) -> &str {
    if !text.starts_with(':') {
        return text;
    }
    let mut depth = 0u32;
    for (i, c) in CodeScanner::new(text, 1) {
        match c {
            '(' | '[' | '<' => depth += 1,
            '{' if stop != '{' || depth > 0 => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            '>' if !text[..i].ends_with('=') => depth = depth.saturating_sub(1),
            c if c == stop && depth == 0 => {
                if stop != '=' || text[i + 1..].starts_with('>') {
                    return &text[i..];
                }
            }
            _ => {}
        }
    }
    text
}

/// Parses a comma-separated parameter list.
fn parse_params(list: &str) -> Result<Vec<Param>, String> {
    let mut params: Vec<Param> = Vec::new();
    for piece in split_top_level(list, ',') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }

        let (head, default) = match find_assignment(piece) {
            Some(eq) => {
                let default = piece[eq + 1..].trim();
                if default.is_empty() {
                    return Err(format!("missing default value in '{piece}'"));
                }
                (piece[..eq].trim(), Some(default.to_string()))
            }
            None => (piece, None),
        };

        let (name, type_name) = match find_top_level_char(head, ':') {
            Some(colon) => {
                let ty = head[colon + 1..].trim();
                if ty.is_empty() {
                    return Err(format!("missing type in '{piece}'"));
                }
                (head[..colon].trim(), Some(ty.to_string()))
            }
            None => (head, None),
        };
        let name = name.strip_suffix('?').unwrap_or(name).trim();

        let valid = is_identifier(name)
            || name.strip_prefix("...").is_some_and(is_identifier)
            || name.starts_with('{')
            || name.starts_with('[');
        if !valid {
            return Err(format!("'{name}' is not a valid parameter name"));
        }
        if params.iter().any(|p| p.name == name) {
            return Err(format!("duplicate parameter '{name}'"));
        }

        params.push(Param {
            name: SmolStr::new(name),
            has_type_annotation: type_name.is_some(),
            type_name,
            default,
        });
    }
    Ok(params)
}
