//! Statement handlers that build a [`Module`] one declaration at a time.
//!
//! Each handler receives the raw text of a single statement (without its
//! terminating `;`) and either applies it to the module under construction
//! or fails with a [`Diagnostic`]. The builder also remembers where every
//! port, wire and instance was declared so that duplicate-declaration
//! errors can point back at the original.

use indexmap::IndexMap;
use log::{debug, trace};
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat},
    error::ModalResult,
    token::{take_till, take_until, take_while},
};

use desgraph_core::{
    identifier::{Id, is_valid_identifier},
    module::{Direction, Instance, Module, WireKind},
};

use crate::{
    error::{Diagnostic, DiagnosticSink, ErrorCode, Result},
    lexer::Statement,
    span::Span,
};

/// Byte offset of `sub` within `text`.
///
/// `sub` must be a subslice of `text`.
fn offset_in(text: &str, sub: &str) -> usize {
    sub.as_ptr() as usize - text.as_ptr() as usize
}

/// Span of the subslice `sub` of `statement.text`.
fn span_of(statement: &Statement<'_>, sub: &str) -> Span {
    let start = offset_in(statement.text, sub);
    Span::new(start..start + sub.len()).shift(statement.span.start())
}

fn invalid_identifier(statement: &Statement<'_>, name: &str, what: &str) -> Diagnostic {
    let span = if name.is_empty() {
        statement.span
    } else {
        span_of(statement, name)
    };
    Diagnostic::error(format!("invalid {what} name `{name}`"))
        .with_code(ErrorCode::E200)
        .with_label(span, "not a valid identifier")
        .with_help("identifiers start with a letter or `_` followed by letters, digits or `_`")
}

/// Validates an identifier and interns it.
fn identifier(statement: &Statement<'_>, name: &str, what: &str) -> Result<Id> {
    if is_valid_identifier(name) {
        Ok(Id::new(name))
    } else {
        Err(invalid_identifier(statement, name, what))
    }
}

/// Rejects `input`/`output`/`wire` statements that continue on another line.
fn single_line(statement: &Statement<'_>, keyword: &str) -> Result<()> {
    if statement.text.contains('\n') {
        return Err(
            Diagnostic::error(format!("`{keyword}` declaration spans multiple lines"))
                .with_code(ErrorCode::E102)
                .with_label(statement.span, "must fit on one line")
                .with_help("put the whole declaration and its `;` on one line"),
        );
    }
    Ok(())
}

/// One `.pin(wire)` group from an instance statement.
struct Connection<'a> {
    group: &'a str,
    pin: &'a str,
    wire: &'a str,
}

/// Parse one `.pin(wire)` group.
fn connection<'a>(input: &mut &'a str) -> ModalResult<Connection<'a>> {
    let group_start = *input;
    let (pin, wire) = preceded(
        '.',
        cut_err((
            take_till(0.., ['(', ')']),
            '(',
            take_till(0.., ['(', ')']),
            ')',
        )),
    )
    .map(|(pin, _, wire, _): (&str, char, &str, char)| (pin.trim(), wire.trim()))
    .parse_next(input)?;

    let consumed = group_start.len() - input.len();
    Ok(Connection {
        group: &group_start[..consumed],
        pin,
        wire,
    })
}

/// Parse the separators allowed between connection groups: whitespace,
/// commas and comments.
fn separator(input: &mut &str) -> ModalResult<()> {
    repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_whitespace() || c == ',').void(),
            (alt(("//", "#")), take_till(0.., '\n')).void(),
            ("/*", take_until(0.., "*/"), "*/").void(),
        )),
    )
    .parse_next(input)
}

/// Accumulates the statements of one module.
#[derive(Debug)]
pub(crate) struct ModuleBuilder {
    module: Module,
    header: Span,
    ports: IndexMap<Id, Span>,
    directions: IndexMap<Id, Span>,
    wires: IndexMap<Id, Span>,
    instances: IndexMap<Id, Span>,
    port_connections: IndexMap<Id, Span>,
}

impl ModuleBuilder {
    /// Starts a module from its header statement,
    /// `module <name> ( <port>, ... )`.
    pub(crate) fn from_header(statement: &Statement<'_>) -> Result<Self> {
        let text = statement.text;
        let rest = text.strip_prefix("module").unwrap_or(text);

        let malformed = |message: &str, label: &str| {
            Diagnostic::error(message.to_string())
                .with_code(ErrorCode::E201)
                .with_label(statement.span, label.to_string())
                .with_help("write the header as `module NAME(port, port, ...);`")
        };

        let (Some(open), Some(close)) = (rest.find('('), rest.rfind(')')) else {
            return Err(malformed(
                "malformed module header",
                "expected a parenthesized port list",
            ));
        };
        if open > close || rest.matches('(').count() != 1 || rest.matches(')').count() != 1 {
            return Err(malformed(
                "malformed module header",
                "expected exactly one `(` followed by one `)`",
            ));
        }
        if !rest[close + 1..].trim().is_empty() {
            let trailing = rest[close + 1..].trim();
            return Err(Diagnostic::error("unexpected text after port list")
                .with_code(ErrorCode::E201)
                .with_label(span_of(statement, trailing), "not part of the header")
                .with_help("write the header as `module NAME(port, port, ...);`"));
        }

        let name = identifier(statement, rest[..open].trim(), "module")?;
        let mut builder = Self {
            module: Module::new(name),
            header: statement.span,
            ports: IndexMap::new(),
            directions: IndexMap::new(),
            wires: IndexMap::new(),
            instances: IndexMap::new(),
            port_connections: IndexMap::new(),
        };

        let interior = &rest[open + 1..close];
        if interior.trim().is_empty() {
            debug!(module:% = name; "Module header has no ports");
            return Ok(builder);
        }

        for entry in interior.split(',') {
            let port_name = entry.trim();
            if port_name.is_empty() {
                return Err(Diagnostic::error("empty entry in port list")
                    .with_code(ErrorCode::E201)
                    .with_label(span_of(statement, interior), "port list")
                    .with_help("remove the extra `,`"));
            }
            let port = identifier(statement, port_name, "port")?;
            let span = span_of(statement, port_name);
            if let Some(first) = builder.ports.get(&port) {
                return Err(Diagnostic::error(format!("duplicate port `{port}`"))
                    .with_code(ErrorCode::E202)
                    .with_label(span, "port listed again")
                    .with_secondary_label(*first, "first listed here"));
            }
            builder.module.add_port(port);
            builder.ports.insert(port, span);
        }

        debug!(module:% = name, ports = builder.ports.len(); "Parsed module header");
        Ok(builder)
    }

    /// The span of the header statement.
    pub(crate) fn header_span(&self) -> Span {
        self.header
    }

    pub(crate) fn name(&self) -> Id {
        self.module.name()
    }

    /// Applies `input <name>` or `output <name>`.
    pub(crate) fn declare_direction(
        &mut self,
        statement: &Statement<'_>,
        direction: Direction,
    ) -> Result<()> {
        single_line(statement, direction.keyword())?;

        let words: Vec<&str> = statement.text.split_whitespace().collect();
        let [_, port_name] = words[..] else {
            return Err(malformed_declaration(
                statement,
                &format!("`{direction} NAME`"),
            ));
        };
        let port = identifier(statement, port_name, "port")?;
        let span = span_of(statement, port_name);

        if !self.module.has_port(port) {
            let mut diag = Diagnostic::error(format!("`{port}` is not a port of `{}`", self.name()))
                .with_code(ErrorCode::E203)
                .with_label(span, "undeclared port")
                .with_secondary_label(self.header, "ports are declared here");
            if self.module.wire(port).is_some() {
                diag = diag.with_help("wires cannot be given a direction");
            }
            return Err(diag);
        }
        if let Some(first) = self.directions.get(&port) {
            return Err(
                Diagnostic::error(format!("port `{port}` already has a direction"))
                    .with_code(ErrorCode::E204)
                    .with_label(statement.span, "second direction declaration")
                    .with_secondary_label(*first, "first declared here"),
            );
        }

        self.module.classify_port(port, direction);
        self.directions.insert(port, statement.span);
        debug!(port:% = port, direction:% = direction; "Declared port direction");
        Ok(())
    }

    /// Applies `wire <name> <kind>`.
    pub(crate) fn declare_wire(&mut self, statement: &Statement<'_>) -> Result<()> {
        single_line(statement, "wire")?;

        let words: Vec<&str> = statement.text.split_whitespace().collect();
        let [_, wire_name, kind_name] = words[..] else {
            return Err(malformed_declaration(statement, "`wire NAME dependency|stream`"));
        };
        let wire = identifier(statement, wire_name, "wire")?;
        let span = span_of(statement, wire_name);

        let Some(kind) = WireKind::from_keyword(kind_name) else {
            return Err(Diagnostic::error(format!("invalid wire kind `{kind_name}`"))
                .with_code(ErrorCode::E206)
                .with_label(span_of(statement, kind_name), "unknown kind")
                .with_help("use `dependency` or `stream`"));
        };

        let first = self.wires.get(&wire).or_else(|| self.ports.get(&wire));
        if let Some(first) = first {
            let what = if self.module.has_port(wire) {
                "port"
            } else {
                "wire"
            };
            return Err(
                Diagnostic::error(format!("`{wire}` is already declared as a {what}"))
                    .with_code(ErrorCode::E205)
                    .with_label(span, "duplicate declaration")
                    .with_secondary_label(*first, "first declared here"),
            );
        }

        self.module.add_wire(wire, kind);
        self.wires.insert(wire, statement.span);
        debug!(wire:% = wire, kind:% = kind; "Declared wire");
        Ok(())
    }

    /// Applies a cell instance, `<type> <name> ( .<pin>(<wire>), ... )`.
    pub(crate) fn add_instance(&mut self, statement: &Statement<'_>) -> Result<()> {
        let text = statement.text;
        let malformed = |label: &str| {
            Diagnostic::error("malformed instance")
                .with_code(ErrorCode::E213)
                .with_label(statement.span, label.to_string())
                .with_help("write instances as `TYPE name(.pin(wire), ...);`")
        };

        let Some(open) = text.find('(') else {
            return Err(malformed("expected `(` after the instance name"));
        };
        let trimmed = text.trim_end();
        let Some(body) = trimmed
            .strip_suffix(')')
            .filter(|inner| inner.len() > open)
            .map(|inner| &inner[open + 1..])
        else {
            return Err(malformed("expected the statement to end with `)`"));
        };

        let words: Vec<&str> = text[..open].split_whitespace().collect();
        let [type_name, instance_name] = words[..] else {
            return Err(malformed("expected a cell type followed by an instance name"));
        };
        let module_name = identifier(statement, type_name, "cell type")?;
        let name = identifier(statement, instance_name, "instance")?;
        let name_span = span_of(statement, instance_name);

        if let Some(first) = self.instances.get(&name) {
            return Err(Diagnostic::error(format!("duplicate instance `{name}`"))
                .with_code(ErrorCode::E208)
                .with_label(name_span, "instance name reused")
                .with_secondary_label(*first, "first instantiated here"));
        }

        let mut instance = Instance::new(name, module_name);
        let mut rest = body;
        loop {
            // Infallible: accepts zero separators. An unterminated `/*` is
            // left in place and rejected as a connection.
            let _ = separator(&mut rest);
            if rest.is_empty() {
                break;
            }
            let at = rest;
            let Ok(conn) = connection(&mut rest) else {
                let junk = at.split(',').next().unwrap_or(at).trim_end();
                return Err(Diagnostic::error("malformed instance connection")
                    .with_code(ErrorCode::E213)
                    .with_label(span_of(statement, junk), "expected `.pin(wire)`")
                    .with_help("connect pins as `.pin(wire)`, separated by `,`"));
            };
            self.connect(statement, &mut instance, &conn)?;
        }

        if instance.connection_count() == 0 {
            return Err(
                Diagnostic::error(format!("instance `{name}` has no connections"))
                    .with_code(ErrorCode::E210)
                    .with_label(statement.span, "no `.pin(wire)` groups")
                    .with_help("connect at least one pin, e.g. `.a(x)`"),
            );
        }

        debug!(
            instance:% = name,
            cell:% = module_name,
            connections = instance.connection_count();
            "Added instance"
        );
        self.module.add_instance(instance);
        self.instances.insert(name, name_span);
        Ok(())
    }

    /// Resolves one `.pin(wire)` group of `instance`.
    fn connect(
        &mut self,
        statement: &Statement<'_>,
        instance: &mut Instance,
        conn: &Connection<'_>,
    ) -> Result<()> {
        let pin = identifier(statement, conn.pin, "pin")?;
        let wire = identifier(statement, conn.wire, "wire")?;
        let group_span = span_of(statement, conn.group);
        let wire_span = span_of(statement, conn.wire);

        if !instance.connect(pin, wire) {
            let message = if instance.wire(pin).is_some() {
                format!("pin `{pin}` of `{}` is connected twice", instance.name())
            } else {
                format!("`{wire}` is connected twice by `{}`", instance.name())
            };
            return Err(Diagnostic::error(message)
                .with_code(ErrorCode::E212)
                .with_label(group_span, "repeated connection"));
        }

        if self.module.direction(wire).is_some() {
            if !self.module.set_port_instance(wire, instance.name()) {
                let mut diag = Diagnostic::error(format!("port `{wire}` is already connected"))
                    .with_code(ErrorCode::E211)
                    .with_label(wire_span, "second connection");
                if let Some(first) = self.port_connections.get(&wire) {
                    diag = diag.with_secondary_label(*first, "first connected here");
                }
                return Err(diag.with_help("a port connects to exactly one instance"));
            }
            self.port_connections.insert(wire, wire_span);
            trace!(port:% = wire, instance:% = instance.name(); "Connected port");
            return Ok(());
        }

        if let Some(first) = self.ports.get(&wire) {
            return Err(
                Diagnostic::error(format!("port `{wire}` has no direction"))
                    .with_code(ErrorCode::E207)
                    .with_label(wire_span, "used before its direction is declared")
                    .with_secondary_label(*first, "declared here")
                    .with_help(format!(
                        "declare `input {wire};` or `output {wire};` before this instance"
                    )),
            );
        }

        let Some(declared) = self.module.wire_mut(wire) else {
            return Err(Diagnostic::error(format!("undeclared wire `{wire}`"))
                .with_code(ErrorCode::E207)
                .with_label(wire_span, "not a wire or port")
                .with_help(format!("declare it first, e.g. `wire {wire} dependency;`")));
        };
        if !declared.endpoints_mut().push(instance.name()) {
            let mut diag = Diagnostic::error(format!("wire `{wire}` already has two endpoints"))
                .with_code(ErrorCode::E209)
                .with_label(wire_span, "third connection");
            if let Some(first) = self.wires.get(&wire) {
                diag = diag.with_secondary_label(*first, "declared here");
            }
            return Err(diag.with_help("wires connect exactly two instances"));
        }
        trace!(wire:% = wire, instance:% = instance.name(); "Connected wire");
        Ok(())
    }

    /// Completes the module, reporting suspicious but legal declarations to
    /// `sink`.
    pub(crate) fn finish(self, sink: &mut dyn DiagnosticSink) -> Module {
        for (name, wire) in self.module.wires() {
            if wire.endpoints().is_full() {
                continue;
            }
            let mut diag = Diagnostic::warning(format!(
                "wire `{name}` has {} of 2 endpoints",
                wire.endpoints().len()
            ))
            .with_code(ErrorCode::W001)
            .with_help("incomplete wires are left out of the graph");
            if let Some(span) = self.wires.get(name) {
                diag = diag.with_label(*span, "declared here");
            }
            sink.emit(diag);
        }

        for port in self.module.ports() {
            let span = self.ports.get(port).copied().unwrap_or(self.header);
            if self.module.direction(*port).is_none() {
                sink.emit(
                    Diagnostic::warning(format!("port `{port}` has no direction"))
                        .with_code(ErrorCode::W002)
                        .with_label(span, "never declared `input` or `output`"),
                );
            } else if self.module.port_instance(*port).is_none() {
                sink.emit(
                    Diagnostic::warning(format!("port `{port}` is not connected"))
                        .with_code(ErrorCode::W003)
                        .with_label(span, "no instance uses this port"),
                );
            }
        }

        self.module
    }
}

fn malformed_declaration(statement: &Statement<'_>, expected: &str) -> Diagnostic {
    Diagnostic::error("malformed declaration")
        .with_code(ErrorCode::E214)
        .with_label(statement.span, format!("expected {expected}"))
}
