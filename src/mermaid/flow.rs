//! Recursive descent over flowchart statements.
//!
//! DESIGN
//! ======
//! Every line is parsed on its own as `node (link node)*`. A statement is
//! applied to the graph only once the whole line has been consumed, so a
//! line that fails halfway leaves no partial nodes behind.

use tracing::debug;

use super::ast::{ArrowCap, ConnectorStyle, Direction, Edge, FlowGraph, Node, NodeShapeKind, Subgraph};
use super::parse::strip_keyword;

/// Bracket pairs, ordered so multi-character openers win over their prefixes.
const SHAPES: &[(&str, &str, NodeShapeKind)] = &[
    ("((", "))", NodeShapeKind::Circle),
    ("([", "])", NodeShapeKind::Stadium),
    ("[(", ")]", NodeShapeKind::Cylinder),
    ("{{", "}}", NodeShapeKind::Hexagon),
    ("[/", "/]", NodeShapeKind::Parallelogram),
    ("[\\", "\\]", NodeShapeKind::Trapezoid),
    ("(", ")", NodeShapeKind::RoundedRectangle),
    ("{", "}", NodeShapeKind::Decision),
    ("[", "]", NodeShapeKind::Rectangle),
    (">", "]", NodeShapeKind::Parallelogram),
];

/// Build a flowchart from the lines following the header.
pub(super) fn parse_flow(direction: Direction, lines: &[&str]) -> FlowGraph {
    let mut graph = FlowGraph { direction, ..FlowGraph::default() };
    // Innermost open subgraph last.
    let mut open: Vec<usize> = Vec::new();

    for &raw in lines {
        let line = raw.trim_end_matches(';').trim_end();

        if line.eq_ignore_ascii_case("end") {
            open.pop();
            continue;
        }
        if let Some(rest) = strip_keyword(line, "subgraph") {
            open.push(open_subgraph(&mut graph, rest));
            continue;
        }

        match parse_statement(line) {
            Some(statement) => apply(&mut graph, statement, open.last().copied()),
            None => debug!(line, "ignoring unrecognized flowchart line"),
        }
    }

    graph
}

// =============================================================================
// STATEMENTS
// =============================================================================

#[derive(Debug)]
struct NodeRef<'a> {
    id: &'a str,
    annotation: Option<(String, NodeShapeKind)>,
}

#[derive(Debug)]
struct Link {
    style: ConnectorStyle,
    end_cap: ArrowCap,
    label: Option<String>,
}

/// `nodes.len() == links.len() + 1`
#[derive(Debug)]
struct Statement<'a> {
    nodes: Vec<NodeRef<'a>>,
    links: Vec<Link>,
}

fn parse_statement(line: &str) -> Option<Statement<'_>> {
    let mut cur = Cursor::new(line);
    let mut nodes = vec![node_ref(&mut cur)?];
    let mut links = Vec::new();

    loop {
        cur.skip_ws();
        if cur.at_end() {
            break;
        }
        links.push(link(&mut cur)?);
        nodes.push(node_ref(&mut cur)?);
    }

    Some(Statement { nodes, links })
}

fn apply(graph: &mut FlowGraph, statement: Statement<'_>, group: Option<usize>) {
    let Statement { nodes, links } = statement;

    for node in &nodes {
        register(graph, node, group);
    }

    for (pair, link) in nodes.windows(2).zip(links) {
        graph.edges.push(Edge {
            from: pair[0].id.to_owned(),
            to: pair[1].id.to_owned(),
            label: link.label,
            style: link.style,
            start_cap: ArrowCap::None,
            end_cap: link.end_cap,
        });
    }
}

/// Insert a node on first mention. A later annotation upgrades a node that is
/// still a rectangle to a specific shape; a specific shape is never replaced.
fn register(graph: &mut FlowGraph, node: &NodeRef<'_>, group: Option<usize>) {
    if let Some(existing) = graph.nodes.get_mut(node.id) {
        if let Some((label, shape)) = &node.annotation {
            let upgrades = !existing.annotated
                || (existing.shape == NodeShapeKind::Rectangle && *shape != NodeShapeKind::Rectangle);
            if upgrades {
                existing.label.clone_from(label);
                existing.shape = *shape;
                existing.annotated = true;
            }
        }
        return;
    }

    let (label, shape, annotated) = match &node.annotation {
        Some((label, shape)) => (label.clone(), *shape, true),
        None => (node.id.to_owned(), NodeShapeKind::Rectangle, false),
    };
    graph.nodes.insert(
        node.id.to_owned(),
        Node { id: node.id.to_owned(), label, shape, annotated, subgraph: group },
    );
    if let Some(group) = group {
        graph.subgraphs[group].nodes.push(node.id.to_owned());
    }
}

/// Register a `subgraph` from `ID`, `ID[Title]` or free-form title words.
fn open_subgraph(graph: &mut FlowGraph, rest: &str) -> usize {
    let (id, title) = match rest.split_once('[') {
        Some((id, title)) if title.ends_with(']') => (id.trim(), unquote(title[..title.len() - 1].trim())),
        _ => (rest, unquote(rest)),
    };

    let index = graph.subgraphs.len();
    let id = if id.is_empty() { format!("subgraph{}", index + 1) } else { id.to_owned() };
    let title = if title.is_empty() { id.clone() } else { title.to_owned() };
    graph.subgraphs.push(Subgraph { id, title, nodes: Vec::new() });
    index
}

// =============================================================================
// NODES AND LINKS
// =============================================================================

fn node_ref<'a>(cur: &mut Cursor<'a>) -> Option<NodeRef<'a>> {
    let id = cur.ident()?;
    let annotation = match cur.peek() {
        Some('[' | '(' | '{' | '>') => Some(shape(cur, id)?),
        _ => None,
    };
    Some(NodeRef { id, annotation })
}

/// Match the first bracket form that closes; an opener with no closer fails the line.
fn shape(cur: &mut Cursor<'_>, id: &str) -> Option<(String, NodeShapeKind)> {
    let start = cur.pos;
    for &(open, close, kind) in SHAPES {
        if !cur.eat(open) {
            continue;
        }
        if let Some(inner) = cur.take_until(close) {
            let label = unquote(inner.trim());
            let label = if label.is_empty() { id } else { label };
            return Some((label.to_owned(), kind));
        }
        cur.pos = start;
    }
    None
}

fn link(cur: &mut Cursor<'_>) -> Option<Link> {
    cur.skip_ws();
    let (style, end_cap, mut label) = operator(cur)?;
    cur.skip_ws();
    if cur.eat("|") {
        label = non_empty(cur.take_until("|")?);
    }
    cur.skip_ws();
    Some(Link { style, end_cap, label })
}

/// Scan one link operator, e.g. `-->`, `---`, `-.->`, `==>`, `--o`, `-- text -->`.
fn operator(cur: &mut Cursor<'_>) -> Option<(ConnectorStyle, ArrowCap, Option<String>)> {
    let rest = cur.rest();

    if let Some(after) = rest.strip_prefix('-') {
        let dots = after.bytes().take_while(|&b| b == b'.').count();
        if dots > 0 {
            let tail = &after[dots..];
            let (len, cap) = if tail.starts_with("->") {
                (2, ArrowCap::Arrow)
            } else if tail.starts_with('-') {
                (1, ArrowCap::None)
            } else {
                return None;
            };
            cur.pos += 1 + dots + len;
            return Some((ConnectorStyle::Dotted, cap, None));
        }
    }

    let (fill, style) = match rest.bytes().next() {
        Some(b'-') => (b'-', ConnectorStyle::Solid),
        Some(b'=') => (b'=', ConnectorStyle::Thick),
        _ => return None,
    };
    let run = rest.bytes().take_while(|&b| b == fill).count();
    let tail = &rest[run..];

    if run >= 2 && tail.starts_with('>') {
        cur.pos += run + 1;
        return Some((style, ArrowCap::Arrow, None));
    }
    if run >= 3 {
        cur.pos += run;
        return Some((style, ArrowCap::None, None));
    }
    if run != 2 {
        return None;
    }

    if style == ConnectorStyle::Solid {
        for (marker, cap) in [('o', ArrowCap::FilledCircle), ('x', ArrowCap::Cross)] {
            let closes = tail
                .strip_prefix(marker)
                .is_some_and(|after| after.starts_with(|c: char| c.is_whitespace() || c == '|'));
            if closes {
                cur.pos += 3;
                return Some((style, cap, None));
            }
        }
    }

    // Inline label: the text runs up to the next operator of the same stroke.
    if !tail.starts_with(char::is_whitespace) {
        return None;
    }
    let opener = if style == ConnectorStyle::Thick { "==" } else { "--" };
    let close_at = tail.find(opener)?;
    let label = non_empty(&tail[..close_at]);
    cur.pos += run + close_at;
    let (_, cap, _) = operator(cur)?;
    Some((style, cap, label))
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

fn non_empty(text: &str) -> Option<String> {
    let text = unquote(text.trim()).trim();
    if text.is_empty() { None } else { Some(text.to_owned()) }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// =============================================================================
// CURSOR
// =============================================================================

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !is_ident_char(c))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    /// Consume through `close`, returning the text before it.
    fn take_until(&mut self, close: &str) -> Option<&'a str> {
        let rest = self.rest();
        let idx = rest.find(close)?;
        self.pos += idx + close.len();
        Some(&rest[..idx])
    }
}
