use bumpalo::Bump;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;
use tracing::trace;

use super::{Node, NodeKind, ParseError, ParseTree, Span};

#[derive(Parser)]
#[grammar = "parser/kerboscript.pest"]
pub struct KerboScriptParser;

/// Lower-case everything outside of string literals.
///
/// Only ASCII is folded so byte offsets stay stable; trigger names are built
/// from them.
pub fn normalize(source: &str) -> String {
    let mut in_string = false;
    source
        .chars()
        .map(|c| {
            if c == '"' {
                in_string = !in_string;
            }
            if in_string { c } else { c.to_ascii_lowercase() }
        })
        .collect()
}

/// Parse a program into an arena-allocated tree.
pub fn parse<'a>(arena: &'a Bump, source: &str) -> Result<ParseTree<'a>, ParseError> {
    let source: &'a str = arena.alloc_str(&normalize(source));
    let mut pairs = KerboScriptParser::parse(Rule::start, source)?;
    let root = match pairs.next() {
        Some(pair) => lower(arena, pair),
        None => None,
    };
    let root = root.unwrap_or_else(|| Node {
        kind: NodeKind::Start,
        text: source,
        span: Span::new(0, source.len()),
        children: &[],
    });
    trace!(nodes = root.children.len(), "parsed program");
    Ok(ParseTree {
        source,
        root: arena.alloc(root),
    })
}

fn lower<'a>(arena: &'a Bump, pair: Pair<'a, Rule>) -> Option<Node<'a>> {
    let kind = node_kind(pair.as_rule())?;
    let start = pair.as_span().start();
    let text = trim_trailing_trivia(pair.as_str());
    let span = Span::new(start, start + text.len());
    let children: Vec<Node<'a>> = pair
        .into_inner()
        .filter_map(|inner| lower(arena, inner))
        .collect();
    Some(Node {
        kind,
        text,
        span,
        children: arena.alloc_slice_fill_iter(children),
    })
}

/// Drop the whitespace and comments a non-atomic rule swallows after its
/// last token.
fn trim_trailing_trivia(text: &str) -> &str {
    let mut text = text.trim_end();
    while let Some(comment) = trailing_comment(text) {
        text = text[..comment].trim_end();
    }
    text
}

/// Offset of a `//` comment that runs to the end of `text`.
fn trailing_comment(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut in_string = false;
    let mut comment = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' if comment.is_none() => in_string = !in_string,
            b'\n' => comment = None,
            b'/' if !in_string && comment.is_none() && bytes.get(i + 1) == Some(&b'/') => {
                comment = Some(i);
            }
            _ => {}
        }
        i += 1;
    }
    comment
}

fn node_kind(rule: Rule) -> Option<NodeKind> {
    use NodeKind as K;
    let kind = match rule {
        Rule::start => K::Start,
        Rule::instruction => K::Instruction,
        Rule::instruction_block => K::InstructionBlock,

        Rule::set_stmt => K::SetStmt,
        Rule::if_stmt => K::IfStmt,
        Rule::until_stmt => K::UntilStmt,
        Rule::lock_stmt => K::LockStmt,
        Rule::unlock_stmt => K::UnlockStmt,
        Rule::print_stmt => K::PrintStmt,
        Rule::on_stmt => K::OnStmt,
        Rule::toggle_stmt => K::ToggleStmt,
        Rule::wait_stmt => K::WaitStmt,
        Rule::when_stmt => K::WhenStmt,
        Rule::onoff_stmt => K::OnOffStmt,
        Rule::stage_stmt => K::StageStmt,
        Rule::clear_stmt => K::ClearStmt,
        Rule::add_stmt => K::AddStmt,
        Rule::remove_stmt => K::RemoveStmt,
        Rule::log_stmt => K::LogStmt,
        Rule::break_stmt => K::BreakStmt,
        Rule::declare_stmt => K::DeclareStmt,
        Rule::switch_stmt => K::SwitchStmt,
        Rule::copy_stmt => K::CopyStmt,
        Rule::rename_stmt => K::RenameStmt,
        Rule::delete_stmt => K::DeleteStmt,
        Rule::run_stmt => K::RunStmt,
        Rule::list_stmt => K::ListStmt,
        Rule::reboot_stmt => K::RebootStmt,
        Rule::shutdown_stmt => K::ShutdownStmt,
        Rule::unset_stmt => K::UnsetStmt,

        Rule::expr => K::Expr,
        Rule::or_expr => K::OrExpr,
        Rule::and_expr => K::AndExpr,
        Rule::compare_expr => K::CompareExpr,
        Rule::arith_expr => K::ArithExpr,
        Rule::mult_expr => K::MultExpr,
        Rule::factor => K::Factor,
        Rule::atom => K::Atom,
        Rule::sci_number => K::SciNumber,
        Rule::number => K::Number,
        Rule::integer | Rule::exponent => K::Integer,
        Rule::double => K::Double,
        Rule::boolean => K::Bool,
        Rule::string_literal => K::String,
        Rule::identifier => K::Identifier,
        Rule::varidentifier => K::VarIdentifier,
        Rule::arglist => K::ArgList,
        Rule::filevol_name => K::FileVolName,

        Rule::plusminus => K::PlusMinus,
        Rule::mult => K::Mult,
        Rule::div => K::Div,
        Rule::power => K::Power,
        Rule::comparator => K::Comparator,
        Rule::and => K::And,
        Rule::or => K::Or,
        Rule::until => K::Until,
        Rule::all => K::All,
        Rule::on => K::On,
        Rule::off => K::Off,
        Rule::from => K::From,
        Rule::to => K::To,
        Rule::file => K::File,
        Rule::volume => K::Volume,
        Rule::parameter => K::Parameter,

        _ => return None,
    };
    Some(kind)
}
