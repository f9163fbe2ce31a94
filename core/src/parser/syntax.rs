use core::fmt;
use core::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Span(pub Range<usize>);

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self(start..end)
    }
    pub fn start(&self) -> usize {
        self.0.start
    }
    pub fn str_of<'a>(&self, source: &'a str) -> &'a str {
        &source[self.0.start..self.0.end]
    }
}

impl From<pest::Span<'_>> for Span {
    fn from(s: pest::Span<'_>) -> Self {
        Self(s.start()..s.end())
    }
}

/// Closed set of parse tree node kinds.
///
/// Keywords and punctuation that carry no meaning are dropped by the parser;
/// the kinds below the statements are tokens that decide how their parent is
/// compiled (`On`/`Off`, `From`/`To`, comparator text, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Start,
    Instruction,
    InstructionBlock,

    // Statements
    SetStmt,
    IfStmt,
    UntilStmt,
    LockStmt,
    UnlockStmt,
    PrintStmt,
    OnStmt,
    ToggleStmt,
    WaitStmt,
    WhenStmt,
    OnOffStmt,
    StageStmt,
    ClearStmt,
    AddStmt,
    RemoveStmt,
    LogStmt,
    BreakStmt,
    DeclareStmt,
    SwitchStmt,
    CopyStmt,
    RenameStmt,
    DeleteStmt,
    RunStmt,
    ListStmt,
    RebootStmt,
    ShutdownStmt,
    UnsetStmt,

    // Expressions
    Expr,
    OrExpr,
    AndExpr,
    CompareExpr,
    ArithExpr,
    MultExpr,
    Factor,
    Atom,
    SciNumber,
    Number,
    Integer,
    Double,
    Bool,
    String,
    Identifier,
    VarIdentifier,
    ArgList,
    FileVolName,

    // Tokens
    PlusMinus,
    Mult,
    Div,
    Power,
    Comparator,
    And,
    Or,
    Until,
    All,
    On,
    Off,
    From,
    To,
    File,
    Volume,
    Parameter,
}

impl NodeKind {
    pub fn is_statement(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            SetStmt
                | IfStmt
                | UntilStmt
                | LockStmt
                | UnlockStmt
                | PrintStmt
                | OnStmt
                | ToggleStmt
                | WaitStmt
                | WhenStmt
                | OnOffStmt
                | StageStmt
                | ClearStmt
                | AddStmt
                | RemoveStmt
                | LogStmt
                | BreakStmt
                | DeclareStmt
                | SwitchStmt
                | CopyStmt
                | RenameStmt
                | DeleteStmt
                | RunStmt
                | ListStmt
                | RebootStmt
                | ShutdownStmt
                | UnsetStmt
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
