use crate::location::SourceRange;

/// A piece of whitespace/comment attached to a real token for
/// source-fidelity tooling (§3: "Trivia are whitespace/comments
/// preserved for diagnostics").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaKind {
    Newline,
    LineComment,
    BlockComment,
    DocLineComment,
    DocBlockComment,
}
