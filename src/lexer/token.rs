#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,          // Command name, argument or file name
    Pipe,          // |
    RedirectIn,    // <
    RedirectOut,   // >
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,       // Original string
    pub span: (usize, usize), // Position info [start, end)
}

