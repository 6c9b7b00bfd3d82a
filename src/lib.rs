pub mod ast;
pub mod cli;
pub mod compiler;
pub mod evaluator;
pub mod filter;
pub mod lexer;
pub mod parser;
pub mod pattern;
pub mod record;
pub mod value;


pub use ast::{ArithOp, CmpOp, Node, NodeType, QueryPlan, Token, TokenKind};
pub use compiler::{CompileError, SyntaxError, compile};
pub use evaluator::{EvalError, Getter};
pub use filter::{FilterStats, JsonFilter, RecordError};
pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, Parser};
pub use record::{KEYS_FIELD, Record};
pub use value::Value;
