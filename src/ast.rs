//! # Query Language - Abstract Syntax Tree
//!
//! This module defines the tokens and the predicate tree for the small
//! SQL-flavoured language used to filter newline-delimited JSON records.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[nodes]** - Predicate tree nodes and their introspection tags
//! - **[operators]** - Comparison and arithmetic operators
//! - **[query]** - The compiled query plan (field list + predicate)
//!
//! ## Quick Start
//!
//! ```text
//! select name, age from t where age > 18 and name like 'A%'
//! ```
//!
//! Keeps records whose `age` exceeds 18 and whose `name` starts with `A`,
//! and emits only those two fields.
//!
//! ## Core Concepts
//!
//! ### Query Shape
//!
//! ```text
//! SELECT <field>[, <field>...] FROM t [WHERE <predicate>]
//! ```
//!
//! `t` is the only table name. `*` selects the whole record verbatim and
//! `[keys]` yields the sorted, comma-joined list of a record's keys.
//!
//! ### Precedence Tiers
//!
//! From loosest to tightest binding:
//!
//! 1. `and`, `or`
//! 2. `=`, `!=`, `<>`, `<`, `<=`, `>`, `>=`
//! 3. `+`, `-`, `*`, `/`, `%`
//!
//! Within a tier the first operator (left to right, outside parentheses)
//! splits the expression, so chains of one tier group to the right:
//! `a - b - c` reads as `a - (b - c)`.
//!
//! ### Fixed-Shape Predicates
//!
//! ```text
//! key is null
//! key is not null
//! key like 'A%'
//! key not like '_b%'
//! key in ('x', 'y', 3)
//! key not in (1, 2)
//! ```
//!
//! ### Node Capabilities
//!
//! Every node supports some of three evaluations: a dynamic value, a number,
//! or a boolean. The parser checks capabilities while building the tree, so
//! `'abc' > 3` is rejected before any record is read.
pub mod nodes;
pub mod operators;
pub mod query;
pub mod tokens;

pub use nodes::{Node, NodeType};
pub use operators::{ArithOp, CmpOp};
pub use query::{QueryPlan, SELECT_ALL};
pub use tokens::{Token, TokenKind, fragment};
