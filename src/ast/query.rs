use crate::ast::Node;

/// Field list that selects the whole record unchanged.
pub const SELECT_ALL: &str = "*";

/// A compiled `SELECT <fields> FROM t [WHERE <expr>]` query.
///
/// Built once per query string and shared read-only by every record.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Projected fields in query order; never empty.
    ///
    /// May contain `*` and the `[keys]` pseudo-field.
    pub fields: Vec<String>,

    /// Boolean predicate; [`Node::True`] when the query has no WHERE clause
    pub predicate: Node,
}

impl QueryPlan {
    /// True when the field list is exactly `*`, in which case kept records are
    /// emitted verbatim.
    pub fn selects_all(&self) -> bool {
        self.fields.len() == 1 && self.fields[0] == SELECT_ALL
    }
}
