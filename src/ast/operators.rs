/// Comparison operators (the middle precedence tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// Equal (`=`)
    Equal,
    /// Not equal (`!=` or `<>`)
    NotEqual,
    /// Less than (`<`)
    LessThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    GreaterThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
}

impl CmpOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(CmpOp::Equal),
            "!=" | "<>" => Some(CmpOp::NotEqual),
            "<" => Some(CmpOp::LessThan),
            "<=" => Some(CmpOp::LessEqual),
            ">" => Some(CmpOp::GreaterThan),
            ">=" => Some(CmpOp::GreaterEqual),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Equal => "=",
            CmpOp::NotEqual => "!=",
            CmpOp::LessThan => "<",
            CmpOp::LessEqual => "<=",
            CmpOp::GreaterThan => ">",
            CmpOp::GreaterEqual => ">=",
        }
    }

    /// `=`, `!=` and `<>` compare values; the rest compare numbers.
    pub fn is_equality(self) -> bool {
        matches!(self, CmpOp::Equal | CmpOp::NotEqual)
    }
}

/// Arithmetic operators (the highest precedence tier).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    /// Addition (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`)
    Modulo,
}

impl ArithOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(ArithOp::Add),
            "-" => Some(ArithOp::Subtract),
            "*" => Some(ArithOp::Multiply),
            "/" => Some(ArithOp::Divide),
            "%" => Some(ArithOp::Modulo),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Subtract => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
            ArithOp::Modulo => "%",
        }
    }
}
