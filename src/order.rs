use std::fmt::{Display, Formatter};

/// Operator binding strength of a rendered expression.
///
/// Higher values bind tighter. A child rendered through
/// [`GenerationPass::value_to_code`](crate::generator::GenerationPass::value_to_code)
/// is wrapped in parentheses when its order is below the order the parent asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Order(u8);

impl Order {
    pub const ATOMIC: Order = Order(12);
    pub const MEMBER: Order = Order(12);
    pub const FUNCTION_CALL: Order = Order(12);
    pub const LOGICAL_NOT: Order = Order(11);
    pub const MULTIPLICATION: Order = Order(10);
    pub const DIVISION: Order = Order(10);
    pub const ADDITION: Order = Order(9);
    pub const SUBTRACTION: Order = Order(9);
    pub const RELATIONAL: Order = Order(8);
    pub const EQUALITY: Order = Order(7);
    pub const LOGICAL_AND: Order = Order(6);
    pub const LOGICAL_OR: Order = Order(5);
    pub const ASSIGNMENT: Order = Order(3);
    pub const COMMA: Order = Order(1);
    /// Requesting this order never wraps the child.
    pub const NONE: Order = Order(0);

    pub fn rank(self) -> u8 {
        self.0
    }

    pub fn needs_parens(child: Order, requested: Order) -> bool {
        child < requested
    }
}

impl Display for Order {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
