use std::fmt::{Display, Formatter};

/// Every block kind the Hexput generator knows how to render.
///
/// `Custom` covers literal blocks added at run time through
/// [`add_custom_literal`](crate::host::add_custom_literal).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockKind {
    VariableDeclaration,
    NumberLiteral,
    StringLiteral,
    BooleanLiteral,
    AnyConcat,
    MathSubtract,
    MathMultiply,
    MathDivide,
    ReturnStatement,
    ArrayLiteral,
    ArrayItem,
    ObjectLiteral,
    ObjectProperty,
    VariableReference,
    IfStatement,
    LogicAnd,
    LogicOr,
    LogicNot,
    ComparisonGt,
    ComparisonLt,
    ComparisonEq,
    ComparisonNeq,
    ComparisonGte,
    ComparisonLte,
    LoopStatement,
    ObjectPropertyAccess,
    ObjectBracketAccess,
    ArrayIndexAccess,
    FunctionCall,
    FunctionParams,
    FunctionParameter,
    Custom(String),
}

impl BlockKind {
    pub const BUILTIN: [BlockKind; 31] = [
        BlockKind::VariableDeclaration,
        BlockKind::NumberLiteral,
        BlockKind::StringLiteral,
        BlockKind::BooleanLiteral,
        BlockKind::AnyConcat,
        BlockKind::MathSubtract,
        BlockKind::MathMultiply,
        BlockKind::MathDivide,
        BlockKind::ReturnStatement,
        BlockKind::ArrayLiteral,
        BlockKind::ArrayItem,
        BlockKind::ObjectLiteral,
        BlockKind::ObjectProperty,
        BlockKind::VariableReference,
        BlockKind::IfStatement,
        BlockKind::LogicAnd,
        BlockKind::LogicOr,
        BlockKind::LogicNot,
        BlockKind::ComparisonGt,
        BlockKind::ComparisonLt,
        BlockKind::ComparisonEq,
        BlockKind::ComparisonNeq,
        BlockKind::ComparisonGte,
        BlockKind::ComparisonLte,
        BlockKind::LoopStatement,
        BlockKind::ObjectPropertyAccess,
        BlockKind::ObjectBracketAccess,
        BlockKind::ArrayIndexAccess,
        BlockKind::FunctionCall,
        BlockKind::FunctionParams,
        BlockKind::FunctionParameter,
    ];

    pub fn type_name(&self) -> &str {
        match self {
            BlockKind::VariableDeclaration => "variable_declaration",
            BlockKind::NumberLiteral => "number_literal",
            BlockKind::StringLiteral => "string_literal",
            BlockKind::BooleanLiteral => "boolean_literal",
            BlockKind::AnyConcat => "any_concat",
            BlockKind::MathSubtract => "math_subtract",
            BlockKind::MathMultiply => "math_multiply",
            BlockKind::MathDivide => "math_divide",
            BlockKind::ReturnStatement => "return_statement",
            BlockKind::ArrayLiteral => "array_literal",
            BlockKind::ArrayItem => "array_item",
            BlockKind::ObjectLiteral => "object_literal",
            BlockKind::ObjectProperty => "object_property",
            BlockKind::VariableReference => "variable_reference",
            BlockKind::IfStatement => "if_statement",
            BlockKind::LogicAnd => "logic_and",
            BlockKind::LogicOr => "logic_or",
            BlockKind::LogicNot => "logic_not",
            BlockKind::ComparisonGt => "comparison_gt",
            BlockKind::ComparisonLt => "comparison_lt",
            BlockKind::ComparisonEq => "comparison_eq",
            BlockKind::ComparisonNeq => "comparison_neq",
            BlockKind::ComparisonGte => "comparison_gte",
            BlockKind::ComparisonLte => "comparison_lte",
            BlockKind::LoopStatement => "loop_statement",
            BlockKind::ObjectPropertyAccess => "object_property_access",
            BlockKind::ObjectBracketAccess => "object_bracket_access",
            BlockKind::ArrayIndexAccess => "array_index_access",
            BlockKind::FunctionCall => "function_call",
            BlockKind::FunctionParams => "function_params",
            BlockKind::FunctionParameter => "function_parameter",
            BlockKind::Custom(name) => name,
        }
    }

    /// Resolves a builtin type name. Anything else is treated as a custom literal;
    /// whether one is registered under that name is checked at load time.
    pub fn from_type_name(name: &str) -> BlockKind {
        BlockKind::BUILTIN
            .iter()
            .find(|kind| kind.type_name() == name)
            .cloned()
            .unwrap_or_else(|| BlockKind::Custom(name.to_string()))
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, BlockKind::Custom(_))
    }

    /// Statement blocks render to plain text; everything else yields an expression.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            BlockKind::VariableDeclaration
                | BlockKind::ReturnStatement
                | BlockKind::ArrayItem
                | BlockKind::ObjectProperty
                | BlockKind::IfStatement
                | BlockKind::LoopStatement
                | BlockKind::FunctionParams
                | BlockKind::FunctionParameter
        )
    }
}

impl Display for BlockKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}
