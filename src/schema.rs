use crate::block::BlockKind;
use crate::error::RegistryError;
use anyhow::Result;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Connection tag of an output or a previous/next statement slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Check {
    /// The slot does not exist on this block.
    #[default]
    Absent,
    /// The slot exists and accepts anything (`null` in the toolkit's JSON).
    Any,
    Typed(&'static str),
}

impl Check {
    pub fn is_absent(&self) -> bool {
        matches!(self, Check::Absent)
    }
}

impl Serialize for Check {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Check::Absent | Check::Any => serializer.serialize_none(),
            Check::Typed(tag) => serializer.serialize_str(tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Arg {
    FieldInput {
        name: &'static str,
        text: &'static str,
    },
    FieldNumber {
        name: &'static str,
        value: f64,
    },
    FieldDropdown {
        name: &'static str,
        options: Vec<(&'static str, &'static str)>,
    },
    FieldLabel {
        text: String,
    },
    InputValue {
        name: &'static str,
        check: Option<&'static str>,
    },
    InputStatement {
        name: &'static str,
        check: Option<&'static str>,
    },
}

impl Arg {
    fn value(name: &'static str) -> Arg {
        Arg::InputValue { name, check: None }
    }

    fn text(name: &'static str, text: &'static str) -> Arg {
        Arg::FieldInput { name, text }
    }

    fn statement(name: &'static str, check: Option<&'static str>) -> Arg {
        Arg::InputStatement { name, check }
    }
}

/// Toolbox grouping. Not part of the toolkit's block JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Variables,
    Values,
    Math,
    Logic,
    Collections,
    Control,
    Functions,
    Custom,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Variables,
        Category::Values,
        Category::Math,
        Category::Logic,
        Category::Collections,
        Category::Control,
        Category::Functions,
        Category::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Variables => "Variables",
            Category::Values => "Values",
            Category::Math => "Math",
            Category::Logic => "Logic",
            Category::Collections => "Collections",
            Category::Control => "Control",
            Category::Functions => "Functions",
            Category::Custom => "Custom",
        }
    }
}

/// Shape of one block type, serialized in the toolkit's JSON block-definition format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSchema {
    #[serde(rename = "type")]
    pub type_name: String,
    pub message0: String,
    pub args0: Vec<Arg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message1: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args1: Vec<Arg>,
    #[serde(skip_serializing_if = "Check::is_absent")]
    pub output: Check,
    #[serde(skip_serializing_if = "Check::is_absent")]
    pub previous_statement: Check,
    #[serde(skip_serializing_if = "Check::is_absent")]
    pub next_statement: Check,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inputs_inline: bool,
    pub colour: u16,
    pub tooltip: String,
    pub help_url: String,
    #[serde(skip)]
    pub category: Category,
}

impl BlockSchema {
    pub fn new(kind: &BlockKind, message0: &str, colour: u16, category: Category) -> Self {
        Self {
            type_name: kind.type_name().to_string(),
            message0: message0.to_string(),
            args0: Vec::new(),
            message1: None,
            args1: Vec::new(),
            output: Check::Absent,
            previous_statement: Check::Absent,
            next_statement: Check::Absent,
            inputs_inline: false,
            colour,
            tooltip: String::new(),
            help_url: String::new(),
            category,
        }
    }

    pub fn args(mut self, args: Vec<Arg>) -> Self {
        self.args0 = args;
        self
    }

    pub fn body(mut self, message1: &str, args1: Vec<Arg>) -> Self {
        self.message1 = Some(message1.to_string());
        self.args1 = args1;
        self
    }

    pub fn output(mut self, check: Check) -> Self {
        self.output = check;
        self
    }

    pub fn chain(mut self, previous: Check, next: Check) -> Self {
        self.previous_statement = previous;
        self.next_statement = next;
        self
    }

    pub fn inline(mut self) -> Self {
        self.inputs_inline = true;
        self
    }

    pub fn tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = tooltip.to_string();
        self
    }

    pub fn is_value_block(&self) -> bool {
        !self.output.is_absent()
    }
}

/// Block-type registry owned by one host. Registration order is kept for the toolbox.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: Vec<BlockSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, schema: BlockSchema) -> Result<(), RegistryError> {
        if schema.type_name.trim().is_empty() {
            return Err(RegistryError::EmptyTypeName);
        }
        if self.contains(&schema.type_name) {
            return Err(RegistryError::DuplicateType(schema.type_name));
        }
        self.schemas.push(schema);
        Ok(())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.get(type_name).is_some()
    }

    pub fn get(&self, type_name: &str) -> Option<&BlockSchema> {
        self.schemas.iter().find(|s| s.type_name == type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockSchema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The array handed to the toolkit's `defineBlocksWithJsonArray`.
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.schemas)?)
    }
}

const VARIABLE_COLOUR: u16 = 230;
const VALUE_COLOUR: u16 = 160;
const LOGIC_COLOUR: u16 = 210;
const ARRAY_COLOUR: u16 = 290;
const LOOP_COLOUR: u16 = 120;
const RETURN_COLOUR: u16 = 20;
pub const CUSTOM_LITERAL_COLOUR: u16 = 330;

/// Registers every builtin Hexput block.
pub fn define_block_types(registry: &mut SchemaRegistry) -> Result<(), RegistryError> {
    for kind in BlockKind::BUILTIN.iter() {
        registry.register(builtin_schema(kind))?;
    }
    Ok(())
}

pub fn custom_literal_schema(type_name: &str, label: &str) -> BlockSchema {
    let kind = BlockKind::Custom(type_name.to_string());
    BlockSchema::new(&kind, "%1", CUSTOM_LITERAL_COLOUR, Category::Custom)
        .args(vec![Arg::FieldLabel {
            text: label.to_string(),
        }])
        .output(Check::Any)
        .tooltip(&format!("Custom literal: {}", label))
}

fn builtin_schema(kind: &BlockKind) -> BlockSchema {
    match kind {
        BlockKind::VariableDeclaration => {
            BlockSchema::new(kind, "vl %1 = %2", VARIABLE_COLOUR, Category::Variables)
                .args(vec![Arg::text("VAR_NAME", "varName"), Arg::value("VALUE")])
                .chain(Check::Any, Check::Any)
                .tooltip("Declare a variable with the vl keyword")
        }
        BlockKind::VariableReference => {
            BlockSchema::new(kind, "%1", VARIABLE_COLOUR, Category::Variables)
                .args(vec![Arg::text("VAR_NAME", "varName")])
                .output(Check::Any)
                .tooltip("Reference a variable by name")
        }
        BlockKind::NumberLiteral => BlockSchema::new(kind, "%1", VALUE_COLOUR, Category::Values)
            .args(vec![Arg::FieldNumber {
                name: "NUM",
                value: 0.0,
            }])
            .output(Check::Typed("Number"))
            .tooltip("A number value"),
        BlockKind::StringLiteral => BlockSchema::new(kind, "\"%1\"", VALUE_COLOUR, Category::Values)
            .args(vec![Arg::text("TEXT", "")])
            .output(Check::Typed("String"))
            .tooltip("A string value"),
        BlockKind::BooleanLiteral => BlockSchema::new(kind, "%1", VALUE_COLOUR, Category::Values)
            .args(vec![Arg::FieldDropdown {
                name: "BOOL",
                options: vec![("true", "true"), ("false", "false")],
            }])
            .output(Check::Typed("Boolean"))
            .tooltip("A boolean value (true or false)"),
        BlockKind::AnyConcat => math_schema(kind, "+", "Concatenate any two values"),
        BlockKind::MathSubtract => math_schema(kind, "-", "Subtract two values"),
        BlockKind::MathMultiply => math_schema(kind, "×", "Multiply two values"),
        BlockKind::MathDivide => math_schema(kind, "÷", "Divide two values"),
        BlockKind::ReturnStatement => {
            BlockSchema::new(kind, "res %1", RETURN_COLOUR, Category::Control)
                .args(vec![Arg::value("VALUE")])
                .chain(Check::Any, Check::Any)
                .tooltip("Return a value from a function or script.")
        }
        BlockKind::ArrayLiteral => {
            BlockSchema::new(kind, "List %1", ARRAY_COLOUR, Category::Collections)
                .args(vec![Arg::statement("ITEMS", Some("ArrayItem"))])
                .output(Check::Typed("Array"))
                .tooltip("Create an array")
        }
        BlockKind::ArrayItem => BlockSchema::new(kind, "%1", ARRAY_COLOUR, Category::Collections)
            .args(vec![Arg::value("VALUE")])
            .chain(Check::Typed("ArrayItem"), Check::Typed("ArrayItem"))
            .tooltip("Item in an array"),
        BlockKind::ObjectLiteral => {
            BlockSchema::new(kind, "Object %1", LOGIC_COLOUR, Category::Collections)
                .args(vec![Arg::statement("PROPERTIES", Some("ObjectProperty"))])
                .output(Check::Typed("Object"))
                .tooltip("Create an object")
        }
        BlockKind::ObjectProperty => {
            BlockSchema::new(kind, "%1 : %2", LOGIC_COLOUR, Category::Collections)
                .args(vec![Arg::text("PROP_NAME", "property"), Arg::value("VALUE")])
                .chain(
                    Check::Typed("ObjectProperty"),
                    Check::Typed("ObjectProperty"),
                )
                .tooltip("Property in an object")
        }
        BlockKind::IfStatement => BlockSchema::new(kind, "if %1", LOGIC_COLOUR, Category::Control)
            .args(vec![Arg::value("CONDITION")])
            .body("%1", vec![Arg::statement("DO", None)])
            .chain(Check::Any, Check::Any)
            .tooltip("If statement - executes the block if the condition is true"),
        BlockKind::LogicAnd => logic_schema(kind, "and", "Logical AND operator"),
        BlockKind::LogicOr => logic_schema(kind, "or", "Logical OR operator"),
        BlockKind::LogicNot => BlockSchema::new(kind, "not %1", LOGIC_COLOUR, Category::Logic)
            .args(vec![Arg::value("BOOL")])
            .output(Check::Typed("Boolean"))
            .tooltip("Logical NOT operator"),
        BlockKind::ComparisonGt => logic_schema(kind, "greater than", "Greater than comparison"),
        BlockKind::ComparisonLt => logic_schema(kind, "less than", "Less than comparison"),
        BlockKind::ComparisonEq => logic_schema(kind, "equals", "Equality comparison"),
        BlockKind::ComparisonNeq => logic_schema(kind, "not equal to", "Inequality comparison"),
        BlockKind::ComparisonGte => logic_schema(
            kind,
            "greater than or equal to",
            "Greater than or equal comparison",
        ),
        BlockKind::ComparisonLte => logic_schema(
            kind,
            "less than or equal to",
            "Less than or equal comparison",
        ),
        BlockKind::LoopStatement => {
            BlockSchema::new(kind, "loop %1 in %2", LOOP_COLOUR, Category::Control)
                .args(vec![Arg::text("ITER_VAR", "item"), Arg::value("ITERABLE")])
                .body("%1", vec![Arg::statement("DO", None)])
                .chain(Check::Any, Check::Any)
                .tooltip("Loop through items in a collection")
        }
        BlockKind::ObjectPropertyAccess => {
            BlockSchema::new(kind, "%1 . %2", LOGIC_COLOUR, Category::Collections)
                .args(vec![Arg::value("OBJECT"), Arg::text("PROPERTY", "property")])
                .output(Check::Any)
                .inline()
                .tooltip("Access an object property using dot notation")
        }
        BlockKind::ObjectBracketAccess => {
            BlockSchema::new(kind, "%1 [ %2 ]", LOGIC_COLOUR, Category::Collections)
                .args(vec![Arg::value("OBJECT"), Arg::value("PROPERTY")])
                .output(Check::Any)
                .inline()
                .tooltip("Access an object property using bracket notation")
        }
        BlockKind::ArrayIndexAccess => {
            BlockSchema::new(kind, "%1 [ %2 ]", ARRAY_COLOUR, Category::Collections)
                .args(vec![
                    Arg::value("ARRAY"),
                    Arg::InputValue {
                        name: "INDEX",
                        check: Some("Number"),
                    },
                ])
                .output(Check::Any)
                .inline()
                .tooltip("Access an array element by index")
        }
        BlockKind::FunctionCall => {
            BlockSchema::new(kind, "call %1", VALUE_COLOUR, Category::Functions)
                .args(vec![Arg::value("FUNCTION_NAME")])
                .output(Check::Any)
                .chain(Check::Absent, Check::Typed("FunctionParams"))
                .tooltip("Call a function")
        }
        BlockKind::FunctionParams => {
            BlockSchema::new(kind, "with parameters %1", VALUE_COLOUR, Category::Functions)
                .args(vec![Arg::statement("PARAMS", Some("FunctionParameter"))])
                .chain(Check::Typed("FunctionParams"), Check::Absent)
                .tooltip("Add parameters to a function call")
        }
        BlockKind::FunctionParameter => {
            BlockSchema::new(kind, "%1", VALUE_COLOUR, Category::Functions)
                .args(vec![Arg::value("PARAM_VALUE")])
                .chain(
                    Check::Typed("FunctionParameter"),
                    Check::Typed("FunctionParameter"),
                )
                .tooltip("Parameter for a function call")
        }
        BlockKind::Custom(name) => custom_literal_schema(name, name),
    }
}

fn math_schema(kind: &BlockKind, symbol: &str, tooltip: &str) -> BlockSchema {
    BlockSchema::new(kind, &format!("%1 {} %2", symbol), VALUE_COLOUR, Category::Math)
        .args(vec![Arg::value("A"), Arg::value("B")])
        .output(Check::Any)
        .inline()
        .tooltip(tooltip)
}

fn logic_schema(kind: &BlockKind, label: &str, tooltip: &str) -> BlockSchema {
    BlockSchema::new(kind, &format!("%1 {} %2", label), LOGIC_COLOUR, Category::Logic)
        .args(vec![Arg::value("A"), Arg::value("B")])
        .output(Check::Typed("Boolean"))
        .inline()
        .tooltip(tooltip)
}
