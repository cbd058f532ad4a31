use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Block type '{0}' is already registered.")]
    DuplicateType(String),
    #[error("Block type name must not be empty.")]
    EmptyTypeName,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("Block '{0}' does not exist in this workspace.")]
    MissingBlock(String),
    #[error("Block '{id}' ({block_type}) is reached again while it is still being rendered.")]
    Cycle { id: String, block_type: String },
    #[error("Input '{input}' of block '{id}' expects a value block, found statement block '{child_type}'.")]
    ExpectedValue {
        id: String,
        input: String,
        child_type: String,
    },
    #[error("Input '{input}' of block '{id}' expects a statement block, found value block '{child_type}'.")]
    ExpectedStatement {
        id: String,
        input: String,
        child_type: String,
    },
    #[error("No generator registered for custom block type '{0}'.")]
    UnknownCustomType(String),
}
