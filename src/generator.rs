use crate::block::BlockKind;
use crate::callbacks;
use crate::error::{GenerateError, RegistryError};
use crate::order::Order;
use crate::workspace::{Block, BlockId, Workspace};
use anyhow::Result;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use tracing::debug;

static LEADING_BLANK: LazyLock<Regex> = LazyLock::new(|| compile(r"^\s+\n"));
static TRAILING_BLANK: LazyLock<Regex> = LazyLock::new(|| compile(r"\n\s+$"));
static TRAILING_SPACES: LazyLock<Regex> = LazyLock::new(|| compile(r"[ \t]+\n"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid pattern {}: {}", pattern, err))
}

/// Output of one block routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// Expression text and the order it binds at.
    Expr(String, Order),
    /// Statement text, normally ending in a newline.
    Stmt(String),
}

impl Code {
    pub fn text(&self) -> &str {
        match self {
            Code::Expr(text, _) | Code::Stmt(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Code::Expr(text, _) | Code::Stmt(text) => text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Prefix added to every line of a nested statement body.
    pub indent: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
        }
    }
}

/// The Hexput code generator. Holds no per-workspace state; every call to
/// [`workspace_to_code`](Self::workspace_to_code) runs in a fresh [`GenerationPass`].
#[derive(Debug, Clone, Default)]
pub struct HexputGenerator {
    options: GeneratorOptions,
    custom_literals: BTreeMap<String, String>,
}

impl HexputGenerator {
    pub const NAME: &'static str = "Hexput";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: GeneratorOptions) -> Self {
        Self {
            options,
            custom_literals: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Binds a literal routine to a custom block type. Builtin names and names
    /// already bound are rejected.
    pub fn register_custom_literal(
        &mut self,
        type_name: &str,
        literal_value: &str,
    ) -> Result<(), RegistryError> {
        if type_name.trim().is_empty() {
            return Err(RegistryError::EmptyTypeName);
        }
        if BlockKind::from_type_name(type_name).is_builtin()
            || self.custom_literals.contains_key(type_name)
        {
            return Err(RegistryError::DuplicateType(type_name.to_string()));
        }
        self.custom_literals
            .insert(type_name.to_string(), literal_value.to_string());
        Ok(())
    }

    pub fn custom_literal(&self, type_name: &str) -> Option<&str> {
        self.custom_literals.get(type_name).map(String::as_str)
    }

    /// Nothing to reset between workspaces.
    pub fn init(&self, _workspace: &Workspace) {}

    /// Terminates every non-blank line that does not already end in `;`, `{` or `}`.
    pub fn finish(&self, code: &str) -> String {
        code.split('\n')
            .map(|line| {
                let trimmed = line.trim_end();
                if trimmed.is_empty() || trimmed.ends_with([';', '{', '}']) {
                    line.to_string()
                } else {
                    format!("{};", line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn pass<'a>(&'a self, workspace: &'a Workspace) -> GenerationPass<'a> {
        GenerationPass {
            generator: self,
            workspace,
            consumed: HashSet::new(),
            rendering: HashSet::new(),
        }
    }

    /// Renders every top-level block, top to bottom, into one Hexput program.
    pub fn workspace_to_code(&self, workspace: &Workspace) -> Result<String> {
        self.init(workspace);
        self.check_custom_types(workspace)?;

        let top = workspace.top_blocks();
        debug!(top_blocks = top.len(), blocks = workspace.len(), "generating Hexput");
        let mut pass = self.pass(workspace);
        let mut codes = Vec::new();
        for id in top {
            let line = pass.block_to_code(id, false)?.into_text();
            if !line.is_empty() {
                codes.push(line);
            }
        }
        let code = self.finish(&codes.join("\n"));
        Ok(tidy_whitespace(&code))
    }

    pub(crate) fn prefix_lines(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for line in text.split_inclusive('\n') {
            out.push_str(&self.options.indent);
            out.push_str(line);
        }
        out
    }

    fn check_custom_types(&self, workspace: &Workspace) -> Result<(), GenerateError> {
        for (_, block) in workspace.blocks() {
            if let BlockKind::Custom(name) = &block.kind {
                if self.custom_literal(name).is_none() {
                    return Err(GenerateError::UnknownCustomType(name.clone()));
                }
            }
        }
        Ok(())
    }
}

fn tidy_whitespace(code: &str) -> String {
    let code = LEADING_BLANK.replace(code, "");
    let code = TRAILING_BLANK.replace(&code, "\n");
    TRAILING_SPACES.replace_all(&code, "\n").into_owned()
}

/// Appends the text of a chained follower to the code of the block before it.
fn scrub(code: Code, next_code: &str) -> Code {
    match code {
        Code::Expr(text, order) => Code::Expr(text + next_code, order),
        Code::Stmt(text) => Code::Stmt(text + next_code),
    }
}

/// State of one generation run over one workspace.
///
/// `consumed` holds parameter blocks a function call has already rendered;
/// the next time the chain reaches one of them it renders as nothing.
pub struct GenerationPass<'a> {
    generator: &'a HexputGenerator,
    workspace: &'a Workspace,
    consumed: HashSet<BlockId>,
    rendering: HashSet<BlockId>,
}

impl<'a> GenerationPass<'a> {
    pub fn generator(&self) -> &'a HexputGenerator {
        self.generator
    }

    pub fn workspace(&self) -> &'a Workspace {
        self.workspace
    }

    pub fn block(&self, id: BlockId) -> Result<&'a Block, GenerateError> {
        self.workspace
            .get(id)
            .ok_or_else(|| GenerateError::MissingBlock(format!("{:?}", id)))
    }

    /// Renders one block, followed by the rest of its chain unless `this_only`.
    ///
    /// Followers are walked in a loop, so chain length does not grow the stack.
    /// Every block of the chain stays marked as rendering until the walk ends,
    /// which is what turns a `next` link back into the chain into a cycle error.
    pub fn block_to_code(&mut self, id: BlockId, this_only: bool) -> Result<Code> {
        let mut entered = Vec::new();
        let result = self.render_chain(id, this_only, &mut entered);
        for id in entered {
            self.rendering.remove(&id);
        }
        result
    }

    fn render_chain(
        &mut self,
        id: BlockId,
        this_only: bool,
        entered: &mut Vec<BlockId>,
    ) -> Result<Code> {
        let (mut code, mut next) = self.render_one(id, entered)?;
        if this_only {
            return Ok(code);
        }
        while let Some(follower) = next {
            let (follower_code, after) = self.render_one(follower, entered)?;
            code = scrub(code, follower_code.text());
            next = after;
        }
        Ok(code)
    }

    fn render_one(&mut self, id: BlockId, entered: &mut Vec<BlockId>) -> Result<(Code, Option<BlockId>)> {
        let block = self.block(id)?;
        if !self.rendering.insert(id) {
            return Err(GenerateError::Cycle {
                id: block.id.clone(),
                block_type: block.kind.type_name().to_string(),
            }
            .into());
        }
        entered.push(id);
        let code = callbacks::render(self, id, block)?;
        Ok((code, block.next))
    }

    /// Expression text of the block plugged into `input`, parenthesized when it
    /// binds looser than `order`. Empty when nothing is connected.
    pub fn value_to_code(&mut self, id: BlockId, input: &str, order: Order) -> Result<String> {
        let block = self.block(id)?;
        let Some(child) = block.input(input) else {
            return Ok(String::new());
        };
        match self.block_to_code(child, false)? {
            Code::Expr(text, child_order) => {
                if !text.is_empty() && Order::needs_parens(child_order, order) {
                    Ok(format!("({})", text))
                } else {
                    Ok(text)
                }
            }
            Code::Stmt(_) => Err(GenerateError::ExpectedValue {
                id: block.id.clone(),
                input: input.to_string(),
                child_type: self.block(child)?.kind.type_name().to_string(),
            }
            .into()),
        }
    }

    /// Indented text of the statement chain plugged into `input`.
    pub fn statement_to_code(&mut self, id: BlockId, input: &str) -> Result<String> {
        let block = self.block(id)?;
        let Some(child) = block.input(input) else {
            return Ok(String::new());
        };
        match self.block_to_code(child, false)? {
            Code::Stmt(text) => Ok(self.generator.prefix_lines(&text)),
            Code::Expr(..) => Err(self.expected_statement(block, input, child)),
        }
    }

    /// Renders each block of the chain plugged into `input` on its own.
    pub fn chain_items(&mut self, id: BlockId, input: &str) -> Result<Vec<String>> {
        let block = self.block(id)?;
        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut current = block.input(input);
        while let Some(item) = current {
            let item_block = self.block(item)?;
            if !visited.insert(item) {
                return Err(GenerateError::Cycle {
                    id: item_block.id.clone(),
                    block_type: item_block.kind.type_name().to_string(),
                }
                .into());
            }
            match self.block_to_code(item, true)? {
                Code::Stmt(text) => items.push(text),
                Code::Expr(..) => return Err(self.expected_statement(block, input, item)),
            }
            current = item_block.next;
        }
        Ok(items)
    }

    pub fn consume(&mut self, id: BlockId) {
        self.consumed.insert(id);
    }

    /// True once for a block marked with [`consume`](Self::consume).
    pub fn take_consumed(&mut self, id: BlockId) -> bool {
        self.consumed.remove(&id)
    }

    fn expected_statement(&self, block: &Block, input: &str, child: BlockId) -> anyhow::Error {
        let child_type = self
            .workspace
            .get(child)
            .map(|b| b.kind.type_name().to_string())
            .unwrap_or_default();
        GenerateError::ExpectedStatement {
            id: block.id.clone(),
            input: input.to_string(),
            child_type,
        }
        .into()
    }
}
