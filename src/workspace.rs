use crate::block::BlockKind;
use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Index of a block inside the [`Workspace`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(usize);

/// One block instance: type tag, field values, connected inputs and the next block in its chain.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: String,
    pub kind: BlockKind,
    pub fields: BTreeMap<String, String>,
    pub inputs: BTreeMap<String, BlockId>,
    pub next: Option<BlockId>,
    pub position: Option<(f64, f64)>,
}

impl Block {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn input(&self, name: &str) -> Option<BlockId> {
        self.inputs.get(name).copied()
    }
}

/// Arena holding the block graph of one editor workspace.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    blocks: Vec<Block>,
    top: Vec<BlockId>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self, kind: BlockKind) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block {
            id: format!("b{}", id.0),
            kind,
            fields: BTreeMap::new(),
            inputs: BTreeMap::new(),
            next: None,
            position: None,
        });
        id
    }

    pub fn add_top_block(&mut self, kind: BlockKind, x: f64, y: f64) -> BlockId {
        let id = self.add_block(kind);
        self.blocks[id.0].position = Some((x, y));
        self.top.push(id);
        id
    }

    pub fn set_field(&mut self, block: BlockId, name: &str, value: impl Into<String>) {
        if let Some(b) = self.blocks.get_mut(block.0) {
            b.fields.insert(name.to_string(), value.into());
        }
    }

    pub fn connect_input(&mut self, parent: BlockId, input: &str, child: BlockId) {
        if let Some(b) = self.blocks.get_mut(parent.0) {
            b.inputs.insert(input.to_string(), child);
        }
    }

    pub fn connect_next(&mut self, previous: BlockId, next: BlockId) {
        if let Some(b) = self.blocks.get_mut(previous.0) {
            b.next = Some(next);
        }
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.0)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks.iter().enumerate().map(|(i, b)| (BlockId(i), b))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Top-level blocks ordered by position: top to bottom, then left to right.
    pub fn top_blocks(&self) -> Vec<BlockId> {
        let mut top = self.top.clone();
        top.sort_by(|a, b| {
            let (ay, ax, aid) = self.sort_key(*a);
            let (by, bx, bid) = self.sort_key(*b);
            ay.total_cmp(&by)
                .then(ax.total_cmp(&bx))
                .then_with(|| aid.cmp(bid))
        });
        top
    }

    fn sort_key(&self, id: BlockId) -> (f64, f64, &str) {
        match self.get(id) {
            Some(block) => {
                let (x, y) = block.position.unwrap_or((f64::MAX, f64::MAX));
                (y, x, block.id.as_str())
            }
            None => (f64::MAX, f64::MAX, ""),
        }
    }

    /// Loads the editor's JSON serialization (`{"blocks": {"blocks": [...]}}`).
    ///
    /// Every chained statement nests two objects deeper, so the document is read
    /// without serde_json's depth limit, on a stack that grows as needed.
    pub fn from_json(source: &str) -> Result<Workspace> {
        let mut json = serde_json::Deserializer::from_str(source);
        json.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))
            .context("Invalid workspace JSON.")?;
        json.end().context("Invalid workspace JSON.")?;
        Workspace::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Workspace> {
        let mut workspace = Workspace::new();
        let Some(blocks) = value.get("blocks") else {
            return Ok(workspace);
        };
        let top_level = blocks
            .get("blocks")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("Invalid workspace JSON: 'blocks.blocks' must be an array."))?;

        let mut seen_ids = HashSet::new();
        for node in top_level {
            let id = workspace.load_chain(node, &mut seen_ids)?;
            let x = node.get("x").and_then(Value::as_f64).unwrap_or(0.0);
            let y = node.get("y").and_then(Value::as_f64).unwrap_or(0.0);
            workspace.blocks[id.0].position = Some((x, y));
            workspace.top.push(id);
        }
        Ok(workspace)
    }

    /// Loads `node` and every block chained after it through `next`.
    fn load_chain(&mut self, node: &Value, seen_ids: &mut HashSet<String>) -> Result<BlockId> {
        let first = self.load_block(node, seen_ids)?;
        let mut previous = first;
        let mut current = node.get("next").and_then(|n| n.get("block"));
        while let Some(next) = current {
            let id = self.load_block(next, seen_ids)?;
            self.connect_next(previous, id);
            previous = id;
            current = next.get("next").and_then(|n| n.get("block"));
        }
        Ok(first)
    }

    fn load_block(&mut self, node: &Value, seen_ids: &mut HashSet<String>) -> Result<BlockId> {
        let type_name = node
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Block is missing its 'type'."))?;
        let id = self.add_block(BlockKind::from_type_name(type_name));
        if let Some(given) = node.get("id").and_then(Value::as_str) {
            if !seen_ids.insert(given.to_string()) {
                bail!("Duplicate block id '{}'.", given);
            }
            self.blocks[id.0].id = given.to_string();
        }

        if let Some(fields) = node.get("fields").and_then(Value::as_object) {
            for (name, value) in fields {
                if let Some(text) = field_text(value) {
                    self.set_field(id, name, text);
                }
            }
        }

        if let Some(inputs) = node.get("inputs").and_then(Value::as_object) {
            for (name, input) in inputs {
                if let Some(child) = input_child(input) {
                    let child_id = self
                        .load_chain(child, seen_ids)
                        .with_context(|| format!("In input '{}' of a '{}' block.", name, type_name))?;
                    self.connect_input(id, name, child_id);
                }
            }
        }
        Ok(id)
    }
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => object_field_text(obj),
        _ => None,
    }
}

// Variable-style fields serialize as `{ "id": ..., "name": ... }`.
fn object_field_text(obj: &Map<String, Value>) -> Option<String> {
    obj.get("name")
        .or_else(|| obj.get("id"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

fn input_child(input: &Value) -> Option<&Value> {
    input.get("block").or_else(|| input.get("shadow"))
}
