//! The plugin surface a host application calls: block registration, generator
//! binding and editor injection.

use crate::block::BlockKind;
use crate::error::RegistryError;
use crate::generator::{GeneratorOptions, HexputGenerator};
use crate::schema::{self, custom_literal_schema, SchemaRegistry};
use crate::toolbox::{toolbox_block_types, EMPTY_TOOLBOX};
use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, error, warn};

/// One editor host: its block registry and the generator bound to it.
///
/// Several hosts can live side by side; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct BlocklyHost {
    registry: SchemaRegistry,
    generator: Option<HexputGenerator>,
}

impl BlocklyHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host whose generator is already bound with the given options.
    pub fn with_generator_options(options: GeneratorOptions) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            generator: Some(HexputGenerator::with_options(options)),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn generator(&self) -> Option<&HexputGenerator> {
        self.generator.as_ref()
    }

    /// Registers a literal block on this host, binding a generator first if needed.
    pub fn add_custom_literal(
        &mut self,
        type_name: &str,
        label: &str,
        literal_value: &str,
    ) -> Result<String, RegistryError> {
        let generator = self.generator.get_or_insert_with(HexputGenerator::new);
        add_custom_literal(
            &mut self.registry,
            generator,
            type_name,
            label,
            literal_value,
        )
    }
}

/// Where the editor gets mounted.
#[derive(Debug, Clone, PartialEq)]
pub enum Container<E> {
    Id(String),
    Element(E),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Toolbox<E> {
    /// JSON toolbox definition.
    Definition(Value),
    Xml(String),
    Element(E),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InjectOptions {
    pub trashcan: bool,
    pub scrollbars: bool,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            trashcan: true,
            scrollbars: true,
        }
    }
}

/// The page the editor lives in: element lookup and the toolkit's `inject`.
pub trait EditorEnvironment {
    type Element;
    type Workspace;

    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn inject(
        &mut self,
        container: &Self::Element,
        registry: &SchemaRegistry,
        toolbox: &Toolbox<Self::Element>,
        options: &InjectOptions,
    ) -> Result<Self::Workspace>;
}

/// Registers the builtin blocks. A second call on the same host does nothing.
pub fn define_block_types(host: &mut BlocklyHost) -> Result<(), RegistryError> {
    let marker = BlockKind::VariableDeclaration;
    if host.registry.contains(marker.type_name()) {
        debug!("builtin Hexput blocks already defined");
        return Ok(());
    }
    schema::define_block_types(&mut host.registry)
}

/// Returns the generator bound to `host`, creating it on first use.
pub fn generate_hexput_blockly(host: &mut BlocklyHost) -> &mut HexputGenerator {
    host.generator.get_or_insert_with(|| {
        debug!("binding a new {} generator", HexputGenerator::NAME);
        HexputGenerator::new()
    })
}

/// Registers a block showing `label` whose code is always `literal_value`.
/// Returns the type name for use in toolbox definitions.
pub fn add_custom_literal(
    registry: &mut SchemaRegistry,
    generator: &mut HexputGenerator,
    type_name: &str,
    label: &str,
    literal_value: &str,
) -> Result<String, RegistryError> {
    if registry.contains(type_name) {
        return Err(RegistryError::DuplicateType(type_name.to_string()));
    }
    generator.register_custom_literal(type_name, literal_value)?;
    registry.register(custom_literal_schema(type_name, label))?;
    Ok(type_name.to_string())
}

/// Every registered schema must have a routine in the bound generator.
pub fn check_block_coverage(host: &BlocklyHost) -> Result<()> {
    let Some(generator) = host.generator.as_ref() else {
        bail!("No {} generator bound to this host.", HexputGenerator::NAME);
    };
    for schema in host.registry.iter() {
        let kind = BlockKind::from_type_name(&schema.type_name);
        if !kind.is_builtin() && generator.custom_literal(&schema.type_name).is_none() {
            bail!(
                "Block type '{}' has no {} generator routine.",
                schema.type_name,
                HexputGenerator::NAME
            );
        }
    }
    Ok(())
}

/// Defines the blocks, binds the generator and mounts an editor into `container`.
///
/// Returns `Ok(None)` when the container cannot be found. Without a toolbox the
/// element with id `toolbox` is used, then an empty toolbox.
pub fn init_blockly<E: EditorEnvironment>(
    host: &mut BlocklyHost,
    env: &mut E,
    container: Container<E::Element>,
    toolbox: Option<Toolbox<E::Element>>,
) -> Result<Option<E::Workspace>> {
    let container = match container {
        Container::Id(id) => match env.element_by_id(&id) {
            Some(element) => element,
            None => {
                error!("Container element with ID '{}' not found.", id);
                return Ok(None);
            }
        },
        Container::Element(element) => element,
    };

    let toolbox = match toolbox {
        Some(toolbox) => toolbox,
        None => match env.element_by_id("toolbox") {
            Some(element) => Toolbox::Element(element),
            None => {
                warn!("No toolbox element found with ID 'toolbox'. Using empty toolbox.");
                Toolbox::Xml(EMPTY_TOOLBOX.to_string())
            }
        },
    };

    define_block_types(host)?;
    generate_hexput_blockly(host);
    check_block_coverage(host)?;

    if let Toolbox::Xml(xml) = &toolbox {
        warn_unknown_toolbox_blocks(&host.registry, xml);
    }

    let workspace = env.inject(&container, &host.registry, &toolbox, &InjectOptions::default())?;
    Ok(Some(workspace))
}

fn warn_unknown_toolbox_blocks(registry: &SchemaRegistry, xml: &str) {
    match toolbox_block_types(xml) {
        Ok(types) => {
            for type_name in types {
                if !registry.contains(&type_name) {
                    warn!("Toolbox references unregistered block type '{}'.", type_name);
                }
            }
        }
        Err(e) => warn!("{}", e),
    }
}

/// An in-memory page for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct HeadlessEnvironment {
    elements: BTreeSet<String>,
}

/// What a headless injection produced.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWorkspace {
    pub container: String,
    pub toolbox: Toolbox<String>,
    pub block_types: Vec<String>,
    pub options: InjectOptions,
}

impl HeadlessEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_elements<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl EditorEnvironment for HeadlessEnvironment {
    type Element = String;
    type Workspace = HeadlessWorkspace;

    fn element_by_id(&self, id: &str) -> Option<String> {
        self.elements.get(id).cloned()
    }

    fn inject(
        &mut self,
        container: &String,
        registry: &SchemaRegistry,
        toolbox: &Toolbox<String>,
        options: &InjectOptions,
    ) -> Result<HeadlessWorkspace> {
        Ok(HeadlessWorkspace {
            container: container.clone(),
            toolbox: toolbox.clone(),
            block_types: registry.iter().map(|s| s.type_name.clone()).collect(),
            options: *options,
        })
    }
}
