use crate::schema::{Category, SchemaRegistry};
use anyhow::{anyhow, Result};
use xmltree::{Element, EmitterConfig, XMLNode};

pub const EMPTY_TOOLBOX: &str = "<xml></xml>";

/// Builds a categorized toolbox listing every registered block type.
pub fn default_toolbox_xml(registry: &SchemaRegistry) -> Result<String> {
    let mut root = Element::new("xml");
    root.attributes
        .insert("id".to_string(), "toolbox".to_string());
    root.attributes
        .insert("style".to_string(), "display: none".to_string());

    for category in Category::ALL {
        let schemas = registry
            .iter()
            .filter(|s| s.category == category)
            .collect::<Vec<_>>();
        let Some(first) = schemas.first() else {
            continue;
        };
        let mut node = Element::new("category");
        node.attributes
            .insert("name".to_string(), category.label().to_string());
        node.attributes
            .insert("colour".to_string(), first.colour.to_string());
        for schema in schemas {
            let mut block = Element::new("block");
            block
                .attributes
                .insert("type".to_string(), schema.type_name.clone());
            node.children.push(XMLNode::Element(block));
        }
        root.children.push(XMLNode::Element(node));
    }

    let mut out = Vec::new();
    root.write_with_config(
        &mut out,
        EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(false),
    )?;
    Ok(String::from_utf8(out)?)
}

/// Block types referenced by `<block type="...">` anywhere in a toolbox XML.
pub fn toolbox_block_types(xml: &str) -> Result<Vec<String>> {
    let root = Element::parse(xml.as_bytes()).map_err(|e| anyhow!("Invalid toolbox XML: {}.", e))?;
    let mut out = Vec::new();
    collect_block_types(&root, &mut out);
    Ok(out)
}

fn collect_block_types(element: &Element, out: &mut Vec<String>) {
    if element.name == "block" {
        if let Some(type_name) = element.attributes.get("type") {
            out.push(type_name.clone());
        }
    }
    for child in &element.children {
        if let XMLNode::Element(child) = child {
            collect_block_types(child, out);
        }
    }
}
