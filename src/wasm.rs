use crate::host::{BlocklyHost, Container, EditorEnvironment, InjectOptions, Toolbox};
use crate::schema::SchemaRegistry;
use anyhow::anyhow;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = document, js_name = getElementById)]
    fn get_element_by_id(id: &str) -> JsValue;

    #[wasm_bindgen(js_namespace = JSON, js_name = parse, catch)]
    fn json_parse(text: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = Blockly, js_name = defineBlocksWithJsonArray, catch)]
    fn define_blocks_with_json_array(definitions: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(js_namespace = Blockly, js_name = inject, catch)]
    fn blockly_inject(container: &JsValue, options: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = Reflect, js_name = set, catch)]
    fn reflect_set(target: &JsValue, key: &JsValue, value: &JsValue) -> Result<bool, JsValue>;
}

struct BrowserEnvironment;

impl EditorEnvironment for BrowserEnvironment {
    type Element = JsValue;
    type Workspace = JsValue;

    fn element_by_id(&self, id: &str) -> Option<JsValue> {
        let element = get_element_by_id(id);
        if element.is_null() || element.is_undefined() {
            None
        } else {
            Some(element)
        }
    }

    fn inject(
        &mut self,
        container: &JsValue,
        registry: &SchemaRegistry,
        toolbox: &Toolbox<JsValue>,
        options: &InjectOptions,
    ) -> anyhow::Result<JsValue> {
        let definitions = serde_json::to_string(&registry.to_json()?)?;
        define_blocks_with_json_array(&parse(&definitions)?).map_err(js_error)?;

        let options = parse(&serde_json::to_string(options)?)?;
        let toolbox = match toolbox {
            Toolbox::Definition(value) => parse(&serde_json::to_string(value)?)?,
            Toolbox::Xml(xml) => JsValue::from_str(xml),
            Toolbox::Element(element) => element.clone(),
        };
        reflect_set(&options, &JsValue::from_str("toolbox"), &toolbox).map_err(js_error)?;
        blockly_inject(container, &options).map_err(js_error)
    }
}

fn parse(text: &str) -> anyhow::Result<JsValue> {
    json_parse(text).map_err(js_error)
}

fn js_error(value: JsValue) -> anyhow::Error {
    anyhow!("{}", value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn to_js(e: anyhow::Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// One editor session: the block registry and the generator bound to it.
///
/// Custom literals added after the editor is mounted are defined in Blockly
/// right away; earlier ones go in with the builtin blocks at mount time.
#[wasm_bindgen]
#[derive(Default)]
pub struct HexputBlockly {
    host: BlocklyHost,
    mounted: bool,
}

#[wasm_bindgen]
impl HexputBlockly {
    #[wasm_bindgen(constructor)]
    pub fn new() -> HexputBlockly {
        HexputBlockly::default()
    }

    /// Mounts an editor into the element with id `container_id`. Returns
    /// `undefined` when the element does not exist.
    #[wasm_bindgen(js_name = initBlockly)]
    pub fn init_blockly(
        &mut self,
        container_id: &str,
        toolbox_xml: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let workspace = crate::host::init_blockly(
            &mut self.host,
            &mut BrowserEnvironment,
            Container::Id(container_id.to_string()),
            toolbox_xml.map(Toolbox::Xml),
        )
        .map_err(to_js)?;
        match workspace {
            Some(workspace) => {
                self.mounted = true;
                Ok(workspace)
            }
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = addCustomLiteral)]
    pub fn add_custom_literal(
        &mut self,
        type_name: &str,
        label: &str,
        literal_value: &str,
    ) -> Result<String, JsValue> {
        let name = self
            .host
            .add_custom_literal(type_name, label, literal_value)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if self.mounted {
            if let Some(schema) = self.host.registry().get(&name) {
                let definitions = serde_json::to_string(&[schema]).map_err(|e| to_js(e.into()))?;
                define_blocks_with_json_array(&parse(&definitions).map_err(to_js)?)?;
            }
        }
        Ok(name)
    }

    pub fn generate(&mut self, workspace_json: &str) -> Result<String, JsValue> {
        crate::generate_from_workspace_json(&mut self.host, workspace_json).map_err(to_js)
    }

    #[wasm_bindgen(js_name = blockDefinitions)]
    pub fn block_definitions(&mut self) -> Result<String, JsValue> {
        crate::block_definitions_json(&mut self.host).map_err(to_js)
    }

    #[wasm_bindgen(js_name = defaultToolbox)]
    pub fn default_toolbox(&mut self) -> Result<String, JsValue> {
        crate::host::define_block_types(&mut self.host)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        crate::toolbox::default_toolbox_xml(self.host.registry()).map_err(to_js)
    }
}

#[wasm_bindgen]
pub fn block_definitions() -> Result<String, JsValue> {
    HexputBlockly::new().block_definitions()
}

#[wasm_bindgen]
pub fn default_toolbox() -> Result<String, JsValue> {
    HexputBlockly::new().default_toolbox()
}

#[wasm_bindgen]
pub fn generate_hexput(workspace_json: &str) -> Result<String, JsValue> {
    HexputBlockly::new().generate(workspace_json)
}

#[wasm_bindgen]
pub fn init_blockly(container_id: &str, toolbox_xml: Option<String>) -> Result<JsValue, JsValue> {
    HexputBlockly::new().init_blockly(container_id, toolbox_xml)
}
