//! Browser host for luaform.
//!
//! `Playground` runs transformations; `EditSession` decides which result of a
//! series of edits should be shown.

use luaform_core::{
    ConfigError, Diagnostic, Engine, PipelineConfig, RuleMeta, SourceUnit, Ticket,
    TransformationResult,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Converts any `Display`-implementing error into `JsError`.
///
/// `impl From<E> for JsError` is not possible here because of the orphan rule.
fn to_js_error(e: impl std::fmt::Display) -> JsError {
    JsError::new(&e.to_string())
}

/// Serializes into plain JavaScript objects (no `Map`s), matching the JSON
/// the other hosts produce.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(to_js_error)
}

#[wasm_bindgen]
pub struct Playground {
    engine: Engine,
}

#[wasm_bindgen]
impl Playground {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Playground {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        Self {
            engine: Engine::new(),
        }
    }

    /// Transforms `source` with a configuration object and returns the
    /// result as a JavaScript object. `undefined` means the default
    /// configuration.
    #[wasm_bindgen]
    pub fn process(&self, source: &str, config: JsValue) -> Result<JsValue, JsError> {
        let result = if config.is_undefined() || config.is_null() {
            self.run(source, &PipelineConfig::default())
        } else {
            match serde_wasm_bindgen::from_value::<PipelineConfig>(config) {
                Ok(config) => self.run(source, &config),
                Err(e) => config_failure(&e),
            }
        };
        to_js(&result)
    }

    /// Transforms `source` with configuration text and returns the result as
    /// a JSON string.
    #[wasm_bindgen(js_name = processJson)]
    pub fn process_json(&self, source: &str, config: &str) -> String {
        self.engine.process_json(source, config).to_json()
    }

    /// Lists the available rules with their ordering constraints.
    #[wasm_bindgen]
    pub fn rules(&self) -> Result<JsValue, JsError> {
        to_js(&self.rule_list())
    }

    fn run(&self, source: &str, config: &PipelineConfig) -> TransformationResult {
        self.engine.process(&SourceUnit::new(source), config)
    }

    fn rule_list(&self) -> Vec<JsRule> {
        self.engine.registry().metas().map(JsRule::from).collect()
    }
}

impl Default for Playground {
    fn default() -> Self {
        Self::new()
    }
}

fn config_failure(error: &serde_wasm_bindgen::Error) -> TransformationResult {
    let error = ConfigError::invalid(error.to_string());
    TransformationResult::failure(vec![Diagnostic::from(&error)])
}

/// JavaScript-friendly rule description.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRule {
    name: &'static str,
    description: &'static str,
    runs_before: Vec<&'static str>,
    runs_after: Vec<&'static str>,
}

impl From<&RuleMeta> for JsRule {
    fn from(meta: &RuleMeta) -> Self {
        Self {
            name: meta.name,
            description: meta.description,
            runs_before: meta.runs_before.to_vec(),
            runs_after: meta.runs_after.to_vec(),
        }
    }
}

/// Last-edit-wins bookkeeping for an editor that transforms on every edit.
#[wasm_bindgen(js_name = EditSession)]
#[derive(Default)]
pub struct JsEditSession {
    inner: luaform_core::EditSession,
}

#[wasm_bindgen(js_class = EditSession)]
impl JsEditSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsEditSession {
        Self::default()
    }

    /// Starts a new edit and returns its ticket.
    #[wasm_bindgen(js_name = beginEdit)]
    pub fn begin_edit(&mut self) -> u32 {
        self.inner.begin_edit().value()
    }

    #[wasm_bindgen(js_name = isCurrent)]
    pub fn is_current(&self, ticket: u32) -> bool {
        self.inner.is_current(Ticket::from_value(ticket))
    }

    /// Returns `result` if `ticket` is the latest edit, `undefined` otherwise.
    #[wasm_bindgen]
    pub fn settle(&self, ticket: u32, result: JsValue) -> JsValue {
        self.inner
            .settle(Ticket::from_value(ticket), result)
            .unwrap_or(JsValue::UNDEFINED)
    }
}
