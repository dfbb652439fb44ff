//! Flat action records, the only thing the execution host understands.

use serde::Serialize;
use serde_json::{Map, Value as Json};
use uuid::Uuid;

use crate::value::OutputRef;
use crate::value_type::ValueType;

// Host operation identifiers.
pub const GET_TEXT: &str = "is.workflow.actions.gettext";
pub const NUMBER: &str = "is.workflow.actions.number";
pub const ASK: &str = "is.workflow.actions.ask";
pub const SHOW_RESULT: &str = "is.workflow.actions.showresult";
pub const SPLIT_TEXT: &str = "is.workflow.actions.text.split";
pub const ITEM_FROM_LIST: &str = "is.workflow.actions.getitemfromlist";
pub const DETECT_DICTIONARY: &str = "is.workflow.actions.detect.dictionary";
pub const EXIT: &str = "is.workflow.actions.exit";
pub const LIST: &str = "is.workflow.actions.list";
pub const MATH: &str = "is.workflow.actions.math";
pub const REPEAT_COUNT: &str = "is.workflow.actions.repeat.count";
pub const REPEAT_EACH: &str = "is.workflow.actions.repeat.each";
pub const DOWNLOAD_URL: &str = "is.workflow.actions.downloadurl";

/// Parameter key mirroring the output id on the wire.
pub const UUID_KEY: &str = "UUID";

/// One host-executable operation: an identifier plus named parameters.
///
/// The output triple (id, label, type) exists only at compile time; on the
/// wire the id shows up solely as the `UUID` parameter, attached the first
/// time the record is marked as producing an addressable output.
#[derive(Debug, Clone, Serialize)]
pub struct Action {
    #[serde(rename = "WFWorkflowActionIdentifier")]
    pub identifier: String,
    #[serde(rename = "WFWorkflowActionParameters")]
    pub parameters: Map<String, Json>,
    #[serde(skip)]
    output: Option<OutputRef>,
}

impl Action {
    pub fn new(identifier: impl Into<String>) -> Self {
        Action {
            identifier: identifier.into(),
            parameters: Map::new(),
            output: None,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }

    pub fn with_output(mut self, name: &str, ty: &'static ValueType) -> Self {
        self.mark_output(name, ty);
        self
    }

    /// Declare (or re-declare) this record's output.
    ///
    /// The unique id is minted on the first call and reused afterwards, and
    /// the `UUID` parameter is only ever inserted once; re-marking can change
    /// the label and type but never the identity.
    pub fn mark_output(&mut self, name: &str, ty: &'static ValueType) -> OutputRef {
        let uuid = match &self.output {
            Some(out) => out.uuid.clone(),
            None => new_uuid(),
        };
        self.parameters
            .entry(UUID_KEY.to_string())
            .or_insert_with(|| Json::String(uuid.clone()));
        let out = OutputRef {
            uuid,
            name: name.to_string(),
            ty,
        };
        self.output = Some(out.clone());
        out
    }

    pub fn output(&self) -> Option<&OutputRef> {
        self.output.as_ref()
    }
}

pub fn new_uuid() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

/// Find the record in `actions` that produces the output `uuid`, if it is
/// still in this buffer.
pub fn find_by_uuid<'a>(actions: &'a mut [Action], uuid: &str) -> Option<&'a mut Action> {
    actions
        .iter_mut()
        .find(|a| a.output.as_ref().is_some_and(|out| out.uuid == uuid))
}
