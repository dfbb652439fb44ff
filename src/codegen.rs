//! Final artifact assembly.

use serde::Serialize;
use serde_json::Value as Json;

use crate::action::Action;

#[derive(Debug, Serialize)]
pub struct ShortcutIcon {
    #[serde(rename = "WFWorkflowIconGlyphNumber")]
    pub glyph_number: i64,
    #[serde(rename = "WFWorkflowIconStartColor")]
    pub start_color: i64,
}

impl Default for ShortcutIcon {
    fn default() -> Self {
        ShortcutIcon {
            glyph_number: 61440,
            start_color: -615917313,
        }
    }
}

/// The complete artifact: the lowered record list plus the metadata fields
/// the host requires, at their defaults.
#[derive(Debug, Serialize)]
pub struct Shortcut {
    #[serde(rename = "WFQuickActionSurfaces")]
    pub quick_action_surfaces: Vec<Json>,
    #[serde(rename = "WFWorkflowActions")]
    pub actions: Vec<Action>,
    #[serde(rename = "WFWorkflowClientVersion")]
    pub client_version: String,
    #[serde(rename = "WFWorkflowHasOutputFallback")]
    pub has_output_fallback: bool,
    #[serde(rename = "WFWorkflowHasShortcutInputVariables")]
    pub has_shortcut_input_variables: bool,
    #[serde(rename = "WFWorkflowIcon")]
    pub icon: ShortcutIcon,
    #[serde(rename = "WFWorkflowImportQuestions")]
    pub import_questions: Vec<Json>,
    #[serde(rename = "WFWorkflowInputContentItemClasses")]
    pub input_content_item_classes: Vec<String>,
    #[serde(rename = "WFWorkflowIsDisabledOnLockScreen")]
    pub is_disabled_on_lock_screen: bool,
    #[serde(rename = "WFWorkflowMinimumClientVersion")]
    pub minimum_client_version: u32,
    #[serde(rename = "WFWorkflowMinimumClientVersionString")]
    pub minimum_client_version_string: String,
    #[serde(rename = "WFWorkflowOutputContentItemClasses")]
    pub output_content_item_classes: Vec<String>,
    #[serde(rename = "WFWorkflowTypes")]
    pub workflow_types: Vec<String>,
}

/// Flatten a completed run's record buffer into the final artifact.
pub fn synthesize(actions: Vec<Action>) -> Shortcut {
    Shortcut {
        quick_action_surfaces: Vec::new(),
        actions,
        client_version: "3607.0.2".to_string(),
        has_output_fallback: false,
        has_shortcut_input_variables: false,
        icon: ShortcutIcon::default(),
        import_questions: Vec::new(),
        input_content_item_classes: Vec::new(),
        is_disabled_on_lock_screen: false,
        minimum_client_version: 900,
        minimum_client_version_string: "900".to_string(),
        output_content_item_classes: Vec::new(),
        workflow_types: Vec::new(),
    }
}
