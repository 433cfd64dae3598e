//! Parameter collection and request-body assembly.
//!
//! Parameters arrive as a JSON object already resolved by the host for one
//! item. Absent parameters take their documented default; explicit `null`
//! or blank values are dropped from the body altogether.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::NodeError;

pub const DEFAULT_SLIDES: u32 = 5;
pub const DEFAULT_BINARY_PROPERTY: &str = "data";

// ---------------------------------------------------------------------------
// Option sets
// ---------------------------------------------------------------------------

/// Writing tone. Older workflows spell two of these `causal` and
/// `sale_pitch`; both spellings are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[serde(alias = "causal")]
    Casual,
    #[default]
    Default,
    Educational,
    Funny,
    Professional,
    #[serde(alias = "sale_pitch")]
    SalesPitch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verbosity {
    Concise,
    #[default]
    Standard,
    TextHeavy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageType {
    AiGenerated,
    #[default]
    Stock,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportAs {
    #[default]
    Pptx,
    Pdf,
}

// ---------------------------------------------------------------------------
// Generate request
// ---------------------------------------------------------------------------

/// Body of `POST /api/v1/ppt/presentation/generate/async`.
///
/// `None` fields and an empty `files` list are left out of the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub content: Option<String>,
    pub instructions: Option<String>,
    pub tone: Option<Tone>,
    pub verbosity: Option<Verbosity>,
    pub web_search: Option<bool>,
    pub image_type: Option<ImageType>,
    pub theme: Option<String>,
    pub n_slides: u32,
    pub language: Option<String>,
    pub template: Option<String>,
    pub include_table_of_contents: Option<bool>,
    pub include_title_slide: Option<bool>,
    pub export_as: Option<ExportAs>,
    /// IDs returned by earlier uploads.
    pub files: Vec<String>,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            content: None,
            instructions: None,
            tone: Some(Tone::Default),
            verbosity: Some(Verbosity::Standard),
            web_search: Some(false),
            image_type: Some(ImageType::Stock),
            theme: Some("general".into()),
            n_slides: DEFAULT_SLIDES,
            language: Some("English".into()),
            template: Some("general".into()),
            include_table_of_contents: Some(false),
            include_title_slide: Some(true),
            export_as: Some(ExportAs::Pptx),
            files: Vec::new(),
        }
    }
}

impl GenerateRequest {
    /// Collect the generate parameters for one item.
    ///
    /// # Errors
    /// [`NodeError::Operation`] when `noOfSlides` is not a positive whole
    /// number or an option parameter holds an unknown value.
    pub fn from_parameters(params: &Map<String, Value>) -> Result<Self, NodeError> {
        let defaults = Self::default();
        Ok(Self {
            n_slides: slide_count(params.get("noOfSlides"))?,
            content: string_param(params, "content", defaults.content)?,
            instructions: string_param(params, "instructions", defaults.instructions)?,
            tone: enum_param(params, "tone", defaults.tone)?,
            verbosity: enum_param(params, "verbosity", defaults.verbosity)?,
            web_search: bool_param(params, "web_search", defaults.web_search)?,
            image_type: enum_param(params, "image_type", defaults.image_type)?,
            theme: string_param(params, "theme", defaults.theme)?,
            language: string_param(params, "language", defaults.language)?,
            template: string_param(params, "template", defaults.template)?,
            include_table_of_contents: bool_param(
                params,
                "include_table_of_contents",
                defaults.include_table_of_contents,
            )?,
            include_title_slide: bool_param(
                params,
                "include_title_slide",
                defaults.include_title_slide,
            )?,
            export_as: enum_param(params, "export_as", defaults.export_as)?,
            files: file_ids(params.get("files"))?,
        })
    }

    /// The JSON body, with empty fields removed.
    pub fn to_body(&self) -> Result<Value, NodeError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(Value::Object(prune_empty(map))),
            Ok(other) => Ok(other),
            Err(e) => Err(NodeError::operation(format!("failed to encode request body: {e}"))),
        }
    }
}

/// Drop `null`, the string `"null"`, blank strings and empty arrays.
pub fn prune_empty(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(_, v)| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty() && s != "null",
            Value::Array(a) => !a.is_empty(),
            _ => true,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parameter readers
// ---------------------------------------------------------------------------

fn invalid(name: &str, found: &Value) -> NodeError {
    NodeError::operation(format!("Invalid value {found} for parameter '{name}'"))
}

/// The task ID for a status check: required, trimmed, non-blank.
pub fn task_id(params: &Map<String, Value>) -> Result<String, NodeError> {
    let id = match params.get("taskId") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_owned(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => return Err(invalid("taskId", other)),
    };
    if id.is_empty() {
        return Err(NodeError::operation("Task ID is required"));
    }
    Ok(id)
}

/// Name of the binary property holding the file to upload.
pub fn binary_property(params: &Map<String, Value>) -> Result<String, NodeError> {
    match params.get("binaryPropertyName") {
        None | Some(Value::Null) => Ok(DEFAULT_BINARY_PROPERTY.to_owned()),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_owned()),
        Some(other) => Err(invalid("binaryPropertyName", other)),
    }
}

fn slide_count(value: Option<&Value>) -> Result<u32, NodeError> {
    let reject = || {
        NodeError::operation("Invalid number of slides")
            .with_description("No of Slides must be a positive whole number.")
    };
    let Some(value) = value else {
        return Ok(DEFAULT_SLIDES);
    };
    let n = value.as_f64().ok_or_else(reject)?;
    if n <= 0.0 || n.fract() != 0.0 || n > f64::from(u32::MAX) {
        return Err(reject());
    }
    Ok(n as u32)
}

fn string_param(
    params: &Map<String, Value>,
    name: &str,
    default: Option<String>,
) -> Result<Option<String>, NodeError> {
    match params.get(name) {
        None => Ok(default),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(Some(v.to_string())),
        Some(other) => Err(invalid(name, other)),
    }
}

fn bool_param(
    params: &Map<String, Value>,
    name: &str,
    default: Option<bool>,
) -> Result<Option<bool>, NodeError> {
    match params.get(name) {
        None => Ok(default),
        Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            "" | "null" => Ok(None),
            _ => Err(invalid(name, &Value::String(s.clone()))),
        },
        Some(other) => Err(invalid(name, other)),
    }
}

fn enum_param<T: DeserializeOwned>(
    params: &Map<String, Value>,
    name: &str,
    default: Option<T>,
) -> Result<Option<T>, NodeError> {
    match params.get(name) {
        None => Ok(default),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if matches!(s.trim(), "" | "null") => Ok(None),
        Some(Value::String(s)) => serde_json::from_value(Value::String(s.trim().to_owned()))
            .map(Some)
            .map_err(|_| invalid(name, &Value::String(s.clone()))),
        Some(other) => Err(invalid(name, other)),
    }
}

/// Accepts an array of IDs or a comma-separated string.
fn file_ids(value: Option<&Value>) -> Result<Vec<String>, NodeError> {
    let raw: Vec<String> = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => s.split(',').map(str::to_owned).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                Value::Number(n) => Ok(n.to_string()),
                other => Err(invalid("files", other)),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => return Err(invalid("files", other)),
    };
    Ok(raw
        .into_iter()
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty() && id != "null")
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn defaults_fill_absent_parameters() {
        let body = GenerateRequest::from_parameters(&Map::new())
            .unwrap()
            .to_body()
            .unwrap();
        assert_eq!(
            body,
            json!({
                "tone": "default",
                "verbosity": "standard",
                "web_search": false,
                "image_type": "stock",
                "theme": "general",
                "n_slides": 5,
                "language": "English",
                "template": "general",
                "include_table_of_contents": false,
                "include_title_slide": true,
                "export_as": "pptx",
            })
        );
    }

    #[test]
    fn explicit_values_are_sent() {
        let req = GenerateRequest::from_parameters(&params(json!({
            "content": "Quarterly results",
            "instructions": "Keep it short",
            "tone": "professional",
            "verbosity": "text-heavy",
            "web_search": true,
            "image_type": "ai-generated",
            "noOfSlides": 12,
            "export_as": "pdf",
            "files": "file-1, file-2",
        })))
        .unwrap();

        let body = req.to_body().unwrap();
        assert_eq!(body["content"], "Quarterly results");
        assert_eq!(body["tone"], "professional");
        assert_eq!(body["verbosity"], "text-heavy");
        assert_eq!(body["image_type"], "ai-generated");
        assert_eq!(body["web_search"], true);
        assert_eq!(body["n_slides"], 12);
        assert_eq!(body["export_as"], "pdf");
        assert_eq!(body["files"], json!(["file-1", "file-2"]));
    }

    #[test]
    fn empty_and_null_fields_never_reach_the_body() {
        let req = GenerateRequest::from_parameters(&params(json!({
            "content": "   ",
            "instructions": null,
            "theme": "",
            "language": "null",
            "tone": "",
            "web_search": null,
            "files": [],
        })))
        .unwrap();

        let body = req.to_body().unwrap();
        let obj = body.as_object().unwrap();
        for key in ["content", "instructions", "theme", "language", "tone", "web_search", "files"] {
            assert!(!obj.contains_key(key), "'{key}' should have been dropped");
        }
        for value in obj.values() {
            assert!(!value.is_null());
            assert_ne!(value, &json!(""));
            assert_ne!(value, &json!([]));
        }
    }

    #[test]
    fn null_strings_drop_option_and_flag_fields() {
        let req = GenerateRequest::from_parameters(&params(json!({
            "tone": "null",
            "verbosity": " null ",
            "image_type": "null",
            "export_as": "null",
            "web_search": "null",
            "include_title_slide": "null",
        })))
        .expect("\"null\" values are dropped, not rejected");

        let body = req.to_body().unwrap();
        let obj = body.as_object().unwrap();
        for key in ["tone", "verbosity", "image_type", "export_as", "web_search", "include_title_slide"] {
            assert!(!obj.contains_key(key), "'{key}' should have been dropped");
        }
        assert_eq!(body["n_slides"], 5);
    }

    #[test]
    fn legacy_tone_spellings_are_accepted() {
        let req = GenerateRequest::from_parameters(&params(json!({ "tone": "causal" }))).unwrap();
        assert_eq!(req.tone, Some(Tone::Casual));
        let req = GenerateRequest::from_parameters(&params(json!({ "tone": "sale_pitch" }))).unwrap();
        assert_eq!(req.to_body().unwrap()["tone"], "sales_pitch");
    }

    #[test]
    fn non_positive_or_non_numeric_slide_counts_are_rejected() {
        for bad in [json!(0), json!(-3), json!(2.5), json!("5"), json!(null), json!(true)] {
            let err = GenerateRequest::from_parameters(&params(json!({ "noOfSlides": bad })))
                .unwrap_err();
            assert_eq!(err.to_string(), "Invalid number of slides", "value {bad}");
            assert!(matches!(
                err,
                NodeError::Operation { description: Some(ref d), .. } if d.contains("whole number")
            ));
        }
    }

    #[test]
    fn unknown_option_value_is_rejected() {
        let err = GenerateRequest::from_parameters(&params(json!({ "export_as": "key" })))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("export_as"));
    }

    #[test]
    fn files_array_is_trimmed() {
        let req = GenerateRequest::from_parameters(&params(json!({
            "files": [" a ", "", "null", "b"],
        })))
        .unwrap();
        assert_eq!(req.files, vec!["a", "b"]);
    }

    #[test]
    fn task_id_must_not_be_blank() {
        assert!(task_id(&Map::new()).is_err());
        assert!(task_id(&params(json!({ "taskId": " \t" }))).is_err());
        assert_eq!(task_id(&params(json!({ "taskId": " abc-1 " }))).unwrap(), "abc-1");
        assert_eq!(task_id(&params(json!({ "taskId": 1234 }))).unwrap(), "1234");
    }

    #[test]
    fn task_id_of_wrong_type_reports_the_value() {
        let err = task_id(&params(json!({ "taskId": true }))).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value true for parameter 'taskId'");

        let err = task_id(&params(json!({ "taskId": ["a"] }))).unwrap_err();
        assert!(err.to_string().contains("'taskId'"));
    }

    #[test]
    fn binary_property_defaults_to_data() {
        assert_eq!(binary_property(&Map::new()).unwrap(), "data");
        assert_eq!(
            binary_property(&params(json!({ "binaryPropertyName": "attachment" }))).unwrap(),
            "attachment"
        );
    }

    #[test]
    fn prune_keeps_false_and_zero() {
        let pruned = prune_empty(params(json!({
            "a": false, "b": 0, "c": null, "d": "", "e": [], "f": {}, "g": "null",
        })));
        assert_eq!(Value::Object(pruned), json!({ "a": false, "b": 0, "f": {} }));
    }
}
