use std::path::Path;

const CLI_ERROR_CODE_JSON: &str = "json";
const CLI_ERROR_CODE_OUTPUT: &str = "output";

#[derive(Debug)]
pub(crate) enum CliError {
    Tool(code_tools_fs::Error),
    Json(serde_json::Error),
    Output(std::io::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Tool(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "json error: {err}"),
            CliError::Output(err) => write!(f, "failed to write output: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Tool(err) => Some(err),
            CliError::Json(err) => Some(err),
            CliError::Output(err) => Some(err),
        }
    }
}

impl From<code_tools_fs::Error> for CliError {
    fn from(err: code_tools_fs::Error) -> Self {
        Self::Tool(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl CliError {
    pub(crate) fn code(&self) -> &'static str {
        match self {
            CliError::Tool(err) => err.code(),
            CliError::Json(_) => CLI_ERROR_CODE_JSON,
            CliError::Output(_) => CLI_ERROR_CODE_OUTPUT,
        }
    }
}

fn details_map(kind: &'static str) -> serde_json::Map<String, serde_json::Value> {
    let mut out = serde_json::Map::new();
    out.insert(
        "kind".to_string(),
        serde_json::Value::String(kind.to_string()),
    );
    out
}

fn path_value(path: &Path) -> serde_json::Value {
    serde_json::Value::String(path.display().to_string())
}

fn insert_io_source(out: &mut serde_json::Map<String, serde_json::Value>, err: &std::io::Error) {
    out.insert(
        "io_kind".to_string(),
        serde_json::Value::String(format!("{:?}", err.kind())),
    );
    if let Some(raw_os_error) = err.raw_os_error() {
        out.insert("raw_os_error".to_string(), serde_json::json!(raw_os_error));
    }
}

/// Structured details for `--error-format json`.
pub(crate) fn tool_error_details(tool: &code_tools_fs::Error) -> serde_json::Value {
    use code_tools_fs::Error;

    let mut out = details_map(tool.code());
    match tool {
        Error::IoPath { op, path, source } => {
            out.insert("op".to_string(), serde_json::json!(op));
            out.insert("path".to_string(), path_value(path));
            insert_io_source(&mut out, source);
        }
        Error::WalkDir(err) => {
            if let Some(path) = err.path() {
                out.insert("path".to_string(), path_value(path));
            }
            out.insert("message".to_string(), serde_json::json!(err.to_string()));
        }
        Error::InvalidConfig(message) | Error::InvalidPath(message) => {
            out.insert("message".to_string(), serde_json::json!(message));
        }
        Error::InvalidPattern { pattern, message } => {
            out.insert("pattern".to_string(), serde_json::json!(pattern));
            out.insert("message".to_string(), serde_json::json!(message));
        }
        Error::NotFound(path)
        | Error::NotADirectory(path)
        | Error::IsADirectory(path)
        | Error::AlreadyExists(path) => {
            out.insert("path".to_string(), path_value(path));
        }
        Error::PartialFailure {
            source_path,
            destination,
            source,
        } => {
            out.insert("source".to_string(), path_value(source_path));
            out.insert("destination".to_string(), path_value(destination));
            insert_io_source(&mut out, source);
        }
        _ => {}
    }
    serde_json::Value::Object(out)
}

pub(crate) fn render_error_json(err: &CliError) -> serde_json::Value {
    let mut error = serde_json::Map::new();
    error.insert(
        "code".to_string(),
        serde_json::Value::String(err.code().to_string()),
    );
    error.insert(
        "message".to_string(),
        serde_json::Value::String(err.to_string()),
    );
    if let CliError::Tool(tool) = err {
        error.insert("details".to_string(), tool_error_details(tool));
    }
    serde_json::json!({ "error": error })
}
