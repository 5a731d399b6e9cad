//! Writing a submission into its workspace
//!
//! Each language gets its own on-disk layout: Python runs through a generated
//! wrapper that applies resource limits before executing `main.py`, JavaScript
//! runs `main.js` directly, and Java sources are named after their public
//! class so that `javac` accepts them.

use std::path::PathBuf;

use regex::Regex;
use tracing::{debug, instrument};

use crate::config::Toolchain;
use crate::runner::PrepareError;
use crate::sandbox::Workspace;
use crate::types::Language;

/// File name of the generated Python launcher
pub const PYTHON_WRAPPER_NAME: &str = "_wrapper.py";

/// Class name used when a Java source declares no public class
pub const DEFAULT_JAVA_CLASS: &str = "Main";

const SOURCE_STEM: &str = "main";

/// A submission written to disk and ready to compile or run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedProgram {
    pub language: Language,
    /// File name of the submission inside the workspace
    pub source_name: String,
    /// Java class to launch (the source stem for other languages)
    pub class_name: String,
    /// Absolute path of the file the runtime is pointed at
    pub entry: PathBuf,
}

impl PreparedProgram {
    /// Whether each run needs a freshly generated launcher
    pub fn uses_wrapper(&self) -> bool {
        self.language == Language::Python
    }
}

/// Write the submission into the workspace
#[instrument(skip(workspace, toolchain, code), fields(len = code.len()))]
pub async fn prepare(
    workspace: &Workspace,
    toolchain: &Toolchain,
    language: Language,
    code: &str,
) -> Result<PreparedProgram, PrepareError> {
    let class_name = match language {
        Language::Java => java_class_name(code),
        Language::Python | Language::JavaScript => SOURCE_STEM.to_owned(),
    };
    let source_name = format!("{class_name}.{}", toolchain.extension);

    let source_path = workspace.write_file(&source_name, code.as_bytes()).await?;
    let entry = match language {
        Language::Python => workspace.file_path(PYTHON_WRAPPER_NAME)?,
        Language::JavaScript | Language::Java => source_path,
    };

    debug!(%source_name, %class_name, "submission written");

    Ok(PreparedProgram {
        language,
        source_name,
        class_name,
        entry,
    })
}

/// Name of the first `public class` declared in a Java source
pub fn java_class_name(code: &str) -> String {
    Regex::new(r"public\s+class\s+(\w+)")
        .ok()
        .and_then(|re| re.captures(code))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .unwrap_or_else(|| DEFAULT_JAVA_CLASS.to_owned())
}

/// CPU-seconds limit derived from a wall-clock timeout
pub fn cpu_limit_secs(timeout_ms: u64) -> u64 {
    (timeout_ms / 1000).max(1)
}

/// Source of the Python launcher
///
/// Each limit is applied independently and silently skipped where the host
/// lacks the `resource` module or refuses the call.
pub fn python_wrapper(source_name: &str, memory_limit_mb: u64, timeout_ms: u64) -> String {
    let memory_bytes = memory_limit_mb.saturating_mul(1024 * 1024);
    let cpu_secs = cpu_limit_secs(timeout_ms);

    format!(
        r#"import os

try:
    import resource
except ImportError:
    resource = None

if resource is not None:
    try:
        resource.setrlimit(resource.RLIMIT_AS, ({memory_bytes}, {memory_bytes}))
    except Exception:
        pass
    try:
        resource.setrlimit(resource.RLIMIT_CPU, ({cpu_secs}, {cpu_secs}))
    except Exception:
        pass

_path = os.path.join(os.path.dirname(os.path.abspath(__file__)), {source_name:?})
with open(_path, "r", encoding="utf-8") as _f:
    _source = _f.read()

exec(compile(_source, _path, "exec"), {{"__name__": "__main__", "__file__": _path}})
"#
    )
}
