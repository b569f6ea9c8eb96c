//! The external input/output contract (spec §6).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How the core should treat the repository's real dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepMode {
    /// Ignore whatever dependencies exist; stub everything unresolved.
    None,
    /// Real dependency jars are available on `extraClasspath` and should be
    /// indexed and preferred over stubs where possible.
    Provided,
    /// Reserved for a driver that fetches dependencies on demand. The core
    /// treats this identically to `Provided` — fetching itself is an
    /// external collaborator's job (spec §1).
    Fetched,
}

impl Default for DepMode {
    fn default() -> Self {
        DepMode::None
    }
}

/// How much structural context around the target method was preserved by the
/// (external) slicer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SliceMode {
    Method,
    Class,
}

impl Default for SliceMode {
    fn default() -> Self {
        SliceMode::Method
    }
}

/// Ambiguity resolution policy (spec §4.2 "Disambiguation").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AmbiguityPolicy {
    /// Fail with `FAILED_RESOLVE` when a simple name has more than one
    /// candidate FQN and nothing disambiguates it.
    Strict,
    /// Deterministically pick the lexicographically smallest candidate.
    Lenient,
}

impl Default for AmbiguityPolicy {
    fn default() -> Self {
        AmbiguityPolicy::Lenient
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    #[serde(default)]
    pub dep_mode: DepMode,
    #[serde(default)]
    pub slice_mode: SliceMode,
    #[serde(default)]
    pub ambiguity_policy: AmbiguityPolicy,
    /// Per-method wall-clock budget. Spec §4.7 "Wall clock".
    pub timeout_sec: u64,
    #[serde(default)]
    pub extra_classpath: Vec<PathBuf>,
    pub work_dir: PathBuf,
    /// Maximum repair iterations before giving up (spec §4.7 "Budget",
    /// default 6).
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    6
}

impl Options {
    pub fn new(work_dir: impl Into<PathBuf>, timeout_sec: u64) -> Self {
        Self {
            dep_mode: DepMode::default(),
            slice_mode: SliceMode::default(),
            ambiguity_policy: AmbiguityPolicy::default(),
            timeout_sec,
            extra_classpath: Vec::new(),
            work_dir: work_dir.into(),
            max_iterations: default_max_iterations(),
        }
    }

    pub fn slice_dir(&self) -> PathBuf {
        self.work_dir.join("slice")
    }

    pub fn gen_dir(&self) -> PathBuf {
        self.work_dir.join("gen")
    }

    pub fn classes_dir(&self) -> PathBuf {
        self.work_dir.join("classes")
    }
}

/// `(binaryClassName, methodName, descriptor)` — spec §6 "methodId".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodId {
    /// `/`-package-separated, `$`-nested binary name.
    pub binary_class_name: String,
    pub method_name: String,
    /// The low-level `(<paramTypeDescs>)<returnTypeDesc>` signature string.
    pub descriptor: String,
}

impl MethodId {
    pub fn new(
        binary_class_name: impl Into<String>,
        method_name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            binary_class_name: binary_class_name.into(),
            method_name: method_name.into(),
            descriptor: descriptor.into(),
        }
    }

    /// The canonical (dotted, `$`-nested) form of the binary name.
    pub fn canonical_owner(&self) -> String {
        self.binary_class_name.replace('/', ".")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub project_root: PathBuf,
    pub source_root: PathBuf,
    pub method_id: MethodId,
    pub options: Options,
}

/// Spec §7 status taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    FailedParse,
    FailedResolve,
    FailedCompile,
    MissingDep,
    Timeout,
    TargetMethodNotEmitted,
    InternalError,
}

impl Status {
    pub fn is_success(self) -> bool {
        matches!(self, Status::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub status: Status,
    /// Present whenever compilation ran at all.
    pub classes_out_dir: Option<PathBuf>,
    pub target_class: String,
    pub emitted_classes: Vec<String>,
    pub target_class_file: Option<PathBuf>,
    pub target_has_code: bool,
    pub used_stubs: bool,
    pub deps_resolved: DepMode,
    pub elapsed_ms: u128,
    pub notes: String,
}

impl Outcome {
    pub fn internal_error(target_class: String, notes: impl Into<String>) -> Self {
        Self {
            status: Status::InternalError,
            classes_out_dir: None,
            target_class,
            emitted_classes: Vec::new(),
            target_class_file: None,
            target_has_code: false,
            used_stubs: false,
            deps_resolved: DepMode::None,
            elapsed_ms: 0,
            notes: notes.into(),
        }
    }
}
