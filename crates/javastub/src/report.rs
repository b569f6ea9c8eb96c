//! Result Reporter (component C8): locates the requested method in the
//! emitted classfile set and confirms it was actually compiled with a body.

use std::path::{Path, PathBuf};

use javastub_classfile::ClassFile;
use javastub_core::MethodId;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct TargetReport {
    pub emitted_classes: Vec<String>,
    pub target_class_file: Option<PathBuf>,
    pub target_has_code: bool,
    /// Set when the owning class was found but no method matched
    /// `(name, descriptor)` exactly — spec scenario 8's descriptor-mismatch
    /// note.
    pub descriptor_mismatch: Option<String>,
}

/// Checks whether `class` is the requested method's owner and, if so,
/// whether it carries a method matching `(name, descriptor)` exactly.
/// Split out from the directory walk so the matching rules can be tested
/// without needing a real classfile on disk.
fn match_owner(class: &ClassFile, method_id: &MethodId) -> Option<(bool, Option<String>)> {
    if class.this_class != method_id.binary_class_name {
        return None;
    }
    let exact = class.methods.iter().find(|m| m.name == method_id.method_name && m.descriptor == method_id.descriptor);
    match exact {
        Some(m) => Some((m.has_code, None)),
        None => {
            let mismatch = class.methods.iter().find(|m| m.name == method_id.method_name).map(|found| {
                format!(
                    "descriptor mismatch: found {}{}, wanted {}{}",
                    found.name, found.descriptor, method_id.method_name, method_id.descriptor
                )
            });
            Some((false, mismatch))
        }
    }
}

/// Walks every `.class` file under `classes_dir`, parses it, and checks
/// whether `method_id`'s owner/name/descriptor triple is present.
pub fn locate_target_method(classes_dir: &Path, method_id: &MethodId) -> Result<TargetReport> {
    let mut emitted_classes = Vec::new();
    let mut target_class_file = None;
    let mut target_has_code = false;
    let mut descriptor_mismatch = None;

    for entry in walkdir::WalkDir::new(classes_dir).into_iter().filter_map(std::result::Result::ok) {
        if !entry.file_type().is_file() || entry.path().extension().and_then(|e| e.to_str()) != Some("class") {
            continue;
        }
        let bytes = std::fs::read(entry.path()).map_err(|source| crate::error::Error::ReadFile { path: entry.path().to_path_buf(), source })?;
        let class = match ClassFile::parse(&bytes) {
            Ok(class) => class,
            Err(err) => {
                tracing::debug!(target: "javastub.report", path = %entry.path().display(), %err, "skipping unparseable classfile");
                continue;
            }
        };
        emitted_classes.push(class.this_class.clone());

        let relative = entry.path().strip_prefix(classes_dir).unwrap_or(entry.path()).to_path_buf();
        if let Some((has_code, mismatch)) = match_owner(&class, method_id) {
            target_class_file = Some(relative);
            target_has_code = has_code;
            descriptor_mismatch = mismatch;
        }
    }

    Ok(TargetReport {
        emitted_classes,
        target_class_file,
        target_has_code,
        descriptor_mismatch,
    })
}

#[cfg(test)]
mod tests {
    use javastub_classfile::ClassMember;

    use super::*;

    #[test]
    fn reports_no_target_class_file_when_classes_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let method_id = MethodId::new("a/B", "f", "()V");
        let report = locate_target_method(dir.path(), &method_id).unwrap();
        assert!(report.target_class_file.is_none());
        assert!(!report.target_has_code);
        assert!(report.emitted_classes.is_empty());
    }

    fn member(name: &str, descriptor: &str, has_code: bool) -> ClassMember {
        ClassMember {
            access_flags: 0x0001,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            has_code,
        }
    }

    fn class_with_methods(this_class: &str, methods: Vec<ClassMember>) -> ClassFile {
        ClassFile {
            minor_version: 0,
            major_version: 52,
            access_flags: 0x0021,
            this_class: this_class.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods,
            signature: None,
            runtime_visible_annotations: Vec::new(),
            runtime_invisible_annotations: Vec::new(),
            inner_classes: Vec::new(),
        }
    }

    #[test]
    fn exact_match_reports_has_code() {
        let class = class_with_methods("a/B", vec![member("f", "(I)V", true)]);
        let method_id = MethodId::new("a/B", "f", "(I)V");
        let (has_code, mismatch) = match_owner(&class, &method_id).unwrap();
        assert!(has_code);
        assert!(mismatch.is_none());
    }

    #[test]
    fn descriptor_mismatch_is_reported_by_name() {
        let class = class_with_methods("a/B", vec![member("f", "()V", true)]);
        let method_id = MethodId::new("a/B", "f", "(I)V");
        let (has_code, mismatch) = match_owner(&class, &method_id).unwrap();
        assert!(!has_code);
        assert_eq!(mismatch.as_deref(), Some("descriptor mismatch: found f()V, wanted f(I)V"));
    }

    #[test]
    fn different_owner_is_not_matched() {
        let class = class_with_methods("a/Other", vec![member("f", "()V", true)]);
        let method_id = MethodId::new("a/B", "f", "()V");
        assert!(match_owner(&class, &method_id).is_none());
    }
}
