//! Classpath-jar indexing, enabled when `depMode = provided`. Real
//! dependency jars on `extraClasspath` are indexed the same shape as
//! source-derived types so the collector can prefer a real symbol over a
//! synthetic stub whenever one exists.

use std::io::Read;
use std::path::Path;

use javastub_core::TypeKind;

use crate::error::{Error, Result};
use crate::index::IndexedType;

const ACC_INTERFACE: u16 = 0x0200;
const ACC_ANNOTATION: u16 = 0x2000;
const ACC_ENUM: u16 = 0x4000;

fn kind_from_access_flags(flags: u16) -> TypeKind {
    if flags & ACC_ANNOTATION != 0 {
        TypeKind::Annotation
    } else if flags & ACC_INTERFACE != 0 {
        TypeKind::Interface
    } else if flags & ACC_ENUM != 0 {
        TypeKind::Enum
    } else {
        TypeKind::Class
    }
}

fn to_canonical(internal_name: &str) -> String {
    internal_name.replace('/', ".")
}

fn field_type_simple_name(ty: &javastub_classfile::FieldType) -> String {
    use javastub_classfile::{BaseType, FieldType};
    match ty {
        FieldType::Base(BaseType::Byte) => "byte".to_string(),
        FieldType::Base(BaseType::Char) => "char".to_string(),
        FieldType::Base(BaseType::Double) => "double".to_string(),
        FieldType::Base(BaseType::Float) => "float".to_string(),
        FieldType::Base(BaseType::Int) => "int".to_string(),
        FieldType::Base(BaseType::Long) => "long".to_string(),
        FieldType::Base(BaseType::Short) => "short".to_string(),
        FieldType::Base(BaseType::Boolean) => "boolean".to_string(),
        FieldType::Object(name) => javastub_core::simple_name_of(&to_canonical(name)).to_string(),
        FieldType::Array(inner) => format!("{}[]", field_type_simple_name(inner)),
    }
}

/// Indexes every `.class` entry of a single jar. A jar that can't be opened,
/// or an entry that can't be parsed, is skipped best-effort rather than
/// failing the whole index build.
pub fn index_jar(jar_path: &Path) -> Result<Vec<IndexedType>> {
    let file = std::fs::File::open(jar_path).map_err(|source| Error::Jar {
        path: jar_path.to_path_buf(),
        source,
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|source| Error::Zip {
        path: jar_path.to_path_buf(),
        source,
    })?;

    let mut out = Vec::new();
    for i in 0..archive.len() {
        let mut entry = match archive.by_index(i) {
            Ok(e) => e,
            Err(err) => {
                tracing::debug!(
                    target = "javastub.index",
                    jar = %jar_path.display(),
                    error = %err,
                    "skipping unreadable jar entry"
                );
                continue;
            }
        };
        if !entry.name().ends_with(".class") || entry.is_dir() {
            continue;
        }

        let mut bytes = Vec::new();
        if entry.read_to_end(&mut bytes).is_err() {
            continue;
        }

        let class = match javastub_classfile::ClassFile::parse(&bytes) {
            Ok(c) => c,
            Err(err) => {
                tracing::debug!(
                    target = "javastub.index",
                    jar = %jar_path.display(),
                    entry = entry.name(),
                    error = %err,
                    "skipping unparseable class entry"
                );
                continue;
            }
        };

        let stub = match class.stub() {
            Ok(s) => s,
            Err(_) => continue,
        };

        let fqn = to_canonical(&stub.internal_name);
        let outer_fqn = fqn.rsplit_once('$').map(|(outer, _)| outer.to_string());

        out.push(IndexedType {
            fqn,
            kind: kind_from_access_flags(stub.access_flags),
            outer_fqn,
            superclass: stub.super_class.as_deref().map(to_canonical),
            interfaces: stub.interfaces.iter().map(|i| to_canonical(i)).collect(),
            methods: stub
                .methods
                .iter()
                .map(|m| crate::index::IndexedMethod {
                    name: m.name.clone(),
                    arity: m.parsed_descriptor.params.len() as u32,
                    param_simple_names: m
                        .parsed_descriptor
                        .params
                        .iter()
                        .map(field_type_simple_name)
                        .collect(),
                })
                .collect(),
            fields: stub.fields.iter().map(|f| f.name.clone()).collect(),
        });
    }

    Ok(out)
}

/// Indexes every jar on the extra classpath, merging failures away: one bad
/// jar does not prevent the rest of the classpath from being indexed.
pub fn index_classpath(jars: &[std::path::PathBuf]) -> Vec<IndexedType> {
    let mut out = Vec::new();
    for jar in jars {
        match index_jar(jar) {
            Ok(entries) => out.extend(entries),
            Err(err) => {
                tracing::debug!(
                    target = "javastub.index",
                    jar = %jar.display(),
                    error = %err,
                    "skipping jar that could not be indexed"
                );
            }
        }
    }
    out
}
