//! A language-independent reference to a type (spec §3, `TypeRef`).

use crate::Name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    /// The lexeme as it would be written in source.
    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Short => "short",
            Primitive::Char => "char",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    /// The zero-value literal the materializer emits for this primitive
    /// (spec §4.4).
    pub fn zero_literal(self) -> &'static str {
        match self {
            Primitive::Boolean => "false",
            Primitive::Byte | Primitive::Short | Primitive::Int => "0",
            Primitive::Long => "0L",
            Primitive::Float => "0.0f",
            Primitive::Double => "0.0",
            Primitive::Char => "'\\0'",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Some(match word {
            "boolean" => Primitive::Boolean,
            "byte" => Primitive::Byte,
            "short" => Primitive::Short,
            "char" => Primitive::Char,
            "int" => Primitive::Int,
            "long" => Primitive::Long,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            _ => return None,
        })
    }
}

/// The non-array core of a [`TypeRef`].
///
/// Kept as its own enum so the invariant in spec §3 ("primitive and `void`
/// `TypeRef`s carry empty type arguments ... unless they are array-of-primitive")
/// is enforced by construction: only [`TypeRefKind::Reference`] can carry type
/// arguments at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRefKind {
    Primitive(Primitive),
    Void,
    Reference {
        /// Dot-separated for package segments, `$`-separated for nested types.
        canonical_name: Name,
        type_args: Vec<TypeRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub array_dims: u32,
}

/// The canonical name of the top reference type (`java.lang.Object`).
///
/// Used throughout the collector and extractor as the default for parameters
/// and expressions whose static type could not be determined.
pub const TOP_TYPE: &str = "java.lang.Object";

impl TypeRef {
    pub fn primitive(p: Primitive) -> Self {
        Self {
            kind: TypeRefKind::Primitive(p),
            array_dims: 0,
        }
    }

    pub fn void() -> Self {
        Self {
            kind: TypeRefKind::Void,
            array_dims: 0,
        }
    }

    pub fn reference(canonical_name: impl Into<Name>, type_args: Vec<TypeRef>) -> Self {
        Self {
            kind: TypeRefKind::Reference {
                canonical_name: canonical_name.into(),
                type_args,
            },
            array_dims: 0,
        }
    }

    /// The top reference type (`java.lang.Object`), used as the default for
    /// symbols whose real type could not be inferred (spec §4.2 point 3, §4.6
    /// "Otherwise -> top type").
    pub fn top() -> Self {
        Self::reference(TOP_TYPE, Vec::new())
    }

    pub fn with_array_dims(mut self, dims: u32) -> Self {
        self.array_dims = dims;
        self
    }

    pub fn is_top_type(&self) -> bool {
        !self.is_array()
            && matches!(&self.kind, TypeRefKind::Reference { canonical_name, type_args }
                if canonical_name.as_str() == TOP_TYPE && type_args.is_empty())
    }

    pub fn is_array(&self) -> bool {
        self.array_dims > 0
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeRefKind::Primitive(_)) && !self.is_array()
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeRefKind::Void) && !self.is_array()
    }

    /// The bare canonical name with type arguments and array brackets
    /// stripped (`stripTypeArgsAndArrays` in spec §4.3), or `None` for
    /// primitives/`void`.
    pub fn bare_fqn(&self) -> Option<&str> {
        match &self.kind {
            TypeRefKind::Reference { canonical_name, .. } => Some(canonical_name.as_str()),
            _ => None,
        }
    }

    /// A stable, type-argument- and array-insensitive "shape" name used to
    /// compare stubbed parameter lists for overload disambiguation (spec §3,
    /// `normalizedParamSimpleNames`).
    pub fn simple_shape(&self) -> String {
        let base = match &self.kind {
            TypeRefKind::Primitive(p) => p.keyword().to_string(),
            TypeRefKind::Void => "void".to_string(),
            TypeRefKind::Reference { canonical_name, .. } => {
                simple_name_of(canonical_name.as_str()).to_string()
            }
        };
        if self.array_dims == 0 {
            base
        } else {
            format!("{base}{}", "[]".repeat(self.array_dims as usize))
        }
    }
}

/// The simple (unqualified, innermost-nested) name of a canonical FQN.
pub fn simple_name_of(fqn: &str) -> &str {
    let after_dot = fqn.rsplit('.').next().unwrap_or(fqn);
    after_dot.rsplit('$').next().unwrap_or(after_dot)
}

/// `dotToDollarForNested` from spec §4.3: join an outer FQN and an inner
/// simple name with `$`, the JVM nested-type convention.
pub fn dot_to_dollar_for_nested(outer_fqn: &str, inner_simple_name: &str) -> String {
    format!("{outer_fqn}${inner_simple_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_type_is_object_with_no_args() {
        let top = TypeRef::top();
        assert!(top.is_top_type());
        assert_eq!(top.bare_fqn(), Some(TOP_TYPE));
    }

    #[test]
    fn array_of_primitive_is_not_primitive() {
        let arr = TypeRef::primitive(Primitive::Int).with_array_dims(1);
        assert!(!arr.is_primitive());
        assert!(arr.is_array());
    }

    #[test]
    fn simple_shape_strips_package_and_keeps_arrays() {
        let ty = TypeRef::reference("java.lang.String", Vec::new()).with_array_dims(2);
        assert_eq!(ty.simple_shape(), "String[][]");
    }

    #[test]
    fn nested_name_joins_with_dollar() {
        assert_eq!(dot_to_dollar_for_nested("com.example.Outer", "Inner"), "com.example.Outer$Inner");
    }

    #[test]
    fn simple_name_of_strips_nesting() {
        assert_eq!(simple_name_of("com.example.Outer$Inner"), "Inner");
    }
}
