//! Rust type IR: resolved field types and the type declarations to emit.

/// Fixed scalar kinds a schema format maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    String,
    Bool,
    U8,
    I16,
    I32,
    U32,
    /// Routed through the runtime's quoted `Int64`.
    I64,
    F32,
    F64,
}

/// A resolved field, parameter or payload type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RustType {
    Scalar(ScalarKind),
    Timestamp,
    /// Open JSON object.
    Json,
    /// A declared schema, by normalized identifier.
    Named(String),
    /// The type variable of a generic family definition.
    Param,
    /// `Family<arg>`.
    Generic { family: String, arg: Box<RustType> },
    Vec(Box<RustType>),
    Map {
        key: Box<RustType>,
        value: Box<RustType>,
    },
    Nullable(Box<RustType>),
    /// Foreign key into the table of the named definition.
    HashRef(String),
    /// Flag set over the named enum.
    Bitmask(String),
}

impl RustType {
    pub fn vec(inner: RustType) -> Self {
        Self::Vec(Box::new(inner))
    }

    pub fn nullable(inner: RustType) -> Self {
        Self::Nullable(Box::new(inner))
    }

    pub fn map(key: RustType, value: RustType) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn generic(family: impl Into<String>, arg: RustType) -> Self {
        Self::Generic {
            family: family.into(),
            arg: Box::new(arg),
        }
    }

    /// Declared identifiers this type depends on, in visiting order.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_dependencies(&mut out);
        out
    }

    fn collect_dependencies<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Named(ident) | Self::HashRef(ident) | Self::Bitmask(ident) => out.push(ident),
            Self::Generic { family, arg } => {
                out.push(family);
                arg.collect_dependencies(out);
            }
            Self::Vec(inner) | Self::Nullable(inner) => inner.collect_dependencies(out),
            Self::Map { key, value } => {
                key.collect_dependencies(out);
                value.collect_dependencies(out);
            }
            Self::Scalar(_) | Self::Timestamp | Self::Json | Self::Param => {}
        }
    }

    /// Replaces every occurrence of `target` with `replacement`.
    #[must_use]
    pub fn substitute(&self, target: &RustType, replacement: &RustType) -> RustType {
        if self == target {
            return replacement.clone();
        }
        match self {
            Self::Generic { family, arg } => Self::generic(family.clone(), arg.substitute(target, replacement)),
            Self::Vec(inner) => Self::vec(inner.substitute(target, replacement)),
            Self::Nullable(inner) => Self::nullable(inner.substitute(target, replacement)),
            Self::Map { key, value } => Self::map(
                key.substitute(target, replacement),
                value.substitute(target, replacement),
            ),
            other => other.clone(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Self::Param)
    }

    /// True when the type variable is used as a map key anywhere inside.
    pub fn has_param_key(&self) -> bool {
        match self {
            Self::Map { key, value } => key.is_param() || key.has_param_key() || value.has_param_key(),
            Self::Generic { arg, .. } => arg.has_param_key(),
            Self::Vec(inner) | Self::Nullable(inner) => inner.has_param_key(),
            _ => false,
        }
    }
}

/// One field of an emitted struct.
#[derive(Debug, Clone)]
pub struct Field {
    pub wire_name: String,
    pub rust_name: String,
    pub ty: RustType,
    pub description: Option<String>,
}

/// One named value of an integer-backed enum.
#[derive(Debug, Clone)]
pub struct EnumVariant {
    pub identifier: String,
    pub const_name: String,
    /// Integer literal text.
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub enum TypeDefKind {
    Struct {
        /// Declared as `Ident<T>`.
        generic: bool,
        fields: Vec<Field>,
    },
    /// Object without declared properties.
    OpenMap,
    /// Type alias for a top-level array or dictionary schema.
    Alias(RustType),
    Enum {
        repr: ScalarKind,
        variants: Vec<EnumVariant>,
    },
}

/// A type declaration to emit.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub ident: String,
    /// Schema reference name the declaration came from.
    pub ref_name: String,
    pub description: Option<String>,
    pub kind: TypeDefKind,
    /// Table name for records stored in a definition table.
    pub definition_table: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependencies_walk_nested_types() {
        let ty = RustType::generic(
            "ComponentResponse",
            RustType::map(
                RustType::HashRef("InventoryItemDefinition".into()),
                RustType::nullable(RustType::vec(RustType::Bitmask("GameVersions".into()))),
            ),
        );
        assert_eq!(
            ty.dependencies(),
            vec!["ComponentResponse", "InventoryItemDefinition", "GameVersions"]
        );
    }

    #[test]
    fn test_substitute_and_param_key() {
        let ty = RustType::generic(
            "ComponentResponse",
            RustType::map(RustType::Scalar(ScalarKind::I64), RustType::Named("ItemInstanceComponent".into())),
        );
        let generic = ty.substitute(&RustType::Scalar(ScalarKind::I64), &RustType::Param);
        assert!(generic.has_param_key());
        assert!(!ty.has_param_key());
        assert_eq!(generic.dependencies(), vec!["ComponentResponse", "ItemInstanceComponent"]);
    }
}
