//! IDL document model
//!
//! One [`Document`] per parsed IDL file. Records ([`StructLike`]) keep their
//! declaration order, and fields keep their position within the record.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One parsed IDL file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Path of the IDL source file, as given to the parser
    pub filename: String,
    /// Declared namespace per target language (e.g. `"go" -> "example.user"`)
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
    /// Filenames of the documents this one depends upon, in declaration order
    #[serde(default)]
    pub includes: Vec<String>,
    /// Type aliases declared in this document
    #[serde(default)]
    pub typedefs: Vec<Typedef>,
    /// Record-like declarations (structs, unions, exceptions) in declaration order
    #[serde(default)]
    pub structs: Vec<StructLike>,
}

/// A named aggregate type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructLike {
    /// Kind of record
    #[serde(default)]
    pub category: StructCategory,
    /// Record name as declared
    pub name: String,
    /// Fields in declaration order
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Record kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StructCategory {
    /// Plain struct
    #[default]
    Struct,
    /// Tagged union; at most one field set at a time
    Union,
    /// Exception type
    Exception,
}

/// A record field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    /// Wire identifier
    pub id: i32,
    /// Field name as declared
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Requiredness as declared
    #[serde(default)]
    pub requiredness: Requiredness,
}

/// Field requiredness
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Requiredness {
    /// No explicit qualifier
    #[default]
    Default,
    /// `required`
    Required,
    /// `optional`
    Optional,
}

/// A declared type reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldType {
    /// Type name as written, fully qualified for cross-document references (e.g. `"base.Base"`)
    pub name: String,
    /// Type category
    pub category: TypeCategory,
    /// Key type (maps only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<Box<FieldType>>,
    /// Element type (lists, sets) or value type (maps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<Box<FieldType>>,
    /// Declaration this name resolves to (structs, unions, exceptions, enums, typedefs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<TypeReference>,
}

/// Resolved target of a named type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeReference {
    /// Filename of the declaring document
    pub document: String,
    /// Unqualified name of the declaration
    pub name: String,
}

/// Type categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    /// `bool`
    Bool,
    /// `byte` / `i8`
    Byte,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `double`
    Double,
    /// `string`
    String,
    /// `binary`
    Binary,
    /// `map<K, V>`
    Map,
    /// `set<T>`
    Set,
    /// `list<T>`
    List,
    /// Enum declaration
    Enum,
    /// Struct declaration
    Struct,
    /// Union declaration
    Union,
    /// Exception declaration
    Exception,
    /// Type alias
    Typedef,
}

/// A type alias declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Typedef {
    /// Alias name
    pub alias: String,
    /// Aliased type
    #[serde(rename = "type")]
    pub target: FieldType,
}

impl TypeCategory {
    /// Scalar type identifier as used by the generator helpers (`"I64"`, `"Binary"`, ...).
    ///
    /// Returns `None` for containers and named declarations.
    pub fn type_id(self) -> Option<&'static str> {
        match self {
            TypeCategory::Bool => Some("Bool"),
            TypeCategory::Byte => Some("Byte"),
            TypeCategory::I16 => Some("I16"),
            TypeCategory::I32 => Some("I32"),
            TypeCategory::I64 => Some("I64"),
            TypeCategory::Double => Some("Double"),
            TypeCategory::String => Some("String"),
            TypeCategory::Binary => Some("Binary"),
            _ => None,
        }
    }

    /// Whether this names a struct, union or exception declaration.
    pub fn is_struct_like(self) -> bool {
        matches!(self, TypeCategory::Struct | TypeCategory::Union | TypeCategory::Exception)
    }
}

impl FieldType {
    /// Build a scalar type; the name is the lower-case IDL keyword.
    pub fn scalar(category: TypeCategory) -> Self {
        let name = category.type_id().map(str::to_lowercase).unwrap_or_default();
        Self { name, category, key_type: None, value_type: None, reference: None }
    }

    /// Build a named type resolved to `document`.
    pub fn named(name: &str, category: TypeCategory, document: &str) -> Self {
        let local = name.rsplit('.').next().unwrap_or(name);
        Self {
            name: name.to_string(),
            category,
            key_type: None,
            value_type: None,
            reference: Some(TypeReference {
                document: document.to_string(),
                name: local.to_string(),
            }),
        }
    }

    /// Build a `list<T>` or `set<T>`.
    pub fn sequence(category: TypeCategory, element: FieldType) -> Self {
        let keyword = if category == TypeCategory::Set { "set" } else { "list" };
        Self {
            name: keyword.to_string(),
            category,
            key_type: None,
            value_type: Some(Box::new(element)),
            reference: None,
        }
    }

    /// Build a `map<K, V>`.
    pub fn map(key: FieldType, value: FieldType) -> Self {
        Self {
            name: "map".to_string(),
            category: TypeCategory::Map,
            key_type: Some(Box::new(key)),
            value_type: Some(Box::new(value)),
            reference: None,
        }
    }
}

impl Document {
    /// Create an empty document for `filename`.
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            namespaces: BTreeMap::new(),
            includes: Vec::new(),
            typedefs: Vec::new(),
            structs: Vec::new(),
        }
    }

    /// Namespace declared for `language`, if any.
    pub fn namespace(&self, language: &str) -> Option<&str> {
        self.namespaces.get(language).map(String::as_str)
    }

    /// Name other documents use to refer to this one: the file stem.
    ///
    /// `idl/base.thrift` is referenced as `base`.
    pub fn reference_name(&self) -> &str {
        Path::new(&self.filename).file_stem().and_then(|s| s.to_str()).unwrap_or(&self.filename)
    }

    /// Declared namespace for `language`, falling back to the reference name.
    pub fn namespace_or_reference_name(&self, language: &str) -> &str {
        self.namespace(language).unwrap_or_else(|| self.reference_name())
    }

    /// All record-like declarations in declaration order.
    pub fn struct_like(&self) -> &[StructLike] { &self.structs }

    /// Look up a record by unqualified name.
    pub fn find_struct(&self, name: &str) -> Option<&StructLike> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// Look up a typedef by alias.
    pub fn find_typedef(&self, alias: &str) -> Option<&Typedef> {
        self.typedefs.iter().find(|t| t.alias == alias)
    }
}

impl StructLike {
    /// Create a struct with the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self { category: StructCategory::Struct, name: name.into(), fields }
    }
}

impl Field {
    /// Create a field with default requiredness.
    pub fn new(id: i32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self { id, name: name.into(), field_type, requiredness: Requiredness::Default }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_name_strips_directory_and_extension() {
        let doc = Document::new("idl/common/base.thrift");
        assert_eq!(doc.reference_name(), "base");
        assert_eq!(doc.namespace_or_reference_name("go"), "base");

        let mut doc = Document::new("user.thrift");
        doc.namespaces.insert("go".into(), "example.user".into());
        assert_eq!(doc.namespace_or_reference_name("go"), "example.user");
        assert_eq!(doc.namespace_or_reference_name("java"), "user");
    }

    #[test]
    fn test_named_type_keeps_qualified_name() {
        let ty = FieldType::named("base.Base", TypeCategory::Struct, "base.thrift");
        assert_eq!(ty.name, "base.Base");
        let reference = ty.reference.expect("named types carry a reference");
        assert_eq!(reference.name, "Base");
        assert_eq!(reference.document, "base.thrift");
    }

    #[test]
    fn test_type_ids() {
        assert_eq!(TypeCategory::I64.type_id(), Some("I64"));
        assert_eq!(TypeCategory::Binary.type_id(), Some("Binary"));
        assert_eq!(TypeCategory::List.type_id(), None);
        assert_eq!(FieldType::scalar(TypeCategory::Double).name, "double");
    }
}
