//! Type predicates over the parsed IR.
//!
//! The generator never inspects type structure itself; it asks a
//! [`TypeOracle`]. [`StructuralOracle`] answers from a [`DocumentTree`]
//! whose named types were resolved by the parser.

use ir::{DocumentTree, FieldType, TypeCategory, TypeReference};

use crate::{Result, SemanticError};

/// Questions the generator asks about declared types.
pub trait TypeOracle {
    /// Whether the encoded length of `ty` is known statically.
    fn is_fixed_length(&self, ty: &FieldType) -> Result<bool>;

    /// Whether `ty` is (an alias of) `binary`.
    fn is_binary(&self, ty: &FieldType) -> Result<bool>;

    /// Whether `ty` is (an alias of) `string`.
    fn is_string(&self, ty: &FieldType) -> Result<bool>;

    /// Normalized, unexported spelling of a field name.
    fn unexport(&self, name: &str) -> String { unexport(name) }

    /// The non-alias type `ty` stands for. Oracles without alias
    /// information return `ty` unchanged.
    fn resolve_alias(&self, ty: &FieldType) -> Result<FieldType> { Ok(ty.clone()) }

    /// Whether `ty` is a binary or string scalar. Binary is checked first.
    fn is_binary_or_string(&self, ty: &FieldType) -> Result<bool> {
        if self.is_binary(ty)? {
            return Ok(true);
        }
        self.is_string(ty)
    }
}

/// Lower-camel-case form of an IDL identifier.
///
/// Underscore-separated words are joined camel-case and the first letter is
/// lowered: `Base -> base`, `BaseResp -> baseResp`, `base_resp -> baseResp`.
pub fn unexport(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in name.split('_').filter(|w| !w.is_empty()).enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

/// [`TypeOracle`] answering from the structure of a [`DocumentTree`].
///
/// Scalars and enums are fixed-length; strings, binaries, containers and
/// unions are not; typedefs follow their target; structs and exceptions are
/// fixed-length when every field is.
#[derive(Debug, Clone, Copy)]
pub struct StructuralOracle<'a> {
    tree: &'a DocumentTree,
}

impl<'a> StructuralOracle<'a> {
    /// Create an oracle over `tree`
    pub fn new(tree: &'a DocumentTree) -> Self { Self { tree } }

    fn reference<'t>(&self, ty: &'t FieldType) -> Result<&'t TypeReference> {
        ty.reference.as_ref().ok_or_else(|| SemanticError::UnresolvedType(ty.name.clone()))
    }

    /// Follow typedefs until a non-alias type is reached.
    fn resolve<'t>(&self, ty: &'t FieldType) -> Result<&'t FieldType>
    where
        'a: 't,
    {
        let mut current = ty;
        let mut seen: Vec<&TypeReference> = Vec::new();
        while current.category == TypeCategory::Typedef {
            let reference = self.reference(current)?;
            if seen.contains(&reference) {
                return Err(SemanticError::CyclicType(ty.name.clone()));
            }
            seen.push(reference);
            current = self
                .tree
                .get(&reference.document)
                .and_then(|doc| doc.find_typedef(&reference.name))
                .map(|td| &td.target)
                .ok_or_else(|| SemanticError::UnresolvedType(current.name.clone()))?;
        }
        Ok(current)
    }

    fn fixed_length(&self, ty: &FieldType, stack: &mut Vec<TypeReference>) -> Result<bool> {
        let ty = self.resolve(ty)?;
        match ty.category {
            TypeCategory::Bool
            | TypeCategory::Byte
            | TypeCategory::I16
            | TypeCategory::I32
            | TypeCategory::I64
            | TypeCategory::Double
            | TypeCategory::Enum => Ok(true),
            TypeCategory::String
            | TypeCategory::Binary
            | TypeCategory::Map
            | TypeCategory::Set
            | TypeCategory::List
            | TypeCategory::Union => Ok(false),
            TypeCategory::Struct | TypeCategory::Exception => {
                let reference = self.reference(ty)?;
                if stack.contains(reference) {
                    return Err(SemanticError::CyclicType(ty.name.clone()));
                }
                let record = self
                    .tree
                    .get(&reference.document)
                    .and_then(|doc| doc.find_struct(&reference.name))
                    .ok_or_else(|| SemanticError::UnresolvedType(ty.name.clone()))?;

                stack.push(reference.clone());
                let mut all_fixed = true;
                for field in &record.fields {
                    if !self.fixed_length(&field.field_type, stack)? {
                        all_fixed = false;
                        break;
                    }
                }
                stack.pop();
                Ok(all_fixed)
            }
            // resolve() never returns an alias
            TypeCategory::Typedef => Err(SemanticError::UnresolvedType(ty.name.clone())),
        }
    }
}

impl TypeOracle for StructuralOracle<'_> {
    fn is_fixed_length(&self, ty: &FieldType) -> Result<bool> {
        self.fixed_length(ty, &mut Vec::new())
    }

    fn is_binary(&self, ty: &FieldType) -> Result<bool> {
        Ok(self.resolve(ty)?.category == TypeCategory::Binary)
    }

    fn is_string(&self, ty: &FieldType) -> Result<bool> {
        Ok(self.resolve(ty)?.category == TypeCategory::String)
    }

    fn resolve_alias(&self, ty: &FieldType) -> Result<FieldType> { self.resolve(ty).cloned() }
}

#[cfg(test)]
mod tests {
    use ir::{Document, Field, StructLike, Typedef};

    use super::*;

    fn create_test_tree() -> DocumentTree {
        let mut doc = Document::new("t.thrift");
        doc.typedefs.push(Typedef {
            alias: "UserID".into(),
            target: FieldType::scalar(TypeCategory::I64),
        });
        doc.typedefs.push(Typedef {
            alias: "Blob".into(),
            target: FieldType::scalar(TypeCategory::Binary),
        });
        doc.structs.push(StructLike::new(
            "Point",
            vec![
                Field::new(1, "x", FieldType::scalar(TypeCategory::I32)),
                Field::new(2, "y", FieldType::named("UserID", TypeCategory::Typedef, "t.thrift")),
            ],
        ));
        doc.structs.push(StructLike::new(
            "Named",
            vec![
                Field::new(1, "p", FieldType::named("Point", TypeCategory::Struct, "t.thrift")),
                Field::new(2, "label", FieldType::scalar(TypeCategory::String)),
            ],
        ));
        doc.structs.push(StructLike::new(
            "Loop",
            vec![Field::new(1, "next", FieldType::named("Loop", TypeCategory::Struct, "t.thrift"))],
        ));
        DocumentTree::with_root("t.thrift", vec![doc]).expect("tree should build")
    }

    #[test]
    fn test_unexport() {
        assert_eq!(unexport("Base"), "base");
        assert_eq!(unexport("BaseResp"), "baseResp");
        assert_eq!(unexport("base_resp"), "baseResp");
        assert_eq!(unexport("base"), "base");
        assert_eq!(unexport("_base"), "base");
        assert_eq!(unexport(""), "");
    }

    #[test]
    fn test_fixed_length_structural_rules() {
        let tree = create_test_tree();
        let oracle = StructuralOracle::new(&tree);

        let fixed = |ty: FieldType| oracle.is_fixed_length(&ty).expect("classification");
        assert!(fixed(FieldType::scalar(TypeCategory::Bool)));
        assert!(fixed(FieldType::scalar(TypeCategory::Double)));
        assert!(!fixed(FieldType::scalar(TypeCategory::String)));
        assert!(!fixed(FieldType::sequence(
            TypeCategory::List,
            FieldType::scalar(TypeCategory::I32)
        )));
        assert!(fixed(FieldType::named("UserID", TypeCategory::Typedef, "t.thrift")));
        assert!(fixed(FieldType::named("Point", TypeCategory::Struct, "t.thrift")));
        assert!(!fixed(FieldType::named("Named", TypeCategory::Struct, "t.thrift")));
    }

    #[test]
    fn test_cycle_and_unresolved_are_errors() {
        let tree = create_test_tree();
        let oracle = StructuralOracle::new(&tree);

        let result =
            oracle.is_fixed_length(&FieldType::named("Loop", TypeCategory::Struct, "t.thrift"));
        assert!(matches!(result, Err(SemanticError::CyclicType(_))), "got {:?}", result);

        let result =
            oracle.is_fixed_length(&FieldType::named("Ghost", TypeCategory::Struct, "t.thrift"));
        assert!(matches!(result, Err(SemanticError::UnresolvedType(_))), "got {:?}", result);

        let mut unresolved = FieldType::scalar(TypeCategory::Struct);
        unresolved.name = "Orphan".into();
        assert!(oracle.is_fixed_length(&unresolved).is_err());
    }

    #[test]
    fn test_binary_or_string_follows_typedefs() {
        let tree = create_test_tree();
        let oracle = StructuralOracle::new(&tree);

        let blob = FieldType::named("Blob", TypeCategory::Typedef, "t.thrift");
        assert!(oracle.is_binary(&blob).expect("classification"));
        assert!(oracle.is_binary_or_string(&blob).expect("classification"));
        let target = oracle.resolve_alias(&blob).expect("alias should resolve");
        assert_eq!(target.category, TypeCategory::Binary);
        assert!(oracle
            .is_binary_or_string(&FieldType::scalar(TypeCategory::String))
            .expect("classification"));
        assert!(!oracle
            .is_binary_or_string(&FieldType::scalar(TypeCategory::I64))
            .expect("classification"));
    }
}
