// codegen/src/templates/codec.rs

//! Fast codec emitters for single values and fields.
//!
//! Every emitter resolves typedefs through the helpers first, so alias
//! chains encode exactly like their target. Nested containers use the
//! nesting depth to keep loop variables distinct.

use std::fmt::{Display, Write as _};

use ir::{Field, FieldType, Requiredness, TypeCategory};
use semantics::SemanticError;

use crate::helpers::{type_id_to_go_type, TemplateHelpers};
use crate::utils::{go_identifier, thrift_ttype};
use crate::Result;

/// Tab-indented line writer.
pub(super) struct GoWriter<'o> {
    out: &'o mut String,
    depth: usize,
}

impl<'o> GoWriter<'o> {
    pub(super) fn new(out: &'o mut String) -> Self { Self { out, depth: 0 } }

    pub(super) fn line(&mut self, text: impl Display) -> Result<()> {
        if text.to_string().is_empty() {
            self.out.push('\n');
            return Ok(());
        }
        for _ in 0..self.depth {
            self.out.push('\t');
        }
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    /// Write `text` and indent what follows.
    pub(super) fn open(&mut self, text: impl Display) -> Result<()> {
        self.line(text)?;
        self.depth += 1;
        Ok(())
    }

    /// Dedent and write `text`.
    pub(super) fn close(&mut self, text: impl Display) -> Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }

    pub(super) fn dedent(&mut self) { self.depth = self.depth.saturating_sub(1); }

    /// Dedent, write `text` (e.g. `} else {`) and indent again.
    pub(super) fn reopen(&mut self, text: impl Display) -> Result<()> {
        self.close(text)?;
        self.depth += 1;
        Ok(())
    }

    fn read_step(&mut self, call: impl Display) -> Result<()> {
        self.open(format_args!("if l, err := {}; err != nil {{", call))?;
        self.line("return offset, err")?;
        self.reopen("} else {")?;
        self.line("offset += l")?;
        self.close("}")
    }
}

fn element(ty: &FieldType) -> Result<&FieldType> {
    ty.value_type.as_deref().ok_or_else(|| {
        SemanticError::MalformedType(ty.name.clone(), "missing element type".into()).into()
    })
}

fn key(ty: &FieldType) -> Result<&FieldType> {
    ty.key_type.as_deref().ok_or_else(|| {
        SemanticError::MalformedType(ty.name.clone(), "missing key type".into()).into()
    })
}

fn unresolved(ty: &FieldType) -> crate::CodegenError {
    SemanticError::UnresolvedType(ty.name.clone()).into()
}

fn scalar_id(category: TypeCategory) -> Option<&'static str> {
    category.type_id()
}

/// Go type expression of a declared type.
pub(super) fn go_type(ty: &FieldType, helpers: &TemplateHelpers<'_>) -> Result<String> {
    if let Some(id) = scalar_id(ty.category) {
        return Ok(type_id_to_go_type(id).to_string());
    }
    let go = match ty.category {
        TypeCategory::Enum => helpers.go_type_name(ty)?,
        TypeCategory::Struct | TypeCategory::Union | TypeCategory::Exception => {
            format!("*{}", helpers.go_type_name(ty)?)
        }
        TypeCategory::List | TypeCategory::Set => format!("[]{}", go_type(element(ty)?, helpers)?),
        TypeCategory::Map => {
            format!("map[{}]{}", go_type(key(ty)?, helpers)?, go_type(element(ty)?, helpers)?)
        }
        TypeCategory::Typedef => {
            if helpers.resolve_alias(ty)?.category.is_struct_like() {
                format!("*{}", helpers.go_type_name(ty)?)
            } else {
                helpers.go_type_name(ty)?
            }
        }
        _ => return Err(unresolved(ty)),
    };
    Ok(go)
}

/// `thrift.<TTYPE>` constant for `ty`, aliases resolved.
pub(super) fn wire_type(ty: &FieldType, helpers: &TemplateHelpers<'_>) -> Result<String> {
    let resolved = helpers.resolve_alias(ty)?;
    let ttype = thrift_ttype(resolved.category).ok_or_else(|| unresolved(ty))?;
    Ok(format!("thrift.{}", ttype))
}

/// Declare `var` and decode one value of type `ty` into it.
pub(super) fn read_value(
    w: &mut GoWriter<'_>,
    ty: &FieldType,
    var: &str,
    depth: usize,
    helpers: &TemplateHelpers<'_>,
) -> Result<()> {
    let resolved = helpers.resolve_alias(ty)?;
    let go = go_type(ty, helpers)?;

    if let Some(id) = scalar_id(resolved.category) {
        w.line(format_args!("var {} {}", var, go))?;
        w.open(format_args!(
            "if v, l, err := bthrift.Binary.Read{}(buf[offset:]); err != nil {{",
            id
        ))?;
        w.line("return offset, err")?;
        w.reopen("} else {")?;
        w.line("offset += l")?;
        w.line(format_args!("{} = {}(v)", var, go))?;
        return w.close("}");
    }

    match resolved.category {
        TypeCategory::Enum => {
            w.line(format_args!("var {} {}", var, go))?;
            w.open("if v, l, err := bthrift.Binary.ReadI32(buf[offset:]); err != nil {")?;
            w.line("return offset, err")?;
            w.reopen("} else {")?;
            w.line("offset += l")?;
            w.line(format_args!("{} = {}(v)", var, go))?;
            w.close("}")
        }
        TypeCategory::Struct | TypeCategory::Union | TypeCategory::Exception => {
            // typedefs of records carry their own constructor
            w.line(format_args!("{} := {}()", var, helpers.go_constructor(ty)?))?;
            w.read_step(format_args!("{}.FastRead(buf[offset:])", var))
        }
        TypeCategory::List | TypeCategory::Set => {
            let kind = if resolved.category == TypeCategory::List { "List" } else { "Set" };
            let elem_var = format!("_elem{}", depth);
            w.line(format_args!("var {} {}", var, go))?;
            w.open("{")?;
            w.line(format_args!(
                "_, size, l, err := bthrift.Binary.Read{}Begin(buf[offset:])",
                kind
            ))?;
            w.line("offset += l")?;
            w.open("if err != nil {")?;
            w.line("return offset, err")?;
            w.close("}")?;
            w.line(format_args!("{} = make({}, 0, size)", var, go))?;
            w.open("for i := 0; i < size; i++ {")?;
            read_value(w, element(&resolved)?, &elem_var, depth + 1, helpers)?;
            w.line(format_args!("{var} = append({var}, {elem})", var = var, elem = elem_var))?;
            w.close("}")?;
            w.read_step(format_args!("bthrift.Binary.Read{}End(buf[offset:])", kind))?;
            w.close("}")
        }
        TypeCategory::Map => {
            let key_var = format!("_key{}", depth);
            let val_var = format!("_val{}", depth);
            w.line(format_args!("var {} {}", var, go))?;
            w.open("{")?;
            w.line("_, _, size, l, err := bthrift.Binary.ReadMapBegin(buf[offset:])")?;
            w.line("offset += l")?;
            w.open("if err != nil {")?;
            w.line("return offset, err")?;
            w.close("}")?;
            w.line(format_args!("{} = make({}, size)", var, go))?;
            w.open("for i := 0; i < size; i++ {")?;
            read_value(w, key(&resolved)?, &key_var, depth + 1, helpers)?;
            read_value(w, element(&resolved)?, &val_var, depth + 1, helpers)?;
            w.line(format_args!("{}[{}] = {}", var, key_var, val_var))?;
            w.close("}")?;
            w.read_step("bthrift.Binary.ReadMapEnd(buf[offset:])")?;
            w.close("}")
        }
        _ => Err(unresolved(ty)),
    }
}

/// Encode `expr` of type `ty` at `buf[offset:]`.
pub(super) fn write_value(
    w: &mut GoWriter<'_>,
    ty: &FieldType,
    expr: &str,
    depth: usize,
    helpers: &TemplateHelpers<'_>,
) -> Result<()> {
    let resolved = helpers.resolve_alias(ty)?;
    match resolved.category {
        TypeCategory::String => w.line(format_args!(
            "offset += bthrift.Binary.WriteStringNocopy(buf[offset:], binaryWriter, {})",
            expr
        )),
        TypeCategory::Binary => w.line(format_args!(
            "offset += bthrift.Binary.WriteBinaryNocopy(buf[offset:], binaryWriter, []byte({}))",
            expr
        )),
        TypeCategory::Enum => {
            w.line(format_args!("offset += bthrift.Binary.WriteI32(buf[offset:], int32({}))", expr))
        }
        TypeCategory::Struct | TypeCategory::Union | TypeCategory::Exception => w.line(
            format_args!("offset += {}.FastWriteNocopy(buf[offset:], binaryWriter)", expr),
        ),
        TypeCategory::List | TypeCategory::Set => {
            let kind = if resolved.category == TypeCategory::List { "List" } else { "Set" };
            let elem = element(&resolved)?;
            let v = format!("v{}", depth);
            w.line(format_args!(
                "offset += bthrift.Binary.Write{}Begin(buf[offset:], {}, len({}))",
                kind,
                wire_type(elem, helpers)?,
                expr
            ))?;
            w.open(format_args!("for _, {} := range {} {{", v, expr))?;
            write_value(w, elem, &v, depth + 1, helpers)?;
            w.close("}")?;
            w.line(format_args!("offset += bthrift.Binary.Write{}End(buf[offset:])", kind))
        }
        TypeCategory::Map => {
            let (k_ty, v_ty) = (key(&resolved)?, element(&resolved)?);
            let (k, v) = (format!("k{}", depth), format!("v{}", depth));
            w.line(format_args!(
                "offset += bthrift.Binary.WriteMapBegin(buf[offset:], {}, {}, len({}))",
                wire_type(k_ty, helpers)?,
                wire_type(v_ty, helpers)?,
                expr
            ))?;
            w.open(format_args!("for {}, {} := range {} {{", k, v, expr))?;
            write_value(w, k_ty, &k, depth + 1, helpers)?;
            write_value(w, v_ty, &v, depth + 1, helpers)?;
            w.close("}")?;
            w.line("offset += bthrift.Binary.WriteMapEnd(buf[offset:])")
        }
        category => match scalar_id(category) {
            Some(id) => w.line(format_args!(
                "offset += bthrift.Binary.Write{}(buf[offset:], {})",
                id, expr
            )),
            None => Err(unresolved(ty)),
        },
    }
}

/// Add the encoded length of `expr` to `l`.
pub(super) fn value_length(
    w: &mut GoWriter<'_>,
    ty: &FieldType,
    expr: &str,
    depth: usize,
    helpers: &TemplateHelpers<'_>,
) -> Result<()> {
    let resolved = helpers.resolve_alias(ty)?;
    match resolved.category {
        TypeCategory::String => {
            w.line(format_args!("l += bthrift.Binary.StringLengthNocopy({})", expr))
        }
        TypeCategory::Binary => {
            w.line(format_args!("l += bthrift.Binary.BinaryLengthNocopy([]byte({}))", expr))
        }
        TypeCategory::Enum => {
            w.line(format_args!("l += bthrift.Binary.I32Length(int32({}))", expr))
        }
        TypeCategory::Struct | TypeCategory::Union | TypeCategory::Exception => {
            w.line(format_args!("l += {}.BLength()", expr))
        }
        TypeCategory::List | TypeCategory::Set => {
            let kind = if resolved.category == TypeCategory::List { "List" } else { "Set" };
            let elem = element(&resolved)?;
            let v = format!("v{}", depth);
            w.line(format_args!(
                "l += bthrift.Binary.{}BeginLength({}, len({}))",
                kind,
                wire_type(elem, helpers)?,
                expr
            ))?;
            w.open(format_args!("for _, {} := range {} {{", v, expr))?;
            value_length(w, elem, &v, depth + 1, helpers)?;
            w.close("}")?;
            w.line(format_args!("l += bthrift.Binary.{}EndLength()", kind))
        }
        TypeCategory::Map => {
            let (k_ty, v_ty) = (key(&resolved)?, element(&resolved)?);
            let (k, v) = (format!("k{}", depth), format!("v{}", depth));
            w.line(format_args!(
                "l += bthrift.Binary.MapBeginLength({}, {}, len({}))",
                wire_type(k_ty, helpers)?,
                wire_type(v_ty, helpers)?,
                expr
            ))?;
            w.open(format_args!("for {}, {} := range {} {{", k, v, expr))?;
            value_length(w, k_ty, &k, depth + 1, helpers)?;
            value_length(w, v_ty, &v, depth + 1, helpers)?;
            w.close("}")?;
            w.line("l += bthrift.Binary.MapEndLength()")
        }
        category => match scalar_id(category) {
            Some(id) => w.line(format_args!("l += bthrift.Binary.{}Length({})", id, expr)),
            None => Err(unresolved(ty)),
        },
    }
}

/// How a record field is laid out in the generated Go struct.
pub(super) struct FieldLayout<'f> {
    pub(super) field: &'f Field,
    /// Go struct member name
    pub(super) member: String,
    /// Optional scalars are stored behind a pointer
    pub(super) pointer: bool,
    /// `thrift.<TTYPE>` of the field
    pub(super) wire_type: String,
}

impl<'f> FieldLayout<'f> {
    pub(super) fn new(field: &'f Field, helpers: &TemplateHelpers<'_>) -> Result<Self> {
        let resolved = helpers.resolve_alias(&field.field_type)?;
        let pointer = field.requiredness == Requiredness::Optional
            && (matches!(resolved.category, TypeCategory::Enum)
                || (scalar_id(resolved.category).is_some()
                    && resolved.category != TypeCategory::Binary));
        Ok(Self {
            field,
            member: go_identifier(&field.name),
            pointer,
            wire_type: wire_type(&field.field_type, helpers)?,
        })
    }

    fn optional(&self) -> bool { self.field.requiredness == Requiredness::Optional }

    /// Expression reading the member's value.
    fn value_expr(&self) -> String {
        if self.pointer {
            format!("*p.{}", self.member)
        } else {
            format!("p.{}", self.member)
        }
    }

    /// `func (p *R) FastReadFieldN(buf []byte) (int, error)`
    pub(super) fn emit_read(
        &self,
        w: &mut GoWriter<'_>,
        record: &str,
        helpers: &TemplateHelpers<'_>,
    ) -> Result<()> {
        w.open(format_args!(
            "func (p *{}) FastReadField{}(buf []byte) (int, error) {{",
            record, self.field.id
        ))?;
        w.line("offset := 0")?;
        read_value(w, &self.field.field_type, "_field", 0, helpers)?;
        if self.pointer {
            w.line(format_args!("p.{} = &_field", self.member))?;
        } else {
            w.line(format_args!("p.{} = _field", self.member))?;
        }
        w.line("return offset, nil")?;
        w.close("}")
    }

    /// `func (p *R) fastWriteFieldN(buf []byte, binaryWriter bthrift.BinaryWriter) int`
    pub(super) fn emit_write(
        &self,
        w: &mut GoWriter<'_>,
        record: &str,
        helpers: &TemplateHelpers<'_>,
    ) -> Result<()> {
        w.open(format_args!(
            "func (p *{}) fastWriteField{}(buf []byte, binaryWriter bthrift.BinaryWriter) int {{",
            record, self.field.id
        ))?;
        w.line("offset := 0")?;
        if self.optional() {
            w.open(format_args!("if p.IsSet{}() {{", self.member))?;
        }
        w.line(format_args!(
            "offset += bthrift.Binary.WriteFieldBegin(buf[offset:], {:?}, {}, {})",
            self.field.name, self.wire_type, self.field.id
        ))?;
        write_value(w, &self.field.field_type, &self.value_expr(), 0, helpers)?;
        w.line("offset += bthrift.Binary.WriteFieldEnd(buf[offset:])")?;
        if self.optional() {
            w.close("}")?;
        }
        w.line("return offset")?;
        w.close("}")
    }

    /// `func (p *R) fieldNLength() int`
    pub(super) fn emit_length(
        &self,
        w: &mut GoWriter<'_>,
        record: &str,
        helpers: &TemplateHelpers<'_>,
    ) -> Result<()> {
        w.open(format_args!("func (p *{}) field{}Length() int {{", record, self.field.id))?;
        w.line("l := 0")?;
        if self.optional() {
            w.open(format_args!("if p.IsSet{}() {{", self.member))?;
        }
        w.line(format_args!(
            "l += bthrift.Binary.FieldBeginLength({:?}, {}, {})",
            self.field.name, self.wire_type, self.field.id
        ))?;
        value_length(w, &self.field.field_type, &self.value_expr(), 0, helpers)?;
        w.line("l += bthrift.Binary.FieldEndLength()")?;
        if self.optional() {
            w.close("}")?;
        }
        w.line("return l")?;
        w.close("}")
    }
}

#[cfg(test)]
mod tests {
    use semantics::StructuralOracle;

    use super::*;

    fn create_test_tree() -> ir::DocumentTree {
        let mut doc = ir::Document::new("t.thrift");
        doc.typedefs.push(ir::Typedef {
            alias: "Ids".into(),
            target: FieldType::sequence(TypeCategory::List, FieldType::scalar(TypeCategory::I64)),
        });
        ir::DocumentTree::with_root("t.thrift", vec![doc]).expect("tree should build")
    }

    #[test]
    fn test_go_type() {
        let tree = create_test_tree();
        let oracle = StructuralOracle::new(&tree);
        let helpers = TemplateHelpers::new(&oracle, true);

        let map = FieldType::map(
            FieldType::scalar(TypeCategory::String),
            FieldType::sequence(TypeCategory::Set, FieldType::scalar(TypeCategory::Binary)),
        );
        assert_eq!(go_type(&map, &helpers).expect("go type"), "map[string][][]byte");
        let base = FieldType::named("base.Base", TypeCategory::Struct, "base.thrift");
        assert_eq!(go_type(&base, &helpers).expect("go type"), "*base.Base");
        let ids = FieldType::named("Ids", TypeCategory::Typedef, "t.thrift");
        assert_eq!(go_type(&ids, &helpers).expect("go type"), "Ids");
        assert_eq!(wire_type(&ids, &helpers).expect("wire type"), "thrift.LIST");
    }

    #[test]
    fn test_nested_container_read_uses_distinct_variables() {
        let tree = create_test_tree();
        let oracle = StructuralOracle::new(&tree);
        let helpers = TemplateHelpers::new(&oracle, true);
        let ty = FieldType::sequence(
            TypeCategory::List,
            FieldType::sequence(TypeCategory::List, FieldType::scalar(TypeCategory::I32)),
        );

        let mut out = String::new();
        read_value(&mut GoWriter::new(&mut out), &ty, "_field", 0, &helpers).expect("render");
        assert!(out.contains("var _elem0 []int32"));
        assert!(out.contains("var _elem1 int32"));
        assert!(out.contains("_elem0 = append(_elem0, _elem1)"));
        assert!(out.contains("_field = append(_field, _elem0)"));
    }

    #[test]
    fn test_malformed_container_is_classification_error() {
        let tree = create_test_tree();
        let oracle = StructuralOracle::new(&tree);
        let helpers = TemplateHelpers::new(&oracle, true);
        let mut ty = FieldType::scalar(TypeCategory::List);
        ty.name = "list".into();

        let mut out = String::new();
        let result = write_value(&mut GoWriter::new(&mut out), &ty, "p.X", 0, &helpers);
        assert!(matches!(result, Err(crate::CodegenError::Classification(_))), "got {:?}", result);
    }
}
