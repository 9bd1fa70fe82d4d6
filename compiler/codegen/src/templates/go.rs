// codegen/src/templates/go.rs

//! Built-in Go templates.
//!
//! - `file`: header, package clause, `imports`, the protection block, then
//!   `struct` for every record (fast API only) and `envelope`
//! - `imports`: fixed runtime imports, the filtered set, then the include
//!   packages the body qualifies types with
//! - `struct`: fast codec methods of the record in focus
//! - `envelope`: `GetOrSetBase` / `GetOrSetBaseResp` accessors

use std::collections::{BTreeMap, BTreeSet};

use semantics::{EnvelopeHit, EnvelopeRole};
use tracing::trace;

use super::codec::{FieldLayout, GoWriter};
use super::{RenderContext, TemplateEngine};
use crate::helpers::TemplateHelpers;
use crate::utils::go_identifier;
use crate::{CodegenError, Result};

type TemplateFn = fn(&GoTemplates, &RenderContext<'_>, &mut String) -> Result<()>;

/// Imports every generated file carries, referenced by the protection block.
const FIXED_IMPORTS: &[(&str, &str)] = &[
    ("bytes", ""),
    ("fmt", ""),
    ("reflect", ""),
    ("strings", ""),
    ("github.com/apache/thrift/lib/go/thrift", "thrift"),
    ("github.com/cloudwego/kitex/pkg/protocol/bthrift", ""),
];

/// Uses of the fixed imports inside the protection block.
const FIXED_IMPORT_USES: &[&str] = &[
    "fmt.Formatter(nil)",
    "(*bytes.Buffer)(nil)",
    "(*strings.Builder)(nil)",
    "reflect.Type(nil)",
    "thrift.TProtocol(nil)",
    "bthrift.BinaryWriter(nil)",
];

/// The built-in Go template set.
pub struct GoTemplates {
    templates: BTreeMap<&'static str, TemplateFn>,
}

impl Default for GoTemplates {
    fn default() -> Self { Self::new() }
}

impl GoTemplates {
    /// Register the built-in templates.
    pub fn new() -> Self {
        let mut templates: BTreeMap<&'static str, TemplateFn> = BTreeMap::new();
        templates.insert("file", render_file);
        templates.insert("imports", render_imports);
        templates.insert("struct", render_struct);
        templates.insert("envelope", render_envelope);
        Self { templates }
    }

    /// Names of the registered templates, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.templates.keys().copied()
    }
}

impl TemplateEngine for GoTemplates {
    fn render(&self, name: &str, ctx: &RenderContext<'_>, out: &mut String) -> Result<()> {
        let template =
            self.templates.get(name).ok_or_else(|| CodegenError::UnknownTemplate(name.into()))?;
        trace!(template = name, document = %ctx.data.document.filename, "rendering");
        template(self, ctx, out)
    }
}

fn render_file(engine: &GoTemplates, ctx: &RenderContext<'_>, out: &mut String) -> Result<()> {
    let data = ctx.data;
    {
        let mut w = GoWriter::new(out);
        w.line(format_args!(
            "// Code generated by stubgen {}. DO NOT EDIT.",
            ctx.helpers.version()
        ))?;
        w.line("")?;
        w.line(format_args!("package {}", data.pkg_name))?;
        w.line("")?;
    }
    engine.render("imports", ctx, out)?;

    {
        let mut w = GoWriter::new(out);
        w.line("")?;
        w.line("// unused protection")?;
        w.open("var (")?;
        for usage in FIXED_IMPORT_USES {
            w.line(format_args!("_ = {}", usage))?;
        }
        let mut packages: BTreeSet<String> =
            ctx.helpers.to_package_names(&data.imports).into_iter().collect();
        packages.extend(ctx.helpers.packages().imports().into_iter().map(|p| p.name.clone()));
        for pkg in packages {
            w.line(format_args!("_ = {}", data.protection.reference(&pkg)))?;
        }
        w.close(")")?;
    }

    if ctx.helpers.generate_fast_apis() {
        for record in &data.document.structs {
            out.push('\n');
            engine.render("struct", &ctx.with_record(record), out)?;
        }
    }
    engine.render("envelope", ctx, out)
}

fn import_line(path: &str, alias: &str) -> String {
    if alias.is_empty() {
        format!("{:?}", path)
    } else {
        format!("{} {:?}", alias, path)
    }
}

fn render_imports(_: &GoTemplates, ctx: &RenderContext<'_>, out: &mut String) -> Result<()> {
    let mut w = GoWriter::new(out);
    w.open("import (")?;
    for &(path, alias) in FIXED_IMPORTS {
        w.line(import_line(path, alias))?;
    }
    if !ctx.data.imports.is_empty() {
        w.line("")?;
        for (path, alias) in &ctx.data.imports {
            w.line(import_line(path, alias))?;
        }
    }
    let includes: Vec<_> = ctx
        .helpers
        .packages()
        .imports()
        .into_iter()
        .filter(|pkg| !ctx.data.imports.contains_key(&pkg.path))
        .collect();
    if !includes.is_empty() {
        w.line("")?;
        for pkg in includes {
            w.line(import_line(&pkg.path, pkg.alias()))?;
        }
    }
    w.close(")")
}

/// `if err != nil { return offset, <annotated err> }`
fn read_error(w: &mut GoWriter<'_>, what: &str, extra_arg: &str) -> Result<()> {
    let args = if extra_arg.is_empty() { "p".to_string() } else { format!("p, {}", extra_arg) };
    w.open("if err != nil {")?;
    w.line(format_args!(
        "return offset, thrift.PrependError(fmt.Sprintf(\"%T {}: \", {}), err)",
        what, args
    ))?;
    w.close("}")
}

fn render_struct(_: &GoTemplates, ctx: &RenderContext<'_>, out: &mut String) -> Result<()> {
    let record = ctx.record.ok_or_else(|| CodegenError::MissingData {
        template: "struct".into(),
        what: "record in focus".into(),
    })?;
    let helpers = &ctx.helpers;
    let name = go_identifier(&record.name);
    let fields = helpers
        .reorder_struct_fields(&record.fields)?
        .into_iter()
        .map(|field| FieldLayout::new(field, helpers))
        .collect::<Result<Vec<_>>>()?;

    let mut w = GoWriter::new(out);

    // FastRead
    w.open(format_args!("func (p *{}) FastRead(buf []byte) (int, error) {{", name))?;
    w.line("var err error")?;
    w.line("var offset int")?;
    w.line("var l int")?;
    w.line("var fieldTypeId thrift.TType")?;
    w.line("var fieldId int16")?;
    w.line("_, l, err = bthrift.Binary.ReadStructBegin(buf)")?;
    w.line("offset += l")?;
    read_error(&mut w, "read struct begin error", "")?;
    w.line("")?;
    w.open("for {")?;
    w.line("_, fieldTypeId, fieldId, l, err = bthrift.Binary.ReadFieldBegin(buf[offset:])")?;
    w.line("offset += l")?;
    read_error(&mut w, "read field begin error", "")?;
    w.open("if fieldTypeId == thrift.STOP {")?;
    w.line("break")?;
    w.close("}")?;
    w.line("switch fieldId {")?;
    for layout in &fields {
        w.open(format_args!("case {}:", layout.field.id))?;
        w.open(format_args!("if fieldTypeId == {} {{", layout.wire_type))?;
        w.line(format_args!("l, err = p.FastReadField{}(buf[offset:])", layout.field.id))?;
        w.reopen("} else {")?;
        w.line("l, err = bthrift.Binary.Skip(buf[offset:], fieldTypeId)")?;
        w.close("}")?;
        w.dedent();
    }
    w.open("default:")?;
    w.line("l, err = bthrift.Binary.Skip(buf[offset:], fieldTypeId)")?;
    w.dedent();
    w.line("}")?;
    w.line("offset += l")?;
    read_error(&mut w, "read field %d error", "fieldId")?;
    w.line("l, err = bthrift.Binary.ReadFieldEnd(buf[offset:])")?;
    w.line("offset += l")?;
    read_error(&mut w, "read field end error", "")?;
    w.close("}")?;
    w.line("l, err = bthrift.Binary.ReadStructEnd(buf[offset:])")?;
    w.line("offset += l")?;
    read_error(&mut w, "read struct end error", "")?;
    w.line("return offset, nil")?;
    w.close("}")?;

    for layout in &fields {
        w.line("")?;
        layout.emit_read(&mut w, &name, helpers)?;
    }

    // FastWrite / FastWriteNocopy / BLength, fixed-width fields first
    w.line("")?;
    w.open(format_args!("func (p *{}) FastWrite(buf []byte) int {{", name))?;
    w.line("return p.FastWriteNocopy(buf, nil)")?;
    w.close("}")?;
    w.line("")?;
    w.open(format_args!(
        "func (p *{}) FastWriteNocopy(buf []byte, binaryWriter bthrift.BinaryWriter) int {{",
        name
    ))?;
    w.line("offset := 0")?;
    w.line(format_args!(
        "offset += bthrift.Binary.WriteStructBegin(buf[offset:], {:?})",
        record.name
    ))?;
    w.open("if p != nil {")?;
    for layout in &fields {
        w.line(format_args!(
            "offset += p.fastWriteField{}(buf[offset:], binaryWriter)",
            layout.field.id
        ))?;
    }
    w.close("}")?;
    w.line("offset += bthrift.Binary.WriteFieldStop(buf[offset:])")?;
    w.line("offset += bthrift.Binary.WriteStructEnd(buf[offset:])")?;
    w.line("return offset")?;
    w.close("}")?;
    w.line("")?;
    w.open(format_args!("func (p *{}) BLength() int {{", name))?;
    w.line("l := 0")?;
    w.line(format_args!("l += bthrift.Binary.StructBeginLength({:?})", record.name))?;
    w.open("if p != nil {")?;
    for layout in &fields {
        w.line(format_args!("l += p.field{}Length()", layout.field.id))?;
    }
    w.close("}")?;
    w.line("l += bthrift.Binary.FieldStopLength()")?;
    w.line("l += bthrift.Binary.StructEndLength()")?;
    w.line("return l")?;
    w.close("}")?;

    for layout in &fields {
        w.line("")?;
        layout.emit_write(&mut w, &name, helpers)?;
    }
    for layout in &fields {
        w.line("")?;
        layout.emit_length(&mut w, &name, helpers)?;
    }
    Ok(())
}

fn envelope_accessor(
    w: &mut GoWriter<'_>,
    hit: &EnvelopeHit<'_>,
    role: EnvelopeRole,
    helpers: &TemplateHelpers<'_>,
) -> Result<()> {
    let method = match role {
        EnvelopeRole::Request => "GetOrSetBase",
        EnvelopeRole::Response => "GetOrSetBaseResp",
    };
    let member = go_identifier(&hit.field.name);
    w.line("")?;
    w.open(format_args!(
        "func (p *{}) {}() interface{{}} {{",
        go_identifier(&hit.record.name),
        method
    ))?;
    w.open(format_args!("if p.{} == nil {{", member))?;
    let constructor = helpers.go_constructor(&hit.field.field_type)?;
    w.line(format_args!("p.{} = {}()", member, constructor))?;
    w.close("}")?;
    w.line(format_args!("return p.{}", member))?;
    w.close("}")
}

fn render_envelope(_: &GoTemplates, ctx: &RenderContext<'_>, out: &mut String) -> Result<()> {
    let found = ctx.helpers.filter_base(ctx.data.document);
    let mut w = GoWriter::new(out);
    for hit in &found.requests {
        envelope_accessor(&mut w, hit, EnvelopeRole::Request, &ctx.helpers)?;
    }
    for hit in &found.responses {
        envelope_accessor(&mut w, hit, EnvelopeRole::Response, &ctx.helpers)?;
    }
    Ok(())
}
