// codegen/src/utils.rs

use ir::TypeCategory;

/// Capitalize the first letter of a string
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// golint initialisms, written in upper case wherever they form a whole word.
const INITIALISMS: &[&str] = &[
    "ACL", "API", "ASCII", "CPU", "CSS", "DNS", "EOF", "GUID", "HTML", "HTTP", "HTTPS", "ID", "IP",
    "JSON", "LHS", "QPS", "RAM", "RHS", "RPC", "SLA", "SMTP", "SQL", "SSH", "TCP", "TLS", "TTL",
    "UDP", "UI", "UID", "UUID", "URI", "URL", "UTF8", "VM", "XML", "XMPP", "XSRF", "XSS",
];

fn export_word(word: &str) -> String {
    let upper = word.to_uppercase();
    if INITIALISMS.contains(&upper.as_str()) {
        upper
    } else {
        capitalize(word)
    }
}

/// Exported Go identifier for an IDL name: snake_case words joined in PascalCase
///
/// # Examples
/// ```
/// use stubgen_codegen::utils::go_identifier;
/// assert_eq!(go_identifier("base_resp"), "BaseResp");
/// assert_eq!(go_identifier("LogID"), "LogID");
/// assert_eq!(go_identifier("user_id"), "UserID");
/// ```
pub fn go_identifier(name: &str) -> String {
    name.split('_').filter(|w| !w.is_empty()).map(export_word).collect()
}

/// Go constructor expression for a (possibly package-qualified) record type.
///
/// `base.Base` becomes `base.NewBase`, `Point` becomes `NewPoint`.
pub fn go_constructor(type_name: &str) -> String {
    match type_name.rsplit_once('.') {
        Some((pkg, name)) => format!("{}.New{}", pkg, go_identifier(name)),
        None => format!("New{}", go_identifier(type_name)),
    }
}

/// Go type expression for a (possibly package-qualified) named type.
pub fn go_type_name(type_name: &str) -> String {
    match type_name.rsplit_once('.') {
        Some((pkg, name)) => format!("{}.{}", pkg, go_identifier(name)),
        None => go_identifier(type_name),
    }
}

/// Wire type constant of the legacy runtime for a category.
///
/// Typedefs have no wire type of their own.
pub fn thrift_ttype(category: TypeCategory) -> Option<&'static str> {
    let ttype = match category {
        TypeCategory::Bool => "BOOL",
        TypeCategory::Byte => "BYTE",
        TypeCategory::I16 => "I16",
        TypeCategory::I32 | TypeCategory::Enum => "I32",
        TypeCategory::I64 => "I64",
        TypeCategory::Double => "DOUBLE",
        TypeCategory::String | TypeCategory::Binary => "STRING",
        TypeCategory::Map => "MAP",
        TypeCategory::Set => "SET",
        TypeCategory::List => "LIST",
        TypeCategory::Struct | TypeCategory::Union | TypeCategory::Exception => "STRUCT",
        TypeCategory::Typedef => return None,
    };
    Some(ttype)
}
