use crate::lexer::unqualified;
use crate::sexp::{Sexp, SexpKind};
use cljscope_api::models::util::unquote;
use cljscope_api::{FormRecord, MethodSignature, TypeKind, TypeRecord};

pub(crate) fn type_kind(keyword: &str) -> Option<TypeKind> {
    match unqualified(keyword) {
        "defprotocol" => Some(TypeKind::Protocol),
        "definterface" => Some(TypeKind::Interface),
        "deftype" => Some(TypeKind::Type),
        "defrecord" => Some(TypeKind::Record),
        _ => None,
    }
}

pub(crate) fn type_record(
    record: &FormRecord,
    form: &Sexp,
    source: &str,
    namespace: Option<String>,
) -> Option<TypeRecord> {
    let kind = type_kind(record.keyword.as_deref()?)?;
    let name = record.name.clone()?;
    let body = form.children.get(2..).unwrap_or(&[]);

    let mut type_record = TypeRecord {
        kind,
        name,
        docstring: record.docstring.clone(),
        fields: Vec::new(),
        protocols: Vec::new(),
        methods: Vec::new(),
        namespace,
        span: record.span,
        range: record.range,
    };

    match kind {
        TypeKind::Protocol | TypeKind::Interface => {
            type_record.methods = signatures(body, source);
        }
        TypeKind::Type | TypeKind::Record => {
            let mut rest = body;
            if let Some(fields) = rest.first().filter(|f| f.kind == SexpKind::Vector) {
                type_record.fields = fields
                    .children
                    .iter()
                    .filter_map(|f| f.symbol(source))
                    .map(str::to_string)
                    .collect();
                rest = &rest[1..];
            }
            let (protocols, methods) = implementations(rest, source);
            type_record.protocols = protocols;
            type_record.methods = methods;
        }
    }

    Some(type_record)
}

/// Method declarations of a protocol or interface body.
fn signatures(body: &[Sexp], source: &str) -> Vec<MethodSignature> {
    let mut methods = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let form = &body[i];
        match form.kind {
            // Options such as `:extend-via-metadata true`.
            SexpKind::Keyword => {
                i += 2;
                continue;
            }
            SexpKind::List => {
                if let Some(name) = form.children.first().and_then(|c| c.symbol(source)) {
                    methods.push(MethodSignature {
                        name: name.to_string(),
                        arities: form.children[1..]
                            .iter()
                            .filter(|c| c.kind == SexpKind::Vector)
                            .map(|c| c.text(source).to_string())
                            .collect(),
                        docstring: form.children[1..]
                            .iter()
                            .find(|c| c.kind == SexpKind::Str)
                            .map(|c| unquote(c.text(source)).to_string()),
                        protocol: None,
                    });
                }
            }
            _ => {}
        }
        i += 1;
    }
    methods
}

/// Protocol names and method bodies after a type's field vector. Several
/// bodies for one method become one signature with several arities.
fn implementations(body: &[Sexp], source: &str) -> (Vec<String>, Vec<MethodSignature>) {
    let mut protocols: Vec<String> = Vec::new();
    let mut methods: Vec<MethodSignature> = Vec::new();
    let mut i = 0;
    while i < body.len() {
        let form = &body[i];
        match form.kind {
            SexpKind::Keyword => {
                i += 2;
                continue;
            }
            SexpKind::Symbol => protocols.push(form.text(source).to_string()),
            SexpKind::List => {
                let Some(name) = form.children.first().and_then(|c| c.symbol(source)) else {
                    i += 1;
                    continue;
                };
                let arity = form
                    .children
                    .get(1)
                    .filter(|p| p.kind == SexpKind::Vector)
                    .map(|p| p.text(source).to_string());
                let protocol = protocols.last().cloned();
                match methods
                    .iter_mut()
                    .find(|m| m.name == name && m.protocol == protocol)
                {
                    Some(existing) => existing.arities.extend(arity),
                    None => methods.push(MethodSignature {
                        name: name.to_string(),
                        arities: arity.into_iter().collect(),
                        docstring: None,
                        protocol,
                    }),
                }
            }
            _ => {}
        }
        i += 1;
    }
    (protocols, methods)
}
