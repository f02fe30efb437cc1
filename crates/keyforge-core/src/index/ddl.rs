use keyforge_primitives::PropertyType;
use std::fmt::Write;

///
/// IndexDdl
///
/// Renders a `create index` statement. Field clauses arrive already quoted.
///

pub(crate) struct IndexDdl<'a> {
    pub(crate) index_name: &'a str,
    pub(crate) class_name: Option<&'a str>,
    pub(crate) field_clauses: Vec<String>,
    pub(crate) index_type: &'a str,
    pub(crate) engine: Option<&'a str>,
    pub(crate) key_types: Vec<PropertyType>,
}

impl IndexDdl<'_> {
    pub(crate) fn render(&self) -> String {
        let mut ddl = format!("create index `{}`", self.index_name);

        if let Some(class_name) = self.class_name {
            let _ = write!(
                ddl,
                " on `{class_name}` ( {} )",
                self.field_clauses.join(", ")
            );
        }

        let _ = write!(ddl, " {}", self.index_type);

        if let Some(engine) = self.engine {
            let _ = write!(ddl, " ENGINE {engine}");
        }

        if !self.key_types.is_empty() {
            let names: Vec<&str> = self.key_types.iter().map(|ty| ty.name()).collect();
            let _ = write!(ddl, " {}", names.join(", "));
        }

        ddl
    }
}

/// Quote a field name and append its decoration, if any.
pub(crate) fn quote_field(field: &str, decoration: Option<&str>) -> String {
    match decoration {
        Some(decoration) => format!("`{field}` {decoration}"),
        None => format!("`{field}`"),
    }
}
