use crate::types::{BoundingBox, Category};

/// Server-side timeout written into every query, in seconds.
pub const QUERY_TIMEOUT_SECS: u32 = 30;

/// Overpass filter clauses for one category. Each clause gets the bounding
/// box appended when the query is built.
#[derive(Debug, Clone, Copy)]
pub struct QueryTemplate {
    pub category: Category,
    pub clauses: &'static [&'static str],
}

pub const QUERY_TEMPLATES: [QueryTemplate; 7] = [
    QueryTemplate {
        category: Category::Roads,
        clauses: &[r#"way["highway"]"#],
    },
    QueryTemplate {
        category: Category::Buildings,
        clauses: &[r#"way["building"]"#],
    },
    QueryTemplate {
        category: Category::Forests,
        clauses: &[r#"way["landuse"="forest"]"#, r#"way["natural"="wood"]"#],
    },
    QueryTemplate {
        category: Category::Rivers,
        clauses: &[r#"way["waterway"~"^(river|stream)$"]"#],
    },
    QueryTemplate {
        category: Category::Lakes,
        clauses: &[r#"way["natural"="water"]["water"~"^(lake|pond|reservoir)$"]"#],
    },
    QueryTemplate {
        category: Category::Channels,
        clauses: &[r#"way["waterway"~"^(canal|ditch|drain)$"]"#],
    },
    QueryTemplate {
        category: Category::Water,
        clauses: &[
            r#"way["natural"="water"]"#,
            r#"way["landuse"="reservoir"]"#,
            r#"way["waterway"="riverbank"]"#,
        ],
    },
];

pub fn template_for(category: Category) -> Option<&'static QueryTemplate> {
    QUERY_TEMPLATES.iter().find(|t| t.category == category)
}

/// Builds the `out geom` query for `category` restricted to `bbox`.
pub fn build_query(category: Category, bbox: &BoundingBox) -> Option<String> {
    let template = template_for(category)?;
    let bounds = bbox.overpass_bounds();
    let opening = format!("[out:json][timeout:{QUERY_TIMEOUT_SECS}];\n(\n");
    let closing = ");\nout geom;\n";

    let mut query = String::default();
    for clause in template.clauses {
        query.push_str(&format!("  {clause}({bounds});\n"));
    }

    if query.is_empty() {
        return None;
    }
    query.insert_str(0, &opening);
    query.push_str(closing);
    Some(query)
}

/// Like [`build_query`] but keyed by name. Unknown names yield `None`, which
/// callers treat as nothing to fetch.
pub fn build_query_for_name(name: &str, bbox: &BoundingBox) -> Option<String> {
    build_query(Category::from_name(name)?, bbox)
}
