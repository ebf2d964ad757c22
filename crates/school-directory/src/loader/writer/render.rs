use super::catalog::CatalogEntry;
use crate::loader::transform::{StructuredAddress, TransformedModule};
use serde_json::Value;
use std::fmt::Write as _;

const GENERATED_BANNER: &str = "// Generated by school-loader. Manual edits are overwritten with --overwrite.";

/// Feature modules this pipeline never fills in; emitted as explicit `null`s.
const PLACEHOLDER_FIELDS: &[&str] = &[
    "about",
    "programs",
    "admissions",
    "gallery",
    "events",
    "testimonials",
];

/// Quoted, escaped TypeScript string literal.
fn ts_string(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

pub(crate) fn render_constants(org_username: &str) -> String {
    format!(
        "{GENERATED_BANNER}\nexport const ORG_USERNAME = {};\n",
        ts_string(org_username)
    )
}

pub(crate) fn render_module(export_const: &str, module: &TransformedModule, region: &str) -> String {
    let mut content = String::new();
    writeln!(&mut content, "{GENERATED_BANNER}").expect("write banner");
    writeln!(&mut content, "import {{ ORG_USERNAME }} from \"./constants\";\n").expect("write import");
    writeln!(&mut content, "export const {export_const} = {{").expect("write declaration");
    writeln!(&mut content, "  orgUsername: ORG_USERNAME,").expect("write username");
    writeln!(&mut content, "  name: {},", ts_string(&module.name)).expect("write name");
    writeln!(&mut content, "  code: {},", ts_string(&module.code)).expect("write code");

    let categories: Vec<String> = module.categories.iter().map(|tag| ts_string(tag)).collect();
    writeln!(&mut content, "  categories: [{}],", categories.join(", ")).expect("write categories");

    content.push_str("  locations: [\n    {\n");
    writeln!(&mut content, "      name: {},", ts_string(&module.name)).expect("write location name");
    content.push_str("      isPrimary: true,\n");
    render_address(&mut content, &module.address, region);
    render_contacts(&mut content, module);
    content.push_str("    },\n  ],\n");

    for field in PLACEHOLDER_FIELDS {
        writeln!(&mut content, "  {field}: null,").expect("write placeholder");
    }
    content.push_str("};\n");
    content
}

fn render_address(content: &mut String, address: &StructuredAddress, region: &str) {
    content.push_str("      address: {\n");
    let lines = [
        ("line1", address.line1.as_deref()),
        ("line2", address.line2.as_deref()),
        ("line3", address.line3.as_deref()),
        ("city", address.city.as_deref()),
    ];
    for (key, value) in lines {
        if let Some(value) = value {
            writeln!(content, "        {key}: {},", ts_string(value)).expect("write address line");
        }
    }
    if !region.is_empty() {
        writeln!(content, "        parish: {},", ts_string(region)).expect("write parish");
    }
    content.push_str("      },\n");
}

fn render_contacts(content: &mut String, module: &TransformedModule) {
    if module.contacts.is_empty() {
        content.push_str("      contacts: [],\n");
        return;
    }

    content.push_str("      contacts: [\n");
    for contact in &module.contacts {
        content.push_str("        {\n");
        writeln!(content, "          type: {},", ts_string(contact.kind.label())).expect("write type");
        writeln!(content, "          value: {},", ts_string(&contact.value)).expect("write value");
        writeln!(content, "          label: {},", ts_string(&contact.label)).expect("write label");
        writeln!(content, "          isPublic: {},", contact.is_public).expect("write visibility");
        if contact.primary {
            content.push_str("          primary: true,\n");
        }
        content.push_str("        },\n");
    }
    content.push_str("      ],\n");
}

/// Imports every entity and exports them as one array, in the order given.
pub(crate) fn render_barrel(barrel_const: &str, entries: &[CatalogEntry]) -> String {
    let mut content = String::new();
    writeln!(&mut content, "{GENERATED_BANNER}").expect("write banner");
    for entry in entries {
        writeln!(
            &mut content,
            "import {{ {} }} from {};",
            entry.meta.export_const,
            ts_string(&format!("./{}", entry.dir_name))
        )
        .expect("write import");
    }
    if !entries.is_empty() {
        content.push('\n');
    }

    if entries.is_empty() {
        writeln!(&mut content, "export const {barrel_const} = [];").expect("write empty barrel");
        return content;
    }

    writeln!(&mut content, "export const {barrel_const} = [").expect("write barrel open");
    for entry in entries {
        writeln!(&mut content, "  {},", entry.meta.export_const).expect("write barrel item");
    }
    content.push_str("];\n");
    content
}
