//! Extraction of catalog annotations from layer properties.
//!
//! Feature packs describe layers with a flat list of `(name, value)`
//! properties. Only a closed set of names matters to the catalog; every
//! other property is dropped.

use crate::catalog::{CATEGORY_PROPERTY, CategoryName, Property, Rule};
use crate::rules::RuleDescriptions;
use anyhow::{Result, bail};

pub const DESCRIPTION_PROPERTY: &str = "org.wildfly.description";
pub const NOTE_PROPERTY: &str = "org.wildfly.note";
pub const STABILITY_PROPERTY: &str = "org.wildfly.stability";
pub const RULE_PREFIX: &str = "org.wildfly.rule";
pub const ADD_ON_PROPERTY: &str = "org.wildfly.rule.add-on";
pub const RULE_KIND_PROPERTY: &str = "org.wildfly.rule.kind";

// Only this kind is worth surfacing as a discovery rule.
const DOCUMENTED_RULE_KIND: &str = "default-base-layer";

/// Recognized property names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnnotationKey {
    Category,
    Description,
    Note,
    Stability,
    AddOn,
    /// Other `org.wildfly.rule.add-on*` names, such as `add-on-description`.
    AddOnCompanion,
    RuleKind,
    Rule,
    Unrecognized,
}

impl AnnotationKey {
    pub fn classify(name: &str) -> Self {
        match name {
            CATEGORY_PROPERTY => AnnotationKey::Category,
            DESCRIPTION_PROPERTY => AnnotationKey::Description,
            NOTE_PROPERTY => AnnotationKey::Note,
            STABILITY_PROPERTY => AnnotationKey::Stability,
            RULE_KIND_PROPERTY => AnnotationKey::RuleKind,
            ADD_ON_PROPERTY => AnnotationKey::AddOn,
            _ if name.starts_with(ADD_ON_PROPERTY) => AnnotationKey::AddOnCompanion,
            _ if name.starts_with(RULE_PREFIX) => AnnotationKey::Rule,
            _ => AnnotationKey::Unrecognized,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// Annotation fields recovered from one layer's properties.
pub struct Annotations {
    pub category: Option<CategoryName>,
    pub description: Option<String>,
    pub note: Option<String>,
    pub stability: Option<String>,
    pub add_on: Option<String>,
    pub discovery_rules: Vec<Rule>,
}

/// Walk the properties once and collect the recognized annotations.
///
/// Later occurrences of a single-valued property replace earlier ones;
/// discovery rules keep their declaration order. A malformed add-on value is
/// an error.
pub fn extract_annotations(
    properties: &[Property],
    descriptions: &RuleDescriptions,
) -> Result<Annotations> {
    let mut out = Annotations::default();
    for prop in properties {
        match AnnotationKey::classify(&prop.name) {
            AnnotationKey::Category => out.category = Some(CategoryName(prop.value.clone())),
            AnnotationKey::Description => out.description = Some(prop.value.clone()),
            AnnotationKey::Note => out.note = Some(prop.value.clone()),
            AnnotationKey::Stability => out.stability = Some(prop.value.clone()),
            AnnotationKey::AddOn => out.add_on = Some(parse_add_on(prop)?),
            AnnotationKey::RuleKind => {
                if prop.value == DOCUMENTED_RULE_KIND {
                    out.discovery_rules.push(describe_rule(prop, descriptions));
                }
            }
            AnnotationKey::Rule => out.discovery_rules.push(describe_rule(prop, descriptions)),
            AnnotationKey::AddOnCompanion | AnnotationKey::Unrecognized => {}
        }
    }
    Ok(out)
}

/// Add-on values look like `<family>,<add-on id>[,...]`.
fn parse_add_on(prop: &Property) -> Result<String> {
    match prop.value.split(',').nth(1) {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => bail!(
            "malformed {} value '{}': expected '<family>,<add-on>'",
            prop.name,
            prop.value
        ),
    }
}

fn describe_rule(prop: &Property, descriptions: &RuleDescriptions) -> Rule {
    let described = descriptions.describe(&prop.name);
    Rule {
        name: prop.name.clone(),
        value: prop.value.clone(),
        rule_description: described.rule,
        value_description: described.value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, value: &str) -> Property {
        Property {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn classify_covers_every_family() {
        assert_eq!(AnnotationKey::classify(CATEGORY_PROPERTY), AnnotationKey::Category);
        assert_eq!(AnnotationKey::classify(ADD_ON_PROPERTY), AnnotationKey::AddOn);
        assert_eq!(
            AnnotationKey::classify("org.wildfly.rule.add-on-description"),
            AnnotationKey::AddOnCompanion
        );
        assert_eq!(AnnotationKey::classify(RULE_KIND_PROPERTY), AnnotationKey::RuleKind);
        assert_eq!(
            AnnotationKey::classify("org.wildfly.rule.annotations"),
            AnnotationKey::Rule
        );
        assert_eq!(
            AnnotationKey::classify("org.wildfly.categoryx"),
            AnnotationKey::Unrecognized
        );
        assert_eq!(AnnotationKey::classify("other"), AnnotationKey::Unrecognized);
    }

    #[test]
    fn extracts_all_fields() {
        let descriptions = RuleDescriptions::from_entries([
            ("org.wildfly.rule.class", "Java class"),
            ("org.wildfly.rule.class.value", "Class names"),
        ]);
        let props = vec![
            prop(CATEGORY_PROPERTY, "Web"),
            prop(DESCRIPTION_PROPERTY, "Servlet support"),
            prop(NOTE_PROPERTY, "Needs TLS"),
            prop(STABILITY_PROPERTY, "preview"),
            prop("org.wildfly.rule.add-on", "observability,opentelemetry"),
            prop("org.wildfly.rule.class", "jakarta.servlet.*"),
            prop("org.wildfly.rule.expected-file", "WEB-INF/web.xml"),
            prop("org.wildfly.unknown", "ignored"),
        ];
        let annotations = extract_annotations(&props, &descriptions).unwrap();
        assert_eq!(annotations.category, Some(CategoryName("Web".into())));
        assert_eq!(annotations.description.as_deref(), Some("Servlet support"));
        assert_eq!(annotations.note.as_deref(), Some("Needs TLS"));
        assert_eq!(annotations.stability.as_deref(), Some("preview"));
        assert_eq!(annotations.add_on.as_deref(), Some("opentelemetry"));

        let names: Vec<&str> = annotations
            .discovery_rules
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, ["org.wildfly.rule.class", "org.wildfly.rule.expected-file"]);
        let class_rule = &annotations.discovery_rules[0];
        assert_eq!(class_rule.rule_description.as_deref(), Some("Java class"));
        assert_eq!(class_rule.value_description.as_deref(), Some("Class names"));
        assert_eq!(annotations.discovery_rules[1].rule_description, None);
    }

    #[test]
    fn add_on_is_never_a_discovery_rule() {
        let props = vec![prop(ADD_ON_PROPERTY, "family,my-addon,extra")];
        let annotations = extract_annotations(&props, &RuleDescriptions::default()).unwrap();
        assert_eq!(annotations.add_on.as_deref(), Some("my-addon"));
        assert!(annotations.discovery_rules.is_empty());
    }

    #[test]
    fn add_on_companions_are_ignored() {
        let props = vec![
            prop(ADD_ON_PROPERTY, "observability,opentelemetry"),
            prop("org.wildfly.rule.add-on-description", "Support for OpenTelemetry"),
            prop("org.wildfly.rule.add-on-description", "Tracing, metrics and logs"),
            prop("org.wildfly.rule.add-on-fix", ""),
        ];
        let annotations = extract_annotations(&props, &RuleDescriptions::default()).unwrap();
        assert_eq!(annotations.add_on.as_deref(), Some("opentelemetry"));
        assert!(annotations.discovery_rules.is_empty());
    }

    #[test]
    fn malformed_add_on_is_fatal() {
        for value in ["single", "family,", ""] {
            let props = vec![prop(ADD_ON_PROPERTY, value)];
            let err = extract_annotations(&props, &RuleDescriptions::default())
                .expect_err("malformed add-on should fail");
            assert!(err.to_string().contains("malformed org.wildfly.rule.add-on"));
        }
    }

    #[test]
    fn rule_kind_only_kept_for_default_base_layer() {
        let props = vec![
            prop(RULE_KIND_PROPERTY, "base-layer"),
            prop(RULE_KIND_PROPERTY, "default-base-layer"),
        ];
        let annotations = extract_annotations(&props, &RuleDescriptions::default()).unwrap();
        assert_eq!(annotations.discovery_rules.len(), 1);
        assert_eq!(annotations.discovery_rules[0].value, "default-base-layer");
    }

    #[test]
    fn duplicate_rules_are_kept_in_order() {
        let props = vec![
            prop("org.wildfly.rule.class", "a"),
            prop("org.wildfly.rule.class", "a"),
        ];
        let annotations = extract_annotations(&props, &RuleDescriptions::default()).unwrap();
        assert_eq!(annotations.discovery_rules.len(), 2);
    }
}
