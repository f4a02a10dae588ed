//! Dependency manifest (conanfile.py) model
//!
//! This module extracts the declarative surface of a Conan-style recipe:
//! - [`reference`]: `name/version@user/channel` package references
//! - [`options`]: `package:key=value` option overrides
//! - [`lexer`] and [`parser`]: reading the literal Python subset
//! - [`lint`]: rules over a parsed manifest

pub mod lexer;
pub mod lint;
pub mod options;
pub mod parser;
pub mod reference;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PinledgerError, Result, fs as fs_error, manifest as manifest_error};

pub use options::OptionOverride;
pub use parser::Value;
pub use reference::{Channel, PackageReference};

use parser::{Assignment, ClassDef};

/// Base class a recipe must derive from
const RECIPE_BASE: &str = "ConanFile";

/// Attributes whose value must be readable; anything else may be dynamic
const DECLARATIVE_ATTRIBUTES: &[&str] = &[
    "name",
    "version",
    "description",
    "license",
    "url",
    "homepage",
    "author",
    "topics",
    "settings",
    "generators",
    "requires",
    "build_requires",
    "tool_requires",
    "default_options",
];

/// How a requirement is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequireModifier {
    Override,
    Private,
}

impl RequireModifier {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "override" => Some(Self::Override),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// A package reference as listed in `requires`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub reference: PackageReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<RequireModifier>,
    /// Source line of the attribute that declared it
    #[serde(skip)]
    pub line: usize,
}

impl Requirement {
    pub fn name(&self) -> &str {
        &self.reference.name
    }
}

/// A class attribute outside the declarative surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraAttribute {
    pub name: String,
    pub line: usize,
    /// Whether the value is a plain literal
    pub literal: bool,
}

/// The declarative surface of a recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub class_name: String,
    pub base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    pub settings: Vec<String>,
    pub generators: Vec<String>,
    pub requires: Vec<Requirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_requires: Vec<Requirement>,
    pub default_options: Vec<OptionOverride>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<ExtraAttribute>,
}

impl Manifest {
    /// Parse manifest source text
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_named(source, "<input>")
    }

    /// Parse manifest source text, naming `origin` in errors
    pub fn parse_named(source: &str, origin: &str) -> Result<Self> {
        let module = parser::parse_module(source)
            .map_err(|e| manifest_error::parse_failed(origin, e.line, e.column, e.reason))?;

        let Some(class) = module
            .classes
            .iter()
            .find(|class| class.derives_from(RECIPE_BASE))
        else {
            return Err(manifest_error::no_recipe_class(origin));
        };
        debug!(origin, class = %class.name, "using recipe class");

        let mut manifest = Extractor { origin, class }.extract()?;
        manifest.imports = module.imports;
        Ok(manifest)
    }

    /// Read and parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(manifest_error::not_found(path.display().to_string()));
        }
        let source = std::fs::read_to_string(path)
            .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
        Self::parse_named(&source, &path.display().to_string())
    }

    /// Find a requirement (runtime or build) by package name
    pub fn requirement(&self, name: &str) -> Option<&Requirement> {
        self.all_requirements().find(|r| r.name() == name)
    }

    /// Runtime requirements followed by build requirements
    pub fn all_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requires.iter().chain(self.build_requires.iter())
    }

    /// Required package names in declaration order
    pub fn package_names(&self) -> Vec<&str> {
        self.all_requirements().map(Requirement::name).collect()
    }

    /// Option overrides targeting `package`
    pub fn options_for<'a>(&'a self, package: &'a str) -> impl Iterator<Item = &'a OptionOverride> {
        self.default_options
            .iter()
            .filter(move |o| o.package.as_deref() == Some(package))
    }
}

/// Maps class assignments onto manifest fields
struct Extractor<'a> {
    origin: &'a str,
    class: &'a ClassDef,
}

impl Extractor<'_> {
    fn extract(&self) -> Result<Manifest> {
        let mut manifest = Manifest {
            class_name: self.class.name.clone(),
            base: self
                .class
                .bases
                .iter()
                .find(|b| b.ends_with(RECIPE_BASE))
                .cloned()
                .unwrap_or_else(|| RECIPE_BASE.to_string()),
            name: self.scalar("name")?,
            version: self.scalar("version")?,
            description: self.scalar("description")?,
            license: self.scalar("license")?,
            url: self.scalar("url")?.or(self.scalar("homepage")?),
            author: self.scalar("author")?,
            topics: self.strings("topics")?,
            settings: self.strings("settings")?,
            generators: self.strings("generators")?,
            requires: self.requirements("requires")?,
            build_requires: self.requirements("build_requires")?,
            default_options: self.options()?,
            imports: Vec::new(),
            extra: Vec::new(),
        };
        manifest
            .build_requires
            .extend(self.requirements("tool_requires")?);
        manifest.extra = self.extra_attributes();
        Ok(manifest)
    }

    fn invalid(&self, assignment: &Assignment, reason: impl Into<String>) -> PinledgerError {
        manifest_error::invalid_attribute(self.origin, &assignment.name, assignment.line, reason)
    }

    /// Parse a reference, locating failures at the assignment
    fn reference(&self, assignment: &Assignment, text: &str) -> Result<PackageReference> {
        PackageReference::parse(text).map_err(|e| self.invalid(assignment, e.to_string()))
    }

    /// Literal value of a declarative attribute, if assigned
    fn value(&self, name: &str) -> Result<Option<(&Assignment, &Value)>> {
        let Some(assignment) = self.class.assignment(name) else {
            return Ok(None);
        };
        match &assignment.value {
            Ok(value) => Ok(Some((assignment, value))),
            Err(e) => Err(manifest_error::parse_failed(
                self.origin,
                e.line,
                e.column,
                format!("'{name}' must be a literal: {}", e.reason),
            )),
        }
    }

    fn scalar(&self, name: &str) -> Result<Option<String>> {
        let Some((assignment, value)) = self.value(name)? else {
            return Ok(None);
        };
        match value {
            Value::Str(s) | Value::Number(s) => Ok(Some(s.clone())),
            Value::None => Ok(None),
            other => Err(self.invalid(
                assignment,
                format!("expected a string, found {}", other.kind_name()),
            )),
        }
    }

    /// A string or a sequence of strings
    fn strings(&self, name: &str) -> Result<Vec<String>> {
        let Some((assignment, value)) = self.value(name)? else {
            return Ok(Vec::new());
        };
        match value {
            Value::Str(s) => Ok(vec![s.clone()]),
            Value::None => Ok(Vec::new()),
            Value::List(items) | Value::Tuple(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        self.invalid(
                            assignment,
                            format!("expected strings, found {}", item.kind_name()),
                        )
                    })
                })
                .collect(),
            other => Err(self.invalid(
                assignment,
                format!("expected a string or a sequence, found {}", other.kind_name()),
            )),
        }
    }

    fn requirements(&self, name: &str) -> Result<Vec<Requirement>> {
        let Some((assignment, value)) = self.value(name)? else {
            return Ok(Vec::new());
        };
        let entries: &[Value] = match value {
            Value::Str(_) => std::slice::from_ref(value),
            Value::None => &[],
            Value::List(items) | Value::Tuple(items) => items,
            other => {
                return Err(self.invalid(
                    assignment,
                    format!("expected references, found {}", other.kind_name()),
                ));
            }
        };

        let mut requirements = Vec::new();
        for entry in entries {
            match entry {
                Value::Str(text) => requirements.push(Requirement {
                    reference: self.reference(assignment, text)?,
                    modifier: None,
                    line: assignment.line,
                }),
                Value::Tuple(parts) | Value::List(parts) => {
                    requirements.push(self.requirement_tuple(assignment, parts)?);
                }
                other => {
                    return Err(self.invalid(
                        assignment,
                        format!("expected a reference string, found {}", other.kind_name()),
                    ));
                }
            }
        }
        Ok(requirements)
    }

    /// `("pkg/1.0", "override")`
    fn requirement_tuple(&self, assignment: &Assignment, parts: &[Value]) -> Result<Requirement> {
        let Some(reference) = parts.first().and_then(Value::as_str) else {
            return Err(self.invalid(assignment, "requirement tuple must start with a reference"));
        };
        let modifier = match parts.get(1) {
            None => None,
            Some(Value::Str(text)) => Some(RequireModifier::parse(text).ok_or_else(|| {
                self.invalid(assignment, format!("unknown requirement modifier '{text}'"))
            })?),
            Some(other) => {
                return Err(self.invalid(
                    assignment,
                    format!("expected a modifier string, found {}", other.kind_name()),
                ));
            }
        };
        if parts.len() > 2 {
            return Err(self.invalid(assignment, "requirement tuple has more than two items"));
        }
        Ok(Requirement {
            reference: self.reference(assignment, reference)?,
            modifier,
            line: assignment.line,
        })
    }

    fn options(&self) -> Result<Vec<OptionOverride>> {
        let Some((assignment, value)) = self.value("default_options")? else {
            return Ok(Vec::new());
        };
        match value {
            Value::Dict(entries) => entries
                .iter()
                .map(|(key, value)| {
                    let Some(target) = key.as_str() else {
                        return Err(self.invalid(assignment, "option keys must be strings"));
                    };
                    let Some(text) = value.scalar_text() else {
                        return Err(self.invalid(
                            assignment,
                            format!("option '{target}' must have a scalar value"),
                        ));
                    };
                    OptionOverride::from_entry(target, text)
                        .map_err(|e| self.invalid(assignment, e.to_string()))
                })
                .collect(),
            Value::Str(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| {
                    OptionOverride::parse(line).map_err(|e| self.invalid(assignment, e.to_string()))
                })
                .collect(),
            Value::List(items) | Value::Tuple(items) => items
                .iter()
                .map(|item| match item.as_str() {
                    Some(text) => OptionOverride::parse(text)
                        .map_err(|e| self.invalid(assignment, e.to_string())),
                    None => Err(self.invalid(
                        assignment,
                        format!("expected 'key=value' strings, found {}", item.kind_name()),
                    )),
                })
                .collect(),
            Value::None => Ok(Vec::new()),
            other => Err(self.invalid(
                assignment,
                format!("expected a dict or 'key=value' strings, found {}", other.kind_name()),
            )),
        }
    }

    fn extra_attributes(&self) -> Vec<ExtraAttribute> {
        let mut extra: Vec<ExtraAttribute> = Vec::new();
        for assignment in &self.class.assignments {
            if DECLARATIVE_ATTRIBUTES.contains(&assignment.name.as_str())
                || extra.iter().any(|e| e.name == assignment.name)
            {
                continue;
            }
            if let Err(e) = &assignment.value {
                warn!(
                    attribute = %assignment.name,
                    line = assignment.line,
                    reason = %e.reason,
                    "skipping non-literal attribute"
                );
            }
            extra.push(ExtraAttribute {
                name: assignment.name.clone(),
                line: assignment.line,
                literal: assignment.value.is_ok(),
            });
        }
        extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUPERNOVA: &str = r#"from conans import ConanFile

class SuperNovaEngine(ConanFile):
    name = 'SuperNova-Engine'
    version = '0.1.0'
    settings = "os", "arch", "compiler", "build_type"

    generators = "cmake_find_package_multi"

    requires = [
        'assimp/5.0.1',
        'entt/3.7.1',
        'glad/0.1.34@snv/stable',
        'glfw/3.3.4',
        'glm/0.9.9.8',
        'imgui/18311@snv/docking',
        'spdlog/1.8.5',
        'stb/20200203'
    ]
"#;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = Manifest::parse(SUPERNOVA).unwrap();
        assert_eq!(manifest.class_name, "SuperNovaEngine");
        assert_eq!(manifest.name.as_deref(), Some("SuperNova-Engine"));
        assert_eq!(manifest.version.as_deref(), Some("0.1.0"));
        assert_eq!(
            manifest.settings,
            vec!["os", "arch", "compiler", "build_type"]
        );
        assert_eq!(manifest.generators, vec!["cmake_find_package_multi"]);
        assert_eq!(
            manifest.package_names(),
            vec!["assimp", "entt", "glad", "glfw", "glm", "imgui", "spdlog", "stb"]
        );
        assert_eq!(manifest.imports, vec!["from conans import ConanFile"]);
        let glad = manifest.requirement("glad").unwrap();
        assert_eq!(glad.reference.channel.as_ref().unwrap().to_string(), "snv/stable");
    }

    #[test]
    fn test_default_options_dict() {
        let source = r#"
class Engine(ConanFile):
    requires = "glad/0.1.34"
    default_options = {"glad:gl_profile": "core", "glad:gl_version": 4.6, "shared": False}
"#;
        let manifest = Manifest::parse(source).unwrap();
        assert_eq!(manifest.default_options.len(), 3);
        assert_eq!(manifest.default_options[1].to_string(), "glad:gl_version=4.6");
        assert_eq!(manifest.default_options[2].to_string(), "shared=False");
        assert_eq!(manifest.options_for("glad").count(), 2);
    }

    #[test]
    fn test_default_options_string_and_tuple_forms() {
        let as_string = r#"
class Engine(ConanFile):
    default_options = """glad:spec=gl
    glad:gl_version=4.6"""
"#;
        let manifest = Manifest::parse(as_string).unwrap();
        assert_eq!(manifest.default_options.len(), 2);
        assert_eq!(manifest.default_options[1].key, "gl_version");

        let as_tuple = "class Engine(ConanFile):\n    default_options = 'glad:spec=gl', 'glad:no_loader=False'\n";
        let manifest = Manifest::parse(as_tuple).unwrap();
        assert_eq!(manifest.default_options[1].value, "False");
    }

    #[test]
    fn test_requirement_tuples_and_tool_requires() {
        let source = r#"
class Engine(ConanFile):
    requires = (("zlib/1.2.11", "override"), "glfw/3.3.4")
    build_requires = "cmake/3.19.0"
    tool_requires = ["ninja/1.10.2"]
"#;
        let manifest = Manifest::parse(source).unwrap();
        assert_eq!(manifest.requires[0].modifier, Some(RequireModifier::Override));
        assert_eq!(manifest.requires[1].modifier, None);
        let build: Vec<&str> = manifest.build_requires.iter().map(Requirement::name).collect();
        assert_eq!(build, vec!["cmake", "ninja"]);
        assert!(manifest.requirement("ninja").is_some());
    }

    #[test]
    fn test_requires_string_is_one_reference() {
        let err =
            Manifest::parse("class A(ConanFile):\n    requires = 'glfw/3.3.4, glm/0.9.9.8'\n")
                .unwrap_err();
        assert!(matches!(err, PinledgerError::InvalidAttribute { ref attribute, .. } if attribute == "requires"));
        assert!(err.to_string().contains("glfw/3.3.4, glm/0.9.9.8"));

        let ranged = "class A(ConanFile):\n    requires = 'entt/[>=3.7, include_prerelease]'\n";
        let manifest = Manifest::parse(ranged).unwrap();
        assert_eq!(manifest.requires.len(), 1);
        assert_eq!(manifest.requires[0].reference.version, "[>=3.7, include_prerelease]");
    }

    #[test]
    fn test_bad_reference_names_origin_and_line() {
        let err = Manifest::parse_named(
            "class A(ConanFile):\n    name = 'a'\n    requires = ['glfw']\n",
            "engine/conanfile.py",
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("engine/conanfile.py:3"));
        assert!(message.contains("missing '/' between name and version"));

        let err = Manifest::parse_named(
            "class A(ConanFile):\n    default_options = {':shared': True}\n",
            "engine/conanfile.py",
        )
        .unwrap_err();
        assert!(err.to_string().contains("engine/conanfile.py:2"));
    }

    #[test]
    fn test_empty_and_missing_requires() {
        let manifest = Manifest::parse("class A(ConanFile):\n    requires = []\n").unwrap();
        assert!(manifest.requires.is_empty());
        let manifest = Manifest::parse("class A(ConanFile):\n    name = 'a'\n").unwrap();
        assert!(manifest.requires.is_empty());
        assert!(manifest.version.is_none());
    }

    #[test]
    fn test_byte_order_mark_prefixed_manifest() {
        let manifest =
            Manifest::parse("\u{feff}class A(ConanFile):\n    requires = 'glfw/3.3.4'\n").unwrap();
        assert_eq!(manifest.class_name, "A");
        assert_eq!(manifest.package_names(), vec!["glfw"]);
    }

    #[test]
    fn test_invalid_reference_fails_parse() {
        let err = Manifest::parse("class A(ConanFile):\n    requires = ['glfw']\n").unwrap_err();
        assert!(matches!(err, PinledgerError::InvalidAttribute { line: 2, .. }));
        assert!(err.to_string().contains("Invalid package reference 'glfw'"));
    }

    #[test]
    fn test_unknown_modifier() {
        let err =
            Manifest::parse("class A(ConanFile):\n    requires = [('zlib/1.2', 'weird')]\n")
                .unwrap_err();
        assert!(err.to_string().contains("unknown requirement modifier"));
    }

    #[test]
    fn test_non_literal_declarative_attribute_fails() {
        let err = Manifest::parse("class A(ConanFile):\n    version = load_version()\n").unwrap_err();
        assert!(matches!(err, PinledgerError::ManifestParse { line: 2, .. }));
    }

    #[test]
    fn test_non_literal_extra_attribute_is_kept() {
        let source = "class A(ConanFile):\n    exports_sources = os.listdir('.')\n    no_copy_source = True\n";
        let manifest = Manifest::parse(source).unwrap();
        assert_eq!(
            manifest.extra,
            vec![
                ExtraAttribute {
                    name: "exports_sources".to_string(),
                    line: 2,
                    literal: false
                },
                ExtraAttribute {
                    name: "no_copy_source".to_string(),
                    line: 3,
                    literal: true
                },
            ]
        );
    }

    #[test]
    fn test_wrong_type_for_settings() {
        let err = Manifest::parse("class A(ConanFile):\n    settings = {'os': 1}\n").unwrap_err();
        assert!(matches!(err, PinledgerError::InvalidAttribute { .. }));
    }

    #[test]
    fn test_no_recipe_class() {
        let err = Manifest::parse("class Helper:\n    name = 'x'\n").unwrap_err();
        assert!(matches!(err, PinledgerError::NoRecipeClass { .. }));
    }

    #[test]
    fn test_first_recipe_class_wins() {
        let source = "class Helper:\n    name = 'h'\nclass A(ConanFile):\n    name = 'a'\nclass B(ConanFile):\n    name = 'b'\n";
        let manifest = Manifest::parse(source).unwrap();
        assert_eq!(manifest.class_name, "A");
    }

    #[test]
    fn test_comments_do_not_change_result() {
        let commented = SUPERNOVA.replace("'entt/3.7.1',", "'entt/3.7.1',  # ECS");
        assert_eq!(
            Manifest::parse(&commented).unwrap(),
            Manifest::parse(SUPERNOVA).unwrap()
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = Manifest::load(Path::new("/nonexistent/conanfile.py")).unwrap_err();
        assert!(matches!(err, PinledgerError::ManifestNotFound { .. }));
    }
}
