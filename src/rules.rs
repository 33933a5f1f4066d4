//! Rule Set for the binding patcher
//!
//! The rule file names the generated classes to rewrite and how:
//!
//! ```json
//! {
//!   "classDeclarations": {
//!     "Game": { "extends": "GameBase", "postConstructible": true }
//!   }
//! }
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::PatchError;

lazy_static! {
    /// ECMAScript IdentifierName (escapes excluded).
    static ref IDENTIFIER_RE: Regex =
        Regex::new(r"^[\p{ID_Start}_$][\p{ID_Continue}$\x{200C}\x{200D}]*$").unwrap();
}

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true",
    "try", "typeof", "var", "void", "while", "with", "yield", "let", "static", "enum", "await",
];

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name) && !RESERVED_WORDS.contains(&name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClassRule {
    /// Superclass to inject. Without it the class is left alone.
    #[serde(default)]
    pub extends: Option<String>,
    /// Append a `__postConstruct(this)` call to the constructor.
    #[serde(default)]
    pub post_constructible: bool,
}

impl ClassRule {
    pub fn extending(superclass: &str) -> Self {
        ClassRule {
            extends: Some(superclass.to_string()),
            post_constructible: false,
        }
    }

    pub fn post_constructible(mut self) -> Self {
        self.post_constructible = true;
        self
    }
}

/// Names the edits rely on. The defaults match the generator's constructor
/// shape: `const ret = wasm.x_new(); ... return ret;`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conventions {
    pub identity_field: String,
    pub handle_binding: String,
    pub post_construct_hook: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Conventions {
            identity_field: "ptr".to_string(),
            handle_binding: "ret".to_string(),
            post_construct_hook: "__postConstruct".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    #[serde(default)]
    pub class_declarations: BTreeMap<String, ClassRule>,
    #[serde(default)]
    pub conventions: Conventions,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, name: &str, rule: ClassRule) -> Self {
        self.class_declarations.insert(name.to_string(), rule);
        self
    }

    pub fn from_json(json: &str, origin: &Path) -> Result<Self, PatchError> {
        let rules: RuleSet = serde_json::from_str(json).map_err(|source| PatchError::RuleSet {
            path: origin.to_path_buf(),
            source,
        })?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self, PatchError> {
        let json = fs::read_to_string(path).map_err(|e| PatchError::io("read", path, e))?;
        let rules = Self::from_json(&json, path)?;
        tracing::debug!(
            path = %path.display(),
            classes = rules.class_declarations.len(),
            "loaded rule set"
        );
        Ok(rules)
    }

    /// Rejects names that would produce unparsable output once injected.
    pub fn validate(&self) -> Result<(), PatchError> {
        for (class, rule) in &self.class_declarations {
            if !is_valid_identifier(class) {
                return Err(PatchError::InvalidRule {
                    subject: format!("class '{}'", class),
                    message: "class name is not a valid identifier".to_string(),
                });
            }
            if let Some(superclass) = &rule.extends {
                if !is_valid_identifier(superclass) {
                    return Err(PatchError::InvalidRule {
                        subject: format!("class '{}'", class),
                        message: format!("'{}' is not a valid superclass identifier", superclass),
                    });
                }
            }
        }

        let conventions = [
            ("identityField", &self.conventions.identity_field),
            ("handleBinding", &self.conventions.handle_binding),
            ("postConstructHook", &self.conventions.post_construct_hook),
        ];
        for (key, value) in conventions {
            if !is_valid_identifier(value) {
                return Err(PatchError::InvalidRule {
                    subject: format!("conventions.{}", key),
                    message: format!("'{}' is not a valid identifier", value),
                });
            }
        }
        Ok(())
    }
}
