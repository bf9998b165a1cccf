// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Options controlling composition and materialization.

use serde::Serialize;

/// Built-in schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaKind {
    /// Only `!!str`, `!!map` and `!!seq`.
    Failsafe,
    /// Strict JSON-compatible spellings of null, booleans and numbers.
    Json,
    /// The YAML 1.2 core schema.
    #[default]
    Core,
    /// The YAML 1.1 types, including `yes`/`no`, sexagesimal and `!!binary`.
    #[serde(rename = "yaml-1.1")]
    Yaml11,
}

/// YAML version, from a `%YAML` directive or the options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Version {
    #[serde(rename = "1.1")]
    V1_1,
    #[default]
    #[serde(rename = "1.2")]
    V1_2,
}

impl Version {
    /// Parse a `major.minor` version string.
    #[must_use]
    pub fn from_str_opt(version: &str) -> Option<Self> {
        match version {
            "1.1" => Some(Self::V1_1),
            "1.2" => Some(Self::V1_2),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_1 => "1.1",
            Self::V1_2 => "1.2",
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options passed to every parsing entry point.
#[derive(Debug, Clone)]
pub struct Options {
    /// Schema used to resolve tags.
    pub schema: SchemaKind,
    /// Default YAML version for documents without a `%YAML` directive.
    pub version: Version,
    /// Report problems that are only errors in strict mode, such as comments
    /// not separated from the previous token and implicit keys longer than
    /// 1024 characters.
    pub strict: bool,
    /// Report duplicate mapping keys.
    pub unique_keys: bool,
    /// Treat `<<` keys as merge keys.
    pub merge_keys: bool,
    /// Carry `%TAG` and `%YAML` directives into the following documents.
    pub carry_directives: bool,
    /// Warn for plain scalars that this schema would resolve differently.
    pub compat: Option<SchemaKind>,
    /// Maximum weighted count of alias expansions when materializing values.
    /// `None` disables the check.
    pub max_alias_count: Option<usize>,
    /// Record line starts while parsing.
    pub line_counter: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            schema: SchemaKind::Core,
            version: Version::V1_2,
            strict: true,
            unique_keys: false,
            merge_keys: true,
            carry_directives: false,
            compat: None,
            max_alias_count: Some(100),
            line_counter: false,
        }
    }
}

impl Options {
    #[must_use]
    pub const fn with_schema(mut self, schema: SchemaKind) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub const fn with_unique_keys(mut self, unique_keys: bool) -> Self {
        self.unique_keys = unique_keys;
        self
    }

    #[must_use]
    pub const fn with_carry_directives(mut self, carry_directives: bool) -> Self {
        self.carry_directives = carry_directives;
        self
    }

    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
