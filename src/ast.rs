//! The AST produced by the parser and mutated in place by the resolver.
//!
//! Messages live in a flat arena (`Schema::messages`); cross-message
//! references are indices into that arena rather than pointers, so the
//! structure can't form an ownership cycle the way `protogen`'s
//! `Message*`-holding fields could. See `MessageRef`.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    pub fn is_numeric_or_bool(self) -> bool {
        !matches!(self, ScalarType::String | ScalarType::Bytes)
    }
}

/// A reference to a message type, by qualified name at parse time and by
/// arena index once the resolver's binding pass has run.
#[derive(Debug, Clone)]
pub struct MessageRef {
    pub qualified_name: String,
    pub line: usize,
    pub column: usize,
    pub resolved: Option<usize>,
}

impl MessageRef {
    pub fn new(qualified_name: impl Into<String>, line: usize, column: usize) -> Self {
        MessageRef {
            qualified_name: qualified_name.into(),
            line,
            column,
            resolved: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarType),
    Message(MessageRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Identifier,
    String,
    Integer,
    Boolean,
}

#[derive(Debug, Clone)]
pub struct OptionEntry {
    pub name: String,
    pub kind: OptionKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

/// Attached to a schema, message, or field. Lookup by name overwrites on
/// duplicate declaration ("last wins"; see DESIGN.md).
#[derive(Debug, Clone, Default)]
pub struct OptionMap {
    entries: HashMap<String, OptionEntry>,
    order: Vec<String>,
}

impl OptionMap {
    pub fn new() -> Self {
        OptionMap::default()
    }

    pub fn insert(&mut self, entry: OptionEntry) {
        if !self.entries.contains_key(&entry.name) {
            self.order.push(entry.name.clone());
        }
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&OptionEntry> {
        self.entries.get(name)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).map(|e| e.value == "true")
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).map(|e| e.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionEntry> {
        self.order.iter().map(move |name| &self.entries[name])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub index: u32,
    pub repeated: bool,
    pub kind: FieldKind,
    pub options: OptionMap,
    pub line: usize,
    pub column: usize,
}

impl Field {
    /// The field is byte-sequence-shaped for storage purposes: `bytes`
    /// scalars and any `repeated` field use emptiness, not a presence
    /// wrapper, to signal absence.
    pub fn uses_emptiness_presence(&self) -> bool {
        self.repeated || matches!(self.kind, FieldKind::Scalar(ScalarType::Bytes))
    }

    pub fn is_transient(&self) -> bool {
        self.options.get_bool("transient").unwrap_or(false)
    }

    pub fn json_name(&self, number_names: bool) -> String {
        if number_names {
            return self.index.to_string();
        }
        if let Some(name) = self.options.get_string("name") {
            return name.to_string();
        }
        self.name.clone()
    }
}

pub const MAX_FIELDS: usize = 24;

#[derive(Debug, Clone)]
pub struct Message {
    pub name: String,
    pub package: String,
    pub fields: Vec<Field>,
    pub options: OptionMap,
    pub line: usize,
    pub column: usize,
}

impl Message {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub file_name: String,
    pub package: Option<String>,
    pub global_options: OptionMap,
    pub messages: Vec<Message>,
}

impl Schema {
    pub fn new(file_name: impl Into<String>) -> Self {
        Schema {
            file_name: file_name.into(),
            package: None,
            global_options: OptionMap::new(),
            messages: Vec::new(),
        }
    }

    pub fn obfuscate_strings(&self) -> bool {
        self.global_options.get_bool("obfuscate_strings").unwrap_or(false)
    }

    pub fn number_names(&self) -> bool {
        self.global_options.get_bool("number_names").unwrap_or(false)
    }

    pub fn find_by_qualified_name(&self, qualified_name: &str) -> Option<usize> {
        self.messages
            .iter()
            .position(|m| m.qualified_name() == qualified_name)
    }
}
