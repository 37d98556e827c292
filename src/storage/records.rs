//! Value records and type tags for the graph store
//!
//! Every typed retrieval returns these records, never raw cursors. Rows
//! carrying sentinel values (`id == 0`, `type == -1`) are filtered out
//! client-side before they reach callers.

use serde::{Deserialize, Serialize};

/// Dense 64-bit identifier allocated by the store
pub type Id = i64;

/// Kind of node in the code graph
///
/// File nodes share the node table with symbol nodes; the `File` tag
/// marks rows that also have a `file` row under the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Undefined,
    File,
    Namespace,
    Package,
    Class,
    Struct,
    Interface,
    GlobalVariable,
    Field,
    Function,
    Method,
    Enum,
    EnumConstant,
    Typedef,
    Macro,
    Union,
}

impl NodeType {
    /// Integer tag persisted in the `node.type` column
    pub fn to_i64(self) -> i64 {
        match self {
            NodeType::Undefined => 0,
            NodeType::File => 1,
            NodeType::Namespace => 2,
            NodeType::Package => 3,
            NodeType::Class => 4,
            NodeType::Struct => 5,
            NodeType::Interface => 6,
            NodeType::GlobalVariable => 7,
            NodeType::Field => 8,
            NodeType::Function => 9,
            NodeType::Method => 10,
            NodeType::Enum => 11,
            NodeType::EnumConstant => 12,
            NodeType::Typedef => 13,
            NodeType::Macro => 14,
            NodeType::Union => 15,
        }
    }

    /// Decode a persisted tag, falling back to `Undefined` for unknown values
    pub fn from_i64(value: i64) -> NodeType {
        match value {
            1 => NodeType::File,
            2 => NodeType::Namespace,
            3 => NodeType::Package,
            4 => NodeType::Class,
            5 => NodeType::Struct,
            6 => NodeType::Interface,
            7 => NodeType::GlobalVariable,
            8 => NodeType::Field,
            9 => NodeType::Function,
            10 => NodeType::Method,
            11 => NodeType::Enum,
            12 => NodeType::EnumConstant,
            13 => NodeType::Typedef,
            14 => NodeType::Macro,
            15 => NodeType::Union,
            _ => NodeType::Undefined,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Undefined => "undefined",
            NodeType::File => "file",
            NodeType::Namespace => "namespace",
            NodeType::Package => "package",
            NodeType::Class => "class",
            NodeType::Struct => "struct",
            NodeType::Interface => "interface",
            NodeType::GlobalVariable => "global_variable",
            NodeType::Field => "field",
            NodeType::Function => "function",
            NodeType::Method => "method",
            NodeType::Enum => "enum",
            NodeType::EnumConstant => "enum_constant",
            NodeType::Typedef => "typedef",
            NodeType::Macro => "macro",
            NodeType::Union => "union",
        }
    }
}

/// Whether a node definition was seen explicitly, derived implicitly, or
/// not seen at all (pure reference)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefinitionType {
    None,
    Implicit,
    Explicit,
}

impl DefinitionType {
    pub fn to_i64(self) -> i64 {
        match self {
            DefinitionType::None => 0,
            DefinitionType::Implicit => 1,
            DefinitionType::Explicit => 2,
        }
    }

    pub fn from_i64(value: i64) -> DefinitionType {
        match value {
            1 => DefinitionType::Implicit,
            2 => DefinitionType::Explicit,
            _ => DefinitionType::None,
        }
    }
}

/// Kind of directed relation between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeType {
    Undefined,
    Member,
    TypeUsage,
    Usage,
    Call,
    Inheritance,
    Override,
    TemplateSpecialization,
    Include,
    Import,
    MacroUsage,
    Aggregation,
}

impl EdgeType {
    pub fn to_i64(self) -> i64 {
        match self {
            EdgeType::Undefined => 0,
            EdgeType::Member => 1,
            EdgeType::TypeUsage => 2,
            EdgeType::Usage => 3,
            EdgeType::Call => 4,
            EdgeType::Inheritance => 5,
            EdgeType::Override => 6,
            EdgeType::TemplateSpecialization => 7,
            EdgeType::Include => 8,
            EdgeType::Import => 9,
            EdgeType::MacroUsage => 10,
            EdgeType::Aggregation => 11,
        }
    }

    pub fn from_i64(value: i64) -> EdgeType {
        match value {
            1 => EdgeType::Member,
            2 => EdgeType::TypeUsage,
            3 => EdgeType::Usage,
            4 => EdgeType::Call,
            5 => EdgeType::Inheritance,
            6 => EdgeType::Override,
            7 => EdgeType::TemplateSpecialization,
            8 => EdgeType::Include,
            9 => EdgeType::Import,
            10 => EdgeType::MacroUsage,
            11 => EdgeType::Aggregation,
            _ => EdgeType::Undefined,
        }
    }
}

/// What a source location marks within its element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationType {
    Token,
    Scope,
    Qualifier,
    LocalSymbol,
    Signature,
    Error,
}

impl LocationType {
    pub fn to_i64(self) -> i64 {
        match self {
            LocationType::Token => 0,
            LocationType::Scope => 1,
            LocationType::Qualifier => 2,
            LocationType::LocalSymbol => 3,
            LocationType::Signature => 4,
            LocationType::Error => 5,
        }
    }

    pub fn from_i64(value: i64) -> LocationType {
        match value {
            1 => LocationType::Scope,
            2 => LocationType::Qualifier,
            3 => LocationType::LocalSymbol,
            4 => LocationType::Signature,
            5 => LocationType::Error,
            _ => LocationType::Token,
        }
    }
}

/// Access level annotation on a member edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessType {
    None,
    Public,
    Protected,
    Private,
}

impl AccessType {
    pub fn to_i64(self) -> i64 {
        match self {
            AccessType::None => 0,
            AccessType::Public => 1,
            AccessType::Protected => 2,
            AccessType::Private => 3,
        }
    }

    pub fn from_i64(value: i64) -> AccessType {
        match value {
            1 => AccessType::Public,
            2 => AccessType::Protected,
            3 => AccessType::Private,
            _ => AccessType::None,
        }
    }
}

/// Node row: a named symbol or a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageNode {
    pub id: Id,
    pub node_type: NodeType,
    /// Canonical, opaque string form of the fully-qualified name
    pub serialized_name: String,
    pub definition_type: DefinitionType,
}

impl StorageNode {
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Edge row: a typed directed relation between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEdge {
    pub id: Id,
    pub edge_type: EdgeType,
    pub source_node_id: Id,
    pub target_node_id: Id,
}

impl StorageEdge {
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// File row: a node specialization holding path, content and line count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageFile {
    pub id: Id,
    pub path: String,
    pub modification_time: String,
    pub content: String,
    /// Line count of `content`
    pub loc: i64,
}

impl StorageFile {
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Function-local identifier outside the global graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageLocalSymbol {
    pub id: Id,
    pub name: String,
}

impl StorageLocalSymbol {
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Textual range attached to an element, located in a file
///
/// Lines and columns are 1-based; the end position is inclusive of the
/// final character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSourceLocation {
    pub id: Id,
    pub element_id: Id,
    pub file_node_id: Id,
    pub start_line: i64,
    pub start_column: i64,
    pub end_line: i64,
    pub end_column: i64,
    pub location_type: LocationType,
}

impl StorageSourceLocation {
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Access level attached to a member edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageComponentAccess {
    pub id: Id,
    pub edge_id: Id,
    pub access_type: AccessType,
}

impl StorageComponentAccess {
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Comment range in a file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageCommentLocation {
    pub id: Id,
    pub file_node_id: Id,
    pub start_line: i64,
    pub start_column: i64,
    pub end_line: i64,
    pub end_column: i64,
}

impl StorageCommentLocation {
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Analysis diagnostic persisted alongside the graph
///
/// Rows are unique on `(message, fatal, file_path, line, column)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageError {
    pub id: Id,
    pub message: String,
    pub fatal: bool,
    pub file_path: String,
    pub line_number: i64,
    pub column_number: i64,
}

impl StorageError {
    pub fn is_valid(&self) -> bool {
        self.id != 0
    }
}

/// Resolved full-text search hit: a 1-based, end-inclusive range in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseLocation {
    pub file_path: String,
    pub start_line: i64,
    pub start_column: i64,
    pub end_line: i64,
    pub end_column: i64,
}

/// Aggregate counts over the store, displayed after indexing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StorageStats {
    pub node_count: i64,
    pub edge_count: i64,
    pub file_count: i64,
    pub file_loc_count: i64,
    pub source_location_count: i64,
}

/// Error counts split into total and fatal
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ErrorCountInfo {
    pub total: i64,
    pub fatal: i64,
}
