//! Search match value types
//!
//! A [`SearchMatch`] is one entry of a search result list: the matched
//! text, which kind of search produced it, and the character indices the
//! query hit (used for highlight underlines).

use serde::{Deserialize, Serialize};

use crate::storage::NodeType;

/// Which facility produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchType {
    None,
    Token,
    Command,
    Operator,
    Fulltext,
}

/// Built-in commands offered through the search field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandType {
    All,
    Error,
}

/// Name of a search type; total over all variants
pub fn search_type_name(search_type: SearchType) -> &'static str {
    match search_type {
        SearchType::None => "none",
        SearchType::Token => "token",
        SearchType::Command => "command",
        SearchType::Operator => "operator",
        SearchType::Fulltext => "fulltext",
    }
}

/// Name of a built-in command
pub fn command_name(command_type: CommandType) -> &'static str {
    match command_type {
        CommandType::All => "overview",
        CommandType::Error => "error",
    }
}

/// One entry of a search result list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    pub text: String,
    pub node_type: NodeType,
    pub search_type: SearchType,
    /// Character indices of `text` hit by the query
    pub indices: Vec<usize>,
}

impl SearchMatch {
    pub fn new(query: &str) -> SearchMatch {
        SearchMatch {
            text: query.to_string(),
            node_type: NodeType::Undefined,
            search_type: SearchType::None,
            indices: Vec::new(),
        }
    }

    /// Build a match for a built-in command
    pub fn create_command(command_type: CommandType) -> SearchMatch {
        SearchMatch {
            text: command_name(command_type).to_string(),
            node_type: NodeType::Undefined,
            search_type: SearchType::Command,
            indices: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.search_type != SearchType::None
    }

    pub fn search_type_name(&self) -> &'static str {
        search_type_name(self.search_type)
    }

    /// Render the match with caret underlines at the hit indices
    pub fn print(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.text);
        out.push('\n');
        out.push('\t');
        let mut cursor = 0;
        for &index in &self.indices {
            while cursor < index {
                out.push(' ');
                cursor += 1;
            }
            out.push('^');
            cursor += 1;
        }
        out.push('\n');
        out
    }
}

/// Log a result list for diagnostics
pub fn log_matches(matches: &[SearchMatch], query: &str) {
    let mut rendered = String::new();
    for m in matches {
        rendered.push_str(&m.print());
    }
    tracing::info!("{} matches for \"{}\":\n{}", matches.len(), query, rendered);
}
