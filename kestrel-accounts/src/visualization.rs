//! Graph export of the authority tree.
//!
//! Builds a directed graph rooted at the registry root, one vertex per
//! account carrying its address and role string, one edge per
//! parent/child link, and renders it in the DOT language so standard
//! graph tooling can draw it.

use std::collections::BTreeSet;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::debug;

use kestrel_chain::transparent::Address;

use crate::db::AccountDb;

#[derive(Clone, Debug)]
struct VertexProperties {
    address: String,
    roles: String,
}

/// A snapshot of the account tree as a renderable graph.
pub struct AccountGraph {
    graph: DiGraph<VertexProperties, ()>,
}

impl AccountGraph {
    /// Walk the registry from its root, collecting vertices and edges.
    /// Accounts unreachable from the root are not drawn.
    pub fn from_db(db: &AccountDb) -> AccountGraph {
        let mut graph = AccountGraph {
            graph: DiGraph::new(),
        };

        debug!(accounts = db.len(), "building account graph");
        if let Some(root) = db.root_address() {
            let properties = VertexProperties {
                address: root.to_string(),
                roles: db
                    .account(root)
                    .map(|account| account.roles().to_string())
                    .unwrap_or_else(|| "......".to_string()),
            };
            let root_node = graph.graph.add_node(properties);

            let mut visited = BTreeSet::new();
            visited.insert(*root);
            if let Some(account) = db.account(root) {
                graph.add_children(db, account.children(), root_node, &mut visited);
            }
        }
        graph
    }

    fn add_children(
        &mut self,
        db: &AccountDb,
        children: &[Address],
        parent_node: NodeIndex,
        visited: &mut BTreeSet<Address>,
    ) {
        for child in children {
            // a corrupt registry could loop; draw each account once
            if !visited.insert(*child) {
                continue;
            }
            let account = match db.account(child) {
                Some(account) => account,
                None => continue,
            };
            let child_node = self.graph.add_node(VertexProperties {
                address: child.to_string(),
                roles: account.roles().to_string(),
            });
            self.graph.add_edge(parent_node, child_node, ());

            if !account.children().is_empty() {
                self.add_children(db, account.children(), child_node, visited);
            }
        }
    }

    /// The number of accounts drawn.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Render the graph in the DOT language, labelling each vertex with
    /// its address and role string.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph G {\n");
        for node in self.graph.node_indices() {
            let properties = &self.graph[node];
            out.push_str(&format!(
                "{} [address=\"{}\"] [label=\"{}\"];\n",
                node.index(),
                properties.address,
                properties.roles,
            ));
        }
        for edge in self.graph.edge_references() {
            out.push_str(&format!(
                "{} -> {};\n",
                edge.source().index(),
                edge.target().index(),
            ));
        }
        out.push_str("}\n");
        out
    }
}
