//! The workflow compiler: validates a [`Workflow`] and produces an
//! [`ExecutionGraph`] annotated with loop analysis.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use prana_core::{ActionType, NodeId, PortName};
use prana_error::{EngineError, ErrorKind};

use crate::graph::ExecutionGraph;
use crate::model::{Connection, LoopRole, Workflow};

/// What the compiler needs to know about an action's declared ports in
/// order to validate connections. Implemented by the integration registry
/// one layer up (`prana-engine`), keeping this crate free of a dependency
/// on the action crate.
pub trait PortCatalog {
    /// Declared output ports, or `None` if the action type is unknown to
    /// the catalog (port validation is skipped in that case — action
    /// existence is checked separately, at execution time).
    fn output_ports(&self, action_type: &ActionType) -> Option<Vec<PortName>>;
    fn input_ports(&self, action_type: &ActionType) -> Option<Vec<PortName>>;
}

/// A catalog that accepts any port on any action type — useful for
/// compiling workflows before their actions are registered, and in tests.
pub struct PermissiveCatalog;

impl PortCatalog for PermissiveCatalog {
    fn output_ports(&self, _action_type: &ActionType) -> Option<Vec<PortName>> {
        None
    }

    fn input_ports(&self, _action_type: &ActionType) -> Option<Vec<PortName>> {
        None
    }
}

fn is_dynamic(ports: &[PortName]) -> bool {
    ports.iter().any(|p| p.as_str() == "*")
}

/// Compile `workflow` into an [`ExecutionGraph`], or fail with a
/// validation error.
pub fn compile(workflow: &Workflow, catalog: &dyn PortCatalog) -> Result<ExecutionGraph, EngineError> {
    let mut node_map: IndexMap<NodeId, crate::model::Node> = IndexMap::new();
    for node in &workflow.nodes {
        if node_map.insert(node.key.clone(), node.clone()).is_some() {
            return Err(EngineError::new(ErrorKind::DuplicateNodeKey, format!("duplicate node key '{}'", node.key)));
        }
    }

    let trigger_node_key = find_trigger(&workflow.nodes, &workflow.connections)?;

    for conn in &workflow.connections {
        validate_connection(conn, &node_map, catalog)?;
    }

    let mut connection_map: HashMap<(NodeId, PortName), Vec<Connection>> = HashMap::new();
    let mut reverse_connection_map: HashMap<NodeId, Vec<Connection>> = HashMap::new();
    let mut dependency_graph: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();

    for conn in &workflow.connections {
        connection_map.entry((conn.from.clone(), conn.from_port.clone())).or_default().push(conn.clone());
        reverse_connection_map.entry(conn.to.clone()).or_default().push(conn.clone());
        dependency_graph.entry(conn.to.clone()).or_default().insert(conn.from.clone());
    }

    let mut node_map = node_map;
    annotate_loops(&mut node_map, &workflow.connections);

    Ok(ExecutionGraph {
        workflow_id: workflow.id.clone(),
        version: workflow.version,
        trigger_node_key,
        node_map,
        connection_map,
        reverse_connection_map,
        dependency_graph,
        variables: workflow.variables.clone(),
    })
}

fn validate_connection(
    conn: &Connection,
    node_map: &IndexMap<NodeId, crate::model::Node>,
    catalog: &dyn PortCatalog,
) -> Result<(), EngineError> {
    let source = node_map
        .get(&conn.from)
        .ok_or_else(|| EngineError::new(ErrorKind::DanglingConnection, format!("connection references unknown source node '{}'", conn.from)))?;
    let target = node_map
        .get(&conn.to)
        .ok_or_else(|| EngineError::new(ErrorKind::DanglingConnection, format!("connection references unknown target node '{}'", conn.to)))?;

    if let Some(output_ports) = catalog.output_ports(&source.action_type) {
        if !is_dynamic(&output_ports) && !output_ports.contains(&conn.from_port) {
            return Err(EngineError::new(ErrorKind::UnknownPort, format!("'{}' does not declare output port '{}'", source.action_type, conn.from_port)));
        }
    }
    if let Some(input_ports) = catalog.input_ports(&target.action_type) {
        if !is_dynamic(&input_ports) && !input_ports.contains(&conn.to_port) {
            return Err(EngineError::new(ErrorKind::UnknownPort, format!("'{}' does not declare input port '{}'", target.action_type, conn.to_port)));
        }
    }
    Ok(())
}

fn find_trigger(nodes: &[crate::model::Node], connections: &[Connection]) -> Result<NodeId, EngineError> {
    let targets: HashSet<&NodeId> = connections.iter().map(|c| &c.to).collect();
    let roots: Vec<&NodeId> = nodes.iter().map(|n| &n.key).filter(|key| !targets.contains(key)).collect();
    match roots.as_slice() {
        [] => Err(EngineError::new(ErrorKind::NoTrigger, "workflow has no trigger node")),
        [only] => Ok((*only).clone()),
        many => Err(EngineError::new(
            ErrorKind::MultipleTriggers,
            format!("workflow has {} candidate trigger nodes", many.len()),
        )),
    }
}

/// Detect strongly connected components (loops) via Tarjan's algorithm and
/// write `loop_level`/`loop_role`/`loop_ids` into each participating
/// node's metadata.
///
/// A loop's node set is probed for a strictly smaller loop nested inside it
/// by removing each member in turn and re-running the component search on
/// what remains; whatever smaller loops that turns up are probed again the
/// same way, so nesting is discovered to whatever depth the graph actually
/// has rather than being capped at one level. `loop_level` for a given loop
/// is `1 + ` the number of discovered loops whose node set strictly
/// contains it.
fn annotate_loops(node_map: &mut IndexMap<NodeId, crate::model::Node>, connections: &[Connection]) {
    let keys: Vec<NodeId> = node_map.keys().cloned().collect();
    let edges: Vec<(NodeId, NodeId)> = connections.iter().map(|c| (c.from.clone(), c.to.clone())).collect();

    let top_level = find_looping_components(&keys, &edges);
    if top_level.is_empty() {
        return;
    }

    let mut all_loops: Vec<HashSet<NodeId>> = Vec::new();
    let mut seen: HashSet<Vec<NodeId>> = HashSet::new();
    let mut frontier = top_level;
    while let Some(members) = frontier.pop() {
        let mut sorted: Vec<NodeId> = members.iter().cloned().collect();
        sorted.sort();
        if !seen.insert(sorted) {
            continue;
        }

        let mut member_keys: Vec<&NodeId> = members.iter().collect();
        member_keys.sort();
        for removed in &member_keys {
            let reduced_keys: Vec<NodeId> = members.iter().filter(|k| k != removed).cloned().collect();
            let reduced_edges: Vec<(NodeId, NodeId)> = edges
                .iter()
                .filter(|(a, b)| members.contains(a) && members.contains(b) && a != *removed && b != *removed)
                .cloned()
                .collect();
            for nested in find_looping_components(&reduced_keys, &reduced_edges) {
                if nested.len() < members.len() {
                    frontier.push(nested);
                }
            }
        }

        all_loops.push(members);
    }

    let levels: Vec<u32> = all_loops
        .iter()
        .map(|members| {
            let containing_supersets = all_loops.iter().filter(|other| other.len() > members.len() && members.is_subset(other)).count();
            1 + u32::try_from(containing_supersets).unwrap_or(u32::MAX)
        })
        .collect();

    for key in &keys {
        let containing: Vec<usize> = (0..all_loops.len()).filter(|&i| all_loops[i].contains(key)).collect();
        if containing.is_empty() {
            continue;
        }
        let max_level = containing.iter().map(|&i| levels[i]).max().unwrap_or(1);
        let deepest = *containing.iter().filter(|&&i| levels[i] == max_level).max_by_key(|&&i| all_loops[i].len()).unwrap();

        let mut sorted_members: Vec<&NodeId> = all_loops[deepest].iter().collect();
        sorted_members.sort();
        let role = if sorted_members.first() == Some(&key) {
            LoopRole::StartLoop
        } else if sorted_members.last() == Some(&key) {
            LoopRole::EndLoop
        } else {
            LoopRole::InLoop
        };

        let loop_ids: Vec<String> = containing.iter().map(|&i| format!("loop_{i}")).collect();
        if let Some(node) = node_map.get_mut(key) {
            node.set_loop_metadata(max_level, role, loop_ids);
        }
    }
}

/// Strongly connected components with `|V| > 1`, plus single-node
/// components with a self-edge.
fn find_looping_components(keys: &[NodeId], edges: &[(NodeId, NodeId)]) -> Vec<HashSet<NodeId>> {
    let mut graph = DiGraph::<NodeId, ()>::new();
    let mut index_of: HashMap<NodeId, NodeIndex> = HashMap::new();
    for key in keys {
        index_of.insert(key.clone(), graph.add_node(key.clone()));
    }
    let mut has_self_edge: HashSet<NodeId> = HashSet::new();
    for (from, to) in edges {
        if let (Some(&a), Some(&b)) = (index_of.get(from), index_of.get(to)) {
            graph.add_edge(a, b, ());
            if from == to {
                has_self_edge.insert(from.clone());
            }
        }
    }

    tarjan_scc(&graph)
        .into_iter()
        .filter_map(|component| {
            let members: HashSet<NodeId> = component.into_iter().map(|idx| graph[idx].clone()).collect();
            if members.len() > 1 || members.iter().any(|m| has_self_edge.contains(m)) {
                Some(members)
            } else {
                None
            }
        })
        .collect()
}
