//! Lineage reconstruction over `related_entries`.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use librarian_core::confidence::ConfidenceValue;
use librarian_core::errors::LibrarianResult;
use librarian_core::models::{EvidenceChain, EvidenceEntry, EvidenceId, EvidenceKind};

/// Walk the `related_entries` graph from `root` and aggregate.
///
/// Chain confidence is the AND-combination over every chain member carrying
/// a confidence — a lineage is only as trustworthy as its weakest link.
/// Members without confidence contribute nothing (Absent identity).
pub fn reconstruct(root: EvidenceId, entries: &[EvidenceEntry]) -> LibrarianResult<EvidenceChain> {
    let by_id: HashMap<EvidenceId, &EvidenceEntry> =
        entries.iter().map(|e| (e.id, e)).collect();

    let mut graph: DiGraph<EvidenceId, ()> = DiGraph::new();
    let mut nodes: HashMap<EvidenceId, NodeIndex> = HashMap::new();

    // Build the reachable subgraph breadth-first. Dangling references are
    // tolerated — the ledger may have been filtered upstream.
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        if nodes.contains_key(&id) {
            continue;
        }
        let node = graph.add_node(id);
        nodes.insert(id, node);
        if let Some(entry) = by_id.get(&id) {
            for related in &entry.related_entries {
                queue.push_back(*related);
            }
        }
    }
    for (&id, &node) in &nodes {
        if let Some(entry) = by_id.get(&id) {
            for related in &entry.related_entries {
                if let Some(&target) = nodes.get(related) {
                    graph.add_edge(node, target, ());
                }
            }
        }
    }

    // Collect members in BFS order from the root for a stable listing.
    let mut members: Vec<EvidenceEntry> = Vec::new();
    let mut member_ids: HashSet<EvidenceId> = HashSet::new();
    let mut bfs = Bfs::new(&graph, nodes[&root]);
    while let Some(node) = bfs.next(&graph) {
        let id = graph[node];
        if let Some(entry) = by_id.get(&id) {
            member_ids.insert(id);
            members.push((*entry).clone());
        }
    }

    let mut chain_confidence = ConfidenceValue::absent("no confidence-bearing entries in chain");
    for entry in &members {
        if let Some(confidence) = &entry.confidence {
            chain_confidence = chain_confidence.and_combine(confidence);
        }
    }

    // Contradiction entries touching any chain member.
    let contradictions: Vec<EvidenceEntry> = entries
        .iter()
        .filter(|e| e.kind == EvidenceKind::Contradiction)
        .filter(|e| {
            member_ids.contains(&e.id)
                || e.related_entries.iter().any(|r| member_ids.contains(r))
        })
        .cloned()
        .collect();

    Ok(EvidenceChain {
        root,
        entries: members,
        chain_confidence,
        contradictions,
    })
}
