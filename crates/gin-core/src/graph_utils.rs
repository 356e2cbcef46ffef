use crate::{BusId, GinResult, GridModel, LineKey};
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashSet, VecDeque};

/// Connected components of the active topology, used to explain why an
/// interdiction sheds load (an islanded bus without generation).
#[derive(Debug, Clone, PartialEq)]
pub struct IslandAnalysis {
    /// Buses per island, islands ordered by their lowest bus
    pub islands: Vec<Vec<BusId>>,
    /// Island index per bus
    pub assignments: Vec<usize>,
}

impl IslandAnalysis {
    pub fn count(&self) -> usize {
        self.islands.len()
    }

    pub fn is_connected(&self) -> bool {
        self.islands.len() <= 1
    }

    pub fn island_of(&self, bus: BusId) -> Option<usize> {
        self.assignments.get(bus.value()).copied()
    }
}

/// Build a petgraph view of the model with the given line positions removed.
///
/// Node `i` carries `BusId(i)`, edges carry the line position.
pub fn active_graph(model: &GridModel, disabled: &HashSet<usize>) -> UnGraph<BusId, usize> {
    let mut graph = UnGraph::with_capacity(model.num_buses(), model.num_lines());
    for bus in model.buses() {
        graph.add_node(bus);
    }
    for (pos, line) in model.line_records().iter().enumerate() {
        if disabled.contains(&pos) {
            continue;
        }
        graph.add_edge(
            NodeIndex::new(line.from.value()),
            NodeIndex::new(line.to.value()),
            pos,
        );
    }
    graph
}

/// Labels connected components (breadth-first search) of the topology left
/// after removing `disabled` lines.
pub fn islands(model: &GridModel, disabled: &[LineKey]) -> GinResult<IslandAnalysis> {
    let disabled: HashSet<usize> = model.resolve_lines(disabled.iter().copied())?.into_iter().collect();
    let graph = active_graph(model, &disabled);

    let mut assignments = vec![usize::MAX; graph.node_count()];
    let mut islands = Vec::new();
    for start in graph.node_indices() {
        if assignments[start.index()] != usize::MAX {
            continue;
        }
        let island_id = islands.len();
        let mut members = Vec::new();
        let mut queue = VecDeque::from([start]);
        assignments[start.index()] = island_id;
        while let Some(node) = queue.pop_front() {
            members.push(graph[node]);
            for neighbor in graph.neighbors(node) {
                if assignments[neighbor.index()] == usize::MAX {
                    assignments[neighbor.index()] = island_id;
                    queue.push_back(neighbor);
                }
            }
        }
        members.sort();
        islands.push(members);
    }

    Ok(IslandAnalysis {
        islands,
        assignments,
    })
}

/// Whether every bus is reachable with all lines in service.
pub fn is_connected(model: &GridModel) -> bool {
    let graph = active_graph(model, &HashSet::new());
    petgraph::algo::connected_components(&graph) <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> GridModel {
        let mut model = GridModel::new(3);
        model.add_line(BusId::new(0), BusId::new(1), 10.0, 100.0).unwrap();
        model.add_line(BusId::new(1), BusId::new(2), 10.0, 100.0).unwrap();
        model.add_line(BusId::new(2), BusId::new(0), 10.0, 100.0).unwrap();
        model
    }

    #[test]
    fn intact_ring_is_one_island() {
        let model = ring();
        let analysis = islands(&model, &[]).unwrap();
        assert!(analysis.is_connected());
        assert_eq!(analysis.islands[0], model.buses());
        assert!(is_connected(&model));
    }

    #[test]
    fn cutting_two_lines_isolates_bus() {
        let model = ring();
        let analysis = islands(&model, &[LineKey::between(0, 1), LineKey::between(2, 0)]).unwrap();
        assert_eq!(analysis.count(), 2);
        assert_eq!(analysis.islands[0], vec![BusId::new(0)]);
        assert_eq!(analysis.islands[1], vec![BusId::new(1), BusId::new(2)]);
        assert_eq!(analysis.island_of(BusId::new(2)), Some(1));
    }

    #[test]
    fn unknown_line_is_rejected() {
        let model = ring();
        assert!(islands(&model, &[LineKey::between(0, 9)]).is_err());
    }

    #[test]
    fn isolated_buses_count_as_islands() {
        let model = GridModel::new(3);
        assert!(!is_connected(&model));
        assert_eq!(islands(&model, &[]).unwrap().count(), 3);
    }
}
