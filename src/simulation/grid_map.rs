//! Road grid for pathfinding and move legality
//!
//! The grid is a directed graph: every road cell is a node and every
//! permitted single-cell move is an edge. Two-way streets carry an edge in
//! each direction, one-way streets only one.

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use petgraph::Direction as EdgeDirection;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write;

use super::error::{MapError, MapResult};
use super::types::{Cell, RoadSegment};

/// Collects roads, edges and signals before validating them into a `GridMap`
#[derive(Debug, Clone)]
pub struct GridMapBuilder {
    rows: i32,
    cols: i32,
    exits: BTreeMap<Cell, BTreeSet<Cell>>,
    signals: BTreeMap<Cell, u8>,
}

impl GridMapBuilder {
    pub fn new(rows: i32, cols: i32) -> Self {
        Self {
            rows,
            cols,
            exits: BTreeMap::new(),
            signals: BTreeMap::new(),
        }
    }

    /// Mark a cell as road without giving it any exits
    pub fn add_road(&mut self, cell: Cell) -> &mut Self {
        self.exits.entry(cell).or_default();
        self
    }

    /// Add a one-way edge; both cells become roads
    pub fn connect(&mut self, from: Cell, to: Cell) -> &mut Self {
        self.exits.entry(from).or_default().insert(to);
        self.exits.entry(to).or_default();
        self
    }

    pub fn connect_two_way(&mut self, a: Cell, b: Cell) -> &mut Self {
        self.connect(a, b);
        self.connect(b, a)
    }

    pub fn set_signal(&mut self, cell: Cell, group: u8) -> &mut Self {
        self.signals.insert(cell, group);
        self
    }

    pub fn build(&self) -> MapResult<GridMap> {
        if self.rows < 1 || self.cols < 1 {
            return Err(MapError::Empty);
        }

        let in_bounds = |cell: &Cell| {
            (1..=self.rows).contains(&cell.x) && (1..=self.cols).contains(&cell.y)
        };

        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for cell in self.exits.keys() {
            if !in_bounds(cell) {
                return Err(MapError::OutOfBounds(*cell));
            }
            nodes.insert(*cell, graph.add_node(*cell));
        }

        for (from, exits) in &self.exits {
            for to in exits {
                if !from.is_adjacent(to) {
                    return Err(MapError::NotAdjacent { from: *from, to: *to });
                }
                graph.add_edge(nodes[from], nodes[to], 1u32);
            }
        }

        for (cell, group) in &self.signals {
            if !nodes.contains_key(cell) {
                return Err(MapError::SignalOffRoad(*cell));
            }
            if *group == 0 {
                return Err(MapError::InvalidSignalGroup { cell: *cell, group: *group });
            }
        }

        Ok(GridMap {
            rows: self.rows,
            cols: self.cols,
            graph,
            nodes,
            signals: self.signals.clone(),
        })
    }
}

/// Immutable road topology shared by every engine component
#[derive(Debug, Clone)]
pub struct GridMap {
    rows: i32,
    cols: i32,

    /// Road cells as nodes, permitted moves as unit-weight edges
    graph: DiGraph<Cell, u32>,

    /// Maps road cells to their node indices in the graph
    nodes: HashMap<Cell, NodeIndex>,

    /// Signal group of every signal-bearing cell
    signals: BTreeMap<Cell, u8>,
}

impl GridMap {
    pub fn builder(rows: i32, cols: i32) -> GridMapBuilder {
        GridMapBuilder::new(rows, cols)
    }

    /// Generate a square city grid with a street every `spacing` cells.
    ///
    /// Vertical streets are two-way. Horizontal streets cycle through
    /// two-way, one-way east, two-way, one-way west. Every crossing carries a
    /// signal; neighbouring crossings sit in different groups.
    pub fn demo(size: i32, spacing: i32) -> MapResult<GridMap> {
        let size = size.max(2);
        let spacing = spacing.max(1) as usize;

        let mut lines: Vec<i32> = (1..=size).step_by(spacing).collect();
        if lines.last() != Some(&size) {
            lines.push(size);
        }

        let mut builder = GridMapBuilder::new(size, size);

        for &col in &lines {
            for row in 1..size {
                builder.connect_two_way(Cell::new(row, col), Cell::new(row + 1, col));
            }
        }

        for (k, &row) in lines.iter().enumerate() {
            for col in 1..size {
                let west = Cell::new(row, col);
                let east = Cell::new(row, col + 1);
                match k % 4 {
                    1 => {
                        builder.connect(west, east);
                    }
                    3 => {
                        builder.connect(east, west);
                    }
                    _ => {
                        builder.connect_two_way(west, east);
                    }
                }
            }
        }

        for (kr, &row) in lines.iter().enumerate() {
            for (kc, &col) in lines.iter().enumerate() {
                builder.set_signal(Cell::new(row, col), ((kr + kc) % 2) as u8 + 1);
            }
        }

        builder.build()
    }

    /// (max x, max y), i.e. (rows, columns)
    pub fn bounds(&self) -> (i32, i32) {
        (self.rows, self.cols)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        (1..=self.rows).contains(&cell.x) && (1..=self.cols).contains(&cell.y)
    }

    pub fn is_road(&self, cell: Cell) -> bool {
        self.nodes.contains_key(&cell)
    }

    fn has_edge(&self, from: Cell, to: Cell) -> bool {
        match (self.nodes.get(&from), self.nodes.get(&to)) {
            (Some(a), Some(b)) => self.graph.contains_edge(*a, *b),
            _ => false,
        }
    }

    /// True if a single-cell move from `from` to `to` is allowed by the road
    /// layout
    pub fn permits(&self, from: Cell, to: Cell) -> bool {
        from.is_adjacent(&to) && self.has_edge(from, to)
    }

    /// True when the reverse of `from -> to` exists but the move itself does
    /// not, i.e. the move would go the wrong way down a one-way street
    pub fn is_wrong_way(&self, from: Cell, to: Cell) -> bool {
        !self.has_edge(from, to) && self.has_edge(to, from)
    }

    /// A road is one-way when any edge touching it has no reverse edge
    pub fn is_one_way(&self, cell: Cell) -> bool {
        let Some(&node) = self.nodes.get(&cell) else {
            return false;
        };
        let outgoing = self
            .graph
            .neighbors_directed(node, EdgeDirection::Outgoing)
            .any(|other| !self.graph.contains_edge(other, node));
        let incoming = self
            .graph
            .neighbors_directed(node, EdgeDirection::Incoming)
            .any(|other| !self.graph.contains_edge(node, other));
        outgoing || incoming
    }

    /// Cells reachable in one move from `cell`, sorted
    pub fn exits(&self, cell: Cell) -> Vec<Cell> {
        let mut exits: Vec<Cell> = self
            .nodes
            .get(&cell)
            .map(|node| self.graph.neighbors(*node).map(|n| self.graph[n]).collect())
            .unwrap_or_default();
        exits.sort();
        exits
    }

    pub fn signal_group(&self, cell: Cell) -> Option<u8> {
        self.signals.get(&cell).copied()
    }

    /// Signal-bearing cells with their group, in cell order
    pub fn signal_cells(&self) -> impl Iterator<Item = (Cell, u8)> + '_ {
        self.signals.iter().map(|(cell, group)| (*cell, *group))
    }

    /// All road cells in cell order
    pub fn road_cells(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self.nodes.keys().copied().collect();
        cells.sort();
        cells
    }

    pub fn road_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    /// Road segments as served to map clients
    pub fn roads(&self) -> Vec<RoadSegment> {
        self.road_cells()
            .into_iter()
            .map(|cell| RoadSegment {
                x: cell.x,
                y: cell.y,
                one_way: self.is_one_way(cell),
            })
            .collect()
    }

    /// Shortest path from `start` to `end`, both included.
    ///
    /// Every edge costs one, so A* with the Manhattan distance as heuristic
    /// returns the same hop count as a breadth-first search.
    pub fn find_path(&self, start: Cell, end: Cell) -> Option<Vec<Cell>> {
        let start_node = *self.nodes.get(&start)?;
        let end_node = *self.nodes.get(&end)?;

        if start_node == end_node {
            return Some(vec![start]);
        }

        let (_, node_path) = astar(
            &self.graph,
            start_node,
            |node| node == end_node,
            |edge| *edge.weight(),
            |node| self.graph[node].manhattan(&end),
        )?;

        Some(node_path.into_iter().map(|node| self.graph[node]).collect())
    }

    /// Every road cell reachable from `start`, including `start`, sorted
    pub fn reachable_from(&self, start: Cell) -> Vec<Cell> {
        let Some(&start_node) = self.nodes.get(&start) else {
            return Vec::new();
        };

        let mut reachable = Vec::new();
        let mut bfs = Bfs::new(&self.graph, start_node);
        while let Some(node) = bfs.next(&self.graph) {
            reachable.push(self.graph[node]);
        }
        reachable.sort();
        reachable
    }

    /// Text rendering of the road grid: `[_]` road, `[S]` signal, `[X]` blocked
    pub fn render(&self) -> String {
        let mut out = String::new();
        for x in 1..=self.rows {
            for y in 1..=self.cols {
                let cell = Cell::new(x, y);
                let symbol = if self.signals.contains_key(&cell) {
                    "[S]"
                } else if self.is_road(cell) {
                    "[_]"
                } else {
                    "[X]"
                };
                let _ = write!(out, "{symbol} ");
            }
            out.push('\n');
        }
        out
    }
}
