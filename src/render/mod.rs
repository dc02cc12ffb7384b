//! Render sinks for classified snapshots.
//!
//! The classifier hands over attribute columns and per-node cells tagged with
//! a group id. Sinks only use the group id to decide how a cell is marked;
//! they know nothing about what the values mean.

use crate::classify::Snapshot;
use std::io::{self, Write};

/// Receives every snapshot the scheduler produces
pub trait RenderSink {
    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()>;
}

/// Plain-text table, one block per attribute with one line per node.
///
/// Nodes outside group 0 are flagged with `*` so disagreement stands out.
pub struct TableRenderer<W: Write> {
    out: W,
}

impl<W: Write> TableRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for TableRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let divergent = snapshot
            .attributes
            .iter()
            .filter(|attr| snapshot.is_divergent(**attr))
            .count();
        writeln!(
            self.out,
            "=== {} nodes, {} attributes, {} divergent ===",
            snapshot.nodes.len(),
            snapshot.attributes.len(),
            divergent
        )?;

        let id_width = snapshot.nodes.iter().map(|row| row.node_id.len()).max().unwrap_or(0);

        for &attr in &snapshot.attributes {
            if snapshot.is_divergent(attr) {
                writeln!(self.out, "{} [{} values]", attr, snapshot.group_count(attr))?;
            } else {
                writeln!(self.out, "{} [agree]", attr)?;
            }

            for row in &snapshot.nodes {
                let Some(cell) = row.cells.get(&attr) else { continue };
                let marker = if cell.group == 0 { ' ' } else { '*' };
                let text = cell.value.to_string();
                let mut lines = text.lines();
                let first = lines.next().unwrap_or("");
                writeln!(
                    self.out,
                    "  {}{:<width$} [{}] {}",
                    marker,
                    row.node_id,
                    cell.group,
                    first,
                    width = id_width
                )?;
                for line in lines {
                    writeln!(self.out, "  {:width$}     {}", "", line, width = id_width + 1)?;
                }
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

/// One JSON document per snapshot, one per line
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for JsonRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<R: RenderSink + ?Sized> RenderSink for Box<R> {
    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        (**self).render(snapshot)
    }
}
