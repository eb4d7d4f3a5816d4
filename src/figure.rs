//! Plotly-compatible figure built from a [`Layout`].
//!
//! Every drawable relationship becomes a grey line trace and every placed
//! person a marker with its label as hover text. The figure serializes to the
//! JSON that `Plotly.newPlot` accepts, or to a script assigning it to the
//! `graphJSON` global.

use serde::Serialize;

use crate::error::Error;
use crate::layout::Layout;

pub const EDGE_COLOR: &str = "rgb(210,210,210)";
const EDGE_WIDTH: u32 = 1;
const MARKER_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: FigureLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureLayout {
    pub showlegend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    /// `None` breaks the line, as plotly expects after each segment.
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<TextPosition>,
    pub hoverinfo: HoverInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Mode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers+text")]
    MarkersText,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TextPosition {
    #[serde(rename = "top center")]
    TopCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverInfo {
    Skip,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub color: &'static str,
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub size: u32,
}

pub fn build(layout: &Layout) -> Figure {
    let edges = layout.drawable_edges().map(|(from, to)| Trace {
        kind: TraceKind::Scatter,
        x: vec![Some(from.x), Some(to.x), None],
        y: vec![Some(from.y), Some(to.y), None],
        mode: Mode::Lines,
        line: Some(Line {
            color: EDGE_COLOR,
            width: EDGE_WIDTH,
        }),
        marker: None,
        text: None,
        textposition: None,
        hoverinfo: HoverInfo::Skip,
    });

    let nodes = layout.nodes.iter().map(|node| Trace {
        kind: TraceKind::Scatter,
        x: vec![Some(node.x)],
        y: vec![Some(node.y)],
        mode: Mode::MarkersText,
        line: None,
        marker: Some(Marker { size: MARKER_SIZE }),
        text: Some(node.label()),
        textposition: Some(TextPosition::TopCenter),
        hoverinfo: HoverInfo::Text,
    });

    Figure {
        data: edges.chain(nodes).collect(),
        layout: FigureLayout { showlegend: false },
    }
}

pub fn to_json(figure: &Figure) -> Result<String, Error> {
    Ok(serde_json::to_string(figure)?)
}

/// `var graphJSON = <figure>;`, ready to be loaded by a page before plotting.
pub fn to_script(figure: &Figure) -> Result<String, Error> {
    Ok(format!("var graphJSON = {};", to_json(figure)?))
}
