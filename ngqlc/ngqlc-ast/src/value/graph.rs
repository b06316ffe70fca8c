//! Graph entities: vertices, edges and paths.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub props: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub vid: Value,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub src: Value,
    pub dst: Value,
    /// Negative means the reverse direction of the edge type `-etype`.
    pub etype: i32,
    pub name: String,
    pub ranking: i64,
    pub props: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub dst: Vertex,
    pub etype: i32,
    pub name: String,
    pub ranking: i64,
    pub props: IndexMap<String, Value>,
}

/// A walk: a source vertex plus zero or more steps. A zero-length path is a
/// single vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub src: Vertex,
    pub steps: Vec<Step>,
}

impl Vertex {
    pub fn new(vid: Value, tags: Vec<Tag>) -> Vertex {
        Vertex { vid, tags }
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    /// Properties flattened across tags in tag-insertion order; a later tag
    /// overrides an earlier one on key conflict.
    pub fn flat_props(&self) -> IndexMap<&str, &Value> {
        let mut props = IndexMap::new();
        for tag in &self.tags {
            for (k, v) in &tag.props {
                props.insert(k.as_str(), v);
            }
        }
        props
    }
}

// Tag multiplicity is unordered for equality purposes.
impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.vid == other.vid
            && self.tags.len() == other.tags.len()
            && self.tags.iter().all(|t| other.tags.contains(t))
    }
}

impl Edge {
    pub fn new(src: Value, dst: Value, etype: i32, name: &str, ranking: i64) -> Edge {
        Edge {
            src,
            dst,
            etype,
            name: name.to_string(),
            ranking,
            props: IndexMap::new(),
        }
    }

    pub fn is_reversed(&self) -> bool {
        self.etype < 0
    }

    pub fn reverse(&self) -> Edge {
        Edge {
            src: self.dst.clone(),
            dst: self.src.clone(),
            etype: -self.etype,
            name: self.name.clone(),
            ranking: self.ranking,
            props: self.props.clone(),
        }
    }

    /// The positive-type orientation used for comparison and equality.
    pub fn canonicalized(&self) -> Edge {
        if self.is_reversed() {
            self.reverse()
        } else {
            self.clone()
        }
    }
}

impl Step {
    pub fn to_edge(&self, src: &Vertex) -> Edge {
        Edge {
            src: src.vid.clone(),
            dst: self.dst.vid.clone(),
            etype: self.etype,
            name: self.name.clone(),
            ranking: self.ranking,
            props: self.props.clone(),
        }
    }
}

impl Path {
    pub fn new(src: Vertex) -> Path {
        Path {
            src,
            steps: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// `src` plus every step destination: `len() + 1` vertices.
    pub fn nodes(&self) -> Vec<&Vertex> {
        let mut nodes = Vec::with_capacity(self.steps.len() + 1);
        nodes.push(&self.src);
        nodes.extend(self.steps.iter().map(|s| &s.dst));
        nodes
    }

    /// Edges reconstructed from consecutive vertices.
    pub fn relationships(&self) -> Vec<Edge> {
        let mut rels = Vec::with_capacity(self.steps.len());
        let mut cur = &self.src;
        for step in &self.steps {
            rels.push(step.to_edge(cur));
            cur = &step.dst;
        }
        rels
    }

    pub fn reversed(&self) -> Path {
        let mut nodes = self.nodes().into_iter().cloned().collect::<Vec<_>>();
        nodes.reverse();
        let mut rev = Path::new(nodes[0].clone());
        let steps_rev = self.steps.iter().rev();
        for (step, dst) in steps_rev.zip(nodes.into_iter().skip(1)) {
            rev.steps.push(Step {
                dst,
                etype: -step.etype,
                name: step.name.clone(),
                ranking: step.ranking,
                props: step.props.clone(),
            });
        }
        rev
    }

    pub fn has_duplicate_vertices(&self) -> bool {
        let nodes = self.nodes();
        for (i, a) in nodes.iter().enumerate() {
            if nodes[i + 1..].iter().any(|b| a.vid == b.vid) {
                return true;
            }
        }
        false
    }

    pub fn has_duplicate_edges(&self) -> bool {
        let rels: Vec<Edge> = self
            .relationships()
            .iter()
            .map(|e| e.canonicalized())
            .collect();
        for (i, a) in rels.iter().enumerate() {
            if rels[i + 1..]
                .iter()
                .any(|b| a.src == b.src && a.dst == b.dst && a.etype == b.etype && a.ranking == b.ranking)
            {
                return true;
            }
        }
        false
    }
}

fn write_props(f: &mut Formatter<'_>, props: &IndexMap<String, Value>) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (k, v)) in props.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{k}: {v}")?;
    }
    write!(f, "}}")
}

impl Display for Vertex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.vid)?;
        for tag in &self.tags {
            write!(f, " :{} ", tag.name)?;
            write_props(f, &tag.props)?;
        }
        write!(f, ")")
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[:{} {}->{} @{} ",
            self.name, self.src, self.dst, self.ranking
        )?;
        write_props(f, &self.props)?;
        write!(f, "]")
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.src)?;
        let mut prev = &self.src;
        for step in &self.steps {
            let e = step.to_edge(prev);
            if step.etype < 0 {
                write!(f, "<-{e}-")?;
            } else {
                write!(f, "-{e}->")?;
            }
            write!(f, "{}", step.dst)?;
            prev = &step.dst;
        }
        Ok(())
    }
}
