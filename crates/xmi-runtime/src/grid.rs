//! Grid metadata, geometry and topology
//!
//! Buffer-filling accessors take a caller slice, check it against the
//! length the kernel will write, pass it down and hand it back.
//! `describe_grid` assembles a [`Grid`] from buffers it sizes itself.

use crate::catalog::to_usize;
use crate::error::{XmiError, XmiResult};
use crate::ffi::constants::LEN_GRID_TYPE;
use crate::ffi::marshal::{c_buffer_to_string, string_buffer};
use crate::ffi::Arg;
use crate::wrapper::XmiWrapper;
use std::os::raw::{c_double, c_int};

/// Kind of grid, parsed from the kernel's type string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridType {
    /// `rectilinear`, `uniform_rectilinear`, `structured_quadrilateral`
    Structured,
    Vertex,
    Unstructured,
    /// `points` or `scalar`
    Points,
    Other(String),
}

impl GridType {
    pub fn parse(native: &str) -> Self {
        let token = native
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match token.as_str() {
            "rectilinear" | "uniform_rectilinear" | "structured_quadrilateral" => {
                GridType::Structured
            }
            "vertex" => GridType::Vertex,
            "unstructured" => GridType::Unstructured,
            "points" | "scalar" => GridType::Points,
            _ => GridType::Other(native.trim().to_string()),
        }
    }

    /// Whether the grid is described by nodes and faces
    pub fn is_mesh(&self) -> bool {
        matches!(self, GridType::Vertex | GridType::Unstructured)
    }
}

/// Node/face description of a vertex or unstructured grid
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub node_count: i32,
    pub face_count: i32,
    /// Node coordinates, `node_count` each
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Node indices of every face, concatenated
    pub face_nodes: Vec<i32>,
    /// Number of nodes of each face, `face_count` entries
    pub nodes_per_face: Vec<i32>,
}

impl Mesh {
    /// Node indices of face `face`, split out of the flattened buffer
    pub fn face(&self, face: usize) -> Option<&[i32]> {
        let start: usize = self
            .nodes_per_face
            .get(..face)?
            .iter()
            .map(|&n| to_usize(n))
            .sum();
        let len = to_usize(*self.nodes_per_face.get(face)?);
        self.face_nodes.get(start..start + len)
    }
}

/// Layout-specific part of a grid description
#[derive(Debug, Clone, PartialEq)]
pub enum Topology {
    Structured { shape: Vec<i32> },
    Mesh(Mesh),
    /// Nothing beyond rank and size is queried
    Opaque,
}

/// Everything the kernel reports about one grid
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub id: i32,
    pub rank: i32,
    pub grid_type: GridType,
    pub size: i32,
    pub topology: Topology,
}

impl XmiWrapper {
    /// Number of dimensions of a grid
    pub fn get_grid_rank(&mut self, grid: i32) -> XmiResult<i32> {
        self.grid_int("get_grid_rank", grid)
    }

    /// Total number of elements of a grid
    pub fn get_grid_size(&mut self, grid: i32) -> XmiResult<i32> {
        self.grid_int("get_grid_size", grid)
    }

    /// Native grid type string
    pub fn get_grid_type(&mut self, grid: i32) -> XmiResult<String> {
        let mut id: c_int = grid;
        let mut buf = string_buffer(self.len_constant(LEN_GRID_TYPE)?);
        self.invoker.invoke(
            "get_grid_type",
            &mut [Arg::Int(&mut id), Arg::Chars(&mut buf)],
        )?;
        Ok(c_buffer_to_string(&buf))
    }

    /// Parsed grid type
    pub fn grid_type(&mut self, grid: i32) -> XmiResult<GridType> {
        Ok(GridType::parse(&self.get_grid_type(grid)?))
    }

    /// Fill `shape` with the grid's dimensions (`rank` entries)
    pub fn get_grid_shape<'b>(&mut self, grid: i32, shape: &'b mut [i32]) -> XmiResult<&'b mut [i32]> {
        let rank = self.get_grid_rank(grid)?;
        check_capacity(grid, rank, shape.len())?;
        self.grid_ints("get_grid_shape", grid, shape)
    }

    /// Fill `x` with node x-coordinates
    pub fn get_grid_x<'b>(&mut self, grid: i32, x: &'b mut [f64]) -> XmiResult<&'b mut [f64]> {
        self.node_coordinates("get_grid_x", grid, x)
    }

    /// Fill `y` with node y-coordinates
    pub fn get_grid_y<'b>(&mut self, grid: i32, y: &'b mut [f64]) -> XmiResult<&'b mut [f64]> {
        self.node_coordinates("get_grid_y", grid, y)
    }

    /// Fill `z` with node z-coordinates
    pub fn get_grid_z<'b>(&mut self, grid: i32, z: &'b mut [f64]) -> XmiResult<&'b mut [f64]> {
        self.node_coordinates("get_grid_z", grid, z)
    }

    pub fn get_grid_node_count(&mut self, grid: i32) -> XmiResult<i32> {
        self.grid_int("get_grid_node_count", grid)
    }

    pub fn get_grid_face_count(&mut self, grid: i32) -> XmiResult<i32> {
        self.grid_int("get_grid_face_count", grid)
    }

    /// Fill `face_nodes` with the node indices of every face, concatenated
    pub fn get_grid_face_nodes<'b>(
        &mut self,
        grid: i32,
        face_nodes: &'b mut [i32],
    ) -> XmiResult<&'b mut [i32]> {
        let face_count = self.get_grid_face_count(grid)?;
        let mut nodes_per_face = vec![0; to_usize(face_count)];
        self.grid_ints("get_grid_nodes_per_face", grid, &mut nodes_per_face)?;
        let total: i32 = nodes_per_face.iter().sum();
        check_capacity(grid, total, face_nodes.len())?;
        self.grid_ints("get_grid_face_nodes", grid, face_nodes)
    }

    /// Fill `nodes_per_face` with the node count of each face
    pub fn get_grid_nodes_per_face<'b>(
        &mut self,
        grid: i32,
        nodes_per_face: &'b mut [i32],
    ) -> XmiResult<&'b mut [i32]> {
        let face_count = self.get_grid_face_count(grid)?;
        check_capacity(grid, face_count, nodes_per_face.len())?;
        self.grid_ints("get_grid_nodes_per_face", grid, nodes_per_face)
    }

    pub fn get_grid_edge_count(&mut self, _grid: i32) -> XmiResult<i32> {
        Err(XmiError::NotImplemented("get_grid_edge_count".to_string()))
    }

    pub fn get_grid_edge_nodes<'b>(
        &mut self,
        _grid: i32,
        _edge_nodes: &'b mut [i32],
    ) -> XmiResult<&'b mut [i32]> {
        Err(XmiError::NotImplemented("get_grid_edge_nodes".to_string()))
    }

    pub fn get_grid_face_edges<'b>(
        &mut self,
        _grid: i32,
        _face_edges: &'b mut [i32],
    ) -> XmiResult<&'b mut [i32]> {
        Err(XmiError::NotImplemented("get_grid_face_edges".to_string()))
    }

    pub fn get_grid_spacing<'b>(
        &mut self,
        _grid: i32,
        _spacing: &'b mut [f64],
    ) -> XmiResult<&'b mut [f64]> {
        Err(XmiError::NotImplemented("get_grid_spacing".to_string()))
    }

    pub fn get_grid_origin<'b>(
        &mut self,
        _grid: i32,
        _origin: &'b mut [f64],
    ) -> XmiResult<&'b mut [f64]> {
        Err(XmiError::NotImplemented("get_grid_origin".to_string()))
    }

    /// Query everything known about a grid
    ///
    /// Structured grids report their shape; vertex and unstructured grids
    /// report nodes, faces and x/y coordinates.
    pub fn describe_grid(&mut self, grid: i32) -> XmiResult<Grid> {
        let rank = self.get_grid_rank(grid)?;
        let grid_type = self.grid_type(grid)?;
        let size = self.get_grid_size(grid)?;

        let topology = match grid_type {
            GridType::Structured => {
                let mut shape = vec![0; to_usize(rank)];
                self.grid_ints("get_grid_shape", grid, &mut shape)?;
                Topology::Structured { shape }
            }
            ref t if t.is_mesh() => Topology::Mesh(self.describe_mesh(grid)?),
            _ => Topology::Opaque,
        };

        Ok(Grid {
            id: grid,
            rank,
            grid_type,
            size,
            topology,
        })
    }

    fn describe_mesh(&mut self, grid: i32) -> XmiResult<Mesh> {
        let node_count = self.get_grid_node_count(grid)?;
        let face_count = self.get_grid_face_count(grid)?;

        let mut nodes_per_face = vec![0; to_usize(face_count)];
        self.grid_ints("get_grid_nodes_per_face", grid, &mut nodes_per_face)?;
        let total: usize = nodes_per_face.iter().map(|&n| to_usize(n)).sum();
        let mut face_nodes = vec![0; total];
        self.grid_ints("get_grid_face_nodes", grid, &mut face_nodes)?;

        let mut x = vec![0.0; to_usize(node_count)];
        self.grid_doubles("get_grid_x", grid, &mut x)?;
        let mut y = vec![0.0; to_usize(node_count)];
        self.grid_doubles("get_grid_y", grid, &mut y)?;

        Ok(Mesh {
            node_count,
            face_count,
            x,
            y,
            face_nodes,
            nodes_per_face,
        })
    }

    fn node_coordinates<'b>(
        &mut self,
        entry: &str,
        grid: i32,
        buf: &'b mut [c_double],
    ) -> XmiResult<&'b mut [c_double]> {
        let node_count = self.get_grid_node_count(grid)?;
        check_capacity(grid, node_count, buf.len())?;
        self.grid_doubles(entry, grid, buf)
    }

    fn grid_int(&mut self, entry: &str, grid: i32) -> XmiResult<i32> {
        let mut id: c_int = grid;
        let mut value: c_int = 0;
        self.invoker
            .invoke(entry, &mut [Arg::Int(&mut id), Arg::Int(&mut value)])?;
        Ok(value)
    }

    fn grid_ints<'b>(
        &mut self,
        entry: &str,
        grid: i32,
        buf: &'b mut [c_int],
    ) -> XmiResult<&'b mut [c_int]> {
        let mut id: c_int = grid;
        self.invoker
            .invoke(entry, &mut [Arg::Int(&mut id), Arg::Ints(&mut *buf)])?;
        Ok(buf)
    }

    fn grid_doubles<'b>(
        &mut self,
        entry: &str,
        grid: i32,
        buf: &'b mut [c_double],
    ) -> XmiResult<&'b mut [c_double]> {
        let mut id: c_int = grid;
        self.invoker
            .invoke(entry, &mut [Arg::Int(&mut id), Arg::Doubles(&mut *buf)])?;
        Ok(buf)
    }
}

/// The kernel writes `needed` elements whatever the slice length
fn check_capacity(grid: i32, needed: i32, got: usize) -> XmiResult<()> {
    let needed = to_usize(needed);
    if got < needed {
        return Err(XmiError::type_mismatch(
            &format!("grid {}", grid),
            format!("{} elements", needed),
            format!("{} elements", got),
        ));
    }
    Ok(())
}
