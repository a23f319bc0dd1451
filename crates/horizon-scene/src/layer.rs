use std::fmt;

/// One of the fixed draw layers, back to front.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Layer {
    Skybox,
    Sun,
    Stars,
    Mountains,
    Grid,
}

/// How a layer sources per-vertex data.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VertexInput {
    /// Positions are generated in the vertex shader from the vertex index.
    Procedural,
    /// One position per vertex.
    PerVertex,
    /// One position per instance (divisor 1).
    PerInstance,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Topology {
    TriangleList,
    TriangleStrip,
}

/// A single draw call issued for a layer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
    Instanced { vertices: u32, instances: u32 },
    Strip { vertices: u32 },
}

impl Layer {
    /// Draw order: skybox establishes the background, grid is the nearest plane.
    pub const ORDER: [Layer; 5] = [
        Layer::Skybox,
        Layer::Sun,
        Layer::Stars,
        Layer::Mountains,
        Layer::Grid,
    ];

    pub const COUNT: usize = Self::ORDER.len();

    /// Position in [`Layer::ORDER`].
    pub const fn index(self) -> usize {
        match self {
            Layer::Skybox => 0,
            Layer::Sun => 1,
            Layer::Stars => 2,
            Layer::Mountains => 3,
            Layer::Grid => 4,
        }
    }

    /// Base name of the layer's shader files.
    pub const fn name(self) -> &'static str {
        match self {
            Layer::Skybox => "skybox",
            Layer::Sun => "sun",
            Layer::Stars => "star",
            Layer::Mountains => "mountains",
            Layer::Grid => "grid",
        }
    }

    pub const fn vertex_input(self) -> VertexInput {
        match self {
            Layer::Stars => VertexInput::PerInstance,
            Layer::Mountains => VertexInput::PerVertex,
            Layer::Skybox | Layer::Sun | Layer::Grid => VertexInput::Procedural,
        }
    }

    pub const fn topology(self) -> Topology {
        match self {
            Layer::Mountains => Topology::TriangleStrip,
            _ => Topology::TriangleList,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_order() {
        for (i, layer) in Layer::ORDER.iter().enumerate() {
            assert_eq!(layer.index(), i);
        }
    }

    #[test]
    fn only_geometry_layers_read_vertex_buffers() {
        let buffered: Vec<Layer> = Layer::ORDER
            .into_iter()
            .filter(|l| l.vertex_input() != VertexInput::Procedural)
            .collect();
        assert_eq!(buffered, vec![Layer::Stars, Layer::Mountains]);
    }

    #[test]
    fn mountains_are_the_only_strip() {
        for layer in Layer::ORDER {
            let strip = layer.topology() == Topology::TriangleStrip;
            assert_eq!(strip, layer == Layer::Mountains);
        }
    }
}
