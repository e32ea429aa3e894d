use std::fmt;

/// Geometry a category's ways are converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Polygon,
}

/// The fixed classes of map data a snapshot is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Roads,
    Buildings,
    Forests,
    Rivers,
    Lakes,
    Channels,
    Water,
}

impl Category {
    /// Fetch order.
    pub const ALL: [Category; 7] = [
        Category::Roads,
        Category::Buildings,
        Category::Forests,
        Category::Rivers,
        Category::Lakes,
        Category::Channels,
        Category::Water,
    ];

    /// Back-to-front drawing order.
    pub const DRAW_ORDER: [Category; 7] = [
        Category::Water,
        Category::Lakes,
        Category::Forests,
        Category::Rivers,
        Category::Channels,
        Category::Roads,
        Category::Buildings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Roads => "roads",
            Category::Buildings => "buildings",
            Category::Forests => "forests",
            Category::Rivers => "rivers",
            Category::Lakes => "lakes",
            Category::Channels => "channels",
            Category::Water => "water",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        let name = name.trim().to_lowercase();
        Category::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn shape_kind(&self) -> ShapeKind {
        match self {
            Category::Roads | Category::Rivers | Category::Channels => ShapeKind::Line,
            Category::Buildings | Category::Forests | Category::Lakes | Category::Water => {
                ShapeKind::Polygon
            }
        }
    }

    /// Position in [`Category::DRAW_ORDER`]; lower draws first.
    pub fn draw_rank(&self) -> usize {
        Category::DRAW_ORDER
            .iter()
            .position(|c| c == self)
            .unwrap_or(Category::DRAW_ORDER.len())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
