//! Static drawing styles per category and road class.

use crate::types::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Outline drawn around filled shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub color: Rgb,
    /// Width in points.
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub color: Rgb,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f32,
    /// Stroke width in points. Used for lines.
    pub line_width: f32,
    pub edge: Option<Edge>,
    pub dashed: bool,
}

impl Style {
    const fn line(color: Rgb, line_width: f32) -> Self {
        Style {
            color,
            alpha: 1.0,
            line_width,
            edge: None,
            dashed: false,
        }
    }

    const fn area(color: Rgb, alpha: f32) -> Self {
        Style {
            color,
            alpha,
            line_width: 0.5,
            edge: None,
            dashed: false,
        }
    }

    const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    const fn with_edge(mut self, color: Rgb, width: f32) -> Self {
        self.edge = Some(Edge { color, width });
        self
    }

    const fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    pub fn alpha_u8(&self) -> u8 {
        (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryStyle {
    pub category: Category,
    pub label: &'static str,
    pub style: Style,
}

/// A group of `highway=*` values drawn alike, labelled `"<value> road"`.
#[derive(Debug, Clone, Copy)]
pub struct RoadClass {
    pub subtypes: &'static [&'static str],
    pub style: Style,
}

/// Every style the renderer uses. Process-wide and immutable.
#[derive(Debug)]
pub struct StyleSpec {
    pub categories: &'static [CategoryStyle],
    pub road_classes: &'static [RoadClass],
    /// Any `highway` value outside `road_classes`; labelled by the value.
    pub other_road: Style,
    /// Road features without a `highway` tag.
    pub untagged_road: Style,
}

const ORANGE_RED: Rgb = Rgb(255, 69, 0);
const ORANGE: Rgb = Rgb(255, 165, 0);
const GRAY: Rgb = Rgb(128, 128, 128);
const DARK_GREEN: Rgb = Rgb(0, 100, 0);
const FIREBRICK: Rgb = Rgb(178, 34, 34);
const LIGHT_SKY_BLUE: Rgb = Rgb(135, 206, 250);
const CORNFLOWER_BLUE: Rgb = Rgb(100, 149, 237);
const ROYAL_BLUE: Rgb = Rgb(65, 105, 225);
const DODGER_BLUE: Rgb = Rgb(30, 144, 255);

pub static STYLE_SPEC: StyleSpec = StyleSpec {
    categories: &[
        CategoryStyle {
            category: Category::Water,
            label: "Water",
            style: Style::area(LIGHT_SKY_BLUE, 0.8),
        },
        CategoryStyle {
            category: Category::Lakes,
            label: "Lakes",
            style: Style::area(CORNFLOWER_BLUE, 0.7),
        },
        CategoryStyle {
            category: Category::Forests,
            label: "Forests",
            style: Style::area(DARK_GREEN, 0.5),
        },
        CategoryStyle {
            category: Category::Rivers,
            label: "Rivers",
            style: Style::line(ROYAL_BLUE, 2.0),
        },
        CategoryStyle {
            category: Category::Channels,
            label: "Channels",
            style: Style::line(DODGER_BLUE, 1.0).with_alpha(0.9),
        },
        CategoryStyle {
            category: Category::Roads,
            label: "Roads",
            style: Style::line(Rgb::BLACK, 1.5),
        },
        CategoryStyle {
            category: Category::Buildings,
            label: "Buildings",
            style: Style::area(FIREBRICK, 0.7).with_edge(Rgb::BLACK, 0.5),
        },
    ],
    road_classes: &[
        RoadClass {
            subtypes: &["motorway", "trunk", "primary"],
            style: Style::line(ORANGE_RED, 2.5),
        },
        RoadClass {
            subtypes: &["secondary", "tertiary"],
            style: Style::line(ORANGE, 1.8),
        },
        RoadClass {
            subtypes: &["residential", "service"],
            style: Style::line(GRAY, 1.2),
        },
    ],
    other_road: Style::line(Rgb::BLACK, 0.8).dashed(),
    untagged_road: Style::line(Rgb::BLACK, 1.5),
};

impl StyleSpec {
    pub fn category(&self, category: Category) -> Option<&CategoryStyle> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Label and style for a road with the given `highway` value.
    pub fn road(&self, subtype: Option<&str>) -> (String, Style) {
        let Some(subtype) = subtype else {
            return ("Roads".to_string(), self.untagged_road);
        };
        match self
            .road_classes
            .iter()
            .find(|class| class.subtypes.iter().any(|s| *s == subtype))
        {
            Some(class) => (format!("{subtype} road"), class.style),
            None => (subtype.to_string(), self.other_road),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_is_styled() {
        for category in Category::ALL {
            assert!(STYLE_SPEC.category(category).is_some(), "{category}");
        }
    }

    #[test]
    fn major_roads_are_thickest() {
        let (label, motorway) = STYLE_SPEC.road(Some("motorway"));
        let (_, residential) = STYLE_SPEC.road(Some("residential"));
        assert_eq!(label, "motorway road");
        assert!(motorway.line_width > residential.line_width);
        assert_eq!(residential.color, Rgb(128, 128, 128));
    }

    #[test]
    fn unknown_road_types_are_dashed_and_labelled_by_type() {
        let (label, style) = STYLE_SPEC.road(Some("footway"));
        assert_eq!(label, "footway");
        assert!(style.dashed);
    }

    #[test]
    fn untagged_roads_fall_back_to_plain_style() {
        let (label, style) = STYLE_SPEC.road(None);
        assert_eq!(label, "Roads");
        assert!(!style.dashed);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(Rgb(178, 34, 34).hex(), "#b22222");
        assert_eq!(Style::area(DARK_GREEN, 0.5).alpha_u8(), 128);
    }
}
