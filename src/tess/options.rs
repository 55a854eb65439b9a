use geo::GeoFloat;

/// Rule deciding from its winding number whether a region is part of
/// the polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindingRule {
    EvenOdd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl Default for WindingRule {
    fn default() -> Self {
        WindingRule::EvenOdd
    }
}

impl WindingRule {
    #[must_use]
    pub fn is_inside(self, winding: i32) -> bool {
        use WindingRule::*;
        match self {
            EvenOdd => winding & 1 != 0,
            NonZero => winding != 0,
            Positive => winding > 0,
            Negative => winding < 0,
            AbsGeqTwo => winding >= 2 || winding <= -2,
        }
    }
}

/// Shape of a [`Tessellation`](crate::Tessellation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    /// Polygons of at most `poly_size` vertices.
    Polygons,
    /// As `Polygons`, plus the index of the neighbouring polygon across
    /// each polygon edge.
    ConnectedPolygons,
    /// The boundaries between inside and outside, as closed loops.
    BoundaryContours,
}

impl Default for ElementType {
    fn default() -> Self {
        ElementType::Polygons
    }
}

/// Parameters of one [`Tessellator::tessellate`](crate::Tessellator::tessellate)
/// call.
#[derive(Debug, Clone, PartialEq)]
pub struct TessOptions<T: GeoFloat> {
    pub winding_rule: WindingRule,
    pub element_type: ElementType,
    /// Maximum number of vertices per output polygon; at least 3.
    pub poly_size: usize,
    /// Skip polygons of (numerically) zero area.
    pub no_empty_polygons: bool,
    /// Projection normal. Computed from the input when `None` or zero.
    pub normal: Option<[T; 3]>,
    /// The sweep gives up after `(vertices + 8) * event_budget_factor`
    /// events.
    pub event_budget_factor: usize,
}

impl<T: GeoFloat> Default for TessOptions<T> {
    fn default() -> Self {
        TessOptions {
            winding_rule: WindingRule::EvenOdd,
            element_type: ElementType::Polygons,
            poly_size: 3,
            no_empty_polygons: false,
            normal: None,
            event_budget_factor: 4096,
        }
    }
}

impl<T: GeoFloat> TessOptions<T> {
    pub fn with_winding_rule(mut self, winding_rule: WindingRule) -> Self {
        self.winding_rule = winding_rule;
        self
    }

    pub fn with_element_type(mut self, element_type: ElementType) -> Self {
        self.element_type = element_type;
        self
    }

    pub fn with_poly_size(mut self, poly_size: usize) -> Self {
        self.poly_size = poly_size;
        self
    }

    pub fn with_no_empty_polygons(mut self, no_empty_polygons: bool) -> Self {
        self.no_empty_polygons = no_empty_polygons;
        self
    }

    pub fn with_normal(mut self, normal: [T; 3]) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_event_budget_factor(mut self, factor: usize) -> Self {
        self.event_budget_factor = factor;
        self
    }
}
