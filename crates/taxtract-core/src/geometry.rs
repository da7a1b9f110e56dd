use crate::error::TaxtractError;
use crate::extraction::BBox;
use crate::templates::schema::FieldRegion;

/// Points per inch in PDF user space.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Fractional pixels ignored before rounding a raster edge outward.
const RASTER_EPSILON: f64 = 1e-3;

/// Size of a PDF page and of the reference raster its regions were drawn on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pdf_width: f64,
    pdf_height: f64,
    raster_width: f64,
    raster_height: f64,
}

impl PageGeometry {
    /// Build a geometry from explicit dimensions. All four must be positive.
    pub fn new(
        pdf_width: f64,
        pdf_height: f64,
        raster_width: f64,
        raster_height: f64,
    ) -> Result<Self, TaxtractError> {
        for (label, value) in [
            ("pdf width", pdf_width),
            ("pdf height", pdf_height),
            ("raster width", raster_width),
            ("raster height", raster_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TaxtractError::InvalidGeometry(format!(
                    "{label} must be positive, got {value}"
                )));
            }
        }

        Ok(PageGeometry {
            pdf_width,
            pdf_height,
            raster_width,
            raster_height,
        })
    }

    /// Geometry of a page of the given size rendered at `dpi`.
    ///
    /// Raster dimensions round outward to whole pixels, the way a renderer
    /// sizes its output image. A fraction below a thousandth of a pixel is
    /// dropped as float noise.
    pub fn for_page(pdf_width: f64, pdf_height: f64, dpi: f64) -> Result<Self, TaxtractError> {
        if !dpi.is_finite() || dpi <= 0.0 {
            return Err(TaxtractError::InvalidGeometry(format!(
                "dpi must be positive, got {dpi}"
            )));
        }
        let zoom = dpi / POINTS_PER_INCH;
        Self::new(
            pdf_width,
            pdf_height,
            raster_pixels(pdf_width * zoom),
            raster_pixels(pdf_height * zoom),
        )
    }

    pub fn pdf_size(&self) -> (f64, f64) {
        (self.pdf_width, self.pdf_height)
    }

    pub fn raster_size(&self) -> (f64, f64) {
        (self.raster_width, self.raster_height)
    }

    /// Points per raster pixel along each axis.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.pdf_width / self.raster_width,
            self.pdf_height / self.raster_height,
        )
    }
}

fn raster_pixels(extent: f64) -> f64 {
    (extent - RASTER_EPSILON).ceil()
}

/// Convert a region drawn in raster pixel space into PDF point space.
pub fn map_region(region: &FieldRegion, geometry: &PageGeometry) -> BBox {
    let (scale_x, scale_y) = geometry.scale();
    BBox::new(
        region.x0 * scale_x,
        region.y0 * scale_y,
        region.x1 * scale_x,
        region.y1 * scale_y,
    )
}
