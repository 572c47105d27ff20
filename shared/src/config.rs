use serde::{Deserialize, Serialize};

use crate::projection::Projection;
use crate::zoom::{DEFAULT_DRAG_THRESHOLD, DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, Extent, ZoomConfig};

/// Viewport width (CSS px) under which the study map switches to its tall layout.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Study,
    Quiz,
}

/// Size and projection scale of one map screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

/// Everything that parameterizes one region's maps. Only affects rendering;
/// the quiz and study state never look at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub title: String,
    /// Feature property holding the unit identifier, also the display noun.
    pub unit_type: String,
    pub unit_names_path: String,
    pub geo_url: String,
    pub center_longitude: f64,
    pub center_latitude: f64,
    pub quiz: MapLayout,
    pub study: MapLayout,
    pub study_mobile: MapLayout,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub drag_threshold: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            title: "Counties of England".to_owned(),
            unit_type: "county".to_owned(),
            unit_names_path: "/data/englandCountyNames.json".to_owned(),
            geo_url: "/data/englishCeremonialCounties.json".to_owned(),
            center_longitude: -2.0,
            center_latitude: 52.8,
            quiz: MapLayout {
                width: 800.0,
                height: 600.0,
                scale: 5000.0,
            },
            study: MapLayout {
                width: 600.0,
                height: 350.0,
                scale: 3800.0,
            },
            study_mobile: MapLayout {
                width: 600.0,
                height: 650.0,
                scale: 6000.0,
            },
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
        }
    }
}

impl RegionConfig {
    pub fn from_json(text: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| format!("invalid region config: {e}"))?;
        Ok(config.sanitized())
    }

    /// Replace unusable numbers with defaults so every input still yields a map.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.unit_type.trim().is_empty() {
            self.unit_type = defaults.unit_type;
        }
        self.quiz = sanitize_layout(self.quiz, defaults.quiz);
        self.study = sanitize_layout(self.study, defaults.study);
        self.study_mobile = sanitize_layout(self.study_mobile, defaults.study_mobile);
        if !self.center_longitude.is_finite() || !self.center_latitude.is_finite() {
            self.center_longitude = defaults.center_longitude;
            self.center_latitude = defaults.center_latitude;
        }
        if !positive(self.min_zoom) || !positive(self.max_zoom) {
            self.min_zoom = defaults.min_zoom;
            self.max_zoom = defaults.max_zoom;
        } else if self.min_zoom > self.max_zoom {
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }
        if !self.drag_threshold.is_finite() || self.drag_threshold < 0.0 {
            self.drag_threshold = defaults.drag_threshold;
        }
        self
    }

    pub fn layout(&self, mode: Mode, viewport_width: f64) -> MapLayout {
        match mode {
            Mode::Quiz => self.quiz,
            Mode::Study if viewport_width < MOBILE_BREAKPOINT_PX => self.study_mobile,
            Mode::Study => self.study,
        }
    }

    pub fn projection(&self, layout: MapLayout) -> Projection {
        Projection::for_viewport(
            layout.scale,
            (self.center_longitude, self.center_latitude),
            layout.width,
            layout.height,
        )
    }

    /// The study map may not be dragged more than half a viewport past its
    /// edges; the quiz map is unbounded.
    pub fn zoom_config(&self, mode: Mode, layout: MapLayout) -> ZoomConfig {
        let (w, h) = (layout.width, layout.height);
        let translate_extent = match mode {
            Mode::Study => Extent::new([-w / 2.0, -h / 2.0], [w * 1.5, h * 1.5]),
            Mode::Quiz => Extent::UNBOUNDED,
        };
        ZoomConfig {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            translate_extent,
            viewport_width: w,
            viewport_height: h,
            drag_threshold: self.drag_threshold,
        }
    }
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn sanitize_layout(layout: MapLayout, fallback: MapLayout) -> MapLayout {
    if positive(layout.width) && positive(layout.height) && positive(layout.scale) {
        layout
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_english_counties() {
        let config = RegionConfig::default();
        assert_eq!(config.unit_type, "county");
        assert_eq!(config.quiz.scale, 5000.0);
        assert_eq!((config.min_zoom, config.max_zoom), (1.0, 8.0));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = RegionConfig::from_json(
            r#"{"title": "Counties of Wales", "geo_url": "/data/wales.json", "center_latitude": 52.3}"#,
        )
        .expect("valid config");
        assert_eq!(config.title, "Counties of Wales");
        assert_eq!(config.geo_url, "/data/wales.json");
        assert_eq!(config.center_latitude, 52.3);
        assert_eq!(config.unit_type, "county");
        assert_eq!(config.study.width, 600.0);
    }

    #[test]
    fn sanitize_repairs_bad_numbers() {
        let config = RegionConfig::from_json(
            r#"{"unit_type": " ", "min_zoom": 6, "max_zoom": 2, "drag_threshold": -4,
                "quiz": {"width": 0, "height": 600, "scale": 5000}}"#,
        )
        .expect("valid config");
        assert_eq!(config.unit_type, "county");
        assert_eq!((config.min_zoom, config.max_zoom), (2.0, 6.0));
        assert_eq!(config.drag_threshold, DEFAULT_DRAG_THRESHOLD);
        assert_eq!(config.quiz, RegionConfig::default().quiz);
    }

    #[test]
    fn study_layout_switches_on_narrow_screens() {
        let config = RegionConfig::default();
        assert_eq!(config.layout(Mode::Study, 1280.0).height, 350.0);
        assert_eq!(config.layout(Mode::Study, 400.0).height, 650.0);
        assert_eq!(config.layout(Mode::Quiz, 400.0).height, 600.0);
    }

    #[test]
    fn study_extent_is_half_a_viewport_past_each_edge() {
        let config = RegionConfig::default();
        let layout = config.layout(Mode::Study, 1280.0);
        let zoom = config.zoom_config(Mode::Study, layout);
        assert_eq!(
            zoom.translate_extent,
            Extent::new([-300.0, -175.0], [900.0, 525.0])
        );
        assert_eq!(
            config.zoom_config(Mode::Quiz, config.quiz).translate_extent,
            Extent::UNBOUNDED
        );
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Quiz).expect("serialize"), r#""quiz""#);
    }
}
